use std::collections::{BTreeMap, BTreeSet};

use log::warn;

use crate::{
    CreateError, DeleteError, Exercise, ExerciseID, MuscleGroup, Name, Property, TemplateExercise,
    TemplateExerciseID, TemplateID, UpdateError, Workout, WorkoutExercise, WorkoutExerciseID,
    WorkoutID, WorkoutSet, WorkoutSetID, WorkoutTemplate,
};

/// All entities of a user, with explicit ownership.
///
/// Workouts own their workout exercises, which own their sets. Templates own their template
/// exercises. Exercises are only referenced, removing an exercise clears every reference to it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    exercises: BTreeMap<ExerciseID, Exercise>,
    workouts: BTreeMap<WorkoutID, Workout>,
    workout_exercises: BTreeMap<WorkoutExerciseID, WorkoutExercise>,
    workout_sets: BTreeMap<WorkoutSetID, WorkoutSet>,
    templates: BTreeMap<TemplateID, WorkoutTemplate>,
    template_exercises: BTreeMap<TemplateExerciseID, TemplateExercise>,
    workout_children: BTreeMap<WorkoutID, BTreeSet<WorkoutExerciseID>>,
    set_children: BTreeMap<WorkoutExerciseID, BTreeSet<WorkoutSetID>>,
    template_children: BTreeMap<TemplateID, BTreeSet<TemplateExerciseID>>,
    exercise_references: BTreeMap<ExerciseID, BTreeSet<WorkoutExerciseID>>,
    exercise_template_references: BTreeMap<ExerciseID, BTreeSet<TemplateExerciseID>>,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from flat collections.
    ///
    /// Records whose owner is missing or whose order is already taken are dropped. References to
    /// unknown exercises are cleared.
    #[must_use]
    pub fn from_records(
        exercises: Vec<Exercise>,
        workouts: Vec<Workout>,
        workout_exercises: Vec<WorkoutExercise>,
        workout_sets: Vec<WorkoutSet>,
        templates: Vec<WorkoutTemplate>,
        template_exercises: Vec<TemplateExercise>,
    ) -> Self {
        let mut graph = Self::new();

        for exercise in exercises {
            let id = exercise.id;
            if let Err(err) = graph.insert_exercise(exercise) {
                warn!("dropped exercise {id}: {err}");
            }
        }
        for workout in workouts {
            let id = workout.id;
            if let Err(err) = graph.insert_workout(workout) {
                warn!("dropped workout {id}: {err}");
            }
        }
        for mut workout_exercise in workout_exercises {
            let id = workout_exercise.id;
            if workout_exercise
                .exercise_id
                .is_some_and(|e| !graph.exercises.contains_key(&e))
            {
                warn!("cleared unknown exercise of workout exercise {id}");
                workout_exercise.exercise_id = None;
            }
            if let Err(err) = graph.insert_workout_exercise(workout_exercise) {
                warn!("dropped workout exercise {id}: {err}");
            }
        }
        for workout_set in workout_sets {
            let id = workout_set.id;
            if let Err(err) = graph.insert_workout_set(workout_set) {
                warn!("dropped workout set {id}: {err}");
            }
        }
        for template in templates {
            let id = template.id;
            if let Err(err) = graph.insert_template(template) {
                warn!("dropped template {id}: {err}");
            }
        }
        for mut template_exercise in template_exercises {
            let id = template_exercise.id;
            if template_exercise
                .exercise_id
                .is_some_and(|e| !graph.exercises.contains_key(&e))
            {
                warn!("cleared unknown exercise of template exercise {id}");
                template_exercise.exercise_id = None;
            }
            if let Err(err) = graph.insert_template_exercise(template_exercise) {
                warn!("dropped template exercise {id}: {err}");
            }
        }

        graph
    }

    // Exercises

    pub fn exercises(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.values()
    }

    #[must_use]
    pub fn exercise(&self, id: ExerciseID) -> Option<&Exercise> {
        self.exercises.get(&id)
    }

    pub fn insert_exercise(&mut self, mut exercise: Exercise) -> Result<&Exercise, CreateError> {
        if self.exercises.contains_key(&exercise.id) {
            return Err(CreateError::Conflict);
        }
        exercise.normalize();
        let id = exercise.id;
        Ok(self.exercises.entry(id).or_insert(exercise))
    }

    pub fn replace_exercise(&mut self, mut exercise: Exercise) -> Result<&Exercise, UpdateError> {
        let Some(entry) = self.exercises.get_mut(&exercise.id) else {
            return Err(UpdateError::NotFound);
        };
        exercise.normalize();
        *entry = exercise;
        Ok(entry)
    }

    /// Remove an exercise and clear all workout and template references to it.
    pub fn remove_exercise(&mut self, id: ExerciseID) -> Result<Exercise, DeleteError> {
        let exercise = self.exercises.remove(&id).ok_or(DeleteError::NotFound)?;
        for workout_exercise_id in self.exercise_references.remove(&id).unwrap_or_default() {
            if let Some(workout_exercise) = self.workout_exercises.get_mut(&workout_exercise_id) {
                workout_exercise.exercise_id = None;
            }
        }
        for template_exercise_id in self
            .exercise_template_references
            .remove(&id)
            .unwrap_or_default()
        {
            if let Some(template_exercise) = self.template_exercises.get_mut(&template_exercise_id)
            {
                template_exercise.exercise_id = None;
            }
        }
        Ok(exercise)
    }

    // Workouts

    pub fn workouts(&self) -> impl Iterator<Item = &Workout> {
        self.workouts.values()
    }

    #[must_use]
    pub fn workout(&self, id: WorkoutID) -> Option<&Workout> {
        self.workouts.get(&id)
    }

    pub fn insert_workout(&mut self, workout: Workout) -> Result<&Workout, CreateError> {
        if self.workouts.contains_key(&workout.id) {
            return Err(CreateError::Conflict);
        }
        let id = workout.id;
        self.workout_children.entry(id).or_default();
        Ok(self.workouts.entry(id).or_insert(workout))
    }

    pub fn replace_workout(&mut self, workout: Workout) -> Result<&Workout, UpdateError> {
        let Some(entry) = self.workouts.get_mut(&workout.id) else {
            return Err(UpdateError::NotFound);
        };
        *entry = workout;
        Ok(entry)
    }

    /// Remove a workout with all its workout exercises and sets.
    pub fn remove_workout(&mut self, id: WorkoutID) -> Result<Workout, DeleteError> {
        let workout = self.workouts.remove(&id).ok_or(DeleteError::NotFound)?;
        for workout_exercise_id in self.workout_children.remove(&id).unwrap_or_default() {
            self.detach_workout_exercise(workout_exercise_id);
        }
        Ok(workout)
    }

    // Workout exercises

    pub fn all_workout_exercises(&self) -> impl Iterator<Item = &WorkoutExercise> {
        self.workout_exercises.values()
    }

    #[must_use]
    pub fn workout_exercise(&self, id: WorkoutExerciseID) -> Option<&WorkoutExercise> {
        self.workout_exercises.get(&id)
    }

    /// Workout exercises of a workout in order.
    #[must_use]
    pub fn workout_exercises(&self, workout_id: WorkoutID) -> Vec<&WorkoutExercise> {
        let mut result = self
            .workout_children
            .get(&workout_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.workout_exercises.get(id))
            .collect::<Vec<_>>();
        result.sort_by_key(|we| we.order);
        result
    }

    /// Workout exercises referencing the given exercise, across all workouts.
    #[must_use]
    pub fn workout_exercises_of(&self, exercise_id: ExerciseID) -> Vec<&WorkoutExercise> {
        self.exercise_references
            .get(&exercise_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.workout_exercises.get(id))
            .collect()
    }

    pub fn insert_workout_exercise(
        &mut self,
        workout_exercise: WorkoutExercise,
    ) -> Result<&WorkoutExercise, CreateError> {
        if self.workout_exercises.contains_key(&workout_exercise.id) {
            return Err(CreateError::Conflict);
        }
        if !self.workouts.contains_key(&workout_exercise.workout_id) {
            return Err(CreateError::ParentNotFound);
        }
        if workout_exercise
            .exercise_id
            .is_some_and(|e| !self.exercises.contains_key(&e))
        {
            return Err(CreateError::ParentNotFound);
        }
        if self.workout_order_taken(&workout_exercise) {
            return Err(CreateError::Conflict);
        }

        let id = workout_exercise.id;
        self.workout_children
            .entry(workout_exercise.workout_id)
            .or_default()
            .insert(id);
        self.set_children.entry(id).or_default();
        if let Some(exercise_id) = workout_exercise.exercise_id {
            self.exercise_references
                .entry(exercise_id)
                .or_default()
                .insert(id);
        }
        Ok(self.workout_exercises.entry(id).or_insert(workout_exercise))
    }

    /// Replace the order or exercise reference of a workout exercise within its workout.
    pub fn replace_workout_exercise(
        &mut self,
        workout_exercise: WorkoutExercise,
    ) -> Result<&WorkoutExercise, UpdateError> {
        let Some(current) = self.workout_exercises.get(&workout_exercise.id) else {
            return Err(UpdateError::NotFound);
        };
        if current.workout_id != workout_exercise.workout_id
            || workout_exercise
                .exercise_id
                .is_some_and(|e| !self.exercises.contains_key(&e))
            || self.workout_order_taken(&workout_exercise)
        {
            return Err(UpdateError::Conflict);
        }

        if let Some(previous) = current.exercise_id {
            if let Some(references) = self.exercise_references.get_mut(&previous) {
                references.remove(&workout_exercise.id);
            }
        }
        if let Some(exercise_id) = workout_exercise.exercise_id {
            self.exercise_references
                .entry(exercise_id)
                .or_default()
                .insert(workout_exercise.id);
        }
        let id = workout_exercise.id;
        self.workout_exercises.insert(id, workout_exercise);
        self.workout_exercises.get(&id).ok_or(UpdateError::NotFound)
    }

    /// Remove a workout exercise with all its sets.
    pub fn remove_workout_exercise(
        &mut self,
        id: WorkoutExerciseID,
    ) -> Result<WorkoutExercise, DeleteError> {
        let workout_exercise = self.detach_workout_exercise(id).ok_or(DeleteError::NotFound)?;
        if let Some(children) = self.workout_children.get_mut(&workout_exercise.workout_id) {
            children.remove(&id);
        }
        Ok(workout_exercise)
    }

    fn detach_workout_exercise(&mut self, id: WorkoutExerciseID) -> Option<WorkoutExercise> {
        let workout_exercise = self.workout_exercises.remove(&id)?;
        for set_id in self.set_children.remove(&id).unwrap_or_default() {
            self.workout_sets.remove(&set_id);
        }
        if let Some(exercise_id) = workout_exercise.exercise_id {
            if let Some(references) = self.exercise_references.get_mut(&exercise_id) {
                references.remove(&id);
            }
        }
        Some(workout_exercise)
    }

    fn workout_order_taken(&self, workout_exercise: &WorkoutExercise) -> bool {
        self.workout_exercises(workout_exercise.workout_id)
            .iter()
            .any(|we| we.id != workout_exercise.id && we.order == workout_exercise.order)
    }

    // Workout sets

    pub fn all_workout_sets(&self) -> impl Iterator<Item = &WorkoutSet> {
        self.workout_sets.values()
    }

    #[must_use]
    pub fn workout_set(&self, id: WorkoutSetID) -> Option<&WorkoutSet> {
        self.workout_sets.get(&id)
    }

    /// Sets of a workout exercise in order.
    #[must_use]
    pub fn sets(&self, workout_exercise_id: WorkoutExerciseID) -> Vec<&WorkoutSet> {
        let mut result = self
            .set_children
            .get(&workout_exercise_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.workout_sets.get(id))
            .collect::<Vec<_>>();
        result.sort_by_key(|s| s.order);
        result
    }

    pub fn insert_workout_set(&mut self, set: WorkoutSet) -> Result<&WorkoutSet, CreateError> {
        if self.workout_sets.contains_key(&set.id) {
            return Err(CreateError::Conflict);
        }
        let Some(children) = self.set_children.get_mut(&set.workout_exercise_id) else {
            return Err(CreateError::ParentNotFound);
        };
        let id = set.id;
        children.insert(id);
        Ok(self.workout_sets.entry(id).or_insert(set))
    }

    pub fn replace_workout_set(&mut self, set: WorkoutSet) -> Result<&WorkoutSet, UpdateError> {
        let Some(entry) = self.workout_sets.get_mut(&set.id) else {
            return Err(UpdateError::NotFound);
        };
        if entry.workout_exercise_id != set.workout_exercise_id {
            return Err(UpdateError::Conflict);
        }
        *entry = set;
        Ok(entry)
    }

    pub fn remove_workout_set(&mut self, id: WorkoutSetID) -> Result<WorkoutSet, DeleteError> {
        let set = self.workout_sets.remove(&id).ok_or(DeleteError::NotFound)?;
        if let Some(children) = self.set_children.get_mut(&set.workout_exercise_id) {
            children.remove(&id);
        }
        Ok(set)
    }

    // Templates

    pub fn templates(&self) -> impl Iterator<Item = &WorkoutTemplate> {
        self.templates.values()
    }

    #[must_use]
    pub fn template(&self, id: TemplateID) -> Option<&WorkoutTemplate> {
        self.templates.get(&id)
    }

    pub fn insert_template(
        &mut self,
        template: WorkoutTemplate,
    ) -> Result<&WorkoutTemplate, CreateError> {
        if self.templates.contains_key(&template.id) {
            return Err(CreateError::Conflict);
        }
        let id = template.id;
        self.template_children.entry(id).or_default();
        Ok(self.templates.entry(id).or_insert(template))
    }

    pub fn replace_template(
        &mut self,
        template: WorkoutTemplate,
    ) -> Result<&WorkoutTemplate, UpdateError> {
        let Some(entry) = self.templates.get_mut(&template.id) else {
            return Err(UpdateError::NotFound);
        };
        *entry = template;
        Ok(entry)
    }

    /// Remove a template with all its template exercises.
    pub fn remove_template(&mut self, id: TemplateID) -> Result<WorkoutTemplate, DeleteError> {
        let template = self.templates.remove(&id).ok_or(DeleteError::NotFound)?;
        for template_exercise_id in self.template_children.remove(&id).unwrap_or_default() {
            self.detach_template_exercise(template_exercise_id);
        }
        Ok(template)
    }

    // Template exercises

    pub fn all_template_exercises(&self) -> impl Iterator<Item = &TemplateExercise> {
        self.template_exercises.values()
    }

    /// Template exercises of a template in order.
    #[must_use]
    pub fn template_exercises(&self, template_id: TemplateID) -> Vec<&TemplateExercise> {
        let mut result = self
            .template_children
            .get(&template_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.template_exercises.get(id))
            .collect::<Vec<_>>();
        result.sort_by_key(|te| te.order);
        result
    }

    pub fn insert_template_exercise(
        &mut self,
        template_exercise: TemplateExercise,
    ) -> Result<&TemplateExercise, CreateError> {
        if self.template_exercises.contains_key(&template_exercise.id) {
            return Err(CreateError::Conflict);
        }
        if !self.templates.contains_key(&template_exercise.template_id) {
            return Err(CreateError::ParentNotFound);
        }
        if template_exercise
            .exercise_id
            .is_some_and(|e| !self.exercises.contains_key(&e))
        {
            return Err(CreateError::ParentNotFound);
        }
        if self
            .template_exercises(template_exercise.template_id)
            .iter()
            .any(|te| te.order == template_exercise.order)
        {
            return Err(CreateError::Conflict);
        }

        let id = template_exercise.id;
        self.template_children
            .entry(template_exercise.template_id)
            .or_default()
            .insert(id);
        if let Some(exercise_id) = template_exercise.exercise_id {
            self.exercise_template_references
                .entry(exercise_id)
                .or_default()
                .insert(id);
        }
        Ok(self
            .template_exercises
            .entry(id)
            .or_insert(template_exercise))
    }

    pub fn remove_template_exercise(
        &mut self,
        id: TemplateExerciseID,
    ) -> Result<TemplateExercise, DeleteError> {
        let template_exercise = self
            .detach_template_exercise(id)
            .ok_or(DeleteError::NotFound)?;
        if let Some(children) = self
            .template_children
            .get_mut(&template_exercise.template_id)
        {
            children.remove(&id);
        }
        Ok(template_exercise)
    }

    fn detach_template_exercise(&mut self, id: TemplateExerciseID) -> Option<TemplateExercise> {
        let template_exercise = self.template_exercises.remove(&id)?;
        if let Some(exercise_id) = template_exercise.exercise_id {
            if let Some(references) = self.exercise_template_references.get_mut(&exercise_id) {
                references.remove(&id);
            }
        }
        Some(template_exercise)
    }

    // Derived values

    #[must_use]
    pub fn exercise_count(&self, workout_id: WorkoutID) -> usize {
        self.workout_children.get(&workout_id).map_or(0, BTreeSet::len)
    }

    /// Number of sets of a workout, completed or not.
    #[must_use]
    pub fn total_sets(&self, workout_id: WorkoutID) -> usize {
        self.workout_exercises(workout_id)
            .iter()
            .map(|we| self.set_children.get(&we.id).map_or(0, BTreeSet::len))
            .sum()
    }

    #[must_use]
    pub fn completed_sets(&self, workout_id: WorkoutID) -> usize {
        self.workout_exercises(workout_id)
            .iter()
            .flat_map(|we| self.sets(we.id))
            .filter(|s| s.completed)
            .count()
    }

    /// Names of the exercises of a workout in order. Deleted exercises are skipped.
    #[must_use]
    pub fn exercise_names(&self, workout_id: WorkoutID) -> Vec<&Name> {
        self.workout_exercises(workout_id)
            .iter()
            .filter_map(|we| we.exercise_id.and_then(|id| self.exercises.get(&id)))
            .map(|e| &e.name)
            .collect()
    }

    #[must_use]
    pub fn template_exercise_count(&self, template_id: TemplateID) -> usize {
        self.template_children.get(&template_id).map_or(0, BTreeSet::len)
    }

    /// Sum of the default set counts of a template.
    #[must_use]
    pub fn template_total_sets(&self, template_id: TemplateID) -> u32 {
        self.template_exercises(template_id)
            .iter()
            .map(|te| te.default_set_count)
            .sum()
    }

    /// Distinct primary muscles of a template in order of appearance.
    #[must_use]
    pub fn template_muscles(&self, template_id: TemplateID) -> Vec<MuscleGroup> {
        let mut muscles = vec![];
        for muscle in self
            .template_exercises(template_id)
            .iter()
            .filter_map(|te| te.exercise_id.and_then(|id| self.exercises.get(&id)))
            .map(|e| e.primary_muscle)
        {
            if !muscles.contains(&muscle) {
                muscles.push(muscle);
            }
        }
        muscles
    }

    /// Short description of the muscles a template targets, e.g. "Chest, Triceps +1".
    #[must_use]
    pub fn muscle_groups_summary(&self, template_id: TemplateID) -> String {
        let muscles = self.template_muscles(template_id);
        match muscles.as_slice() {
            [] => "No exercises".to_string(),
            [first, second, rest @ ..] if !rest.is_empty() => {
                format!("{}, {} +{}", first.name(), second.name(), rest.len())
            }
            _ => muscles
                .iter()
                .map(|m| m.name())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
