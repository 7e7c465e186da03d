use std::collections::BTreeSet;

use chrono::Utc;
use log::{debug, error, info, warn};

use crate::{
    CreateError, DeleteError, Equipment, Exercise, ExerciseID, ExerciseRepository,
    ExerciseService, Graph, HistoryService, MuscleGroup, Name, ReadError, SeedRepository,
    StorageError, TemplateExercise, TemplateID, TemplateItem, TemplateRepository, TemplateService,
    UpdateError, Workout, WorkoutExercise, WorkoutExerciseID, WorkoutID, WorkoutRepository,
    WorkoutService, WorkoutSet, WorkoutSetID, WorkoutTemplate, instantiate, sort_by_last_use,
};

pub trait SaveRepository {
    /// Persist all changes made since the last save.
    fn save(&self) -> Result<(), StorageError>;
    /// Drop all changes made since the last save.
    fn discard(&self);
}

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

impl<R: SaveRepository> Service<R> {
    /// Save the changes of a successful operation, or drop them if the operation or the save
    /// failed.
    fn persist<T, E: From<StorageError>>(&self, result: Result<T, E>) -> Result<T, E> {
        let result = result.and_then(|value| {
            self.repository.save()?;
            Ok(value)
        });
        if result.is_err() {
            self.repository.discard();
        }
        result
    }
}

impl<R: ExerciseRepository + SaveRepository> Service<R> {
    /// Import the exercises of a seed source if no exercises exist yet.
    ///
    /// Failures are logged and abort the import. Returns the number of imported exercises.
    pub fn import_seed_exercises(&self, seed: &impl SeedRepository) -> usize {
        match self.repository.read_exercises() {
            Ok(exercises) if !exercises.is_empty() => {
                debug!("exercises already present: {}", exercises.len());
                return 0;
            }
            Ok(_) => {}
            Err(err) => {
                error!("failed to get exercises: {err}");
                return 0;
            }
        }

        let seed_exercises = match seed.read_seed_exercises() {
            Ok(seed_exercises) => seed_exercises,
            Err(err) => {
                error!("failed to read seed exercises: {err}");
                return 0;
            }
        };

        let now = Utc::now();
        let mut count = 0;
        for seed_exercise in &seed_exercises {
            let exercise = match seed_exercise.to_exercise(ExerciseID::random(), now) {
                Ok(exercise) => exercise,
                Err(err) => {
                    warn!("skipped seed exercise {:?}: {err}", seed_exercise.name);
                    continue;
                }
            };
            match self.repository.create_exercise(exercise) {
                Ok(_) => count += 1,
                Err(err) => warn!("skipped seed exercise {:?}: {err}", seed_exercise.name),
            }
        }

        if let Err(err) = self.repository.save() {
            error!("failed to save seed exercises: {err}");
            self.repository.discard();
            return 0;
        }

        info!("imported {count} exercises");
        count
    }
}

macro_rules! log_on_error {
    ($func: expr, $expected: pat, $action: literal, $entity: literal) => {{
        let result = $func;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $expected => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: ExerciseRepository + SaveRepository> ExerciseService for Service<R> {
    fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        let mut exercises = log_on_error!(
            self.repository.read_exercises(),
            ReadError::NotFound,
            "get",
            "exercises"
        )?;
        exercises.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(exercises)
    }

    fn create_exercise(
        &self,
        name: Name,
        primary_muscle: MuscleGroup,
        secondary_muscles: BTreeSet<MuscleGroup>,
        equipment: Equipment,
        instructions: Option<String>,
    ) -> Result<Exercise, CreateError> {
        let exercise = Exercise::new(
            ExerciseID::random(),
            name,
            primary_muscle,
            equipment,
            Utc::now(),
        )
        .with_secondary_muscles(secondary_muscles)
        .with_instructions(instructions)
        .custom();
        log_on_error!(
            self.persist(self.repository.create_exercise(exercise)),
            CreateError::Conflict,
            "create",
            "exercise"
        )
    }

    fn replace_exercise(&self, mut exercise: Exercise) -> Result<Exercise, UpdateError> {
        exercise.normalize();
        log_on_error!(
            self.persist(self.repository.replace_exercise(exercise)),
            UpdateError::NotFound,
            "replace",
            "exercise"
        )
    }

    fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError> {
        log_on_error!(
            self.persist(self.repository.delete_exercise(id)),
            DeleteError::NotFound,
            "delete",
            "exercise"
        )
    }
}

impl<R: WorkoutRepository + SaveRepository> Service<R> {
    fn read_workout_exercises_of(
        &self,
        workout_id: WorkoutID,
    ) -> Result<Vec<WorkoutExercise>, ReadError> {
        let mut workout_exercises = self
            .repository
            .read_workout_exercises()?
            .into_iter()
            .filter(|we| we.workout_id == workout_id)
            .collect::<Vec<_>>();
        workout_exercises.sort_by_key(|we| we.order);
        Ok(workout_exercises)
    }

    fn read_workout_set(&self, id: WorkoutSetID) -> Result<WorkoutSet, ReadError> {
        self.repository
            .read_workout_sets()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or(ReadError::NotFound)
    }

    fn append_exercises(
        &self,
        id: WorkoutID,
        exercise_ids: &[ExerciseID],
    ) -> Result<Vec<WorkoutExercise>, CreateError> {
        self.get_workout(id)?;
        let next_order = self
            .read_workout_exercises_of(id)?
            .last()
            .map_or(0, |we| we.order + 1);

        let mut workout_exercises = vec![];
        for (order, exercise_id) in (next_order..).zip(exercise_ids) {
            let workout_exercise = self.repository.create_workout_exercise(WorkoutExercise {
                id: WorkoutExerciseID::random(),
                workout_id: id,
                exercise_id: Some(*exercise_id),
                order,
            })?;
            self.repository.create_workout_set(WorkoutSet::new(
                WorkoutSetID::random(),
                workout_exercise.id,
                0,
            ))?;
            workout_exercises.push(workout_exercise);
        }
        Ok(workout_exercises)
    }

    fn append_set(&self, id: WorkoutExerciseID) -> Result<WorkoutSet, CreateError> {
        let sets = self
            .repository
            .read_workout_sets()?
            .into_iter()
            .filter(|s| s.workout_exercise_id == id)
            .count();
        let order = u32::try_from(sets).map_err(|err| CreateError::Other(err.into()))?;
        self.repository
            .create_workout_set(WorkoutSet::new(WorkoutSetID::random(), id, order))
    }

    fn update_workout(
        &self,
        id: WorkoutID,
        update: impl FnOnce(&mut Workout),
    ) -> Result<Workout, UpdateError> {
        let mut workout = self.get_workout(id)?;
        update(&mut workout);
        self.repository.replace_workout(workout)
    }

    fn update_set(
        &self,
        id: WorkoutSetID,
        update: impl FnOnce(&mut WorkoutSet) -> bool,
    ) -> Result<bool, UpdateError> {
        let mut set = self.read_workout_set(id)?;
        let result = update(&mut set);
        self.repository.replace_workout_set(set)?;
        Ok(result)
    }

    fn delete_workout_in_progress(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError> {
        if self.get_workout(id)?.completed {
            return Err(DeleteError::Completed);
        }
        self.repository.delete_workout(id)
    }
}

impl<R: WorkoutRepository + SaveRepository> WorkoutService for Service<R> {
    fn get_workouts(&self) -> Result<Vec<Workout>, ReadError> {
        let mut workouts = log_on_error!(
            self.repository.read_workouts(),
            ReadError::NotFound,
            "get",
            "workouts"
        )?;
        workouts.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(workouts)
    }

    fn start_workout(&self) -> Result<Workout, CreateError> {
        log_on_error!(
            self.persist(self.repository.create_workout(Workout::new(
                WorkoutID::random(),
                Name::workout(),
                Utc::now(),
            ))),
            CreateError::Conflict,
            "start",
            "workout"
        )
    }

    fn rename_workout(
        &self,
        id: WorkoutID,
        name: Name,
        notes: Option<String>,
    ) -> Result<Workout, UpdateError> {
        log_on_error!(
            self.persist(self.update_workout(id, |workout| {
                workout.name = name;
                workout.notes = notes.filter(|n| !n.trim().is_empty());
            })),
            UpdateError::NotFound,
            "rename",
            "workout"
        )
    }

    fn add_exercises(
        &self,
        id: WorkoutID,
        exercise_ids: &[ExerciseID],
    ) -> Result<Vec<WorkoutExercise>, CreateError> {
        log_on_error!(
            self.persist(self.append_exercises(id, exercise_ids)),
            CreateError::ParentNotFound,
            "add",
            "exercises"
        )
    }

    fn remove_exercise(&self, id: WorkoutExerciseID) -> Result<WorkoutExerciseID, DeleteError> {
        log_on_error!(
            self.persist(self.repository.delete_workout_exercise(id)),
            DeleteError::NotFound,
            "remove",
            "workout exercise"
        )
    }

    fn add_set(&self, id: WorkoutExerciseID) -> Result<WorkoutSet, CreateError> {
        log_on_error!(
            self.persist(self.append_set(id)),
            CreateError::ParentNotFound,
            "add",
            "set"
        )
    }

    fn replace_set(&self, set: WorkoutSet) -> Result<WorkoutSet, UpdateError> {
        log_on_error!(
            self.persist(self.repository.replace_workout_set(set)),
            UpdateError::NotFound,
            "replace",
            "set"
        )
    }

    fn toggle_set(&self, id: WorkoutSetID) -> Result<bool, UpdateError> {
        log_on_error!(
            self.persist(self.update_set(id, |set| set.toggle_completed(Utc::now()))),
            UpdateError::NotFound,
            "toggle",
            "set"
        )
    }

    fn remove_set(&self, id: WorkoutSetID) -> Result<WorkoutSetID, DeleteError> {
        log_on_error!(
            self.persist(self.repository.delete_workout_set(id)),
            DeleteError::NotFound,
            "remove",
            "set"
        )
    }

    fn finish_workout(&self, id: WorkoutID) -> Result<Workout, UpdateError> {
        log_on_error!(
            self.persist(self.update_workout(id, |workout| {
                workout.finish(Utc::now());
            })),
            UpdateError::NotFound,
            "finish",
            "workout"
        )
    }

    fn discard_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError> {
        log_on_error!(
            self.persist(self.delete_workout_in_progress(id)),
            DeleteError::Completed,
            "discard",
            "workout"
        )
    }

    fn delete_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError> {
        log_on_error!(
            self.persist(self.repository.delete_workout(id)),
            DeleteError::NotFound,
            "delete",
            "workout"
        )
    }
}

impl<R: TemplateRepository + WorkoutRepository + SaveRepository> Service<R> {
    fn read_template(&self, id: TemplateID) -> Result<WorkoutTemplate, ReadError> {
        self.repository
            .read_templates()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(ReadError::NotFound)
    }

    fn write_template(
        &self,
        id: Option<TemplateID>,
        name: Name,
        notes: Option<String>,
        items: Vec<TemplateItem>,
    ) -> Result<WorkoutTemplate, CreateError> {
        let notes = notes.filter(|n| !n.trim().is_empty());
        let template = if let Some(id) = id {
            let mut template = self.read_template(id)?;
            template.name = name;
            template.notes = notes;
            for template_exercise in self.get_template_exercises(id)? {
                self.repository
                    .delete_template_exercise(template_exercise.id)?;
            }
            self.repository.replace_template(template)?
        } else {
            let mut template = WorkoutTemplate::new(TemplateID::random(), name, Utc::now());
            template.notes = notes;
            self.repository.create_template(template)?
        };

        for (order, item) in (0..).zip(items) {
            self.repository
                .create_template_exercise(item.into_template_exercise(template.id, order))?;
        }

        Ok(template)
    }

    fn materialize_template(&self, id: TemplateID) -> Result<Workout, CreateError> {
        let mut template = self.read_template(id)?;
        let template_exercises = self.get_template_exercises(id)?;
        let draft = instantiate(&mut template, &template_exercises, Utc::now());

        let workout = self.repository.create_workout(draft.workout)?;
        for (workout_exercise, sets) in draft.exercises {
            self.repository.create_workout_exercise(workout_exercise)?;
            for set in sets {
                self.repository.create_workout_set(set)?;
            }
        }
        self.repository.replace_template(template)?;

        Ok(workout)
    }
}

impl<R: TemplateRepository + WorkoutRepository + SaveRepository> TemplateService for Service<R> {
    fn get_templates(&self) -> Result<Vec<WorkoutTemplate>, ReadError> {
        let mut templates = log_on_error!(
            self.repository.read_templates(),
            ReadError::NotFound,
            "get",
            "templates"
        )?;
        sort_by_last_use(&mut templates);
        Ok(templates)
    }

    fn get_template_exercises(&self, id: TemplateID) -> Result<Vec<TemplateExercise>, ReadError> {
        let mut template_exercises = log_on_error!(
            self.repository.read_template_exercises(),
            ReadError::NotFound,
            "get",
            "template exercises"
        )?
        .into_iter()
        .filter(|te| te.template_id == id)
        .collect::<Vec<_>>();
        template_exercises.sort_by_key(|te| te.order);
        Ok(template_exercises)
    }

    fn save_template(
        &self,
        id: Option<TemplateID>,
        name: Name,
        notes: Option<String>,
        items: Vec<TemplateItem>,
    ) -> Result<WorkoutTemplate, CreateError> {
        log_on_error!(
            self.persist(self.write_template(id, name, notes, items)),
            CreateError::ParentNotFound,
            "save",
            "template"
        )
    }

    fn delete_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError> {
        log_on_error!(
            self.persist(self.repository.delete_template(id)),
            DeleteError::NotFound,
            "delete",
            "template"
        )
    }

    fn start_workout_from_template(&self, id: TemplateID) -> Result<Workout, CreateError> {
        log_on_error!(
            self.persist(self.materialize_template(id)),
            CreateError::ParentNotFound,
            "start",
            "workout from template"
        )
    }
}

impl<R: ExerciseRepository + WorkoutRepository + TemplateRepository> HistoryService for Service<R> {
    fn get_graph(&self) -> Result<Graph, ReadError> {
        log_on_error!(
            self.read_graph(),
            ReadError::NotFound,
            "get",
            "history"
        )
    }
}

impl<R: ExerciseRepository + WorkoutRepository + TemplateRepository> Service<R> {
    fn read_graph(&self) -> Result<Graph, ReadError> {
        Ok(Graph::from_records(
            self.repository.read_exercises()?,
            self.repository.read_workouts()?,
            self.repository.read_workout_exercises()?,
            self.repository.read_workout_sets()?,
            self.repository.read_templates()?,
            self.repository.read_template_exercises()?,
        ))
    }
}
