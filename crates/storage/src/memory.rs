use std::cell::RefCell;

use liftlog_domain::{
    self as domain, CreateError, DeleteError, Graph, ReadError, StorageError, UpdateError,
};

/// Writes a graph to a durable location.
pub trait Persistence {
    fn persist(&self, graph: &Graph) -> Result<(), StorageError>;
}

impl Persistence for () {
    fn persist(&self, _: &Graph) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Arena-backed store holding all entities in memory.
///
/// Changes are handed to the persistence on every save. Without persistence, saving does nothing.
/// Discarding restores the state of the last successful save.
#[derive(Debug, Default)]
pub struct Memory<P = ()> {
    graph: RefCell<Graph>,
    saved: RefCell<Graph>,
    persistence: P,
}

impl Memory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P> Memory<P> {
    pub fn with_persistence(graph: Graph, persistence: P) -> Self {
        Self {
            saved: RefCell::new(graph.clone()),
            graph: RefCell::new(graph),
            persistence,
        }
    }

    /// A snapshot of the stored entities.
    pub fn graph(&self) -> Graph {
        self.graph.borrow().clone()
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }
}

impl From<Graph> for Memory {
    fn from(graph: Graph) -> Self {
        Self::with_persistence(graph, ())
    }
}

impl<P: Persistence> domain::SaveRepository for Memory<P> {
    fn save(&self) -> Result<(), StorageError> {
        let graph = self.graph.borrow();
        self.persistence.persist(&graph)?;
        *self.saved.borrow_mut() = graph.clone();
        Ok(())
    }

    fn discard(&self) {
        *self.graph.borrow_mut() = self.saved.borrow().clone();
    }
}

impl<P> domain::ExerciseRepository for Memory<P> {
    fn read_exercises(&self) -> Result<Vec<domain::Exercise>, ReadError> {
        Ok(self.graph.borrow().exercises().cloned().collect())
    }

    fn create_exercise(&self, exercise: domain::Exercise) -> Result<domain::Exercise, CreateError> {
        self.graph.borrow_mut().insert_exercise(exercise).cloned()
    }

    fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, UpdateError> {
        self.graph.borrow_mut().replace_exercise(exercise).cloned()
    }

    fn delete_exercise(&self, id: domain::ExerciseID) -> Result<domain::ExerciseID, DeleteError> {
        self.graph.borrow_mut().remove_exercise(id).map(|e| e.id)
    }
}

impl<P> domain::WorkoutRepository for Memory<P> {
    fn read_workouts(&self) -> Result<Vec<domain::Workout>, ReadError> {
        Ok(self.graph.borrow().workouts().cloned().collect())
    }

    fn read_workout_exercises(&self) -> Result<Vec<domain::WorkoutExercise>, ReadError> {
        Ok(self.graph.borrow().all_workout_exercises().cloned().collect())
    }

    fn read_workout_sets(&self) -> Result<Vec<domain::WorkoutSet>, ReadError> {
        Ok(self.graph.borrow().all_workout_sets().cloned().collect())
    }

    fn create_workout(&self, workout: domain::Workout) -> Result<domain::Workout, CreateError> {
        self.graph.borrow_mut().insert_workout(workout).cloned()
    }

    fn replace_workout(&self, workout: domain::Workout) -> Result<domain::Workout, UpdateError> {
        self.graph.borrow_mut().replace_workout(workout).cloned()
    }

    fn delete_workout(&self, id: domain::WorkoutID) -> Result<domain::WorkoutID, DeleteError> {
        self.graph.borrow_mut().remove_workout(id).map(|w| w.id)
    }

    fn create_workout_exercise(
        &self,
        workout_exercise: domain::WorkoutExercise,
    ) -> Result<domain::WorkoutExercise, CreateError> {
        self.graph
            .borrow_mut()
            .insert_workout_exercise(workout_exercise)
            .cloned()
    }

    fn delete_workout_exercise(
        &self,
        id: domain::WorkoutExerciseID,
    ) -> Result<domain::WorkoutExerciseID, DeleteError> {
        self.graph
            .borrow_mut()
            .remove_workout_exercise(id)
            .map(|we| we.id)
    }

    fn create_workout_set(
        &self,
        set: domain::WorkoutSet,
    ) -> Result<domain::WorkoutSet, CreateError> {
        self.graph.borrow_mut().insert_workout_set(set).cloned()
    }

    fn replace_workout_set(
        &self,
        set: domain::WorkoutSet,
    ) -> Result<domain::WorkoutSet, UpdateError> {
        self.graph.borrow_mut().replace_workout_set(set).cloned()
    }

    fn delete_workout_set(
        &self,
        id: domain::WorkoutSetID,
    ) -> Result<domain::WorkoutSetID, DeleteError> {
        self.graph.borrow_mut().remove_workout_set(id).map(|s| s.id)
    }
}

impl<P> domain::TemplateRepository for Memory<P> {
    fn read_templates(&self) -> Result<Vec<domain::WorkoutTemplate>, ReadError> {
        Ok(self.graph.borrow().templates().cloned().collect())
    }

    fn read_template_exercises(&self) -> Result<Vec<domain::TemplateExercise>, ReadError> {
        Ok(self.graph.borrow().all_template_exercises().cloned().collect())
    }

    fn create_template(
        &self,
        template: domain::WorkoutTemplate,
    ) -> Result<domain::WorkoutTemplate, CreateError> {
        self.graph.borrow_mut().insert_template(template).cloned()
    }

    fn replace_template(
        &self,
        template: domain::WorkoutTemplate,
    ) -> Result<domain::WorkoutTemplate, UpdateError> {
        self.graph.borrow_mut().replace_template(template).cloned()
    }

    fn delete_template(&self, id: domain::TemplateID) -> Result<domain::TemplateID, DeleteError> {
        self.graph.borrow_mut().remove_template(id).map(|t| t.id)
    }

    fn create_template_exercise(
        &self,
        template_exercise: domain::TemplateExercise,
    ) -> Result<domain::TemplateExercise, CreateError> {
        self.graph
            .borrow_mut()
            .insert_template_exercise(template_exercise)
            .cloned()
    }

    fn delete_template_exercise(
        &self,
        id: domain::TemplateExerciseID,
    ) -> Result<domain::TemplateExerciseID, DeleteError> {
        self.graph
            .borrow_mut()
            .remove_template_exercise(id)
            .map(|te| te.id)
    }
}
