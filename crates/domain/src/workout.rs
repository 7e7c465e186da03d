use chrono::{DateTime, Duration, Utc};

use crate::{
    CreateError, DeleteError, ExerciseID, Name, ReadError, UpdateError, WorkoutSet, WorkoutSetID,
    entity_id,
};

pub trait WorkoutService {
    fn get_workouts(&self) -> Result<Vec<Workout>, ReadError>;
    fn get_workout(&self, id: WorkoutID) -> Result<Workout, ReadError> {
        self.get_workouts()?
            .into_iter()
            .find(|w| w.id == id)
            .ok_or(ReadError::NotFound)
    }
    fn start_workout(&self) -> Result<Workout, CreateError>;
    fn rename_workout(
        &self,
        id: WorkoutID,
        name: Name,
        notes: Option<String>,
    ) -> Result<Workout, UpdateError>;
    fn add_exercises(
        &self,
        id: WorkoutID,
        exercise_ids: &[ExerciseID],
    ) -> Result<Vec<WorkoutExercise>, CreateError>;
    fn remove_exercise(&self, id: WorkoutExerciseID) -> Result<WorkoutExerciseID, DeleteError>;
    fn add_set(&self, id: WorkoutExerciseID) -> Result<WorkoutSet, CreateError>;
    fn replace_set(&self, set: WorkoutSet) -> Result<WorkoutSet, UpdateError>;
    /// Toggle a set's completion state, returning whether it became completed.
    fn toggle_set(&self, id: WorkoutSetID) -> Result<bool, UpdateError>;
    fn remove_set(&self, id: WorkoutSetID) -> Result<WorkoutSetID, DeleteError>;
    fn finish_workout(&self, id: WorkoutID) -> Result<Workout, UpdateError>;
    /// Hard-delete a workout that is still in progress.
    fn discard_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError>;
    fn delete_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError>;
}

pub trait WorkoutRepository {
    fn read_workouts(&self) -> Result<Vec<Workout>, ReadError>;
    fn read_workout_exercises(&self) -> Result<Vec<WorkoutExercise>, ReadError>;
    fn read_workout_sets(&self) -> Result<Vec<WorkoutSet>, ReadError>;
    fn create_workout(&self, workout: Workout) -> Result<Workout, CreateError>;
    fn replace_workout(&self, workout: Workout) -> Result<Workout, UpdateError>;
    /// Remove the workout together with its workout exercises and sets.
    fn delete_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError>;
    fn create_workout_exercise(
        &self,
        workout_exercise: WorkoutExercise,
    ) -> Result<WorkoutExercise, CreateError>;
    /// Remove the workout exercise together with its sets.
    fn delete_workout_exercise(
        &self,
        id: WorkoutExerciseID,
    ) -> Result<WorkoutExerciseID, DeleteError>;
    fn create_workout_set(&self, set: WorkoutSet) -> Result<WorkoutSet, CreateError>;
    fn replace_workout_set(&self, set: WorkoutSet) -> Result<WorkoutSet, UpdateError>;
    fn delete_workout_set(&self, id: WorkoutSetID) -> Result<WorkoutSetID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: WorkoutID,
    pub name: Name,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub completed: bool,
}

impl Workout {
    /// A workout in progress, started at `started_at`.
    #[must_use]
    pub fn new(id: WorkoutID, name: Name, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            started_at,
            completed_at: None,
            notes: None,
            completed: false,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.completed_at.map(|c| c - self.started_at)
    }

    /// Mark the workout as completed.
    ///
    /// A workout is completed at most once, finishing a completed workout leaves it unchanged
    /// and returns `false`.
    pub fn finish(&mut self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(now);
        true
    }

    /// Completion timestamp, or the start timestamp if the completion was never recorded.
    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.completed_at.unwrap_or(self.started_at)
    }
}

entity_id!(WorkoutID);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutExercise {
    pub id: WorkoutExerciseID,
    pub workout_id: WorkoutID,
    pub exercise_id: Option<ExerciseID>,
    pub order: u32,
}

entity_id!(WorkoutExerciseID);
