use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::{
    CreateError, DeleteError, ExerciseID, Name, ReadError, Reps, UpdateError, Weight, Workout,
    WorkoutExercise, WorkoutExerciseID, WorkoutID, WorkoutSet, WorkoutSetID, entity_id,
};

pub trait TemplateService {
    /// All templates, most recently used first.
    fn get_templates(&self) -> Result<Vec<WorkoutTemplate>, ReadError>;
    fn get_template_exercises(&self, id: TemplateID) -> Result<Vec<TemplateExercise>, ReadError>;
    /// Create a template or, if `id` is given, replace name, notes and all exercises of it.
    fn save_template(
        &self,
        id: Option<TemplateID>,
        name: Name,
        notes: Option<String>,
        items: Vec<TemplateItem>,
    ) -> Result<WorkoutTemplate, CreateError>;
    fn delete_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError>;
    fn start_workout_from_template(&self, id: TemplateID) -> Result<Workout, CreateError>;
}

pub trait TemplateRepository {
    fn read_templates(&self) -> Result<Vec<WorkoutTemplate>, ReadError>;
    fn read_template_exercises(&self) -> Result<Vec<TemplateExercise>, ReadError>;
    fn create_template(&self, template: WorkoutTemplate) -> Result<WorkoutTemplate, CreateError>;
    fn replace_template(&self, template: WorkoutTemplate) -> Result<WorkoutTemplate, UpdateError>;
    /// Remove the template together with its template exercises.
    fn delete_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError>;
    fn create_template_exercise(
        &self,
        template_exercise: TemplateExercise,
    ) -> Result<TemplateExercise, CreateError>;
    fn delete_template_exercise(
        &self,
        id: TemplateExerciseID,
    ) -> Result<TemplateExerciseID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutTemplate {
    pub id: TemplateID,
    pub name: Name,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl WorkoutTemplate {
    #[must_use]
    pub fn new(id: TemplateID, name: Name, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            notes: None,
            created_at,
            last_used_at: None,
        }
    }
}

entity_id!(TemplateID);

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateExercise {
    pub id: TemplateExerciseID,
    pub template_id: TemplateID,
    pub exercise_id: Option<ExerciseID>,
    pub order: u32,
    pub default_set_count: u32,
    pub default_weight: Option<Weight>,
    pub default_reps: Option<Reps>,
    pub notes: Option<String>,
}

entity_id!(TemplateExerciseID);

/// One exercise entry of a template being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateItem {
    pub exercise_id: Option<ExerciseID>,
    pub set_count: u32,
    pub default_weight: Option<Weight>,
    pub default_reps: Option<Reps>,
    pub notes: Option<String>,
}

impl TemplateItem {
    pub const DEFAULT_SET_COUNT: u32 = 3;

    #[must_use]
    pub fn new(exercise_id: ExerciseID) -> Self {
        Self {
            exercise_id: Some(exercise_id),
            set_count: Self::DEFAULT_SET_COUNT,
            default_weight: None,
            default_reps: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn into_template_exercise(self, template_id: TemplateID, order: u32) -> TemplateExercise {
        TemplateExercise {
            id: TemplateExerciseID::random(),
            template_id,
            exercise_id: self.exercise_id,
            order,
            default_set_count: self.set_count,
            default_weight: self.default_weight,
            default_reps: self.default_reps,
            notes: self.notes,
        }
    }
}

impl From<&TemplateExercise> for TemplateItem {
    fn from(value: &TemplateExercise) -> Self {
        Self {
            exercise_id: value.exercise_id,
            set_count: value.default_set_count,
            default_weight: value.default_weight,
            default_reps: value.default_reps,
            notes: value.notes.clone(),
        }
    }
}

/// A workout materialized from a template, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutDraft {
    pub workout: Workout,
    pub exercises: Vec<(WorkoutExercise, Vec<WorkoutSet>)>,
}

/// Expand a template into a new workout in progress.
///
/// Every template exercise becomes a workout exercise with the same order and exercise
/// reference, holding `default_set_count` sets prefilled with the default weight and reps.
/// The template's `last_used_at` is set to `now`.
#[must_use]
pub fn instantiate(
    template: &mut WorkoutTemplate,
    template_exercises: &[TemplateExercise],
    now: DateTime<Utc>,
) -> WorkoutDraft {
    let workout = Workout::new(WorkoutID::random(), template.name.clone(), now);

    let mut template_exercises = template_exercises
        .iter()
        .filter(|te| te.template_id == template.id)
        .collect::<Vec<_>>();
    template_exercises.sort_by_key(|te| te.order);

    let exercises = template_exercises
        .into_iter()
        .map(|te| {
            let workout_exercise = WorkoutExercise {
                id: WorkoutExerciseID::random(),
                workout_id: workout.id,
                exercise_id: te.exercise_id,
                order: te.order,
            };
            let sets = (0..te.default_set_count)
                .map(|order| WorkoutSet {
                    weight: te.default_weight.unwrap_or_default(),
                    reps: te.default_reps.unwrap_or_default(),
                    ..WorkoutSet::new(WorkoutSetID::random(), workout_exercise.id, order)
                })
                .collect::<Vec<_>>();
            (workout_exercise, sets)
        })
        .collect::<Vec<_>>();

    template.last_used_at = Some(now);

    WorkoutDraft { workout, exercises }
}

/// Order templates by last use, most recent first. Templates never used come last, newest first.
pub fn sort_by_last_use(templates: &mut [WorkoutTemplate]) {
    templates.sort_by(|a, b| match (a.last_used_at, b.last_used_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.created_at.cmp(&a.created_at),
    });
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn template() -> WorkoutTemplate {
        WorkoutTemplate::new(
            1.into(),
            Name::new("Push Day").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn template_exercise(
        id: u128,
        order: u32,
        default_set_count: u32,
        default_weight: Option<f64>,
        default_reps: Option<u32>,
    ) -> TemplateExercise {
        TemplateExercise {
            id: id.into(),
            template_id: 1.into(),
            exercise_id: Some(id.into()),
            order,
            default_set_count,
            default_weight: default_weight.map(|w| Weight::new(w).unwrap()),
            default_reps: default_reps.map(|r| Reps::new(r).unwrap()),
            notes: None,
        }
    }

    #[test]
    fn test_instantiate() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 18, 0, 0).unwrap();
        let mut template = template();

        let draft = instantiate(
            &mut template,
            &[template_exercise(10, 0, 3, Some(45.0), Some(10))],
            now,
        );

        assert_eq!(draft.workout.name, template.name);
        assert_eq!(draft.workout.started_at, now);
        assert!(!draft.workout.completed);
        assert_eq!(draft.workout.completed_at, None);
        assert_eq!(draft.exercises.len(), 1);

        let (workout_exercise, sets) = &draft.exercises[0];
        assert_eq!(workout_exercise.workout_id, draft.workout.id);
        assert_eq!(workout_exercise.exercise_id, Some(10.into()));
        assert_eq!(workout_exercise.order, 0);
        assert_eq!(sets.len(), 3);
        assert_eq!(sets.iter().map(|s| s.order).collect::<Vec<_>>(), vec![0, 1, 2]);
        for set in sets {
            assert_eq!(set.workout_exercise_id, workout_exercise.id);
            assert_eq!(set.weight, Weight::new(45.0).unwrap());
            assert_eq!(set.reps, Reps::new(10).unwrap());
            assert!(!set.completed);
            assert_eq!(set.completed_at, None);
        }

        assert_eq!(template.last_used_at, Some(now));
    }

    #[test]
    fn test_instantiate_defaults_and_order() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 18, 0, 0).unwrap();
        let mut template = template();
        let mut other = template_exercise(30, 0, 2, None, None);
        other.template_id = 2.into();

        let draft = instantiate(
            &mut template,
            &[
                template_exercise(20, 1, 0, None, None),
                template_exercise(10, 0, 2, None, Some(8)),
                other,
            ],
            now,
        );

        assert_eq!(
            draft
                .exercises
                .iter()
                .map(|(we, sets)| (we.exercise_id, we.order, sets.len()))
                .collect::<Vec<_>>(),
            vec![(Some(10.into()), 0, 2), (Some(20.into()), 1, 0)]
        );
        for set in &draft.exercises[0].1 {
            assert_eq!(set.weight, Weight::ZERO);
            assert_eq!(set.reps, Reps::new(8).unwrap());
        }
    }

    #[test]
    fn test_instantiate_deleted_exercise() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 18, 0, 0).unwrap();
        let mut template = template();
        let mut template_exercise = template_exercise(10, 0, 1, None, None);
        template_exercise.exercise_id = None;

        let draft = instantiate(&mut template, &[template_exercise], now);

        assert_eq!(draft.exercises[0].0.exercise_id, None);
        assert_eq!(draft.exercises[0].1.len(), 1);
    }

    #[test]
    fn test_template_item_round_trip() {
        let template_exercise = template_exercise(10, 4, 5, Some(95.0), Some(6));
        let item = TemplateItem::from(&template_exercise);
        let converted = item.into_template_exercise(1.into(), 4);

        assert_eq!(converted.exercise_id, template_exercise.exercise_id);
        assert_eq!(converted.default_set_count, 5);
        assert_eq!(converted.default_weight, template_exercise.default_weight);
        assert_eq!(converted.default_reps, template_exercise.default_reps);
        assert_eq!(TemplateItem::new(3.into()).set_count, 3);
    }

    #[test]
    fn test_sort_by_last_use() {
        let base = template();
        let at = |h| Some(Utc.with_ymd_and_hms(2024, 3, 4, h, 0, 0).unwrap());
        let mut templates = vec![
            WorkoutTemplate {
                id: 1.into(),
                last_used_at: None,
                ..base.clone()
            },
            WorkoutTemplate {
                id: 2.into(),
                last_used_at: at(8),
                ..base.clone()
            },
            WorkoutTemplate {
                id: 3.into(),
                last_used_at: at(12),
                ..base.clone()
            },
            WorkoutTemplate {
                id: 4.into(),
                last_used_at: None,
                created_at: base.created_at + chrono::Duration::days(1),
                ..base.clone()
            },
        ];

        sort_by_last_use(&mut templates);

        assert_eq!(
            templates.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![3.into(), 2.into(), 4.into(), 1.into()]
        );
    }
}
