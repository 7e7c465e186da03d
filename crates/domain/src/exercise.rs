use std::{collections::BTreeSet, slice::Iter};

use chrono::{DateTime, Utc};

use crate::{CreateError, DeleteError, Name, ReadError, UpdateError, ValidationError, entity_id};

pub trait ExerciseService {
    fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    fn get_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError> {
        self.get_exercises()?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or(ReadError::NotFound)
    }
    fn create_exercise(
        &self,
        name: Name,
        primary_muscle: MuscleGroup,
        secondary_muscles: BTreeSet<MuscleGroup>,
        equipment: Equipment,
        instructions: Option<String>,
    ) -> Result<Exercise, CreateError>;
    fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
    fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;

    fn validate_exercise_name(&self, name: &str, id: ExerciseID) -> Result<Name, ValidationError> {
        match Name::new(name) {
            Ok(name) => match self.get_exercises() {
                Ok(exercises) => {
                    if exercises.iter().all(|e| {
                        e.id == id || e.name.as_ref().to_lowercase() != name.as_ref().to_lowercase()
                    }) {
                        Ok(name)
                    } else {
                        Err(ValidationError::Conflict("name".to_string()))
                    }
                }
                Err(err) => Err(ValidationError::Other(err.into())),
            },
            Err(err) => Err(ValidationError::Other(err.into())),
        }
    }
}

pub trait ExerciseRepository {
    fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    fn create_exercise(&self, exercise: Exercise) -> Result<Exercise, CreateError>;
    fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
    /// Remove the exercise and clear every reference to it.
    fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub primary_muscle: MuscleGroup,
    pub secondary_muscles: BTreeSet<MuscleGroup>,
    pub equipment: Equipment,
    pub instructions: Option<String>,
    pub is_custom: bool,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    #[must_use]
    pub fn new(
        id: ExerciseID,
        name: Name,
        primary_muscle: MuscleGroup,
        equipment: Equipment,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            primary_muscle,
            secondary_muscles: BTreeSet::new(),
            equipment,
            instructions: None,
            is_custom: false,
            created_at,
        }
    }

    #[must_use]
    pub fn with_secondary_muscles(
        mut self,
        secondary_muscles: impl IntoIterator<Item = MuscleGroup>,
    ) -> Self {
        self.secondary_muscles = secondary_muscles.into_iter().collect();
        self.normalize();
        self
    }

    #[must_use]
    pub fn with_instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = instructions.filter(|i| !i.trim().is_empty());
        self
    }

    #[must_use]
    pub fn custom(mut self) -> Self {
        self.is_custom = true;
        self
    }

    /// Drop the primary muscle from the secondary muscles.
    pub fn normalize(&mut self) {
        self.secondary_muscles.remove(&self.primary_muscle);
    }

    #[must_use]
    pub fn targets(&self, muscle: MuscleGroup) -> bool {
        self.primary_muscle == muscle || self.secondary_muscles.contains(&muscle)
    }
}

entity_id!(ExerciseID);

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Core,
    #[default]
    FullBody,
}

impl Property for MuscleGroup {
    fn iter() -> Iter<'static, MuscleGroup> {
        static MUSCLES: [MuscleGroup; 11] = [
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Biceps,
            MuscleGroup::Triceps,
            MuscleGroup::Quads,
            MuscleGroup::Hamstrings,
            MuscleGroup::Glutes,
            MuscleGroup::Calves,
            MuscleGroup::Core,
            MuscleGroup::FullBody,
        ];
        MUSCLES.iter()
    }

    fn name(self) -> &'static str {
        match self {
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Back => "Back",
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Biceps => "Biceps",
            MuscleGroup::Triceps => "Triceps",
            MuscleGroup::Quads => "Quads",
            MuscleGroup::Hamstrings => "Hamstrings",
            MuscleGroup::Glutes => "Glutes",
            MuscleGroup::Calves => "Calves",
            MuscleGroup::Core => "Core",
            MuscleGroup::FullBody => "Full Body",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Cable,
    Machine,
    Bodyweight,
    Kettlebell,
    #[default]
    Other,
}

impl Property for Equipment {
    fn iter() -> Iter<'static, Equipment> {
        static EQUIPMENT: [Equipment; 7] = [
            Equipment::Barbell,
            Equipment::Dumbbell,
            Equipment::Cable,
            Equipment::Machine,
            Equipment::Bodyweight,
            Equipment::Kettlebell,
            Equipment::Other,
        ];
        EQUIPMENT.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Equipment::Barbell => "Barbell",
            Equipment::Dumbbell => "Dumbbell",
            Equipment::Cable => "Cable",
            Equipment::Machine => "Machine",
            Equipment::Bodyweight => "Bodyweight",
            Equipment::Kettlebell => "Kettlebell",
            Equipment::Other => "Other",
        }
    }
}

#[derive(Default, PartialEq)]
pub struct ExerciseFilter {
    pub name: String,
    pub muscle: Option<MuscleGroup>,
    pub equipment: Option<Equipment>,
}

impl ExerciseFilter {
    #[must_use]
    pub fn exercises<'a>(
        &self,
        exercises: impl Iterator<Item = &'a Exercise>,
    ) -> Vec<&'a Exercise> {
        let name = self.name.trim().to_lowercase();
        exercises
            .filter(|e| {
                e.name.as_ref().to_lowercase().contains(&name)
                    && self.muscle.is_none_or(|m| e.targets(m))
                    && self.equipment.is_none_or(|eq| e.equipment == eq)
            })
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.muscle.is_none() && self.equipment.is_none()
    }

    #[must_use]
    pub fn muscle_list(&self) -> Vec<(MuscleGroup, bool)> {
        MuscleGroup::iter()
            .map(|m| (*m, self.muscle == Some(*m)))
            .collect::<Vec<_>>()
    }

    #[must_use]
    pub fn equipment_list(&self) -> Vec<(Equipment, bool)> {
        Equipment::iter()
            .map(|e| (*e, self.equipment == Some(*e)))
            .collect::<Vec<_>>()
    }

    pub fn toggle_muscle(&mut self, muscle: MuscleGroup) {
        if self.muscle == Some(muscle) {
            self.muscle = None;
        } else {
            self.muscle = Some(muscle);
        }
    }

    pub fn toggle_equipment(&mut self, equipment: Equipment) {
        if self.equipment == Some(equipment) {
            self.equipment = None;
        } else {
            self.equipment = Some(equipment);
        }
    }
}

pub trait Property: Clone + Copy + Sized + PartialEq + 'static {
    fn iter() -> Iter<'static, Self>;
    fn name(self) -> &'static str;

    /// Look up a value by its display name.
    #[must_use]
    fn from_name(name: &str) -> Option<Self> {
        Self::iter().copied().find(|p| p.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn exercise(id: u128, name: &str, primary: MuscleGroup, equipment: Equipment) -> Exercise {
        Exercise::new(
            id.into(),
            Name::new(name).unwrap(),
            primary,
            equipment,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_exercise_secondary_muscles_exclude_primary() {
        let exercise = exercise(1, "Bench Press", MuscleGroup::Chest, Equipment::Barbell)
            .with_secondary_muscles([
                MuscleGroup::Chest,
                MuscleGroup::Triceps,
                MuscleGroup::Shoulders,
            ]);
        assert_eq!(
            exercise.secondary_muscles,
            BTreeSet::from([MuscleGroup::Shoulders, MuscleGroup::Triceps])
        );
    }

    #[test]
    fn test_exercise_with_instructions() {
        let e = exercise(1, "A", MuscleGroup::Core, Equipment::Bodyweight);
        assert_eq!(
            e.clone().with_instructions(Some("  ".into())).instructions,
            None
        );
        assert_eq!(
            e.with_instructions(Some("Brace".into())).instructions,
            Some("Brace".into())
        );
    }

    #[test]
    fn test_exercise_id_nil() {
        assert!(ExerciseID::nil().is_nil());
        assert_eq!(ExerciseID::nil(), ExerciseID::default());
        assert!(!ExerciseID::random().is_nil());
    }

    #[rstest]
    #[case(ExerciseFilter::default(), vec!["Bench Press", "Pull-Up", "Squat"])]
    #[case(ExerciseFilter { name: " PRESS ".into(), ..ExerciseFilter::default() }, vec!["Bench Press"])]
    #[case(ExerciseFilter { muscle: Some(MuscleGroup::Biceps), ..ExerciseFilter::default() }, vec!["Pull-Up"])]
    #[case(ExerciseFilter { muscle: Some(MuscleGroup::Back), ..ExerciseFilter::default() }, vec!["Pull-Up"])]
    #[case(ExerciseFilter { equipment: Some(Equipment::Barbell), ..ExerciseFilter::default() }, vec!["Bench Press", "Squat"])]
    #[case(
        ExerciseFilter { name: "s".into(), muscle: Some(MuscleGroup::Quads), equipment: Some(Equipment::Barbell) },
        vec!["Squat"]
    )]
    fn test_exercise_filter_exercises(#[case] filter: ExerciseFilter, #[case] expected: Vec<&str>) {
        let exercises = [
            exercise(1, "Bench Press", MuscleGroup::Chest, Equipment::Barbell),
            exercise(2, "Pull-Up", MuscleGroup::Back, Equipment::Bodyweight)
                .with_secondary_muscles([MuscleGroup::Biceps]),
            exercise(3, "Squat", MuscleGroup::Quads, Equipment::Barbell),
        ];
        assert_eq!(
            filter
                .exercises(exercises.iter())
                .iter()
                .map(|e| e.name.to_string())
                .collect::<Vec<_>>(),
            expected
        );
    }

    #[test]
    fn test_exercise_filter_toggle() {
        let mut filter = ExerciseFilter::default();
        assert!(filter.is_empty());

        filter.toggle_muscle(MuscleGroup::Chest);
        filter.toggle_equipment(Equipment::Cable);
        assert_eq!(filter.muscle, Some(MuscleGroup::Chest));
        assert_eq!(filter.equipment, Some(Equipment::Cable));
        assert!(
            filter
                .muscle_list()
                .contains(&(MuscleGroup::Chest, true))
        );

        filter.toggle_muscle(MuscleGroup::Back);
        assert_eq!(filter.muscle, Some(MuscleGroup::Back));

        filter.toggle_muscle(MuscleGroup::Back);
        filter.toggle_equipment(Equipment::Cable);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_muscle_group_name() {
        let mut names = HashSet::new();

        for muscle in MuscleGroup::iter() {
            let name = muscle.name();

            assert!(!name.is_empty());
            assert!(!names.contains(name));
            assert_eq!(MuscleGroup::from_name(name), Some(*muscle));

            names.insert(name);
        }
    }

    #[test]
    fn test_equipment_name() {
        let mut names = HashSet::new();

        for equipment in Equipment::iter() {
            let name = equipment.name();

            assert!(!name.is_empty());
            assert!(!names.contains(name));
            assert_eq!(Equipment::from_name(name), Some(*equipment));

            names.insert(name);
        }
    }

    #[rstest]
    #[case("Full Body", Some(MuscleGroup::FullBody))]
    #[case("full body", None)]
    #[case("Lats", None)]
    fn test_muscle_group_from_name(#[case] name: &str, #[case] expected: Option<MuscleGroup>) {
        assert_eq!(MuscleGroup::from_name(name), expected);
    }
}
