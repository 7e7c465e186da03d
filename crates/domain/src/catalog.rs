use chrono::{DateTime, Utc};

use crate::{Equipment, Exercise, ExerciseID, MuscleGroup, Name, NameError, Property, ReadError};

pub trait SeedRepository {
    fn read_seed_exercises(&self) -> Result<Vec<SeedExercise>, ReadError>;
}

/// An exercise as described by a seed source, with muscles and equipment given by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedExercise {
    pub name: String,
    pub primary_muscle: String,
    pub secondary_muscles: Vec<String>,
    pub equipment: String,
    pub instructions: Option<String>,
}

impl SeedExercise {
    /// Create a built-in exercise.
    ///
    /// An unknown primary muscle maps to full body, unknown secondary muscles are dropped and
    /// unknown equipment maps to other.
    pub fn to_exercise(
        &self,
        id: ExerciseID,
        created_at: DateTime<Utc>,
    ) -> Result<Exercise, NameError> {
        Ok(Exercise::new(
            id,
            Name::new(&self.name)?,
            MuscleGroup::from_name(&self.primary_muscle).unwrap_or_default(),
            Equipment::from_name(&self.equipment).unwrap_or_default(),
            created_at,
        )
        .with_secondary_muscles(
            self.secondary_muscles
                .iter()
                .filter_map(|m| MuscleGroup::from_name(m)),
        )
        .with_instructions(self.instructions.clone()))
    }
}

/// Built-in sample exercises.
#[derive(Debug, Default, Clone, Copy)]
pub struct Catalog;

impl SeedRepository for Catalog {
    fn read_seed_exercises(&self) -> Result<Vec<SeedExercise>, ReadError> {
        Ok(SAMPLE_EXERCISES.iter().map(SeedExercise::from).collect())
    }
}

struct CatalogExercise {
    name: &'static str,
    primary_muscle: MuscleGroup,
    secondary_muscles: &'static [MuscleGroup],
    equipment: Equipment,
    instructions: Option<&'static str>,
}

impl From<&CatalogExercise> for SeedExercise {
    fn from(value: &CatalogExercise) -> Self {
        SeedExercise {
            name: value.name.to_string(),
            primary_muscle: value.primary_muscle.name().to_string(),
            secondary_muscles: value
                .secondary_muscles
                .iter()
                .map(|m| m.name().to_string())
                .collect(),
            equipment: value.equipment.name().to_string(),
            instructions: value.instructions.map(str::to_string),
        }
    }
}

const SAMPLE_EXERCISES: [CatalogExercise; 6] = [
    CatalogExercise {
        name: "Barbell Bench Press",
        primary_muscle: MuscleGroup::Chest,
        secondary_muscles: &[MuscleGroup::Triceps, MuscleGroup::Shoulders],
        equipment: Equipment::Barbell,
        instructions: Some(
            "Lie on a flat bench, grip the bar slightly wider than shoulder-width, lower to chest, press up.",
        ),
    },
    CatalogExercise {
        name: "Dumbbell Row",
        primary_muscle: MuscleGroup::Back,
        secondary_muscles: &[MuscleGroup::Biceps],
        equipment: Equipment::Dumbbell,
        instructions: None,
    },
    CatalogExercise {
        name: "Barbell Squat",
        primary_muscle: MuscleGroup::Quads,
        secondary_muscles: &[MuscleGroup::Glutes, MuscleGroup::Hamstrings],
        equipment: Equipment::Barbell,
        instructions: None,
    },
    CatalogExercise {
        name: "Overhead Press",
        primary_muscle: MuscleGroup::Shoulders,
        secondary_muscles: &[MuscleGroup::Triceps],
        equipment: Equipment::Barbell,
        instructions: None,
    },
    CatalogExercise {
        name: "Pull-Up",
        primary_muscle: MuscleGroup::Back,
        secondary_muscles: &[MuscleGroup::Biceps],
        equipment: Equipment::Bodyweight,
        instructions: None,
    },
    CatalogExercise {
        name: "Romanian Deadlift",
        primary_muscle: MuscleGroup::Hamstrings,
        secondary_muscles: &[MuscleGroup::Back, MuscleGroup::Glutes],
        equipment: Equipment::Barbell,
        instructions: None,
    },
];
