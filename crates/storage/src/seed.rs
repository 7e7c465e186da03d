use std::{fs, io, path::PathBuf};

use anyhow::Context;
use liftlog_domain::{ReadError, SeedExercise, SeedRepository, StorageError};
use serde::Deserialize;

/// Seed exercises stored as a JSON array.
#[derive(Debug, Clone)]
pub struct SeedFile {
    path: PathBuf,
}

impl SeedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SeedRepository for SeedFile {
    fn read_seed_exercises(&self) -> Result<Vec<SeedExercise>, ReadError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(ReadError::NotFound),
            Err(err) => return Err(StorageError::Io(err).into()),
        };
        parse_seed_exercises(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))
            .map_err(|err| StorageError::Serialization(format!("{err:#}")).into())
    }
}

pub fn parse_seed_exercises(json: &str) -> Result<Vec<SeedExercise>, serde_json::Error> {
    Ok(serde_json::from_str::<Vec<SeedRecord>>(json)?
        .into_iter()
        .map(SeedExercise::from)
        .collect())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedRecord {
    name: String,
    primary_muscle: String,
    #[serde(default)]
    secondary_muscles: Vec<String>,
    equipment: String,
    #[serde(default)]
    instructions: Option<String>,
}

impl From<SeedRecord> for SeedExercise {
    fn from(value: SeedRecord) -> Self {
        Self {
            name: value.name,
            primary_muscle: value.primary_muscle,
            secondary_muscles: value.secondary_muscles,
            equipment: value.equipment,
            instructions: value.instructions,
        }
    }
}
