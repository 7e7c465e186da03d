use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use liftlog_domain::{self as domain, Graph, Property, StorageError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::memory::{Memory, Persistence};

/// Format version written to new documents.
pub const VERSION: u32 = 1;

/// Persists a graph as a single JSON document.
///
/// Documents are written to a temporary file next to the target, which then replaces the target.
/// The temporary file is removed if writing fails.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Open the store backed by the document at `path`.
    ///
    /// A missing document yields an empty store. Invalid records are dropped.
    pub fn open(path: impl Into<PathBuf>) -> Result<Memory<JsonFile>, StorageError> {
        let file = JsonFile { path: path.into() };
        let graph = file.load()?;
        Ok(Memory::with_persistence(graph, file))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn load(&self) -> Result<Graph, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no document at {}", self.path.display());
                return Ok(Graph::new());
            }
            Err(err) => return Err(err.into()),
        };
        let document = serde_json::from_str::<Document>(&content)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        if document.version > VERSION {
            return Err(StorageError::Serialization(format!(
                "unsupported version {}",
                document.version
            )));
        }
        Ok(document.into_graph())
    }
}

impl Persistence for JsonFile {
    fn persist(&self, graph: &Graph) -> Result<(), StorageError> {
        let content = serde_json::to_vec_pretty(&Document::from(graph))
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let mut file = NamedTempFile::new_in(self.directory())?;
        file.write_all(&content)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|err| err.error)?;
        debug!("saved {}", self.path.display());
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Document {
    pub version: u32,
    pub exercises: Vec<Exercise>,
    pub workouts: Vec<Workout>,
    pub workout_exercises: Vec<WorkoutExercise>,
    pub workout_sets: Vec<WorkoutSet>,
    pub templates: Vec<Template>,
    pub template_exercises: Vec<TemplateExercise>,
}

impl Document {
    #[must_use]
    pub fn into_graph(self) -> Graph {
        Graph::from_records(
            valid_records(self.exercises),
            valid_records(self.workouts),
            valid_records(self.workout_exercises),
            valid_records(self.workout_sets),
            valid_records(self.templates),
            valid_records(self.template_exercises),
        )
    }
}

impl From<&Graph> for Document {
    fn from(value: &Graph) -> Self {
        Self {
            version: VERSION,
            exercises: value.exercises().map(Exercise::from).collect(),
            workouts: value.workouts().map(Workout::from).collect(),
            workout_exercises: value
                .all_workout_exercises()
                .map(WorkoutExercise::from)
                .collect(),
            workout_sets: value.all_workout_sets().map(WorkoutSet::from).collect(),
            templates: value.templates().map(Template::from).collect(),
            template_exercises: value
                .all_template_exercises()
                .map(TemplateExercise::from)
                .collect(),
        }
    }
}

fn valid_records<R, D>(records: Vec<R>) -> Vec<D>
where
    D: TryFrom<R, Error = DocumentError>,
{
    records
        .into_iter()
        .filter_map(|record| match D::try_from(record) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("dropped invalid record: {err}");
                None
            }
        })
        .collect()
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DocumentError {
    #[error(transparent)]
    InvalidName(#[from] domain::NameError),
    #[error(transparent)]
    InvalidWeight(#[from] domain::WeightError),
    #[error(transparent)]
    InvalidReps(#[from] domain::RepsError),
    #[error(transparent)]
    InvalidRPE(#[from] domain::RPEError),
    #[error("unknown {0} {1:?}")]
    Unknown(&'static str, String),
}

fn property<P: Property>(kind: &'static str, name: &str) -> Result<P, DocumentError> {
    P::from_name(name).ok_or_else(|| DocumentError::Unknown(kind, name.to_string()))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub primary_muscle: String,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    pub equipment: String,
    #[serde(default)]
    pub instructions: Option<String>,
    pub is_custom: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&domain::Exercise> for Exercise {
    fn from(value: &domain::Exercise) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            primary_muscle: value.primary_muscle.name().to_string(),
            secondary_muscles: value
                .secondary_muscles
                .iter()
                .map(|m| m.name().to_string())
                .collect(),
            equipment: value.equipment.name().to_string(),
            instructions: value.instructions.clone(),
            is_custom: value.is_custom,
            created_at: value.created_at,
        }
    }
}

impl TryFrom<Exercise> for domain::Exercise {
    type Error = DocumentError;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        let mut exercise = domain::Exercise::new(
            value.id.into(),
            domain::Name::new(&value.name)?,
            property("muscle", &value.primary_muscle)?,
            property("equipment", &value.equipment)?,
            value.created_at,
        )
        .with_secondary_muscles(
            value
                .secondary_muscles
                .iter()
                .map(|m| property("muscle", m))
                .collect::<Result<Vec<domain::MuscleGroup>, _>>()?,
        )
        .with_instructions(value.instructions);
        exercise.is_custom = value.is_custom;
        Ok(exercise)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: Uuid,
    pub name: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    pub completed: bool,
}

impl From<&domain::Workout> for Workout {
    fn from(value: &domain::Workout) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            started_at: value.started_at,
            completed_at: value.completed_at,
            notes: value.notes.clone(),
            completed: value.completed,
        }
    }
}

impl TryFrom<Workout> for domain::Workout {
    type Error = DocumentError;

    fn try_from(value: Workout) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            started_at: value.started_at,
            completed_at: value.completed_at,
            notes: value.notes,
            completed: value.completed,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub id: Uuid,
    pub workout_id: Uuid,
    #[serde(default)]
    pub exercise_id: Option<Uuid>,
    pub order: u32,
}

impl From<&domain::WorkoutExercise> for WorkoutExercise {
    fn from(value: &domain::WorkoutExercise) -> Self {
        Self {
            id: *value.id,
            workout_id: *value.workout_id,
            exercise_id: value.exercise_id.map(|id| *id),
            order: value.order,
        }
    }
}

impl TryFrom<WorkoutExercise> for domain::WorkoutExercise {
    type Error = DocumentError;

    fn try_from(value: WorkoutExercise) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            workout_id: value.workout_id.into(),
            exercise_id: value.exercise_id.map(domain::ExerciseID::from),
            order: value.order,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub id: Uuid,
    pub workout_exercise_id: Uuid,
    pub order: u32,
    pub weight: f64,
    pub reps: u32,
    #[serde(default)]
    pub rpe: Option<u8>,
    pub set_type: String,
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_pr: bool,
}

impl From<&domain::WorkoutSet> for WorkoutSet {
    fn from(value: &domain::WorkoutSet) -> Self {
        Self {
            id: *value.id,
            workout_exercise_id: *value.workout_exercise_id,
            order: value.order,
            weight: value.weight.into(),
            reps: value.reps.into(),
            rpe: value.rpe.map(u8::from),
            set_type: value.set_type.name().to_string(),
            completed: value.completed,
            completed_at: value.completed_at,
            is_pr: value.is_pr,
        }
    }
}

impl TryFrom<WorkoutSet> for domain::WorkoutSet {
    type Error = DocumentError;

    fn try_from(value: WorkoutSet) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            workout_exercise_id: value.workout_exercise_id.into(),
            order: value.order,
            weight: domain::Weight::new(value.weight)?,
            reps: domain::Reps::new(value.reps)?,
            rpe: value.rpe.map(domain::RPE::new).transpose()?,
            set_type: domain::SetType::from_name(&value.set_type)
                .ok_or_else(|| DocumentError::Unknown("set type", value.set_type.clone()))?,
            completed: value.completed,
            completed_at: value.completed_at,
            is_pr: value.is_pr,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<&domain::WorkoutTemplate> for Template {
    fn from(value: &domain::WorkoutTemplate) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            notes: value.notes.clone(),
            created_at: value.created_at,
            last_used_at: value.last_used_at,
        }
    }
}

impl TryFrom<Template> for domain::WorkoutTemplate {
    type Error = DocumentError;

    fn try_from(value: Template) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            notes: value.notes,
            created_at: value.created_at,
            last_used_at: value.last_used_at,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExercise {
    pub id: Uuid,
    pub template_id: Uuid,
    #[serde(default)]
    pub exercise_id: Option<Uuid>,
    pub order: u32,
    pub default_set_count: u32,
    #[serde(default)]
    pub default_weight: Option<f64>,
    #[serde(default)]
    pub default_reps: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<&domain::TemplateExercise> for TemplateExercise {
    fn from(value: &domain::TemplateExercise) -> Self {
        Self {
            id: *value.id,
            template_id: *value.template_id,
            exercise_id: value.exercise_id.map(|id| *id),
            order: value.order,
            default_set_count: value.default_set_count,
            default_weight: value.default_weight.map(f64::from),
            default_reps: value.default_reps.map(u32::from),
            notes: value.notes.clone(),
        }
    }
}

impl TryFrom<TemplateExercise> for domain::TemplateExercise {
    type Error = DocumentError;

    fn try_from(value: TemplateExercise) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            template_id: value.template_id.into(),
            exercise_id: value.exercise_id.map(domain::ExerciseID::from),
            order: value.order,
            default_set_count: value.default_set_count,
            default_weight: value.default_weight.map(domain::Weight::new).transpose()?,
            default_reps: value.default_reps.map(domain::Reps::new).transpose()?,
            notes: value.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use domain::{SaveRepository, WorkoutService};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use crate::tests::data::{EXERCISE, TEMPLATE_EXERCISES, WORKOUT, WORKOUT_SETS, graph};

    use super::*;

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFile::open(dir.path().join("liftlog.json")).unwrap();

        assert_eq!(store.graph(), Graph::new());
        assert!(!dir.path().join("liftlog.json").exists());
    }

    #[test]
    fn test_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liftlog.json");
        let store = Memory::with_persistence(graph(), JsonFile { path: path.clone() });

        store.save().unwrap();

        assert_eq!(directory_entries(dir.path()), vec!["liftlog.json".to_string()]);
        assert_eq!(JsonFile::open(&path).unwrap().graph(), graph());
    }

    #[test]
    fn test_service_persists_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liftlog.json");

        let workout = {
            let service = domain::Service::new(JsonFile::open(&path).unwrap());
            service.start_workout().unwrap()
        };

        let service = domain::Service::new(JsonFile::open(&path).unwrap());
        assert_eq!(service.get_workouts().unwrap(), vec![workout]);
    }

    fn directory_entries(path: &Path) -> Vec<String> {
        let mut entries = fs::read_dir(path)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        entries.sort();
        entries
    }

    #[test]
    fn test_save_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFile::open(dir.path().join("missing").join("liftlog.json")).unwrap();

        assert!(matches!(store.save(), Err(StorageError::Io(_))));
    }

    #[test]
    fn test_save_failure_removes_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liftlog.json");
        fs::create_dir(&path).unwrap();
        let store = Memory::with_persistence(graph(), JsonFile { path });

        assert!(matches!(store.save(), Err(StorageError::Io(_))));
        assert_eq!(directory_entries(dir.path()), vec!["liftlog.json".to_string()]);
    }

    #[test]
    fn test_save_failure_discards_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("liftlog.json");
        let service = domain::Service::new(JsonFile::open(path).unwrap());

        assert!(matches!(
            service.start_workout(),
            Err(domain::CreateError::Storage(StorageError::Io(_)))
        ));
        assert_eq!(service.get_workouts().unwrap(), vec![]);
    }

    #[rstest]
    #[case("")]
    #[case("null")]
    #[case(r#"{"exercises": 1}"#)]
    #[case(r#"{"version": 2}"#)]
    fn test_open_invalid_document(#[case] content: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liftlog.json");
        fs::write(&path, content).unwrap();

        assert!(matches!(
            JsonFile::open(&path),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_open_drops_invalid_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liftlog.json");
        let mut document = Document::from(&graph());
        document.exercises[0].name = " ".to_string();
        document.workout_sets[0].weight = -1.0;
        document.workout_sets[1].set_type = "Giant Set".to_string();
        fs::write(&path, serde_json::to_string(&document).unwrap()).unwrap();

        let graph = JsonFile::open(&path).unwrap().graph();

        assert!(graph.exercise(EXERCISE.id).is_none());
        assert!(
            graph
                .all_workout_exercises()
                .all(|we| we.exercise_id != Some(EXERCISE.id))
        );
        assert_eq!(graph.all_workout_sets().count(), WORKOUT_SETS.len() - 2);
    }

    #[test]
    fn test_document_format() {
        let document = Document::from(&graph());
        let value = json!(document);

        assert_eq!(value["version"], json!(VERSION));
        assert_eq!(
            value["exercises"][0],
            json!({
                "id": "00000000-0000-0000-0000-000000000001",
                "name": "Bench Press",
                "primaryMuscle": "Chest",
                "secondaryMuscles": ["Shoulders", "Triceps"],
                "equipment": "Barbell",
                "instructions": "Lower the bar to the chest, press up.",
                "isCustom": false,
                "createdAt": "2024-03-01T08:00:00Z"
            })
        );
        assert_eq!(value["workouts"][0]["completedAt"], json!("2024-03-04T19:05:00Z"));
        assert_eq!(value["workoutSets"][0]["setType"], json!("Working"));
        assert_eq!(value["templateExercises"][1]["defaultWeight"], json!(null));
    }

    #[test]
    fn test_record_conversion() {
        assert_eq!(
            domain::Workout::try_from(Workout::from(&*WORKOUT)),
            Ok(WORKOUT.clone())
        );
        assert_eq!(
            domain::TemplateExercise::try_from(TemplateExercise::from(&TEMPLATE_EXERCISES[0])),
            Ok(TEMPLATE_EXERCISES[0].clone())
        );
        assert_eq!(
            domain::WorkoutSet::try_from(WorkoutSet {
                rpe: Some(11),
                ..WorkoutSet::from(&WORKOUT_SETS[0])
            }),
            Err(DocumentError::InvalidRPE(domain::RPEError::OutOfRange))
        );
    }
}
