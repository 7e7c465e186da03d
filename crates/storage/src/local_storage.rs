use std::{
    collections::VecDeque,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use liftlog_app::{Settings, SettingsRepository, log};
use serde::{Serialize, de::DeserializeOwned};
use strum::AsRefStr;

/// Key-value store keeping one JSON document per key in a directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    directory: PathBuf,
}

#[derive(AsRefStr, Debug, Clone, Copy)]
pub enum Key {
    #[strum(serialize = "settings.json")]
    Settings,
    #[strum(serialize = "log.json")]
    Log,
}

impl LocalStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Read the value stored under `key`, `None` if nothing has been stored.
    pub fn get<T: DeserializeOwned>(&self, key: Key) -> anyhow::Result<Option<T>> {
        let path = self.directory.join(key.as_ref());
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn set<T: Serialize>(&self, key: Key, value: &T) -> anyhow::Result<()> {
        fs::create_dir_all(&self.directory)
            .with_context(|| format!("failed to create {}", self.directory.display()))?;
        let path = self.directory.join(key.as_ref());
        let content = serde_json::to_string(value)?;
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}

impl SettingsRepository for LocalStorage {
    fn read_settings(&self) -> Result<Settings, String> {
        self.get(Key::Settings)
            .map(Option::unwrap_or_default)
            .map_err(|err| format!("{err:#}"))
    }

    fn write_settings(&self, settings: Settings) -> Result<(), String> {
        self.set(Key::Settings, &settings)
            .map_err(|err| format!("{err:#}"))
    }
}

impl log::Repository for LocalStorage {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.get(Key::Log)
            .map(Option::unwrap_or_default)
            .map_err(|err| log::Error::Unknown(format!("{err:#}")))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        entries.push_front(entry);
        entries.truncate(log::MAX_ENTRIES);
        self.set(Key::Log, &entries)
            .map_err(|err| log::Error::Unknown(format!("{err:#}")))
    }
}

#[cfg(test)]
mod tests {
    use liftlog_app::{Appearance, SettingsService, log::Service as _};
    use liftlog_domain::WeightUnit;
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(message: &str) -> log::Entry {
        log::Entry {
            time: "Mar 04 18:00:00".to_string(),
            level: ::log::Level::Info,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_settings_default() {
        let dir = tempfile::tempdir().unwrap();
        let service = liftlog_app::Service::new(LocalStorage::new(dir.path()));

        assert_eq!(service.get_settings(), Ok(Settings::default()));
    }

    #[test]
    fn test_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let service = liftlog_app::Service::new(LocalStorage::new(dir.path().join("config")));
        let settings = Settings {
            weight_unit: WeightUnit::Kg,
            default_rest_duration: 120.0,
            haptic_feedback_enabled: false,
            sound_enabled: false,
            appearance_mode: Appearance::Dark,
        };

        service.set_settings(settings).unwrap();

        assert!(dir.path().join("config").join("settings.json").exists());
        assert_eq!(service.get_settings(), Ok(settings));
    }

    #[test]
    fn test_settings_unknown_values() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            r#"{"weightUnit":"stone","defaultRestDuration":-1,"soundEnabled":false}"#,
        )
        .unwrap();

        assert_eq!(
            LocalStorage::new(dir.path()).read_settings(),
            Ok(Settings {
                sound_enabled: false,
                ..Settings::default()
            })
        );
    }

    #[test]
    fn test_settings_invalid_document() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), "{").unwrap();

        let err = LocalStorage::new(dir.path()).read_settings().unwrap_err();
        assert!(err.starts_with("failed to parse"));
    }

    #[test]
    fn test_log() {
        let dir = tempfile::tempdir().unwrap();
        let service = liftlog_app::Service::new(LocalStorage::new(dir.path()));

        assert_eq!(service.get_log_entries(), Ok(VecDeque::new()));

        for i in 0..log::MAX_ENTRIES + 5 {
            service.add_log_entry(entry(&i.to_string())).unwrap();
        }

        let entries = service.get_log_entries().unwrap();
        assert_eq!(entries.len(), log::MAX_ENTRIES);
        assert_eq!(entries.front().unwrap().message, "104");
        assert_eq!(entries.back().unwrap().message, "5");
    }
}
