use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

/// Number of entries kept by a log repository.
pub const MAX_ENTRIES: usize = 100;

pub static LOG: Mutex<Option<Arc<Mutex<dyn Repository>>>> = Mutex::new(None);

pub trait Service {
    fn get_log_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn add_log_entry(&self, entry: Entry) -> Result<(), Error>;
}

pub trait Repository: Send + Sync + 'static {
    /// Read the stored entries, newest first.
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    /// Store an entry, dropping the oldest entries beyond [`MAX_ENTRIES`].
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
pub enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

static LOGGER: Logger = Logger;

/// # Errors
///
/// Returns an error if the logger has already been initialized.
pub fn init(repository: Arc<Mutex<dyn Repository>>) -> Result<(), SetLoggerError> {
    if let Ok(mut log) = LOG.lock() {
        *log = Some(repository);
    }
    log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Trace))
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Trace
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = record.args().to_string();
        eprintln!("[{}] {message}", record.level());

        if let Ok(log) = LOG.lock() {
            if let Some(ref repository) = *log {
                if let Ok(repository) = repository.lock() {
                    let _ = repository.write_entry(Entry {
                        time: Local::now().format("%b %d %H:%M:%S").to_string(),
                        level: record.level(),
                        message,
                    });
                }
            }
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct Entries(Mutex<VecDeque<Entry>>);

    impl Repository for Entries {
        fn read_entries(&self) -> Result<VecDeque<Entry>, Error> {
            self.0
                .lock()
                .map(|entries| entries.clone())
                .map_err(|err| Error::Unknown(err.to_string()))
        }

        fn write_entry(&self, entry: Entry) -> Result<(), Error> {
            let mut entries = self
                .0
                .lock()
                .map_err(|err| Error::Unknown(err.to_string()))?;
            entries.push_front(entry);
            entries.truncate(MAX_ENTRIES);
            Ok(())
        }
    }

    #[test]
    fn test_logger() {
        let entries = Arc::new(Mutex::new(Entries::default()));
        init(entries.clone()).unwrap();

        log::warn!("first");
        log::error!("second");

        let stored = entries.lock().unwrap().read_entries().unwrap();
        let stored = stored
            .iter()
            .filter(|e| e.message == "first" || e.message == "second")
            .map(|e| (e.level, e.message.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            stored,
            vec![(Level::Error, "second"), (Level::Warn, "first")]
        );
    }

    #[test]
    fn test_entry_serialization() {
        let entry = Entry {
            time: "Jan 02 03:04:05".to_string(),
            level: Level::Info,
            message: "imported 6 exercises".to_string(),
        };
        let json = serde_json::to_string(&entry).unwrap();

        assert_eq!(
            json,
            r#"{"time":"Jan 02 03:04:05","level":"Info","message":"imported 6 exercises"}"#
        );
        assert_eq!(serde_json::from_str::<Entry>(&json).unwrap(), entry);
    }
}
