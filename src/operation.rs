//! The operator's airline/flight selection, kept in a small JSON file between runs.
//!
//! Persistence is best-effort: a missing or corrupt file means defaults, and a failed
//! write is logged and otherwise ignored.

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

pub const DEFAULT_AIRLINE_LABEL: &str = "AIRLINE";
pub const OPERATION_FILE_NAME: &str = "gate-operation.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationInfo {
    #[serde(default)]
    pub airline: String,
    #[serde(default)]
    pub flight: String,
}

impl Default for OperationInfo {
    fn default() -> Self {
        Self {
            airline: DEFAULT_AIRLINE_LABEL.into(),
            flight: String::new(),
        }
    }
}

impl OperationInfo {
    /// Cleans raw input the way the selection screen does: trimmed airline,
    /// trimmed upper-case flight number.
    pub fn from_params(airline: Option<&str>, flight: Option<&str>) -> Self {
        let airline = airline
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_AIRLINE_LABEL)
            .to_string();
        let flight = flight.map(|f| f.trim().to_uppercase()).unwrap_or_default();
        Self { airline, flight }
    }

    pub fn label(&self) -> String {
        if self.flight.is_empty() {
            self.airline.clone()
        } else {
            format!("{} {}", self.airline, self.flight)
        }
    }

    fn sanitized(self) -> Self {
        let airline = if self.airline.is_empty() {
            DEFAULT_AIRLINE_LABEL.to_string()
        } else {
            self.airline
        };
        Self {
            airline,
            flight: self.flight,
        }
    }
}

pub struct OperationStore {
    path: PathBuf,
    data: RwLock<OperationInfo>,
}

impl OperationStore {
    pub fn open(path: PathBuf) -> Self {
        let data = match Self::read(&path) {
            Ok(Some(info)) => info,
            Ok(None) => OperationInfo::default(),
            Err(err) => {
                warn!("ignoring stored operation selection: {err:#}");
                OperationInfo::default()
            }
        };

        Self {
            path,
            data: RwLock::new(data),
        }
    }

    pub fn current(&self) -> OperationInfo {
        self.data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replaces the selection in memory and tries to persist it.
    pub fn select(&self, info: OperationInfo) -> OperationInfo {
        let info = info.sanitized();
        {
            let mut guard = self
                .data
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *guard = info.clone();
        }
        if let Err(err) = self.persist(&info) {
            warn!("operation selection not saved: {err:#}");
        }
        info
    }

    fn read(path: &Path) -> Result<Option<OperationInfo>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        let info: OperationInfo = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(info.sanitized()))
    }

    fn persist(&self, info: &OperationInfo) -> Result<()> {
        let serialized = serde_json::to_string_pretty(info)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_cleaned() {
        let info = OperationInfo::from_params(Some("  Volaris "), Some(" y4 321 "));
        assert_eq!(info.airline, "Volaris");
        assert_eq!(info.flight, "Y4 321");
        assert_eq!(info.label(), "Volaris Y4 321");
    }

    #[test]
    fn blank_airline_gets_default_label() {
        let info = OperationInfo::from_params(Some("   "), None);
        assert_eq!(info.airline, DEFAULT_AIRLINE_LABEL);
        assert_eq!(info.label(), DEFAULT_AIRLINE_LABEL);
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = OperationStore::open(dir.path().join(OPERATION_FILE_NAME));
        assert_eq!(store.current(), OperationInfo::default());
    }

    #[test]
    fn corrupt_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OPERATION_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        let store = OperationStore::open(path);
        assert_eq!(store.current(), OperationInfo::default());
    }

    #[test]
    fn selection_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OPERATION_FILE_NAME);

        let store = OperationStore::open(path.clone());
        store.select(OperationInfo::from_params(Some("Interjet"), Some("4o 100")));

        let reopened = OperationStore::open(path);
        assert_eq!(reopened.current().label(), "Interjet 4O 100");
    }

    #[test]
    fn partial_record_is_filled_in() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OPERATION_FILE_NAME);
        fs::write(&path, r#"{"flight":"AM 58"}"#).unwrap();
        let store = OperationStore::open(path);
        assert_eq!(store.current().airline, DEFAULT_AIRLINE_LABEL);
        assert_eq!(store.current().flight, "AM 58");
    }

    #[test]
    fn unwritable_path_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = OperationStore::open(dir.path().join("missing").join(OPERATION_FILE_NAME));
        let applied = store.select(OperationInfo::from_params(Some("Volaris"), None));
        assert_eq!(store.current(), applied);
    }
}
