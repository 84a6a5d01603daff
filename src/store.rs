use std::collections::BTreeMap;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::PersistenceError;
use crate::models::AlertState;

/// Reads a JSON document. A file that does not exist yet yields `Ok(None)`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| PersistenceError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Like [`load_json`] but substitutes the default on any failure, logging it.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path) {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            warn!("{e}; starting from an empty document");
            T::default()
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), PersistenceError> {
    let io = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_string_pretty(value).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let mut file = File::create(path).map_err(io)?;
    file.write_all(json.as_bytes()).map_err(io)?;
    Ok(())
}

/// Durable `url -> last alerted price` map.
pub struct AlertLedger {
    path: PathBuf,
    records: BTreeMap<String, f64>,
}

impl AlertLedger {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = load_or_default(&path);
        Self { path, records }
    }

    pub fn state(&self, url: &str) -> AlertState {
        self.records
            .get(url)
            .map_or(AlertState::NeverAlerted, |price| AlertState::AlertedAt(*price))
    }

    /// Moves `url` to `AlertedAt(price)` and writes the ledger out immediately.
    pub fn record(&mut self, url: &str, price: f64) -> Result<(), PersistenceError> {
        self.records.insert(url.to_string(), price);
        save_json(&self.records, &self.path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
