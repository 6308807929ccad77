//! Whole-file JSON persistence shared by the project, home-slot, and user
//! stores. Every store reads the full file, mutates in memory, and writes
//! the full file back; there is no locking, and a corrupt or missing file
//! reads as an empty collection.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        StoreError::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Serialization(value)
    }
}

/// Read a JSON collection file. Missing files and parse failures both
/// degrade to an empty collection rather than erroring.
pub(crate) fn read_collection<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Vec<T> {
    match std::fs::read_to_string(path) {
        Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
        Err(_) => Vec::new(),
    }
}

/// Write a collection back as pretty-printed JSON, creating the parent
/// directory on first write.
pub(crate) fn write_collection<T: Serialize, P: AsRef<Path>>(
    path: P,
    items: &[T],
) -> Result<(), StoreError> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(items)?;
    std::fs::write(path, data)?;
    Ok(())
}
