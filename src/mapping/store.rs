use log::{info, warn};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::mapping::model::MappingTable;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Reading mapping file {path:?} failed. Reason: {source}.")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Mapping file {path:?} is not a valid note to action map. Reason: {source}.")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Writing mapping file {path:?} failed. Reason: {source}.")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Durable home of the mapping table.
pub trait MappingStore {
    fn try_load(&self) -> Result<MappingTable, StoreError>;

    /// Replaces everything persisted with `table`.
    fn save(&self, table: &MappingTable) -> Result<(), StoreError>;

    /// Never fails: anything unreadable is reported and treated as empty.
    fn load(&self) -> MappingTable {
        match self.try_load() {
            Ok(table) => table,
            Err(e) => {
                warn!("{e} Starting with no mappings.");
                MappingTable::default()
            }
        }
    }
}

/// JSON object file, `{"60": "a", ...}`.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> JsonFileStore {
        JsonFileStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = OsString::from(self.path.as_os_str());
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl MappingStore for JsonFileStore {
    fn try_load(&self) -> Result<MappingTable, StoreError> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Mapping file {:?} not found. No mappings loaded.", self.path);
                return Ok(MappingTable::default());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            warn!("Mapping file {:?} is empty. No mappings loaded.", self.path);
            return Ok(MappingTable::default());
        }

        let table: MappingTable =
            serde_json::from_slice(&data).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        if table.is_empty() {
            warn!("Mapping file {:?} has no entries.", self.path);
        } else {
            info!("Loaded {} mapping(s) from {:?}.", table.len(), self.path);
        }
        Ok(table)
    }

    fn save(&self, table: &MappingTable) -> Result<(), StoreError> {
        let write_err = |source: io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let mut json = serde_json::to_string_pretty(table)
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        json.push('\n');

        // Readers only ever see the old file or the new one.
        let staging = self.staging_path();
        std::fs::write(&staging, json).map_err(write_err)?;
        std::fs::rename(&staging, &self.path).map_err(write_err)
    }
}
