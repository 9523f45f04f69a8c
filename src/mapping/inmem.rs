use std::sync::Mutex;

use crate::mapping::model::MappingTable;
use crate::mapping::store::{MappingStore, StoreError};

/// Keeps the last saved table in memory. Can be told to fail writes.
#[derive(Default)]
pub struct InMemoryStore {
    saved: Mutex<Option<MappingTable>>,
    pub fail_writes: bool,
}

impl InMemoryStore {
    pub fn with(table: MappingTable) -> InMemoryStore {
        InMemoryStore {
            saved: Mutex::new(Some(table)),
            fail_writes: false,
        }
    }

    pub fn failing() -> InMemoryStore {
        InMemoryStore {
            saved: Mutex::new(None),
            fail_writes: true,
        }
    }

    pub fn saved(&self) -> Option<MappingTable> {
        self.saved.lock().unwrap().clone()
    }
}

impl MappingStore for InMemoryStore {
    fn try_load(&self) -> Result<MappingTable, StoreError> {
        Ok(self.saved().unwrap_or_default())
    }

    fn save(&self, table: &MappingTable) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Write {
                path: "memory".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read only"),
            });
        }
        *self.saved.lock().unwrap() = Some(table.clone());
        Ok(())
    }
}
