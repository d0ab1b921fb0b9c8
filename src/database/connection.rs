use crate::config::{StorageBackend, StorageConfig};
use crate::database::{FileStorage, KeyValueStorage, MemoryStorage};
use crate::error::AppResult;
use std::sync::Arc;

pub type SharedStorage = Arc<dyn KeyValueStorage>;

pub fn create_storage(config: &StorageConfig) -> AppResult<SharedStorage> {
    let storage: SharedStorage = match config.backend {
        StorageBackend::File => {
            log::info!("Using file storage at {}", config.dir);
            Arc::new(FileStorage::open(&config.dir)?)
        }
        StorageBackend::Memory => {
            log::info!("Using in-memory storage, state will not survive restarts");
            Arc::new(MemoryStorage::new())
        }
    };
    Ok(storage)
}
