pub mod constants;
pub mod storage;

pub use storage::{MemoryStorage, StorageBackend};
