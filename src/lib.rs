// todostore - Task list management over a snapshot file or SQLite

pub mod backend;
pub mod config;
pub mod error;
pub mod filter;
pub mod render;
pub mod snapshot;
pub mod sqlite;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use backend::Backend;
pub use config::{BackendKind, Config, StorageConfig};
pub use error::{Result, StoreError};
pub use filter::{Filter, StatusFilter};
pub use store::TaskStore;
pub use task::{Priority, Task, TaskFields, TaskId, today};
