// Persistence strategy trait and backing selection

use crate::config::{BackendKind, StorageConfig};
use crate::error::Result;
use crate::snapshot::SnapshotBackend;
use crate::sqlite::SqliteBackend;
use crate::task::{Task, TaskId, ValidFields};

/// Durable home for the task collection
///
/// Implementations only store and retrieve; validation, defaults, filtering
/// and ordering are the store's job so every backing answers queries the same way.
pub trait Backend {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// All tasks in storage order
    fn load(&self) -> Result<Vec<Task>>;

    fn get(&self, id: TaskId) -> Result<Option<Task>>;

    /// Store a new, incomplete task and return it with its assigned id
    fn insert(&mut self, fields: ValidFields) -> Result<Task>;

    /// Overwrite an existing task; returns false if the id is unknown
    fn update(&mut self, task: &Task) -> Result<bool>;

    /// Returns false if the id is unknown
    fn delete(&mut self, id: TaskId) -> Result<bool>;

    /// Make pending changes durable
    fn flush(&mut self) -> Result<()>;

    /// Flush and release the underlying file or connection
    fn close(self: Box<Self>) -> Result<()>;
}

/// Open the backing named by the configuration
pub fn open(config: &StorageConfig) -> Result<Box<dyn Backend>> {
    let path = config.resolved_path();
    Ok(match config.backend {
        BackendKind::Snapshot => Box::new(SnapshotBackend::open(path)),
        BackendKind::Sqlite => Box::new(SqliteBackend::open(path)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_selects_backing() {
        let temp = TempDir::new().unwrap();

        let snapshot = StorageConfig {
            backend: BackendKind::Snapshot,
            path: Some(temp.path().join("tasks.json")),
        };
        assert_eq!(open(&snapshot).unwrap().name(), "snapshot");

        let sqlite = StorageConfig {
            backend: BackendKind::Sqlite,
            path: Some(temp.path().join("tasks.db")),
        };
        assert_eq!(open(&sqlite).unwrap().name(), "sqlite");
        assert!(temp.path().join("tasks.db").exists());
    }
}
