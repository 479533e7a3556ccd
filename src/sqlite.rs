// Single-table SQLite backing with per-operation commit

use crate::backend::Backend;
use crate::error::{Result, StoreError};
use crate::task::{StoredTask, Task, TaskId, ValidFields};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const SELECT_COLUMNS: &str = "SELECT id, title, description, priority, due_date, category, is_completed FROM tasks";

/// Tasks stored as rows of a single `tasks` table
pub struct SqliteBackend {
    db: Connection,
}

impl SqliteBackend {
    /// Open or create the database at `path` and ensure the schema exists
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::StorageUnavailable(format!("cannot create directory {}: {}", parent.display(), e))
            })?;
        }

        let db = Connection::open(path)
            .map_err(|e| StoreError::StorageUnavailable(format!("cannot open database {}: {}", path.display(), e)))?;

        let backend = Self::from_connection(db)?;
        info!(file = ?path, "Opened task database");
        Ok(backend)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory()
            .map_err(|e| StoreError::StorageUnavailable(format!("cannot open in-memory database: {}", e)))?;
        Self::from_connection(db)
    }

    fn from_connection(db: Connection) -> Result<Self> {
        let backend = Self { db };
        backend
            .create_schema()
            .map_err(|e| StoreError::StorageUnavailable(format!("cannot initialise schema: {}", e)))?;
        Ok(backend)
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    fn create_schema(&self) -> rusqlite::Result<()> {
        debug!("Creating database schema");

        // Column layout is compatible with databases written by earlier releases
        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                priority TEXT,
                due_date TEXT,
                category TEXT,
                is_completed INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
    }

    fn row_to_task(row: &Row<'_>) -> rusqlite::Result<(TaskId, StoredTask)> {
        let id: i64 = row.get(0)?;
        let stored = StoredTask {
            title: row.get(1)?,
            description: row.get(2)?,
            priority: row.get(3)?,
            due_date: row.get(4)?,
            category: row.get(5)?,
            is_completed: row.get::<_, i64>(6)? != 0,
        };
        Ok((TaskId(id), stored))
    }
}

impl Backend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn load(&self) -> Result<Vec<Task>> {
        let mut stmt = self.db.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
        let rows = stmt.query_map([], Self::row_to_task)?;

        let mut tasks = Vec::new();
        for row in rows {
            let (id, stored) = row?;
            if let Some(task) = stored.into_task(id) {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    fn get(&self, id: TaskId) -> Result<Option<Task>> {
        let row = self
            .db
            .query_row(&format!("{} WHERE id = ?1", SELECT_COLUMNS), [id.0], Self::row_to_task)
            .optional()?;

        Ok(row.and_then(|(id, stored)| stored.into_task(id)))
    }

    fn insert(&mut self, fields: ValidFields) -> Result<Task> {
        self.db.execute(
            "INSERT INTO tasks (title, description, priority, due_date, category, is_completed)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                fields.title,
                fields.description,
                fields.priority.as_str(),
                fields.due_date,
                fields.category
            ],
        )?;

        let id = TaskId(self.db.last_insert_rowid());
        debug!(%id, "Inserted task");
        Ok(fields.into_task(id, false))
    }

    fn update(&mut self, task: &Task) -> Result<bool> {
        let changed = self.db.execute(
            "UPDATE tasks
             SET title = ?1, description = ?2, priority = ?3, due_date = ?4, category = ?5, is_completed = ?6
             WHERE id = ?7",
            params![
                task.title,
                task.description,
                task.priority.as_str(),
                task.due_date,
                task.category,
                task.is_completed as i64,
                task.id.0
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete(&mut self, id: TaskId) -> Result<bool> {
        let changed = self.db.execute("DELETE FROM tasks WHERE id = ?1", [id.0])?;
        Ok(changed > 0)
    }

    fn flush(&mut self) -> Result<()> {
        // Every statement already committed
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.db.close().map_err(|(_, e)| StoreError::Database(e))?;
        debug!("Closed task database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, TaskFields};
    use tempfile::TempDir;

    fn insert(backend: &mut SqliteBackend, fields: TaskFields) -> Task {
        backend.insert(fields.validate().unwrap()).unwrap()
    }

    #[test]
    fn test_open_creates_database() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data").join("tasks.db");

        let _backend = SqliteBackend::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.create_schema().unwrap();
        backend.create_schema().unwrap();
    }

    #[test]
    fn test_unopenable_database_is_storage_unavailable() {
        let temp = TempDir::new().unwrap();
        // A directory cannot be opened as a database file
        let result = SqliteBackend::open(temp.path());
        assert!(matches!(result, Err(StoreError::StorageUnavailable(_))));
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        let a = insert(&mut backend, TaskFields::new("a"));
        let b = insert(&mut backend, TaskFields::new("b"));
        assert!(b.id > a.id);

        let fetched = backend.get(b.id).unwrap().unwrap();
        assert_eq!(fetched, b);
    }

    #[test]
    fn test_completed_stored_as_integer() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        let mut task = insert(&mut backend, TaskFields::new("flag"));
        task.is_completed = true;
        assert!(backend.update(&task).unwrap());

        let raw: i64 = backend
            .db()
            .query_row("SELECT is_completed FROM tasks WHERE id = ?1", [task.id.0], |row| row.get(0))
            .unwrap();
        assert_eq!(raw, 1);
    }

    #[test]
    fn test_reads_legacy_rows() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend
            .db()
            .execute(
                "INSERT INTO tasks (title, description, priority, due_date, category, is_completed)
                 VALUES ('Legacy', NULL, 'Média', 'not-a-date', '', 0)",
                [],
            )
            .unwrap();

        let tasks = backend.load().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "");
        assert_eq!(tasks[0].priority, Priority::Medium);
        assert_eq!(tasks[0].category, "General");
        assert_eq!(tasks[0].due_date.as_deref(), Some("not-a-date"));
    }

    #[test]
    fn test_ids_durable_across_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.db");

        let mut backend = SqliteBackend::open(&path).unwrap();
        let first = insert(&mut backend, TaskFields::new("first"));
        let second = insert(&mut backend, TaskFields::new("second").priority(Priority::High));
        assert!(backend.delete(first.id).unwrap());
        Box::new(backend).close().unwrap();

        let mut reopened = SqliteBackend::open(&path).unwrap();
        let tasks = reopened.load().unwrap();
        assert_eq!(tasks, vec![second.clone()]);

        // AUTOINCREMENT never reuses a deleted id
        let third = insert(&mut reopened, TaskFields::new("third"));
        assert!(third.id > second.id);
        assert!(!reopened.delete(first.id).unwrap());
    }
}
