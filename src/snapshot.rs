// Whole-collection JSON snapshot backing

use crate::backend::Backend;
use crate::error::Result;
use crate::task::{StoredTask, Task, TaskId, ValidFields};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// One task as it appears in the snapshot file
///
/// Ids are not persisted; they are reassigned in file order on every load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotEntry {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    is_completed: bool,
}

impl From<&Task> for SnapshotEntry {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: Some(task.description.clone()),
            priority: Some(task.priority.to_string()),
            due_date: task.due_date.clone(),
            category: Some(task.category.clone()),
            is_completed: task.is_completed,
        }
    }
}

impl From<SnapshotEntry> for StoredTask {
    fn from(entry: SnapshotEntry) -> Self {
        Self {
            title: entry.title,
            description: entry.description,
            priority: entry.priority,
            due_date: entry.due_date,
            category: entry.category,
            is_completed: entry.is_completed,
        }
    }
}

/// In-memory collection loaded from, and saved back to, a single JSON file
pub struct SnapshotBackend {
    path: PathBuf,
    tasks: Vec<Task>,
    /// Entries that could not be read as tasks, written back untouched
    preserved: Vec<Value>,
    next_id: i64,
    dirty: bool,
}

impl SnapshotBackend {
    /// Load the snapshot at `path`; a missing or unreadable file starts an empty collection
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let contents = read_snapshot(&path);
        let tasks: Vec<Task> = contents
            .entries
            .into_iter()
            .zip(1..)
            .filter_map(|(stored, id)| stored.into_task(TaskId(id)))
            .collect();
        let next_id = tasks.iter().map(|t| t.id.0).max().unwrap_or(0) + 1;

        info!(
            file = ?path,
            count = tasks.len(),
            preserved = contents.preserved.len(),
            "Loaded task snapshot"
        );

        Self {
            path,
            tasks,
            preserved: contents.preserved,
            next_id,
            dirty: false,
        }
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }
}

impl Backend for SnapshotBackend {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn load(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.clone())
    }

    fn get(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.tasks.iter().find(|t| t.id == id).cloned())
    }

    fn insert(&mut self, fields: ValidFields) -> Result<Task> {
        let task = fields.into_task(TaskId(self.next_id), false);
        self.next_id += 1;
        self.tasks.push(task.clone());
        self.dirty = true;
        Ok(task)
    }

    fn update(&mut self, task: &Task) -> Result<bool> {
        match self.position(task.id) {
            Some(pos) => {
                self.tasks[pos] = task.clone();
                self.dirty = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&mut self, id: TaskId) -> Result<bool> {
        match self.position(id) {
            Some(pos) => {
                self.tasks.remove(pos);
                self.dirty = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            debug!(file = ?self.path, "Snapshot unchanged, nothing to save");
            return Ok(());
        }
        write_snapshot(&self.path, &self.tasks, &self.preserved)?;
        self.dirty = false;
        Ok(())
    }

    fn close(mut self: Box<Self>) -> Result<()> {
        self.flush()
    }
}

/// What a snapshot file held, split into usable tasks and everything else
#[derive(Debug, Default)]
struct SnapshotContents {
    entries: Vec<StoredTask>,
    preserved: Vec<Value>,
}

/// Read every entry from a snapshot file
///
/// A missing file, an unreadable file, or content that is not a JSON array all
/// yield nothing. Entries that fail to parse or have no title are kept aside
/// as raw JSON so the next save writes them back.
fn read_snapshot(path: &Path) -> SnapshotContents {
    if !path.exists() {
        debug!(file = ?path, "Snapshot file does not exist yet");
        return SnapshotContents::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(file = ?path, error = ?e, "Failed to read snapshot, starting empty");
            return SnapshotContents::default();
        }
    };

    let values: Vec<Value> = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!(file = ?path, error = ?e, "Snapshot is not a JSON array, starting empty");
            return SnapshotContents::default();
        }
    };

    let mut contents = SnapshotContents::default();
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<SnapshotEntry>(value.clone()) {
            Ok(entry) if !entry.title.trim().is_empty() => contents.entries.push(entry.into()),
            Ok(_) => {
                warn!(file = ?path, index, "Snapshot entry has no title, keeping it as is");
                contents.preserved.push(value);
            }
            Err(e) => {
                warn!(file = ?path, index, error = ?e, "Failed to parse snapshot entry, keeping it as is");
                contents.preserved.push(value);
            }
        }
    }
    contents
}

/// Atomically replace the snapshot file with the given tasks
///
/// Unreadable entries from the last load follow the tasks unchanged. The new
/// content goes to a temp file in the same directory, which is then renamed
/// over the target, so a crash leaves either the old file or the new one.
fn write_snapshot(path: &Path, tasks: &[Task], preserved: &[Value]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut values = Vec::with_capacity(tasks.len() + preserved.len());
    for task in tasks {
        values.push(serde_json::to_value(SnapshotEntry::from(task))?);
    }
    values.extend(preserved.iter().cloned());
    let json = serde_json::to_string_pretty(&values)?;

    // Writers take turns on a sibling lock file; the snapshot itself is swapped by rename
    let lock = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(lock_path(path))?;
    lock.lock_exclusive()?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(json.as_bytes())?;
    temp.write_all(b"\n")?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    info!(
        file = ?path,
        count = tasks.len(),
        preserved = preserved.len(),
        "Saved task snapshot"
    );
    Ok(())
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}
