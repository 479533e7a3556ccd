// Task store: validation, defaults and queries over a pluggable backing

use crate::backend::{self, Backend};
use crate::config::StorageConfig;
use crate::error::{Result, StoreError};
use crate::filter::Filter;
use crate::task::{DEFAULT_CATEGORY, Task, TaskFields, TaskId};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Owns the task collection for the lifetime of the process
pub struct TaskStore {
    backend: Box<dyn Backend>,
}

impl TaskStore {
    /// Open the backing named by `config`
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let backend = backend::open(config)?;
        info!(backend = backend.name(), "Task store opened");
        Ok(Self { backend })
    }

    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a task with defaults applied; the backing assigns its id
    pub fn add(&mut self, fields: TaskFields) -> Result<Task> {
        let fields = fields.validate()?;
        let task = self.backend.insert(fields)?;
        debug!(id = %task.id, title = %task.title, "Added task");
        Ok(task)
    }

    /// Overwrite the editable fields of a task, keeping its completion state
    pub fn update(&mut self, id: TaskId, fields: TaskFields) -> Result<Task> {
        let fields = fields.validate()?;
        let existing = self.get(id)?;
        let task = fields.into_task(id, existing.is_completed);

        if !self.backend.update(&task)? {
            return Err(StoreError::NotFound(id));
        }
        debug!(%id, "Updated task");
        Ok(task)
    }

    pub fn delete(&mut self, id: TaskId) -> Result<()> {
        if !self.backend.delete(id)? {
            return Err(StoreError::NotFound(id));
        }
        debug!(%id, "Deleted task");
        Ok(())
    }

    /// Flip the completion flag and return the updated task
    pub fn toggle_completed(&mut self, id: TaskId) -> Result<Task> {
        let mut task = self.get(id)?;
        task.is_completed = !task.is_completed;

        if !self.backend.update(&task)? {
            return Err(StoreError::NotFound(id));
        }
        debug!(%id, is_completed = task.is_completed, "Toggled task");
        Ok(task)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get(&self, id: TaskId) -> Result<Task> {
        self.backend.get(id)?.ok_or(StoreError::NotFound(id))
    }

    /// All tasks, or only those in `category`; open tasks come before completed ones
    pub fn list(&self, category: Option<&str>) -> Result<Vec<Task>> {
        let mut filter = Filter::all();
        filter.category = category.map(str::to_string);
        self.query(&filter)
    }

    /// Tasks matching `filter`, open before completed, otherwise in storage order
    pub fn query(&self, filter: &Filter) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self.backend.load()?.into_iter().filter(|t| filter.matches(t)).collect();

        // Stable sort keeps storage order within each group
        tasks.sort_by_key(|t| t.is_completed);
        Ok(tasks)
    }

    /// Distinct categories in use, always including the default one
    pub fn categories(&self) -> Result<BTreeSet<String>> {
        let mut categories: BTreeSet<String> = self.backend.load()?.into_iter().map(|t| t.category).collect();
        categories.insert(DEFAULT_CATEGORY.to_string());
        Ok(categories)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Flush pending changes and release the backing
    pub fn close(self) -> Result<()> {
        let name = self.backend.name();
        self.backend.close()?;
        info!(backend = name, "Task store closed");
        Ok(())
    }
}
