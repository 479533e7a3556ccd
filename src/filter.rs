// Query filtering for task listings

use crate::task::Task;
use chrono::NaiveDate;
use std::str::FromStr;

/// Selection applied by `TaskStore::query`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Exact category match when set
    pub category: Option<String>,
    pub status: StatusFilter,
    /// Reference date for `StatusFilter::Overdue`
    pub today: NaiveDate,
}

/// Completion-state selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
}

impl Filter {
    /// Every task, evaluated against the current date
    pub fn all() -> Self {
        Self {
            category: None,
            status: StatusFilter::All,
            today: crate::task::today(),
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        if self.category.as_ref().is_some_and(|c| task.category != *c) {
            return false;
        }

        match self.status {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.is_completed,
            StatusFilter::Completed => task.is_completed,
            StatusFilter::Overdue => task.is_overdue(self.today),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pending" | "open" => Ok(StatusFilter::Pending),
            "completed" | "done" => Ok(StatusFilter::Completed),
            "overdue" => Ok(StatusFilter::Overdue),
            other => Err(format!("unknown status filter: {}", other)),
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Pending => write!(f, "pending"),
            StatusFilter::Completed => write!(f, "completed"),
            StatusFilter::Overdue => write!(f, "overdue"),
        }
    }
}
