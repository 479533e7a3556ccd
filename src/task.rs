// Task data model

use crate::error::{Result, StoreError};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Category used when none (or a blank one) is given
pub const DEFAULT_CATEGORY: &str = "General";

/// Input and storage format for due dates
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Store-assigned task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Interpret a stored priority, falling back to Medium for anything unrecognised
    pub(crate) fn from_stored(raw: Option<&str>) -> Self {
        match raw {
            None => Priority::default(),
            Some(s) if s.trim().is_empty() => Priority::default(),
            Some(s) => s.parse().unwrap_or_else(|_| {
                warn!(priority = s, "Unknown stored priority, using Medium");
                Priority::default()
            }),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = StoreError;

    // Accepts the Portuguese labels older data files were written with
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "baixa" => Ok(Priority::Low),
            "medium" | "média" | "media" => Ok(Priority::Medium),
            "high" | "alta" => Ok(Priority::High),
            other => Err(StoreError::validation(
                "priority",
                format!("'{}' is not one of Low, Medium, High", other),
            )),
        }
    }
}

/// A single to-do record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    /// Raw date string as stored; may fail to parse for data written elsewhere
    pub due_date: Option<String>,
    pub category: String,
    pub is_completed: bool,
}

impl Task {
    /// Parsed due date, or None when absent or not a valid date
    pub fn due(&self) -> Option<NaiveDate> {
        self.due_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), DUE_DATE_FORMAT).ok())
    }

    /// A task is overdue when it is still open and its valid due date lies before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.due().is_some_and(|due| due < today)
    }
}

/// Caller-supplied values for creating or editing a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub category: Option<String>,
}

impl TaskFields {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Trim, apply defaults, and reject empty titles or malformed due dates
    pub fn validate(&self) -> Result<ValidFields> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(StoreError::empty_title());
        }

        let due_date = match self.due_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_due_date(raw)?.format(DUE_DATE_FORMAT).to_string()),
        };

        Ok(ValidFields {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            priority: self.priority.unwrap_or_default(),
            due_date,
            category: normalize_category(self.category.as_deref()),
        })
    }
}

/// Fields that passed validation, with defaults filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidFields {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub category: String,
}

impl ValidFields {
    pub fn into_task(self, id: TaskId, is_completed: bool) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            category: self.category,
            is_completed,
        }
    }
}

/// A record as read back from a backing, before defaults are applied
#[derive(Debug, Clone, Default)]
pub(crate) struct StoredTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub category: Option<String>,
    pub is_completed: bool,
}

impl StoredTask {
    /// Lenient conversion; only a missing title makes a record unusable
    pub fn into_task(self, id: TaskId) -> Option<Task> {
        if self.title.trim().is_empty() {
            warn!(%id, "Skipping stored task with empty title");
            return None;
        }

        Some(Task {
            id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            priority: Priority::from_stored(self.priority.as_deref()),
            due_date: self.due_date.filter(|d| !d.trim().is_empty()),
            category: normalize_category(self.category.as_deref()),
            is_completed: self.is_completed,
        })
    }
}

/// Strictly parse a user-supplied due date
///
/// Only zero-padded `YYYY-MM-DD` is accepted; chrono alone would also take
/// unpadded fields, inner spaces and a leading sign.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if !is_iso_date_shape(trimmed) {
        return Err(StoreError::invalid_due_date(raw));
    }
    NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT).map_err(|_| StoreError::invalid_due_date(raw))
}

fn is_iso_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

/// Current local calendar date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DUE_DATE_FORMAT).unwrap()
    }

    fn task_due(due: Option<&str>, is_completed: bool) -> Task {
        Task {
            id: TaskId(1),
            title: "Pay rent".to_string(),
            description: String::new(),
            priority: Priority::High,
            due_date: due.map(str::to_string),
            category: DEFAULT_CATEGORY.to_string(),
            is_completed,
        }
    }

    #[test]
    fn test_priority_parsing() {
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" Medium ".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("Baixa".parse::<Priority>().unwrap(), Priority::Low);
        assert_eq!("Média".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("Alta".parse::<Priority>().unwrap(), Priority::High);

        let err = "urgent".parse::<Priority>().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_priority_from_stored_is_lenient() {
        assert_eq!(Priority::from_stored(None), Priority::Medium);
        assert_eq!(Priority::from_stored(Some("")), Priority::Medium);
        assert_eq!(Priority::from_stored(Some("bogus")), Priority::Medium);
        assert_eq!(Priority::from_stored(Some("Alta")), Priority::High);
    }

    #[test]
    fn test_priority_display() {
        assert_eq!(Priority::High.to_string(), "High");
        assert_eq!(Priority::Low.to_string(), "Low");
    }

    #[test]
    fn test_validate_applies_defaults() {
        let fields = TaskFields::new("  Buy milk  ").category("   ").validate().unwrap();
        assert_eq!(fields.title, "Buy milk");
        assert_eq!(fields.priority, Priority::Medium);
        assert_eq!(fields.category, DEFAULT_CATEGORY);
        assert_eq!(fields.due_date, None);
    }

    #[test]
    fn test_validate_rejects_empty_title() {
        let err = TaskFields::new("   ").validate().unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "title", .. }));
    }

    #[test]
    fn test_validate_due_date() {
        let ok = TaskFields::new("x").due_date("2024-02-29").validate().unwrap();
        assert_eq!(ok.due_date.as_deref(), Some("2024-02-29"));

        let blank = TaskFields::new("x").due_date("  ").validate().unwrap();
        assert_eq!(blank.due_date, None);

        let padded = TaskFields::new("x").due_date(" 2024-03-05 ").validate().unwrap();
        assert_eq!(padded.due_date.as_deref(), Some("2024-03-05"));

        for bad in [
            "2023-02-29",
            "31/12/2024",
            "tomorrow",
            "2024-1-5",
            "2024- 1- 5",
            "+2024-01-05",
            "2024-01-05T00:00",
        ] {
            let err = TaskFields::new("x").due_date(bad).validate().unwrap_err();
            assert!(matches!(err, StoreError::Validation { field: "due_date", .. }), "{}", bad);
        }
    }

    #[test]
    fn test_overdue() {
        let today = date("2020-01-02");
        assert!(task_due(Some("2020-01-01"), false).is_overdue(today));
        assert!(!task_due(Some("2020-01-01"), true).is_overdue(today));
        assert!(!task_due(Some("2020-01-02"), false).is_overdue(today));
        assert!(!task_due(None, false).is_overdue(today));
        assert!(task_due(Some("2020-01-01"), false).is_overdue(super::today()));
    }

    #[test]
    fn test_invalid_stored_due_date_is_inert() {
        let task = task_due(Some("next week"), false);
        assert_eq!(task.due(), None);
        assert!(!task.is_overdue(date("2030-01-01")));
    }

    #[test]
    fn test_stored_task_defaults() {
        let stored = StoredTask {
            title: "Old".to_string(),
            ..Default::default()
        };
        let task = stored.into_task(TaskId(3)).unwrap();
        assert_eq!(task.description, "");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.category, DEFAULT_CATEGORY);
        assert!(!task.is_completed);

        let untitled = StoredTask::default();
        assert!(untitled.into_task(TaskId(4)).is_none());
    }
}
