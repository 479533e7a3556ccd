// Terminal rendering of tasks

use crate::config::{ColorMode, DisplayConfig};
use crate::task::{Priority, Task};
use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use colored::{ColoredString, Colorize};
use std::fmt::Write;
use tracing::warn;

/// Apply the configured colour mode process-wide
pub fn apply_color_mode(mode: ColorMode) {
    match mode {
        ColorMode::Auto => {}
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
    }
}

/// Formats tasks for the CLI using the display settings chosen at startup
pub struct Renderer {
    config: DisplayConfig,
    today: NaiveDate,
}

impl Renderer {
    pub fn new(mut config: DisplayConfig, today: NaiveDate) -> Self {
        if StrftimeItems::new(&config.date_format).any(|item| item == Item::Error) {
            warn!(format = %config.date_format, "Invalid date format, using default");
            config.date_format = DisplayConfig::default().date_format;
        }
        Self { config, today }
    }

    /// One task: status line, optional description, then category and due date
    pub fn task(&self, task: &Task) -> String {
        let overdue = task.is_overdue(self.today);

        let checkbox = if task.is_completed { "[x]" } else { "[ ]" };
        let title = if task.is_completed {
            task.title.dimmed().italic()
        } else {
            task.title.bold()
        };

        let mut out = format!(
            "{} {} {}  {}",
            checkbox,
            format!("#{}", task.id).dimmed(),
            title,
            priority_label(task.priority)
        );

        if !task.description.is_empty() {
            out.push_str(&format!("\n      {}", task.description));
        }

        let mut info = format!("Category: {}", task.category);
        // Unparseable stored dates are not shown, matching how they are ignored for overdue checks
        if let Some(due) = task.due() {
            info.push_str(&format!("  |  Due: {}", self.format_due(due)));
        }

        let info = if overdue {
            format!("{}  OVERDUE", info).red().bold()
        } else {
            info.dimmed()
        };
        out.push_str(&format!("\n      {}", info));
        out
    }

    // Formats needing a time of day fail on a bare date
    fn format_due(&self, due: NaiveDate) -> String {
        let mut out = String::new();
        match write!(out, "{}", due.format(&self.config.date_format)) {
            Ok(()) => out,
            Err(_) => due.to_string(),
        }
    }

    /// A whole listing, with a placeholder line when empty
    pub fn list(&self, tasks: &[Task]) -> String {
        if tasks.is_empty() {
            return "No tasks.".dimmed().to_string();
        }
        tasks.iter().map(|t| self.task(t)).collect::<Vec<_>>().join("\n")
    }
}

fn priority_label(priority: Priority) -> ColoredString {
    let label = format!("({})", priority);
    match priority {
        Priority::High => label.red(),
        Priority::Medium => label.yellow(),
        Priority::Low => label.blue(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskId;

    fn renderer() -> Renderer {
        colored::control::set_override(false);
        Renderer::new(DisplayConfig::default(), NaiveDate::from_ymd_opt(2020, 1, 2).unwrap())
    }

    fn task() -> Task {
        Task {
            id: TaskId(5),
            title: "File taxes".to_string(),
            description: "before april".to_string(),
            priority: Priority::High,
            due_date: Some("2020-01-01".to_string()),
            category: "Home".to_string(),
            is_completed: false,
        }
    }

    #[test]
    fn test_render_overdue_task() {
        let text = renderer().task(&task());
        assert!(text.starts_with("[ ] #5 File taxes  (High)"));
        assert!(text.contains("before april"));
        assert!(text.contains("Category: Home  |  Due: 01/01/2020  OVERDUE"));
    }

    #[test]
    fn test_render_completed_task_not_overdue() {
        let mut task = task();
        task.is_completed = true;
        let text = renderer().task(&task);
        assert!(text.starts_with("[x]"));
        assert!(!text.contains("OVERDUE"));
    }

    #[test]
    fn test_render_hides_invalid_due_date() {
        let mut task = task();
        task.due_date = Some("whenever".to_string());
        task.description.clear();
        let text = renderer().task(&task);
        assert!(!text.contains("Due:"));
        assert!(!text.contains("whenever"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_render_custom_date_format() {
        colored::control::set_override(false);
        let config = DisplayConfig {
            date_format: "%Y/%m/%d".to_string(),
            ..Default::default()
        };
        let renderer = Renderer::new(config, NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
        assert!(renderer.task(&task()).contains("Due: 2020/01/01"));
    }

    #[test]
    fn test_invalid_date_format_falls_back() {
        colored::control::set_override(false);
        let config = DisplayConfig {
            date_format: "%Q".to_string(),
            ..Default::default()
        };
        let renderer = Renderer::new(config, NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
        assert!(renderer.task(&task()).contains("Due: 01/01/2020"));
    }

    #[test]
    fn test_time_format_on_date_falls_back_to_iso() {
        colored::control::set_override(false);
        let config = DisplayConfig {
            date_format: "%H:%M".to_string(),
            ..Default::default()
        };
        let renderer = Renderer::new(config, NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
        assert!(renderer.task(&task()).contains("Due: 2020-01-01"));
    }

    #[test]
    fn test_render_empty_list() {
        assert_eq!(renderer().list(&[]), "No tasks.");
    }
}
