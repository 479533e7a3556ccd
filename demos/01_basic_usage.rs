//! Demo 01: Basic Usage
//!
//! Runs the same add/toggle/edit/delete sequence against both backings and
//! shows that they answer queries identically.
//!
//! Run with: cargo run --example 01_basic_usage

use eyre::Result;
use todostore::{BackendKind, Priority, StorageConfig, TaskFields, TaskStore};

fn exercise(store: &mut TaskStore) -> Result<()> {
    let groceries = store.add(TaskFields::new("Buy groceries").category("Home"))?;
    let report = store.add(
        TaskFields::new("Quarterly report")
            .description("Numbers for Q3")
            .priority(Priority::High)
            .due_date("2020-01-01")
            .category("Work"),
    )?;
    let typo = store.add(TaskFields::new("Tpyo"))?;

    store.toggle_completed(groceries.id)?;
    store.update(typo.id, TaskFields::new("Fix typo").priority(Priority::Low))?;

    println!("   All tasks:");
    for task in store.list(None)? {
        let overdue = if task.is_overdue(todostore::today()) { " (overdue)" } else { "" };
        println!(
            "   - #{} [{}] {} / {} / {}{}",
            task.id,
            if task.is_completed { "x" } else { " " },
            task.title,
            task.priority,
            task.category,
            overdue
        );
    }

    println!("   Work only: {}", store.list(Some("Work"))?.len());
    println!("   Categories: {:?}", store.categories()?);

    store.delete(report.id)?;
    println!("   After delete: {} tasks", store.list(None)?.len());

    // Deleting again reports NotFound and leaves the collection alone
    if let Err(e) = store.delete(report.id) {
        println!("   Second delete: {}", e);
    }
    Ok(())
}

fn main() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;

    println!("todostore Basic Usage Example");
    println!("=============================\n");

    for backend in [BackendKind::Snapshot, BackendKind::Sqlite] {
        let config = StorageConfig {
            backend,
            path: Some(temp_dir.path().join(backend.default_file_name())),
        };

        println!("Backing: {:?} at {}", backend, config.resolved_path().display());
        let mut store = TaskStore::open(&config)?;
        exercise(&mut store)?;
        store.close()?;

        // Reopen to show the data survived
        let reopened = TaskStore::open(&config)?;
        println!("   Reopened with {} tasks\n", reopened.list(None)?.len());
        reopened.close()?;
    }

    println!("Example complete!");
    Ok(())
}
