use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result};
use std::path::PathBuf;
use todostore::config::{BackendKind, Config};
use todostore::render::{self, Renderer};
use todostore::{Filter, Priority, StatusFilter, StoreError, TaskFields, TaskId, TaskStore};
use tracing::Level;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "todostore CLI - Manage a task list stored in a JSON snapshot or SQLite")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file (default: <config dir>/todostore/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Persistence backing to use, overriding the config
    #[arg(long)]
    backend: Option<BackendKind>,

    /// Data file to use, overriding the config
    #[arg(long)]
    data: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new task
    Add {
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Low, Medium or High (default Medium)
        #[arg(short, long)]
        priority: Option<String>,

        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,

        /// Category label (default General)
        #[arg(long)]
        category: Option<String>,
    },

    /// Change fields of an existing task; omitted fields keep their value
    Edit {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        priority: Option<String>,

        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        #[arg(long)]
        category: Option<String>,
    },

    /// Mark a task done, or open again if already done
    #[command(alias = "done")]
    Toggle { id: i64 },

    /// Remove a task
    #[command(alias = "rm")]
    Delete { id: i64 },

    /// Show a single task
    Show { id: i64 },

    /// List tasks, open ones first
    List {
        /// Only tasks in this category
        #[arg(long)]
        category: Option<String>,

        /// all, pending, completed or overdue
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },

    /// List categories in use
    Categories,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    if let Some(data) = cli.data {
        config.storage.path = Some(data);
    }

    render::apply_color_mode(config.display.color);
    let renderer = Renderer::new(config.display.clone(), todostore::today());

    let mut store = TaskStore::open(&config.storage).with_context(|| {
        format!(
            "Failed to open task storage at {}",
            config.storage.resolved_path().display()
        )
    })?;

    let outcome = run(&mut store, &renderer, cli.command);

    // Release the backing exactly once, even when the command failed
    store.close().context("Failed to save tasks")?;

    if let Some(warning) = settle(outcome)? {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    Ok(())
}

/// Map a command outcome to the exit contract
///
/// A missing task is only a warning (exit status 0, nothing changed); every
/// other failure is returned and exits non-zero.
fn settle(outcome: todostore::Result<()>) -> Result<Option<String>> {
    match outcome {
        Ok(()) => Ok(None),
        Err(e @ StoreError::NotFound(_)) => Ok(Some(format!("{}; nothing changed", e))),
        Err(e) => Err(e.into()),
    }
}

fn run(store: &mut TaskStore, renderer: &Renderer, command: Commands) -> todostore::Result<()> {
    match command {
        Commands::Add {
            title,
            description,
            priority,
            due,
            category,
        } => {
            let mut fields = TaskFields::new(title).description(description);
            fields.priority = priority.as_deref().map(str::parse::<Priority>).transpose()?;
            fields.due_date = due;
            fields.category = category;

            let task = store.add(fields)?;
            println!("Added task #{}", task.id);
            println!("{}", renderer.task(&task));
        }
        Commands::Edit {
            id,
            title,
            description,
            priority,
            due,
            clear_due,
            category,
        } => {
            let id = TaskId(id);
            let current = store.get(id)?;

            let due_date = if clear_due { None } else { due.or(current.due_date) };
            let fields = TaskFields {
                title: title.unwrap_or(current.title),
                description: description.unwrap_or(current.description),
                priority: Some(match priority {
                    Some(p) => p.parse()?,
                    None => current.priority,
                }),
                due_date,
                category: Some(category.unwrap_or(current.category)),
            };

            let task = store.update(id, fields)?;
            println!("Updated task #{}", task.id);
            println!("{}", renderer.task(&task));
        }
        Commands::Toggle { id } => {
            let task = store.toggle_completed(TaskId(id))?;
            let state = if task.is_completed { "done" } else { "open" };
            println!("Task #{} is now {}", task.id, state);
        }
        Commands::Delete { id } => {
            store.delete(TaskId(id))?;
            println!("Deleted task #{}", id);
        }
        Commands::Show { id } => {
            let task = store.get(TaskId(id))?;
            println!("{}", renderer.task(&task));
        }
        Commands::List { category, status } => {
            let mut filter = Filter::all().status(status);
            filter.category = category;
            let tasks = store.query(&filter)?;
            println!("{}", renderer.list(&tasks));
        }
        Commands::Categories => {
            for category in store.categories()? {
                println!("{}", category);
            }
        }
    }

    Ok(())
}
