use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use schedstore::config::Config;
use schedstore::task::DATE_FORMAT;
use schedstore::{Task, TaskStore, export_tasks, import_tasks, parse_id};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schedstore")]
#[command(about = "schedstore CLI - SQLite persistence for scheduler tasks")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Config file (default: <config dir>/schedstore/schedstore.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file, overrides the config file
    #[arg(short, long)]
    db_path: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset, overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database file and schema
    Init,

    /// Add a task
    Add(TaskFields),

    /// List upcoming tasks ordered by date
    List {
        #[arg(long)]
        json: bool,
    },

    /// Search task titles and comments, or match an exact date
    Search {
        /// Text to look for (LIKE wildcards % and _ are honoured)
        #[arg(default_value = "")]
        text: String,

        /// Match tasks on this date instead (YYYYMMDD or "today")
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show a single task
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Overwrite fields of an existing task; omitted fields keep their value
    Edit {
        id: String,

        #[command(flatten)]
        fields: EditFields,
    },

    /// Delete a task
    Rm { id: String },

    /// Write all tasks to a JSONL file
    Export { path: PathBuf },

    /// Insert tasks from a JSONL file
    Import { path: PathBuf },
}

#[derive(Args)]
struct TaskFields {
    #[arg(short, long)]
    title: String,

    /// YYYYMMDD or "today"
    #[arg(short, long, default_value = "")]
    date: String,

    #[arg(short, long, default_value = "")]
    comment: String,

    /// Recurrence rule, stored as is
    #[arg(short, long, default_value = "")]
    repeat: String,
}

#[derive(Args)]
struct EditFields {
    #[arg(short, long)]
    title: Option<String>,

    #[arg(short, long)]
    date: Option<String>,

    #[arg(short, long)]
    comment: Option<String>,

    #[arg(short, long)]
    repeat: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db_path) = cli.db_path {
        config.db_path = db_path;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    // Setup tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // A store that fails to open is fatal for the CLI
    let mut store = TaskStore::open(&config.db_path)
        .with_context(|| format!("Failed to open task store at {}", config.db_path.display()))?;

    match cli.command {
        Commands::Init => {
            println!(
                "Task store ready at {} ({} tasks)",
                config.db_path.display(),
                store.count()?
            );
        }
        Commands::Add(fields) => {
            let task = Task::new(
                resolve_date(&fields.date)?,
                fields.title,
                fields.comment,
                fields.repeat,
            );
            let id = store.insert(&task)?;
            println!("Added task {}", id.to_string().green());
        }
        Commands::List { json } => {
            print_tasks(&store.list()?, json)?;
        }
        Commands::Search { text, date, json } => {
            let tasks = match date {
                Some(date) => store.search_by_date(&resolve_date(&date)?)?,
                None => store.search(&text)?,
            };
            print_tasks(&tasks, json)?;
        }
        Commands::Show { id, json } => {
            let task = store.read(parse_id(&id)?)?;
            print_tasks(std::slice::from_ref(&task), json)?;
        }
        Commands::Edit { id, fields } => {
            let mut task = store.read(parse_id(&id)?)?;
            if let Some(title) = fields.title {
                task.title = title;
            }
            if let Some(date) = fields.date {
                task.date = resolve_date(&date)?;
            }
            if let Some(comment) = fields.comment {
                task.comment = comment;
            }
            if let Some(repeat) = fields.repeat {
                task.repeat = repeat;
            }
            let task = store.update(task)?;
            println!("Updated task {}", task.id.to_string().green());
        }
        Commands::Rm { id } => {
            let id = parse_id(&id)?;
            store.delete(id)?;
            println!("Deleted task {}", id.to_string().red());
        }
        Commands::Export { path } => {
            let count = export_tasks(&store, &path)?;
            println!("Exported {} tasks to {}", count, path.display());
        }
        Commands::Import { path } => {
            let report = import_tasks(&mut store, &path)?;
            println!("Imported {} tasks", report.imported.to_string().green());
            if report.skipped > 0 {
                println!("Skipped {} lines", report.skipped.to_string().yellow());
            }
        }
    }

    Ok(())
}

/// Accept "today", an empty string, or a real YYYYMMDD date
fn resolve_date(date: &str) -> Result<String> {
    let date = date.trim();
    if date.is_empty() {
        return Ok(String::new());
    }
    if date.eq_ignore_ascii_case("today") {
        return Ok(Local::now().format(DATE_FORMAT).to_string());
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| eyre!("Invalid date {:?}, expected YYYYMMDD", date))?;
    Ok(date.to_string())
}

fn print_tasks(tasks: &[Task], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("{}", "No tasks".dimmed());
        return Ok(());
    }

    for task in tasks {
        let date = if task.date.is_empty() { "--------" } else { task.date.as_str() };
        print!("{:>5}  {}  {}", task.id.to_string().dimmed(), date.cyan(), task.title.bold());
        if !task.repeat.is_empty() {
            print!("  [{}]", task.repeat.yellow());
        }
        println!();
        if !task.comment.is_empty() {
            println!("       {}", task.comment.italic());
        }
    }

    Ok(())
}
