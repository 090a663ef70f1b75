// schedstore - SQLite persistence for scheduler tasks

pub mod config;
pub mod error;
pub mod jsonl;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use error::{Result, StoreError};
pub use jsonl::{ImportReport, export_tasks, import_tasks};
pub use store::{LIST_LIMIT, TaskStore, parse_id};
pub use task::Task;
