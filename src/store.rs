// SQLite-backed task store

use crate::error::{Result, StoreError};
use crate::task::Task;
use rusqlite::{Connection, Params, Row, params};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Maximum rows returned by list and search queries
pub const LIST_LIMIT: i64 = 20;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS scheduler (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date VARCHAR(8) NULL,
        title VARCHAR(64) NOT NULL CHECK (title <> ''),
        comment VARCHAR(255) NULL,
        repeat VARCHAR(128) NULL
    );

    CREATE INDEX IF NOT EXISTS scheduler_date ON scheduler (date);
"#;

const SELECT_TASKS: &str = "SELECT id, date, title, comment, repeat FROM scheduler";

/// Durable CRUD storage for [`Task`] records in a single SQLite file
///
/// Each store owns one connection for its whole lifetime. Operations are
/// blocking and run on the calling thread; no extra locking is layered on
/// top of SQLite's own.
pub struct TaskStore {
    path: Option<PathBuf>,
    db: Connection,
}

impl TaskStore {
    /// Open or create the database file at `path` and ensure the schema exists
    ///
    /// Missing parent directories are created. Schema creation is idempotent,
    /// so this is safe to call on every startup.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let db = Connection::open(path)?;
        let store = Self {
            path: Some(path.to_path_buf()),
            db,
        };
        store.create_schema()?;

        info!(path = ?path, "Opened task store");
        Ok(store)
    }

    /// Open a private in-memory store with the same schema
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            path: None,
            db: Connection::open_in_memory()?,
        };
        store.create_schema()?;
        Ok(store)
    }

    /// Backing file, or `None` for an in-memory store
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating scheduler schema");
        self.db.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Insert a task and return the id assigned to it
    ///
    /// `task.id` is ignored. Ids come from `AUTOINCREMENT` and are never
    /// reused, even after the highest row is deleted.
    pub fn insert(&self, task: &Task) -> Result<i64> {
        task.validate()?;

        self.db.execute(
            "INSERT INTO scheduler (date, title, comment, repeat) VALUES (?1, ?2, ?3, ?4)",
            params![task.date, task.title, task.comment, task.repeat],
        )?;

        Ok(self.db.last_insert_rowid())
    }

    /// Insert several tasks in one transaction and return their ids
    ///
    /// Either every task is stored or, on the first failure, none are.
    pub fn insert_all(&mut self, tasks: &[Task]) -> Result<Vec<i64>> {
        let tx = self.db.transaction()?;
        let mut ids = Vec::with_capacity(tasks.len());

        for task in tasks {
            task.validate()?;
            tx.execute(
                "INSERT INTO scheduler (date, title, comment, repeat) VALUES (?1, ?2, ?3, ?4)",
                params![task.date, task.title, task.comment, task.repeat],
            )?;
            ids.push(tx.last_insert_rowid());
        }

        tx.commit()?;
        Ok(ids)
    }

    /// Fetch a single task by id
    pub fn read(&self, id: i64) -> Result<Task> {
        let mut stmt = self.db.prepare(&format!("{} WHERE id = ?1", SELECT_TASKS))?;

        match stmt.query_row([id], row_to_task) {
            Ok(task) => Ok(task),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite every field of the task identified by `task.id`
    pub fn update(&self, task: Task) -> Result<Task> {
        task.validate()?;

        let affected = self.db.execute(
            "UPDATE scheduler SET date = ?1, title = ?2, comment = ?3, repeat = ?4 WHERE id = ?5",
            params![task.date, task.title, task.comment, task.repeat, task.id],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound(task.id));
        }

        Ok(task)
    }

    /// Remove the task with the given id
    pub fn delete(&self, id: i64) -> Result<()> {
        let affected = self.db.execute("DELETE FROM scheduler WHERE id = ?1", [id])?;

        if affected == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Up to [`LIST_LIMIT`] tasks ordered by date; undated tasks come first
    pub fn list(&self) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!("{} ORDER BY date ASC, id ASC LIMIT ?1", SELECT_TASKS),
            [LIST_LIMIT],
        )
    }

    /// Tasks whose title or comment contains `search`
    ///
    /// The text is wrapped in `%...%` and matched with `LIKE`, so `%` and `_`
    /// in `search` act as wildcards. An empty string matches every task.
    pub fn search(&self, search: &str) -> Result<Vec<Task>> {
        let pattern = format!("%{}%", search);
        self.query_tasks(
            &format!(
                "{} WHERE title LIKE ?1 OR comment LIKE ?1 ORDER BY date ASC, id ASC LIMIT ?2",
                SELECT_TASKS
            ),
            params![pattern, LIST_LIMIT],
        )
    }

    /// Tasks scheduled exactly on `date`, in insertion order
    pub fn search_by_date(&self, date: &str) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!("{} WHERE date = ?1 ORDER BY id ASC LIMIT ?2", SELECT_TASKS),
            params![date, LIST_LIMIT],
        )
    }

    /// Every task, ordered like [`list`](Self::list) but without a limit
    pub fn all(&self) -> Result<Vec<Task>> {
        self.query_tasks(&format!("{} ORDER BY date ASC, id ASC", SELECT_TASKS), [])
    }

    /// Number of stored tasks
    pub fn count(&self) -> Result<i64> {
        let count = self
            .db
            .query_row("SELECT COUNT(*) FROM scheduler", [], |row| row.get(0))?;
        Ok(count)
    }

    // Statement and row cursor are dropped before returning, error paths included
    fn query_tasks<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Task>> {
        let mut stmt = self.db.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_task)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }
}

/// Parse a string-typed id as received from outer layers
pub fn parse_id(id: &str) -> Result<i64> {
    id.trim()
        .parse::<i64>()
        .map_err(|_| StoreError::InvalidId(id.to_string()))
}

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        date: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        title: row.get(2)?,
        comment: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        repeat: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}
