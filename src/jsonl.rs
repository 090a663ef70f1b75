// JSONL export and import of tasks

use crate::error::Result;
use crate::store::TaskStore;
use crate::task::Task;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

/// Outcome of [`import_tasks`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Write every task in the store to `path`, one JSON object per line
///
/// The exclusive lock is taken before the file is truncated, so a writer
/// already holding it never sees its contents cleared underneath it.
/// Returns the number of tasks written.
pub fn export_tasks(store: &TaskStore, path: &Path) -> Result<usize> {
    let tasks = store.all()?;

    let file = OpenOptions::new().create(true).write(true).truncate(false).open(path)?;
    file.lock_exclusive()?;
    file.set_len(0)?;

    let mut writer = BufWriter::new(&file);
    for task in &tasks {
        let json = serde_json::to_string(task)?;
        writeln!(writer, "{}", json)?;
    }
    writer.flush()?;
    drop(writer);
    file.sync_all()?;

    // Lock is released when file is dropped
    info!(file = ?path, count = tasks.len(), "Exported tasks to JSONL");
    Ok(tasks.len())
}

/// Insert every task found in a JSONL file
///
/// Ids in the file are ignored; the store assigns fresh ones. Unreadable
/// lines, malformed JSON and tasks that fail validation are skipped and
/// counted. The remaining tasks go in as one transaction, so a database
/// failure leaves the store unchanged.
pub fn import_tasks(store: &mut TaskStore, path: &Path) -> Result<ImportReport> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut tasks = Vec::new();
    let mut skipped = 0;

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                skipped += 1;
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let task: Task = match serde_json::from_str(&line) {
            Ok(t) => t,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse JSON, skipping"
                );
                skipped += 1;
                continue;
            }
        };

        if let Err(e) = task.validate() {
            warn!(
                file = ?path,
                line = line_num + 1,
                error = %e,
                "Invalid task, skipping"
            );
            skipped += 1;
            continue;
        }

        tasks.push(task);
    }

    let imported = store.insert_all(&tasks)?.len();
    let report = ImportReport { imported, skipped };

    info!(
        file = ?path,
        imported = report.imported,
        skipped = report.skipped,
        "Imported tasks from JSONL"
    );

    Ok(report)
}
