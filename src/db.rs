use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::{params, Connection, ErrorCode};
use tracing::{info, warn};

use crate::error::StoreError;
use crate::model::Source;
use crate::output;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS monologue (
            id         INTEGER PRIMARY KEY,
            author     TEXT NOT NULL,
            date       TEXT NOT NULL,
            source     TEXT NOT NULL,
            content    TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(author, date, content)
        );
        CREATE INDEX IF NOT EXISTS idx_monologue_date ON monologue(date);
        CREATE INDEX IF NOT EXISTS idx_monologue_source ON monologue(source);
        ",
    )?;
    Ok(())
}

pub struct MonologueRow<'a> {
    pub author: &'a str,
    pub date: &'a str,
    pub source: Source,
    pub content: &'a str,
}

/// Insert one row in its own transaction. A repeated (author, date, content)
/// is rolled back and reported as `StoreError::Duplicate`.
pub fn insert_monologue(conn: &Connection, row: &MonologueRow<'_>) -> Result<(), StoreError> {
    let tx = conn.unchecked_transaction()?;
    let inserted = tx.execute(
        "INSERT INTO monologue (author, date, source, content) VALUES (?1, ?2, ?3, ?4)",
        params![row.author, row.date, row.source.as_str(), row.content],
    );
    match inserted {
        Ok(_) => {
            tx.commit()?;
            Ok(())
        }
        Err(e) if is_constraint_violation(&e) => {
            tx.rollback()?;
            Err(StoreError::Duplicate {
                author: row.author.to_string(),
                content: row.content.to_string(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation)
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportStats {
    pub files: usize,
    pub inserted: usize,
    pub duplicates: usize,
}

/// Dated CSVs in `dir` and in its `YYYY` year subdirectories, oldest first.
pub fn dated_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() && is_year_dir(&path) {
            for inner in fs::read_dir(&path)? {
                let inner = inner?.path();
                if output::file_date(&inner).is_some() {
                    files.push(inner);
                }
            }
        } else if output::file_date(&path).is_some() {
            files.push(path);
        }
    }
    files.sort_by_key(|p| output::file_date(p));
    Ok(files)
}

fn is_year_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.len() == 4 && n.chars().all(|c| c.is_ascii_digit()))
}

/// Load every dated CSV under `dir` into the store. Duplicates are logged and
/// skipped; any other storage error aborts the import.
pub fn import_csv_dir(conn: &Connection, dir: &Path, source: Source) -> Result<ImportStats> {
    let files = dated_csv_files(dir)?;
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("#>-"),
    );

    let mut stats = ImportStats::default();
    for path in &files {
        let Some(date) = output::file_date(path) else { continue };
        let date = date.format("%Y-%m-%d").to_string();
        let rows = output::read_day(path).with_context(|| format!("reading {}", path.display()))?;
        for (author, content) in &rows {
            let row = MonologueRow { author, date: &date, source, content };
            match insert_monologue(conn, &row) {
                Ok(()) => stats.inserted += 1,
                Err(e @ StoreError::Duplicate { .. }) => {
                    warn!(date = %date, "{}", e);
                    stats.duplicates += 1;
                }
                Err(e) => return Err(e).with_context(|| format!("importing {}", path.display())),
            }
        }
        stats.files += 1;
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        files = stats.files,
        inserted = stats.inserted,
        duplicates = stats.duplicates,
        "import finished"
    );
    Ok(stats)
}

pub struct SourceCount {
    pub source: String,
    pub rows: i64,
    pub days: i64,
    pub first: String,
    pub last: String,
}

pub fn get_stats(conn: &Connection) -> Result<Vec<SourceCount>> {
    let mut stmt = conn.prepare(
        "SELECT source, COUNT(*), COUNT(DISTINCT date), MIN(date), MAX(date)
         FROM monologue GROUP BY source ORDER BY source",
    )?;
    let rows = stmt
        .query_map([], |r| {
            Ok(SourceCount {
                source: r.get(0)?,
                rows: r.get(1)?,
                days: r.get(2)?,
                first: r.get(3)?,
                last: r.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
