use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::mem::take;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::model::DailyRecord;

pub const HEADER: [&str; 2] = ["name", "monologue"];

pub fn day_path(dir: &Path, date: &str) -> PathBuf {
    dir.join(format!("{}.csv", date))
}

pub fn exists(dir: &Path, date: &str) -> bool {
    day_path(dir, date).exists()
}

/// Write `<dir>/<date>.csv`. The file is assembled under a temporary name and
/// renamed into place, so a reader never sees half a day.
pub fn write_day(dir: &Path, record: &DailyRecord) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let mut buf: Vec<u8> = Vec::new();
    write_row(&mut buf, &HEADER)?;
    for (name, monologue) in record.rows() {
        write_row(&mut buf, &[name, monologue])?;
    }

    let path = day_path(dir, &record.date);
    let tmp = path.with_extension("csv.tmp");
    fs::write(&tmp, &buf)?;
    if let Err(e) = fs::rename(&tmp, &path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(path)
}

/// Read back (name, monologue) rows, header dropped.
pub fn read_day(path: &Path) -> io::Result<Vec<(String, String)>> {
    let text = fs::read_to_string(path)?;
    let mut rows = parse_rows(&text).into_iter();
    let mut out = Vec::new();
    if let Some(first) = rows.next() {
        if !is_header(&first) {
            out.extend(pair(first));
        }
    }
    out.extend(rows.filter_map(pair));
    Ok(out)
}

fn is_header(row: &[String]) -> bool {
    row.first().is_some_and(|c| c.eq_ignore_ascii_case(HEADER[0]))
}

fn pair(mut row: Vec<String>) -> Option<(String, String)> {
    if row.len() < 2 {
        return None;
    }
    let monologue = take(&mut row[1]);
    let name = take(&mut row[0]);
    Some((name, monologue))
}

/// Date encoded in a `<YYYY-MM-DD>.csv` file name.
pub fn file_date(path: &Path) -> Option<NaiveDate> {
    if path.extension()? != "csv" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}

/// Delete dated CSVs inside `[from, to]` whose date is not in `keep`.
pub fn prune_stale(
    dir: &Path,
    from: NaiveDate,
    to: NaiveDate,
    keep: &HashSet<String>,
) -> io::Result<Vec<PathBuf>> {
    let mut pruned = Vec::new();
    if !dir.is_dir() {
        return Ok(pruned);
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(date) = file_date(&path) else { continue };
        if date < from || date > to || keep.contains(&date.format("%Y-%m-%d").to_string()) {
            continue;
        }
        fs::remove_file(&path)?;
        pruned.push(path);
    }
    pruned.sort();
    Ok(pruned)
}

/* ---------------- CSV ---------------- */

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one comma-separated row, RFC 4180 quoting, `\n` terminated.
pub fn write_row<W: Write>(mut w: W, row: &[&str]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            w.write_all(b",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    writeln!(w)
}

/// Minimal CSV parser (quotes + CRLF tolerant).
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.strip_prefix('\u{feff}').unwrap_or(text).chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}
