//! File I/O utilities with atomic, retry-tolerant writes
//!
//! Artifact destinations may be held open by an external viewer (a
//! spreadsheet application, an explorer preview pane), so writes go to a
//! temporary file first and are renamed over the destination. A locked
//! destination is retried a bounded number of times; when every retry fails
//! the data is written to a timestamp-suffixed sibling instead of being lost.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::warn;
use serde::Serialize;

use crate::error::{ApError, ApResult};

/// How many times a locked destination is retried
pub const WRITE_RETRIES: u32 = 5;

/// Delay between retries
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Write rows as a headered CSV, atomically, retrying a locked destination
///
/// Returns the path actually written: the destination on success, or a
/// timestamp-suffixed fallback beside it when the destination stayed locked
/// through every retry. The fallback is surfaced as a warning, not an error.
pub fn write_csv_atomic<T, P>(path: P, rows: &[T]) -> ApResult<PathBuf>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_csv_atomic_with(path, rows, WRITE_RETRIES, RETRY_DELAY)
}

/// As [`write_csv_atomic`], with explicit retry parameters
pub fn write_csv_atomic_with<T, P>(
    path: P,
    rows: &[T],
    retries: u32,
    delay: Duration,
) -> ApResult<PathBuf>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ApError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
    }

    // Temp file in the same directory, so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    for attempt in 0..retries {
        match try_write_and_replace(&temp_path, path, rows) {
            Ok(()) => return Ok(path.to_path_buf()),
            Err(err) => {
                let _ = fs::remove_file(&temp_path);
                if attempt + 1 < retries {
                    warn!(
                        "Write to {} failed (attempt {}/{}): {}; retrying",
                        path.display(),
                        attempt + 1,
                        retries,
                        err
                    );
                    std::thread::sleep(delay);
                }
            }
        }
    }

    // Destination stayed locked; save beside it rather than lose the table
    let fallback = fallback_path(path);
    write_csv(&fallback, rows)?;
    warn!(
        "Could not write to {} (locked). Saved to fallback: {}",
        path.display(),
        fallback.display()
    );
    Ok(fallback)
}

/// One direct (non-atomic) CSV write
fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> ApResult<()> {
    let file = File::create(path)
        .map_err(|e| ApError::Storage(format!("Failed to create {}: {}", path.display(), e)))?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .map_err(|e| ApError::Storage(format!("Failed to flush {}: {}", path.display(), e)))?;
    Ok(())
}

fn try_write_and_replace<T: Serialize>(
    temp_path: &Path,
    path: &Path,
    rows: &[T],
) -> ApResult<()> {
    let file = File::create(temp_path)
        .map_err(|e| ApError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    for row in rows {
        writer.serialize(row)?;
    }
    let buf = writer
        .into_inner()
        .map_err(|e| ApError::Storage(format!("Failed to flush temp file: {}", e)))?;
    let file = buf
        .into_inner()
        .map_err(|e| ApError::Storage(format!("Failed to flush temp file: {}", e)))?;

    // Sync to disk before rename
    file.sync_all()
        .map_err(|e| ApError::Storage(format!("Failed to sync data: {}", e)))?;
    drop(file);

    fs::rename(temp_path, path)
        .map_err(|e| ApError::Storage(format!("Failed to replace {}: {}", path.display(), e)))
}

/// Timestamp-suffixed sibling of the destination, e.g. `ap_clean_1724900000.csv`
fn fallback_path(path: &Path) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("csv");
    path.with_file_name(format!("{}_{}.{}", stem, ts, ext))
}

/// Write a serializable value as pretty JSON
pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> ApResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ApError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
    }
    let file = File::create(path)
        .map_err(|e| ApError::Storage(format!("Failed to create {}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer
        .flush()
        .map_err(|e| ApError::Storage(format!("Failed to flush {}: {}", path.display(), e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestRow {
        name: String,
        value: i32,
    }

    fn rows() -> Vec<TestRow> {
        vec![
            TestRow {
                name: "a".into(),
                value: 1,
            },
            TestRow {
                name: "b".into(),
                value: 2,
            },
        ]
    }

    #[test]
    fn test_write_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.csv");

        let written = write_csv_atomic(&path, &rows()).unwrap();
        assert_eq!(written, path);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let back: Vec<TestRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(back, rows());
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.csv");
        let temp_path = temp_dir.path().join("test.tmp");

        write_csv_atomic(&path, &rows()).unwrap();

        assert!(path.exists());
        assert!(!temp_path.exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("test.csv");

        write_csv_atomic(&path, &rows()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_locked_destination_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        // A directory at the destination makes every rename fail,
        // standing in for a file lock
        let path = temp_dir.path().join("locked.csv");
        fs::create_dir(&path).unwrap();

        let written =
            write_csv_atomic_with(&path, &rows(), 2, Duration::from_millis(10)).unwrap();

        assert_ne!(written, path);
        assert!(written.exists());
        let name = written.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("locked_"));
        assert!(name.ends_with(".csv"));

        let mut reader = csv::Reader::from_path(&written).unwrap();
        let back: Vec<TestRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(back, rows());
    }

    #[test]
    fn test_write_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");

        write_json(&path, &rows()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let back: Vec<TestRow> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, rows());
    }
}
