//! Write-Ahead Log (WAL) for finished workout sessions.
//!
//! Sessions are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access.

use crate::{Result, WorkoutSession};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Session sink trait for persisting finished sessions
pub trait SessionSink {
    fn append(&mut self, session: &WorkoutSession) -> Result<()>;
}

/// JSONL-based session sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SessionSink for JsonlSink {
    fn append(&mut self, session: &WorkoutSession) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(session)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.sync_data()?;
        file.unlock()?;

        tracing::debug!(
            "Appended session {} ({} sets) to WAL",
            session.id,
            session.total_sets()
        );
        Ok(())
    }
}

/// Read all sessions from a WAL file
///
/// Lines that fail to parse are skipped with a warning.
pub fn read_sessions(path: &Path) -> Result<Vec<WorkoutSession>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut sessions = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutSession>(&line) {
            Ok(session) => sessions.push(session),
            Err(e) => {
                tracing::warn!("Failed to parse session at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} sessions from WAL", sessions.len());
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorkoutSet;
    use chrono::Utc;

    fn create_test_session() -> WorkoutSession {
        let mut session = WorkoutSession::new(Utc::now());
        session.add_set(WorkoutSet::new("Bench Press", 8, 185.0, Utc::now()));
        session.add_set(WorkoutSet::new("Bench Press", 6, 195.0, Utc::now()));
        session.end_session(Utc::now());
        session
    }

    #[test]
    fn test_append_and_read_single_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let session = create_test_session();

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&session).unwrap();

        let sessions = read_sessions(&wal_path).unwrap();
        assert_eq!(sessions, vec![session]);
    }

    #[test]
    fn test_append_multiple_sessions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("nested").join("test.wal");

        let mut sink = JsonlSink::new(&wal_path);
        for _ in 0..5 {
            sink.append(&create_test_session()).unwrap();
        }

        let sessions = read_sessions(&wal_path).unwrap();
        assert_eq!(sessions.len(), 5);
    }

    #[test]
    fn test_read_empty_wal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("nonexistent.wal");

        let sessions = read_sessions(&wal_path).unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_corrupt_line_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&create_test_session()).unwrap();

        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        writeln!(file, "{{\"id\": \"truncated").unwrap();
        drop(file);

        sink.append(&create_test_session()).unwrap();

        let sessions = read_sessions(&wal_path).unwrap();
        assert_eq!(sessions.len(), 2);
    }
}
