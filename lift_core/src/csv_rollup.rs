//! CSV rollup functionality for archiving WAL sessions.
//!
//! Each finished session is flattened into one CSV row per set. A session
//! without sets still gets a single row with the set columns left empty, so
//! it survives the rollup.

use crate::{Result, WorkoutSession, WorkoutSet};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV archive
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct CsvRow {
    pub session_id: String,
    pub session_start: String,
    pub session_end: Option<String>,
    pub set_id: Option<String>,
    pub exercise_name: Option<String>,
    pub reps: Option<i64>,
    pub weight_lbs: Option<f64>,
    pub timestamp: Option<String>,
}

impl CsvRow {
    fn for_session(session: &WorkoutSession, set: Option<&WorkoutSet>) -> Self {
        CsvRow {
            session_id: session.id.to_string(),
            session_start: session.start_time.to_rfc3339(),
            session_end: session.end_time.map(|t| t.to_rfc3339()),
            set_id: set.map(|s| s.id.to_string()),
            exercise_name: set.map(|s| s.exercise_name.clone()),
            reps: set.map(|s| s.reps),
            weight_lbs: set.map(|s| s.weight_lbs),
            timestamp: set.map(|s| s.timestamp.to_rfc3339()),
        }
    }

    /// Flatten a session into its rows
    pub(crate) fn from_session(session: &WorkoutSession) -> Vec<Self> {
        if session.sets.is_empty() {
            return vec![Self::for_session(session, None)];
        }
        session
            .sets
            .iter()
            .map(|set| Self::for_session(session, Some(set)))
            .collect()
    }
}

/// Roll up WAL sessions into CSV and archive the WAL atomically
///
/// This function:
/// 1. Reads all sessions from the WAL
/// 2. Appends their sets to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the WAL to .processed
/// 5. Returns the number of sessions processed
///
/// # Safety
/// - CSV is fsynced before WAL is renamed
/// - WAL is renamed (not deleted) to allow manual recovery if needed
pub fn wal_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    let sessions = crate::wal::read_sessions(wal_path)?;

    if sessions.is_empty() {
        tracing::info!("No sessions in WAL to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    let mut rows = 0;
    for session in &sessions {
        for row in CsvRow::from_session(session) {
            writer.serialize(row)?;
            rows += 1;
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} sessions ({} rows) to CSV", sessions.len(), rows);

    let processed_path = wal_path.with_extension("wal.processed");
    std::fs::rename(wal_path, &processed_path)?;

    tracing::info!("Archived WAL to {:?}", processed_path);

    Ok(sessions.len())
}

/// Clean up old processed WAL files
///
/// This removes all .wal.processed files in the given directory.
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed WAL: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed WAL files", count);
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::{JsonlSink, SessionSink};
    use chrono::Utc;
    use std::fs::File;

    fn create_test_session(sets: usize) -> WorkoutSession {
        let mut session = WorkoutSession::new(Utc::now());
        for i in 0..sets {
            session.add_set(WorkoutSet::new("Squat", 5, 200.0 + i as f64 * 10.0, Utc::now()));
        }
        session.end_session(Utc::now());
        session
    }

    #[test]
    fn test_wal_to_csv_creates_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&wal_path);
        for _ in 0..3 {
            sink.append(&create_test_session(2)).unwrap();
        }

        let count = wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();
        assert_eq!(count, 3);

        assert!(csv_path.exists());
        assert!(!wal_path.exists());
        assert!(wal_path.with_extension("wal.processed").exists());

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 6);
    }

    #[test]
    fn test_wal_to_csv_appends() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&create_test_session(1)).unwrap();
        assert_eq!(wal_to_csv_and_archive(&wal_path, &csv_path).unwrap(), 1);

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&create_test_session(1)).unwrap();
        assert_eq!(wal_to_csv_and_archive(&wal_path, &csv_path).unwrap(), 1);

        // Headers written once, both rows present
        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 2);
    }

    #[test]
    fn test_empty_session_keeps_a_row() {
        let session = create_test_session(0);
        let rows = CsvRow::from_session(&session);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].session_id, session.id.to_string());
        assert!(rows[0].set_id.is_none());
        assert!(rows[0].exercise_name.is_none());
    }

    #[test]
    fn test_empty_wal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("empty.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        File::create(&wal_path).unwrap();

        let count = wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();
        assert_eq!(count, 0);
        assert!(!csv_path.exists());
    }

    #[test]
    fn test_cleanup_processed_wals() {
        let temp_dir = tempfile::tempdir().unwrap();

        File::create(temp_dir.path().join("s1.wal.processed")).unwrap();
        File::create(temp_dir.path().join("s2.wal.processed")).unwrap();
        File::create(temp_dir.path().join("keep.wal")).unwrap();

        let count = cleanup_processed_wals(temp_dir.path()).unwrap();
        assert_eq!(count, 2);

        assert!(!temp_dir.path().join("s1.wal.processed").exists());
        assert!(!temp_dir.path().join("s2.wal.processed").exists());
        assert!(temp_dir.path().join("keep.wal").exists());
    }
}
