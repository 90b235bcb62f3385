//! Session history loading.
//!
//! Combines sessions still in the WAL with sessions already rolled up
//! into the CSV archive.

use crate::csv_rollup::CsvRow;
use crate::{Error, Result, WorkoutSession, WorkoutSet};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use uuid::Uuid;

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Other(format!("Invalid date '{}': {}", value, e)))
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Other(format!("Invalid UUID '{}': {}", value, e)))
}

/// The set recorded on a row; `None` for the placeholder row of an empty session
fn row_set(row: &CsvRow) -> Result<Option<WorkoutSet>> {
    let (Some(set_id), Some(exercise_name), Some(reps), Some(weight_lbs), Some(timestamp)) = (
        row.set_id.as_deref(),
        row.exercise_name.as_ref(),
        row.reps,
        row.weight_lbs,
        row.timestamp.as_deref(),
    ) else {
        return Ok(None);
    };

    Ok(Some(WorkoutSet {
        id: parse_uuid(set_id)?,
        exercise_name: exercise_name.clone(),
        reps,
        weight_lbs,
        timestamp: parse_time(timestamp)?,
    }))
}

/// Rebuild sessions from the CSV archive, grouping rows by session id
fn load_csv_sessions(csv_path: &Path) -> Result<Vec<WorkoutSession>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(csv_path)?;
    let mut order = Vec::new();
    let mut by_id: HashMap<Uuid, WorkoutSession> = HashMap::new();

    for (row_num, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("Failed to parse CSV row {}: {}", row_num + 1, e);
                continue;
            }
        };

        let rebuilt = parse_uuid(&row.session_id).and_then(|id| Ok((id, row_set(&row)?)));
        let (id, set) = match rebuilt {
            Ok(parts) => parts,
            Err(e) => {
                tracing::warn!("Skipping CSV row {}: {}", row_num + 1, e);
                continue;
            }
        };

        if !by_id.contains_key(&id) {
            let start_time = match parse_time(&row.session_start) {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!("Skipping CSV row {}: {}", row_num + 1, e);
                    continue;
                }
            };
            let end_time = row.session_end.as_deref().and_then(|s| parse_time(s).ok());
            by_id.insert(
                id,
                WorkoutSession {
                    id,
                    start_time,
                    end_time,
                    is_active: false,
                    sets: Vec::new(),
                },
            );
            order.push(id);
        }

        if let (Some(set), Some(session)) = (set, by_id.get_mut(&id)) {
            session.sets.push(set);
        }
    }

    Ok(order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect())
}

/// Load all finished sessions from the WAL and the CSV archive
///
/// Returns sessions sorted by start time (newest first). Sessions present
/// in both sources are only returned once, preferring the WAL copy.
pub fn load_sessions(wal_path: &Path, csv_path: &Path) -> Result<Vec<WorkoutSession>> {
    let mut sessions = Vec::new();
    let mut seen_ids = HashSet::new();

    for session in crate::wal::read_sessions(wal_path)? {
        if seen_ids.insert(session.id) {
            sessions.push(session);
        }
    }

    if csv_path.exists() {
        for session in load_csv_sessions(csv_path)? {
            if seen_ids.insert(session.id) {
                sessions.push(session);
            }
        }
    }

    sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    tracing::debug!("Loaded {} sessions from history", sessions.len());
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_rollup::wal_to_csv_and_archive;
    use crate::wal::{JsonlSink, SessionSink};
    use chrono::{Duration, TimeZone};

    fn session_at(day: u32, sets: &[(&str, i64, f64)]) -> WorkoutSession {
        let start = Utc.with_ymd_and_hms(2024, 5, day, 7, 0, 0).unwrap();
        let mut session = WorkoutSession::new(start);
        for (i, (name, reps, weight)) in sets.iter().enumerate() {
            session.add_set(WorkoutSet::new(
                *name,
                *reps,
                *weight,
                start + Duration::minutes(i as i64 * 3),
            ));
        }
        session.end_session(start + Duration::hours(1));
        session
    }

    #[test]
    fn test_load_from_wal_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&session_at(1, &[("Squat", 5, 225.0)])).unwrap();
        sink.append(&session_at(3, &[("Squat", 5, 235.0)])).unwrap();

        let sessions = load_sessions(&wal_path, &csv_path).unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions[0].start_time > sessions[1].start_time);
    }

    #[test]
    fn test_csv_roundtrip_rebuilds_sessions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let original = session_at(
            2,
            &[("Bench Press", 8, 185.0), ("Bench Press", 6, 195.0), ("Dips", 10, 45.0)],
        );
        let empty = session_at(4, &[]);

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&original).unwrap();
        sink.append(&empty).unwrap();
        wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();

        let sessions = load_sessions(&wal_path, &csv_path).unwrap();
        assert_eq!(sessions, vec![empty, original]);
    }

    #[test]
    fn test_wal_and_csv_are_deduplicated() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let session = session_at(5, &[("Deadlift", 3, 315.0)]);
        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&session).unwrap();
        wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();

        // Same session written to the WAL again, e.g. after a crash mid-rollup
        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&session).unwrap();

        let sessions = load_sessions(&wal_path, &csv_path).unwrap();
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_bad_csv_rows_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let session = session_at(6, &[("Squat", 5, 245.0)]);
        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&session).unwrap();
        wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();

        let mut contents = std::fs::read_to_string(&csv_path).unwrap();
        contents.push_str("not-a-uuid,2024-05-06T07:00:00+00:00,,,,,,\n");
        std::fs::write(&csv_path, contents).unwrap();

        let sessions = load_sessions(&wal_path, &csv_path).unwrap();
        assert_eq!(sessions, vec![session]);
    }
}
