//! Tracker state persistence with file locking.
//!
//! The state file holds the currently active workout session, if any.
//! Finished sessions leave the state file and go to the WAL.
//!
//! Writers serialise on an exclusive lock over a sidecar `<state>.lock`
//! file. The state file itself is replaced by rename on every save, so a
//! lock held on it would not survive the write.

use crate::{Error, Result, TrackerState, WorkoutSession, WorkoutSet};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Exclusive writer lock for a state file, released on drop
struct StateLock {
    file: File,
}

impl StateLock {
    fn acquire(state_path: &Path) -> Result<Self> {
        let lock_path = lock_path(state_path);
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)?;
        file.lock_exclusive()?;
        tracing::trace!("Acquired state lock {:?}", lock_path);
        Ok(Self { file })
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn lock_path(state_path: &Path) -> PathBuf {
    let mut name = state_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "state".into());
    name.push(".lock");
    state_path.with_file_name(name)
}

impl TrackerState {
    /// Load tracker state from a file with shared locking
    ///
    /// Returns default state if file doesn't exist.
    /// If file is corrupted, logs a warning and returns default state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No state file found, using default state");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open state file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock state file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read state file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<TrackerState>(&contents) {
            Ok(state) => {
                tracing::debug!("Loaded tracker state from {:?}", path);
                Ok(state)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse state file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save tracker state to a file with exclusive locking
    ///
    /// Atomically writes state by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::State(format!("State path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved tracker state to {:?}", path);
        Ok(())
    }

    /// Load state, modify it, and save it back atomically
    ///
    /// The writer lock is held from load to save, so concurrent updates from
    /// other processes apply one after another. If `f` fails nothing is saved.
    pub fn update<F, T>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut TrackerState) -> Result<T>,
    {
        let _lock = StateLock::acquire(path)?;
        let mut state = Self::load(path)?;
        let out = f(&mut state)?;
        state.save(path)?;
        Ok(out)
    }

    /// Begin a new session; fails if one is already running
    pub fn start_session(&mut self, now: DateTime<Utc>) -> Result<&WorkoutSession> {
        if let Some(active) = &self.active_session {
            return Err(Error::State(format!(
                "Session {} is already active (started {})",
                active.id,
                active.start_time.to_rfc3339()
            )));
        }

        let session = WorkoutSession::new(now);
        tracing::info!("Started session {}", session.id);
        Ok(&*self.active_session.insert(session))
    }

    /// Add a set to the active session, starting one if needed
    pub fn log_set(&mut self, set: WorkoutSet, now: DateTime<Utc>) -> &WorkoutSession {
        let session = self.active_session.get_or_insert_with(|| {
            tracing::info!("No active session, starting one");
            WorkoutSession::new(now)
        });
        tracing::debug!(
            exercise = %set.exercise_name,
            weight = set.weight_lbs,
            reps = set.reps,
            "Logged set to session {}",
            session.id
        );
        session.add_set(set);
        session
    }

    /// End and detach the active session, if any
    pub fn finish_session(&mut self, now: DateTime<Utc>) -> Option<WorkoutSession> {
        let mut session = self.active_session.take()?;
        session.end_session(now);
        tracing::info!(
            "Finished session {} with {} sets",
            session.id,
            session.total_sets()
        );
        Some(session)
    }
}
