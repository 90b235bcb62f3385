//! Core domain types for liftlog.
//!
//! This module defines the fundamental types used throughout the system:
//! - Muscle groups and catalog exercises
//! - Set candidates produced by the transcript parser
//! - Logged sets and workout sessions
//! - The on-disk tracker state

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Catalog Types
// ============================================================================

/// Muscle group an exercise is filed under
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MuscleGroup {
    #[serde(rename = "Chest")]
    Chest,
    #[serde(rename = "Lower Back")]
    LowerBack,
    #[serde(rename = "Middle Back")]
    MiddleBack,
    #[serde(rename = "Lats")]
    Lats,
    #[serde(rename = "Shoulders")]
    Shoulders,
    #[serde(rename = "Biceps")]
    Biceps,
    #[serde(rename = "Triceps")]
    Triceps,
    #[serde(rename = "Forearms")]
    Forearms,
    #[serde(rename = "Abs")]
    Abs,
    #[serde(rename = "Quads")]
    Quads,
    #[serde(rename = "Hamstrings")]
    Hamstrings,
    #[serde(rename = "Glutes")]
    Glutes,
    #[serde(rename = "Calves")]
    Calves,
}

impl MuscleGroup {
    /// Every group, in declaration order
    pub const ALL: [MuscleGroup; 13] = [
        MuscleGroup::Chest,
        MuscleGroup::LowerBack,
        MuscleGroup::MiddleBack,
        MuscleGroup::Lats,
        MuscleGroup::Shoulders,
        MuscleGroup::Biceps,
        MuscleGroup::Triceps,
        MuscleGroup::Forearms,
        MuscleGroup::Abs,
        MuscleGroup::Quads,
        MuscleGroup::Hamstrings,
        MuscleGroup::Glutes,
        MuscleGroup::Calves,
    ];

    /// Human readable label ("Lower Back")
    pub fn label(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "Chest",
            MuscleGroup::LowerBack => "Lower Back",
            MuscleGroup::MiddleBack => "Middle Back",
            MuscleGroup::Lats => "Lats",
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Biceps => "Biceps",
            MuscleGroup::Triceps => "Triceps",
            MuscleGroup::Forearms => "Forearms",
            MuscleGroup::Abs => "Abs",
            MuscleGroup::Quads => "Quads",
            MuscleGroup::Hamstrings => "Hamstrings",
            MuscleGroup::Glutes => "Glutes",
            MuscleGroup::Calves => "Calves",
        }
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MuscleGroup {
    type Err = crate::Error;

    /// Accepts the label in any case, or its snake_case form (`lower_back`)
    fn from_str(s: &str) -> crate::Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', " ");
        MuscleGroup::ALL
            .iter()
            .copied()
            .find(|group| group.label().to_lowercase() == wanted)
            .ok_or_else(|| crate::Error::Other(format!("Unknown muscle group: {}", s)))
    }
}

/// A known exercise (e.g., "Bench Press" filed under Chest)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ExerciseInfo {
    pub id: String,
    pub name: String,
    pub muscle_group: MuscleGroup,
}

impl ExerciseInfo {
    /// Create an exercise whose id is its name
    pub fn new(name: impl Into<String>, muscle_group: MuscleGroup) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            muscle_group,
        }
    }
}

/// Ordered list of known exercises
///
/// Declaration order is significant: lookups and transcript fallback both
/// return the first match.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub exercises: Vec<ExerciseInfo>,
}

// ============================================================================
// Parser Output
// ============================================================================

/// A tentative set extracted from a transcript, pending validation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParsedSetCandidate {
    pub exercise_name: String,
    pub weight: f64,
    pub reps: i64,
}

// ============================================================================
// Session Types
// ============================================================================

/// A single logged set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSet {
    pub id: Uuid,
    pub exercise_name: String,
    pub reps: i64,
    pub weight_lbs: f64,
    pub timestamp: DateTime<Utc>,
}

impl WorkoutSet {
    pub fn new(
        exercise_name: impl Into<String>,
        reps: i64,
        weight_lbs: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            exercise_name: exercise_name.into(),
            reps,
            weight_lbs,
            timestamp,
        }
    }

    /// Weight moved in this set (weight × reps)
    pub fn volume(&self) -> f64 {
        self.weight_lbs * self.reps as f64
    }
}

impl From<(&ParsedSetCandidate, DateTime<Utc>)> for WorkoutSet {
    fn from((candidate, timestamp): (&ParsedSetCandidate, DateTime<Utc>)) -> Self {
        WorkoutSet::new(
            candidate.exercise_name.clone(),
            candidate.reps,
            candidate.weight,
            timestamp,
        )
    }
}

/// A workout session owning its sets
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub sets: Vec<WorkoutSet>,
}

impl WorkoutSession {
    /// Start a new, active session
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time,
            end_time: None,
            is_active: true,
            sets: Vec::new(),
        }
    }

    pub fn add_set(&mut self, set: WorkoutSet) {
        self.sets.push(set);
    }

    /// Mark the session finished at `at`
    pub fn end_session(&mut self, at: DateTime<Utc>) {
        self.end_time = Some(at);
        self.is_active = false;
    }

    /// Elapsed time, measured to `now` while the session is still open
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        self.end_time.unwrap_or(now) - self.start_time
    }

    pub fn total_sets(&self) -> usize {
        self.sets.len()
    }

    /// Number of distinct exercises performed
    pub fn exercise_count(&self) -> usize {
        self.sets
            .iter()
            .map(|s| s.exercise_name.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Distinct exercise names in the order they were first performed
    pub fn exercise_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.sets
            .iter()
            .map(|s| s.exercise_name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

/// Persistent tracker state between CLI invocations
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TrackerState {
    pub active_session: Option<WorkoutSession>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 18, minute, 0).unwrap()
    }

    #[test]
    fn test_muscle_group_from_str() {
        assert_eq!("chest".parse::<MuscleGroup>().unwrap(), MuscleGroup::Chest);
        assert_eq!(
            "Lower Back".parse::<MuscleGroup>().unwrap(),
            MuscleGroup::LowerBack
        );
        assert_eq!(
            "middle_back".parse::<MuscleGroup>().unwrap(),
            MuscleGroup::MiddleBack
        );
        assert!("neck".parse::<MuscleGroup>().is_err());
    }

    #[test]
    fn test_muscle_group_serializes_as_label() {
        let json = serde_json::to_string(&MuscleGroup::LowerBack).unwrap();
        assert_eq!(json, "\"Lower Back\"");
    }

    #[test]
    fn test_exercise_info_id_defaults_to_name() {
        let info = ExerciseInfo::new("Squat", MuscleGroup::Quads);
        assert_eq!(info.id, "Squat");
        assert_eq!(info.name, "Squat");
    }

    #[test]
    fn test_session_lifecycle() {
        let mut session = WorkoutSession::new(at(0));
        assert!(session.is_active);

        session.add_set(WorkoutSet::new("Squat", 5, 225.0, at(5)));
        session.add_set(WorkoutSet::new("Squat", 5, 235.0, at(10)));
        session.add_set(WorkoutSet::new("Bench Press", 8, 185.0, at(20)));

        assert_eq!(session.total_sets(), 3);
        assert_eq!(session.exercise_count(), 2);
        assert_eq!(session.exercise_names(), vec!["Squat", "Bench Press"]);
        assert_eq!(session.duration(at(30)), Duration::minutes(30));

        session.end_session(at(45));
        assert!(!session.is_active);
        assert_eq!(session.duration(at(59)), Duration::minutes(45));
    }

    #[test]
    fn test_set_volume() {
        let set = WorkoutSet::new("Deadlift", 3, 315.0, at(0));
        assert_eq!(set.volume(), 945.0);
    }
}
