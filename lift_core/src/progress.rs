//! Per-exercise progress statistics.
//!
//! Everything here is a pure function over a slice of sessions; exercise
//! names are matched exactly, as they were logged.

use crate::{WorkoutSession, WorkoutSet};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Summary figures for one exercise
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExerciseProgress {
    pub max_weight: f64,
    pub total_volume: f64,
    pub total_sets: usize,
}

/// Volume of one exercise within one session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionVolume {
    pub session_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub volume: f64,
}

fn sets_for<'a>(
    sessions: &'a [WorkoutSession],
    exercise: &'a str,
) -> impl Iterator<Item = &'a WorkoutSet> + 'a {
    sessions
        .iter()
        .flat_map(|s| s.sets.iter())
        .filter(move |set| set.exercise_name == exercise)
}

/// Distinct exercise names across all sessions, sorted
pub fn exercise_names(sessions: &[WorkoutSession]) -> Vec<String> {
    sessions
        .iter()
        .flat_map(|s| s.sets.iter().map(|set| set.exercise_name.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Heaviest weight, total volume and set count for an exercise
pub fn exercise_progress(sessions: &[WorkoutSession], exercise: &str) -> ExerciseProgress {
    sets_for(sessions, exercise).fold(ExerciseProgress::default(), |mut acc, set| {
        acc.max_weight = acc.max_weight.max(set.weight_lbs);
        acc.total_volume += set.volume();
        acc.total_sets += 1;
        acc
    })
}

/// Weight of every set of an exercise, oldest first
pub fn weight_history(sessions: &[WorkoutSession], exercise: &str) -> Vec<(DateTime<Utc>, f64)> {
    let mut points: Vec<_> = sets_for(sessions, exercise)
        .map(|set| (set.timestamp, set.weight_lbs))
        .collect();
    points.sort_by_key(|(at, _)| *at);
    points
}

/// Per-session volume for an exercise, oldest session first
///
/// Sessions that never touched the exercise are left out.
pub fn session_volumes(sessions: &[WorkoutSession], exercise: &str) -> Vec<SessionVolume> {
    let mut volumes: Vec<_> = sessions
        .iter()
        .filter(|s| s.sets.iter().any(|set| set.exercise_name == exercise))
        .map(|s| SessionVolume {
            session_id: s.id,
            start_time: s.start_time,
            volume: s
                .sets
                .iter()
                .filter(|set| set.exercise_name == exercise)
                .map(WorkoutSet::volume)
                .sum(),
        })
        .collect();
    volumes.sort_by_key(|v| v.start_time);
    volumes
}
