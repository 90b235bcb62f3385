//! Default catalog of exercises.
//!
//! This module provides the built-in exercise list and the read-only
//! lookups used by the transcript parser and the CLI.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn build_default_catalog_internal() -> Catalog {
    use MuscleGroup::*;

    // Order matters: transcript fallback takes the first contained name.
    let entries: &[(&str, MuscleGroup)] = &[
        // Chest
        ("Bench Press", Chest),
        ("Incline Bench Press", Chest),
        ("Decline Bench Press", Chest),
        ("Dumbbell Bench Press", Chest),
        ("Dumbbell Flyes", Chest),
        ("Cable Flyes", Chest),
        ("Push-ups", Chest),
        ("Chest Press Machine", Chest),
        // Back - Lats
        ("Pull-ups", Lats),
        ("Chin-ups", Lats),
        ("Lat Pulldown", Lats),
        ("Close-Grip Pulldown", Lats),
        ("Dumbbell Pullover", Lats),
        // Back - Middle
        ("Barbell Row", MiddleBack),
        ("Dumbbell Row", MiddleBack),
        ("Cable Row", MiddleBack),
        ("T-Bar Row", MiddleBack),
        ("Chest Supported Row", MiddleBack),
        ("Face Pulls", MiddleBack),
        // Back - Lower
        ("Deadlift", LowerBack),
        ("Romanian Deadlift", LowerBack),
        ("Good Mornings", LowerBack),
        ("Back Extensions", LowerBack),
        // Shoulders
        ("Overhead Press", Shoulders),
        ("Dumbbell Shoulder Press", Shoulders),
        ("Arnold Press", Shoulders),
        ("Lateral Raises", Shoulders),
        ("Front Raises", Shoulders),
        ("Rear Delt Flyes", Shoulders),
        ("Upright Row", Shoulders),
        ("Shrugs", Shoulders),
        // Biceps
        ("Barbell Curl", Biceps),
        ("Dumbbell Curl", Biceps),
        ("Hammer Curl", Biceps),
        ("Preacher Curl", Biceps),
        ("Cable Curl", Biceps),
        ("Concentration Curl", Biceps),
        // Triceps
        ("Close-Grip Bench Press", Triceps),
        ("Dips", Triceps),
        ("Tricep Pushdown", Triceps),
        ("Overhead Tricep Extension", Triceps),
        ("Skull Crushers", Triceps),
        ("Tricep Kickbacks", Triceps),
        // Forearms
        ("Wrist Curls", Forearms),
        ("Reverse Wrist Curls", Forearms),
        ("Farmer's Walk", Forearms),
        // Legs - Quads
        ("Squat", Quads),
        ("Front Squat", Quads),
        ("Leg Press", Quads),
        ("Leg Extension", Quads),
        ("Bulgarian Split Squat", Quads),
        ("Lunges", Quads),
        // Legs - Hamstrings
        ("Leg Curl", Hamstrings),
        ("Nordic Curls", Hamstrings),
        ("Stiff-Leg Deadlift", Hamstrings),
        // Legs - Glutes
        ("Hip Thrust", Glutes),
        ("Glute Bridge", Glutes),
        ("Cable Kickbacks", Glutes),
        // Legs - Calves
        ("Calf Raise", Calves),
        ("Seated Calf Raise", Calves),
        // Abs
        ("Crunches", Abs),
        ("Planks", Abs),
        ("Leg Raises", Abs),
        ("Cable Crunches", Abs),
        ("Ab Wheel", Abs),
        ("Russian Twists", Abs),
    ];

    Catalog {
        exercises: entries
            .iter()
            .map(|(name, group)| ExerciseInfo::new(*name, *group))
            .collect(),
    }
}

impl Catalog {
    /// Find an exercise by case-insensitive name equality
    pub fn find_exercise(&self, name: &str) -> Option<&ExerciseInfo> {
        let wanted = name.to_lowercase();
        self.exercises
            .iter()
            .find(|e| e.name.to_lowercase() == wanted)
    }

    /// Search names and muscle-group labels for a case-insensitive substring
    ///
    /// An empty query returns the whole catalog in declaration order.
    pub fn search_exercises(&self, query: &str) -> Vec<&ExerciseInfo> {
        if query.is_empty() {
            return self.exercises.iter().collect();
        }

        let query = query.to_lowercase();
        self.exercises
            .iter()
            .filter(|e| {
                e.name.to_lowercase().contains(&query)
                    || e.muscle_group.label().to_lowercase().contains(&query)
            })
            .collect()
    }

    /// All exercises filed under `group`, in declaration order
    pub fn exercises_by_muscle_group(&self, group: MuscleGroup) -> Vec<&ExerciseInfo> {
        self.exercises
            .iter()
            .filter(|e| e.muscle_group == group)
            .collect()
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut seen_names = HashSet::new();

        for exercise in &self.exercises {
            if exercise.id.is_empty() {
                errors.push(format!("Exercise '{}' has empty ID", exercise.name));
            } else if !seen_ids.insert(exercise.id.as_str()) {
                errors.push(format!("Duplicate exercise ID '{}'", exercise.id));
            }

            if exercise.name.trim().is_empty() {
                errors.push(format!("Exercise '{}' has empty name", exercise.id));
            } else if !seen_names.insert(exercise.name.to_lowercase()) {
                // find_exercise could never reach the second one
                errors.push(format!("Duplicate exercise name '{}'", exercise.name));
            }
        }

        for group in MuscleGroup::ALL {
            if !self.exercises.iter().any(|e| e.muscle_group == group) {
                errors.push(format!("Catalog has no {} exercises", group));
            }
        }

        errors
    }
}
