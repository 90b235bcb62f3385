//! Voice transcript parser.
//!
//! Turns one spoken utterance such as "Bench press, 185 pounds, 8 reps" into
//! a [`ParsedSetCandidate`]. The heuristics are deliberately simple:
//!
//! 1. The first two numbers are weight and reps, in that order.
//! 2. Whatever precedes the first number is the exercise name.
//! 3. With no leading text, the first catalog exercise mentioned anywhere
//!    in the transcript is used instead.
//!
//! Parsing does not check magnitudes; see [`ParsedSetCandidate::validate`].

use crate::catalog::get_default_catalog;
use crate::{Catalog, ParsedSetCandidate};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").ok());

/// Words that mark a number as a weight
const WEIGHT_UNITS: [&str; 3] = ["pound", "lbs", "lb"];

/// Reasons a transcript did not yield a usable set
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ParseFailure {
    /// Fewer than two numbers were spoken
    #[error("expected a weight and a rep count, found {found} number(s)")]
    NoNumericData { found: usize },

    /// No leading text and no catalog exercise mentioned
    #[error("no exercise name found")]
    NoExerciseName,

    /// Weight or reps is not strictly positive
    #[error("weight and reps must be positive (got {weight} x {reps})")]
    InvalidMagnitude { weight: f64, reps: i64 },
}

/// A number found in the transcript and its byte offset
#[derive(Clone, Copy, Debug, PartialEq)]
struct NumberToken {
    value: f64,
    start: usize,
}

/// Parse a transcript against the default catalog
///
/// Returns `None` on any failure; use [`parse_transcript`] to learn why.
pub fn parse_set_data(text: &str) -> Option<ParsedSetCandidate> {
    parse_transcript(text, get_default_catalog()).ok()
}

/// Parse a transcript into a set candidate
pub fn parse_transcript(
    text: &str,
    catalog: &Catalog,
) -> Result<ParsedSetCandidate, ParseFailure> {
    let lowercased = text.to_lowercase();

    let numbers = extract_numbers(&lowercased);
    if numbers.len() < 2 {
        tracing::debug!(found = numbers.len(), "transcript has too few numbers");
        return Err(ParseFailure::NoNumericData {
            found: numbers.len(),
        });
    }

    // The unit word is detected but not used to pick the weight: the first
    // number is always the weight.
    let unit = WEIGHT_UNITS.iter().find(|u| lowercased.contains(*u));
    let weight = numbers[0].value;
    let reps = numbers[1].value.trunc() as i64;
    tracing::debug!(weight, reps, unit = ?unit, "assigned weight and reps");

    let exercise_name = match leading_name(&lowercased, numbers[0].start) {
        Some(name) => name,
        None => catalog_fallback(&lowercased, catalog).ok_or(ParseFailure::NoExerciseName)?,
    };

    Ok(ParsedSetCandidate {
        exercise_name,
        weight,
        reps,
    })
}

impl ParsedSetCandidate {
    /// Check that weight and reps are strictly positive
    ///
    /// The parser accepts "0 pounds" or "0 reps"; anything that persists a
    /// candidate should call this first.
    pub fn validate(&self) -> Result<(), ParseFailure> {
        if self.weight > 0.0 && self.reps > 0 {
            Ok(())
        } else {
            Err(ParseFailure::InvalidMagnitude {
                weight: self.weight,
                reps: self.reps,
            })
        }
    }
}

fn extract_numbers(text: &str) -> Vec<NumberToken> {
    let Some(pattern) = NUMBER_PATTERN.as_ref() else {
        return Vec::new();
    };

    pattern
        .find_iter(text)
        .filter_map(|m| {
            m.as_str()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(|value| NumberToken {
                    value,
                    start: m.start(),
                })
        })
        .collect()
}

/// Text before the first number, cleaned and title-cased
fn leading_name(text: &str, first_number_at: usize) -> Option<String> {
    let before = text[..first_number_at].trim();
    let before = before.strip_suffix(',').unwrap_or(before).trim();

    if before.is_empty() {
        None
    } else {
        Some(title_case(before))
    }
}

/// First catalog exercise (in declaration order) named anywhere in `text`
fn catalog_fallback(text: &str, catalog: &Catalog) -> Option<String> {
    let found = catalog
        .exercises
        .iter()
        .find(|e| text.contains(&e.name.to_lowercase()))?;
    tracing::debug!(exercise = %found.name, "resolved exercise from catalog");
    Some(found.name.clone())
}

/// Upper-case the first letter of each whitespace-delimited word
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;

    for c in text.chars() {
        if c.is_whitespace() {
            word_start = true;
            out.push(c);
        } else if word_start {
            word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}
