//! Course name normalization for fuzzy comparison.
//!
//! # Responsibility
//! - Reduce venue names to a lowercase, punctuation-free, suffix-stripped
//!   form so spelling noise does not defeat duplicate detection.
//!
//! # Invariants
//! - `normalize_name` is pure and idempotent.
//! - Normalization reduces variation but does not eliminate it; callers
//!   compensate with containment checks ("pebble beach" vs
//!   "pebble beach links").

use once_cell::sync::Lazy;
use regex::Regex;

// Near-universal golf-venue suffixes that add noise to comparison.
static VENUE_NOISE_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(golf|course|country|club|cc|gc)\b").expect("static pattern"));

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("static pattern"));

/// Canonicalizes a course name for comparison.
///
/// Lowercases, strips punctuation, drops whole-word venue suffixes
/// (`golf`, `course`, `country`, `club`, `cc`, `gc`) and collapses
/// whitespace. May return an empty string when the input is all noise.
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let depunctuated = PUNCTUATION.replace_all(&lowered, "");
    let destopped = VENUE_NOISE_WORDS.replace_all(&depunctuated, " ");

    destopped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compares two raw names after normalization.
///
/// Names match when equal or when one contains the other. Empty normalized
/// names never match, so all-noise inputs cannot collide universally.
pub fn names_match(a: &str, b: &str) -> bool {
    let left = normalize_name(a);
    let right = normalize_name(b);

    if left.is_empty() || right.is_empty() {
        return false;
    }

    left == right || left.contains(&right) || right.contains(&left)
}
