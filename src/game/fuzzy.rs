//! Typo-tolerant lookup of a typed city against the dictionary.
//!
//! Exact keys always win. Otherwise every dictionary key is scored against the
//! normalized input with a whole-string similarity ratio on a 0-100 scale and the
//! best candidate is accepted when it reaches the threshold.

use super::dictionary::{City, CityDictionary};
use super::normalize::normalize;

/// Threshold used when the configuration does not override it.
pub const DEFAULT_THRESHOLD: u8 = 75;

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub city: &'a City,
    pub score: u8,
    /// True when the input was not an exact key (the caller may say "did you mean ...").
    pub corrected: bool,
}

/// Whole-string similarity in 0..=100 (100 = identical).
///
/// Damerau-Levenshtein distance over chars, normalized by the longer string and
/// rounded. Swapped neighbours (`мосвка`) cost one edit, like a missed letter.
/// Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> u8 {
    let sim = strsim::normalized_damerau_levenshtein(a, b);
    (sim * 100.0).round().clamp(0.0, 100.0) as u8
}

pub struct FuzzyMatcher<'a> {
    dict: &'a CityDictionary,
}

impl<'a> FuzzyMatcher<'a> {
    pub fn new(dict: &'a CityDictionary) -> Self {
        Self { dict }
    }

    /// Resolve noisy user input to a dictionary entry, or `None` (no match).
    ///
    /// Ties between equally scored candidates resolve to an arbitrary one of them.
    pub fn resolve(&self, user_text: &str, threshold: u8) -> Option<Resolved<'a>> {
        let key = normalize(user_text);
        if key.is_empty() {
            return None;
        }
        if let Some(city) = self.dict.get(&key) {
            return Some(Resolved {
                city,
                score: 100,
                corrected: false,
            });
        }
        let (city, score) = self
            .dict
            .cities()
            .map(|c| (c, ratio(&key, &c.key)))
            .max_by_key(|(_, s)| *s)?;
        if score >= threshold {
            Some(Resolved {
                city,
                score,
                corrected: true,
            })
        } else {
            None
        }
    }
}
