//! Reference city dictionary.
//!
//! Built once at startup from a word list (one name per line) and an optional list of
//! "priority" cities. After construction the dictionary is read-only, so it can be
//! shared behind an `Arc` by every session without locking.

use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::normalize::normalize;

/// A reference entry: normalized key plus the spelling shown to players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub key: String,
    pub display: String,
}

#[derive(Debug, Error)]
pub enum DictionaryError {
    /// The reference file could not be read. Callers degrade to an empty dictionary.
    #[error("city list unavailable at {path:?}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default, Clone)]
pub struct CityDictionary {
    cities: HashMap<String, City>,
    priority: HashSet<String>,
}

impl CityDictionary {
    /// Build from in-memory lines. Blank lines and lines without letters are skipped.
    /// Duplicate keys keep the last spelling seen.
    pub fn from_lines<I, J, S, T>(lines: I, priority_lines: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut cities = HashMap::new();
        for line in lines {
            let display = line.as_ref().trim();
            let key = normalize(display);
            if key.is_empty() {
                continue;
            }
            cities.insert(
                key.clone(),
                City {
                    key,
                    display: display.to_string(),
                },
            );
        }
        let priority = priority_lines
            .into_iter()
            .map(|l| normalize(l.as_ref()))
            .filter(|k| !k.is_empty())
            .collect();
        Self { cities, priority }
    }

    /// Load the reference list and the optional priority list from disk.
    ///
    /// A missing priority file only costs the selection bias; a missing city list is
    /// reported so the caller can start in degraded (empty) mode.
    pub fn load(cities_path: &Path, priority_path: Option<&Path>) -> Result<Self, DictionaryError> {
        let raw = std::fs::read_to_string(cities_path).map_err(|source| DictionaryError::Unavailable {
            path: cities_path.to_path_buf(),
            source,
        })?;
        let priority_raw = match priority_path {
            Some(p) => match std::fs::read_to_string(p) {
                Ok(s) => s,
                Err(e) => {
                    warn!("priority city list {:?} unreadable ({}); continuing without bias", p, e);
                    String::new()
                }
            },
            None => String::new(),
        };
        let dict = Self::from_lines(raw.lines(), priority_raw.lines());
        info!(
            "Loaded {} cities ({} priority) from {:?}",
            dict.len(),
            dict.priority.len(),
            cities_path
        );
        Ok(dict)
    }

    /// Like [`CityDictionary::load`] but never fails: an unreadable list yields an empty dictionary.
    pub fn load_or_empty(cities_path: &Path, priority_path: Option<&Path>) -> Self {
        match Self::load(cities_path, priority_path) {
            Ok(d) => d,
            Err(e) => {
                warn!("{}; starting with an empty dictionary", e);
                Self::default()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&City> {
        self.cities.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cities.contains_key(key)
    }

    pub fn is_priority(&self, key: &str) -> bool {
        self.priority.contains(key)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Number of priority keys that are also dictionary entries.
    pub fn priority_len(&self) -> usize {
        self.priority.iter().filter(|k| self.cities.contains_key(*k)).count()
    }

    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.cities.values()
    }

    /// Unused cities whose key starts with `letter`, in a stable (key) order so that a
    /// seeded random source picks reproducibly.
    pub fn unused_starting_with<'a>(&'a self, letter: char, used: &HashSet<String>) -> Vec<&'a City> {
        let mut out: Vec<&City> = self
            .cities
            .values()
            .filter(|c| c.key.starts_with(letter) && !used.contains(&c.key))
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    /// True if at least one unused city starts with `letter`.
    pub fn any_unused_starting_with(&self, letter: char, used: &HashSet<String>) -> bool {
        self.cities
            .keys()
            .any(|k| k.starts_with(letter) && !used.contains(k))
    }
}
