//! Canonical comparison keys for city names.
//!
//! A key is the lowercase form of the input with every character that is not a
//! Latin (`a`-`z`) or Cyrillic (`а`-`я`, `ё`) letter removed. Keys are the identity
//! used by the dictionary, the used-city set and the letter rules.

/// Returns true for the letters that survive normalization (after lowercasing).
pub fn is_key_letter(c: char) -> bool {
    c.is_ascii_lowercase() || ('а'..='я').contains(&c) || c == 'ё'
}

/// Normalize raw text into a comparison key.
///
/// Idempotent; an input with no letters yields an empty key, which callers must
/// reject before any dictionary lookup.
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| is_key_letter(*c))
        .collect()
}
