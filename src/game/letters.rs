//! Letter rules: which letter the next city has to start with.
//!
//! Some letters never start a city in this variant of the game: the soft and hard
//! signs, `ы` and `й`. They are skipped when looking for the last playable letter.

use super::normalize::normalize;

/// Letters that cannot start the following move.
pub const NON_TERMINAL: [char; 4] = ['ь', 'ъ', 'ы', 'й'];

pub fn is_non_terminal(c: char) -> bool {
    NON_TERMINAL.contains(&c)
}

/// Index (in chars of the normalized name) of the last playable letter.
fn last_playable_index(chars: &[char]) -> Option<usize> {
    chars.iter().rposition(|c| !is_non_terminal(*c))
}

/// The letter the next city must start with.
///
/// Scans the normalized name from the end and returns the first letter that is not
/// non-terminal. A name made only of non-terminal letters falls back to its final
/// letter. Returns `None` only when the name has no letters at all.
pub fn last_playable_letter(name: &str) -> Option<char> {
    let chars: Vec<char> = normalize(name).chars().collect();
    match last_playable_index(&chars) {
        Some(idx) => Some(chars[idx]),
        None => chars.last().copied(),
    }
}

/// The playable letter immediately before the last playable one, used by the rescue rule.
pub fn penultimate_playable_letter(name: &str) -> Option<char> {
    let chars: Vec<char> = normalize(name).chars().collect();
    let last = last_playable_index(&chars)?;
    chars[..last]
        .iter()
        .rev()
        .find(|c| !is_non_terminal(**c))
        .copied()
}
