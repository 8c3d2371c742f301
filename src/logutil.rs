//! Log previews of chat input.
//!
//! Game log lines quote what a player typed (`input='...'`). A city name fits in a
//! few dozen characters, so anything longer is a paste or spam and only its head is
//! worth keeping. Previews are always a single line.

/// Longest preview written to the log, in chars. The longest bundled city name
/// is well under this.
pub const MAX_PREVIEW: usize = 48;

/// One-line preview of player input for the log.
///
/// Whitespace runs (newlines included) collapse to one space and the ends are
/// trimmed. Quotes and backslashes are escaped so the preview cannot close the
/// surrounding `'...'`. Other control characters become `\xNN`. Past
/// [`MAX_PREVIEW`] chars the rest is replaced by `…(+N)`, N being the number of
/// chars dropped. Empty input is shown as `<empty>`.
pub fn escape_log(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    let mut out = String::with_capacity(trimmed.len().min(MAX_PREVIEW * 4) + 8);
    let mut kept = 0usize;
    let mut chars = trimmed.chars().peekable();
    while let Some(ch) = chars.next() {
        if kept >= MAX_PREVIEW {
            let dropped = 1 + chars.count();
            out.push_str(&format!("…(+{})", dropped));
            break;
        }
        kept += 1;
        match ch {
            c if c.is_whitespace() => {
                while chars.peek().map_or(false, |n| n.is_whitespace()) {
                    chars.next();
                }
                out.push(' ');
            }
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
