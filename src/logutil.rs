//! Helpers for putting chat text into log lines.
//!
//! Commands and replies are user-controlled and often multi-line (bundle status replies list
//! one item per line), so anything logged goes through [`escape_log`] first.

use std::fmt::Write;

/// Longest preview of user text written to the log, in characters.
pub const MAX_LOG_PREVIEW: usize = 160;

/// Escape a string for single-line logging. Newlines, carriage returns, tabs and
/// backslashes become their escape sequences, other control characters become `\xNN`,
/// and anything past [`MAX_LOG_PREVIEW`] characters is cut with an ellipsis.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_LOG_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_LOG_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// First line of a rendered reply, escaped; enough to identify it in a debug log.
pub fn reply_preview(reply: &str) -> String {
    let first = reply.lines().next().unwrap_or("");
    let mut preview = escape_log(first);
    if reply.lines().nth(1).is_some() && !preview.ends_with('…') {
        preview.push_str(" …");
    }
    preview
}
