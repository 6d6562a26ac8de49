//! Argument validation for user-issued commands.
//!
//! Every failure here is an invalid-argument error: it is rendered back to the user as a
//! plain message and never escalates.

use std::fmt;

/// Maximum accepted length of a single command line, in bytes.
pub const MAX_COMMAND_BYTES: usize = 512;

/// Number of days in every in-game season.
pub const DAYS_PER_SEASON: u8 = 28;

/// Invalid user input, with the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("Season must be Spring, Summer, Fall, or Winter.")]
    UnknownSeason(String),

    #[error("Day must be a number between 1 and 28.")]
    DayNotNumeric(String),

    #[error("Not a valid date.")]
    DayOutOfRange(i64),

    #[error("For now, only `{prefix}bundle reset all` is supported.")]
    UnsupportedResetScope { prefix: char, scope: String },

    #[error("Command is too long (max {max} bytes)")]
    TooLong { max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a season name in any letter case. `Autumn` is accepted for `Fall`.
pub fn parse_season(raw: &str) -> Result<Season, ArgumentError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "spring" => Ok(Season::Spring),
        "summer" => Ok(Season::Summer),
        "fall" | "autumn" => Ok(Season::Fall),
        "winter" => Ok(Season::Winter),
        _ => Err(ArgumentError::UnknownSeason(raw.to_string())),
    }
}

/// Parse a day of the season (1..=28).
pub fn parse_day(raw: &str) -> Result<u8, ArgumentError> {
    let n: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ArgumentError::DayNotNumeric(raw.to_string()))?;
    if n < 1 || n > DAYS_PER_SEASON as i64 {
        return Err(ArgumentError::DayOutOfRange(n));
    }
    Ok(n as u8)
}

/// Drop control characters and reject oversized input before parsing.
pub fn sanitize_command(raw: &str) -> Result<String, ArgumentError> {
    if raw.len() > MAX_COMMAND_BYTES {
        return Err(ArgumentError::TooLong {
            max: MAX_COMMAND_BYTES,
        });
    }
    Ok(raw
        .chars()
        .map(|c| if c == '\t' { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect())
}

/// Capitalize the first letter and lowercase the rest (`"LEAH"` -> `"Leah"`).
pub fn capitalize(s: &str) -> String {
    let mut chars = s.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Title-case every whitespace separated word (`"big barn"` -> `"Big Barn"`).
pub fn title_case(s: &str) -> String {
    s.split_whitespace().map(capitalize).collect::<Vec<_>>().join(" ")
}
