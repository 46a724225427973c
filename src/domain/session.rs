//! Academic session labels and the sequencer that walks a session range.
//!
//! A label looks like `Odd-(2022-23)`: a parity followed by the academic year
//! span with a two-digit end year. Sessions step
//! `Odd(Y) -> Even(Y) -> Odd(Y+1) -> ...`.

use crate::utils::error::{ExtractError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Upper bound on the number of sessions a single range may expand to.
pub const MAX_SESSIONS: usize = 100;

static SESSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Odd|Even)-\((\d{4})-(\d{2})\)$").expect("valid session pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parity {
    Odd,
    Even,
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parity::Odd => f.write_str("Odd"),
            Parity::Even => f.write_str("Even"),
        }
    }
}

/// Field order matters: the derived `Ord` sorts by year, then parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionLabel {
    start_year: u16,
    parity: Parity,
    end_year: u8,
}

impl SessionLabel {
    pub fn new(parity: Parity, start_year: u16) -> Self {
        Self {
            start_year,
            parity,
            end_year: ((start_year + 1) % 100) as u8,
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        let format_error = || ExtractError::SessionFormatError {
            value: value.to_string(),
        };

        let caps = SESSION_PATTERN.captures(value).ok_or_else(format_error)?;
        let parity = match &caps[1] {
            "Odd" => Parity::Odd,
            _ => Parity::Even,
        };
        let start_year: u16 = caps[2].parse().map_err(|_| format_error())?;
        let end_year: u8 = caps[3].parse().map_err(|_| format_error())?;

        let label = Self::new(parity, start_year);
        if label.end_year != end_year {
            return Err(format_error());
        }
        Ok(label)
    }

    pub fn parity(&self) -> Parity {
        self.parity
    }

    pub fn start_year(&self) -> u16 {
        self.start_year
    }

    /// Two-digit end year, e.g. `23` for `Odd-(2022-23)`.
    pub fn end_year(&self) -> u8 {
        self.end_year
    }

    pub fn successor(&self) -> Self {
        match self.parity {
            Parity::Odd => Self {
                parity: Parity::Even,
                ..*self
            },
            Parity::Even => Self {
                start_year: self.start_year + 1,
                parity: Parity::Odd,
                end_year: (self.end_year + 1) % 100,
            },
        }
    }
}

impl fmt::Display for SessionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-({}-{:02})", self.parity, self.start_year, self.end_year)
    }
}

impl FromStr for SessionLabel {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Expands `start..=end` into the ordered list of sessions between them.
///
/// Both labels are parsed before stepping, so a malformed `end` fails fast.
/// An `end` that stepping never reaches (e.g. earlier than `start`) is caught
/// by the [`MAX_SESSIONS`] guard.
pub fn generate_sessions(start: &str, end: &str) -> Result<Vec<SessionLabel>> {
    let start = SessionLabel::parse(start)?;
    let end = SessionLabel::parse(end)?;

    let mut sessions = vec![start];
    let mut current = start;

    while current != end {
        current = current.successor();
        sessions.push(current);

        if sessions.len() > MAX_SESSIONS {
            tracing::error!(
                "Session range {} -> {} produces more than {} sessions",
                start,
                end,
                MAX_SESSIONS
            );
            return Err(ExtractError::RangeTooLargeError {
                subject: format!("Session range {} -> {}", start, end),
                limit: MAX_SESSIONS as u64,
            });
        }
    }

    Ok(sessions)
}
