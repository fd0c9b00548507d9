use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PREFIX: &str = "HGD";

/// Human-readable order identifier such as `HGD2025007`: prefix, four-digit year and a
/// zero-padded sequence of at least three digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderCode(String);

impl OrderCode {
    /// Normalizes customer input for lookups: surrounding whitespace removed, upper case.
    pub fn normalize(input: &str) -> Self {
        Self(input.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the next order code from the most recently created one.
///
/// There is no dedicated counter: two checkouts reading the same "last" code compute the
/// same next code. Storage enforces uniqueness and checkout regenerates on a collision.
#[derive(Debug, Clone)]
pub struct OrderCodeGenerator {
    prefix: String,
}

impl OrderCodeGenerator {
    pub fn new(prefix: &str) -> Result<Self, CodeError> {
        let prefix = prefix.trim().to_uppercase();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(CodeError::InvalidPrefix(prefix));
        }
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Code following `last` (the newest stored code, if any) in `year`.
    pub fn next_after(&self, last: Option<&str>, year: i32) -> OrderCode {
        let sequence = last.and_then(parse_sequence).map_or(1, |n| n + 1);
        OrderCode(format!("{}{:04}{:03}", self.prefix, year, sequence))
    }
}

impl Default for OrderCodeGenerator {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

/// Sequence part of a stored code: whatever follows the letter prefix and the four year
/// digits. Anything that is not all digits yields `None`.
fn parse_sequence(code: &str) -> Option<u64> {
    let rest = code.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let year = rest.get(..4)?;
    if !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let digits = &rest[4..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    #[error("Order code prefix must be ASCII letters, got {0:?}")]
    InvalidPrefix(String),
}
