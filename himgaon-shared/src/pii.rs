use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps customer contact data so it never reaches log output in clear text.
///
/// `Debug` and `Display` both print a fixed mask; serialization still emits the real value
/// because API responses (order tracking, admin order detail) need it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl From<String> for Masked<String> {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Keeps the last `visible` characters of a phone number, e.g. `******3210`.
/// Used where an operator needs to tell orders apart in logs without the full number.
pub fn mask_tail(value: &str, visible: usize) -> String {
    let count = value.chars().count();
    if count <= visible {
        return "*".repeat(count);
    }
    let tail: String = value.chars().skip(count - visible).collect();
    format!("{}{}", "*".repeat(count - visible), tail)
}
