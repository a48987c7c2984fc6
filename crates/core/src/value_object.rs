//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Maximum length of a group or child name, in characters.
pub const NAME_MAX_CHARS: usize = 100;

/// A display name that has been trimmed and checked to hold
/// between 1 and [`NAME_MAX_CHARS`] characters.
///
/// Length is counted in Unicode scalar values, so a name written in Japanese
/// gets the same budget as one written in ASCII.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BoundedName(String);

impl BoundedName {
    /// Validate `raw` for the named input `field`.
    pub fn parse(field: &str, raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation(
                field,
                format!("{field} must not be empty"),
            ));
        }
        if trimmed.chars().count() > NAME_MAX_CHARS {
            return Err(DomainError::validation(
                field,
                format!("{field} must be at most {NAME_MAX_CHARS} characters"),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValueObject for BoundedName {}

impl core::fmt::Display for BoundedName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BoundedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BoundedName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse("name", &value)
    }
}

impl From<BoundedName> for String {
    fn from(value: BoundedName) -> Self {
        value.0
    }
}
