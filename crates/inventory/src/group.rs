use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use kidstock_core::{BoundedName, GroupId};

use crate::child::Child;

/// Number of random bytes behind a share token (256 bits of entropy).
pub const SHARE_TOKEN_BYTES: usize = 32;

/// Opaque, unguessable token identifying a group in shared links.
///
/// Hex-encoded, so it is URL-safe without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareToken(String);

impl ShareToken {
    /// Draw a fresh token from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let bytes: [u8; SHARE_TOKEN_BYTES] = rng.random();
        Self(hex::encode(bytes))
    }

    /// Wrap a token received from a caller (e.g. a URL path segment).
    ///
    /// No format check: an unknown token simply resolves to no group.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ShareToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A household group; owns zero or more children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub share_token: ShareToken,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Build a new group with a freshly generated share token.
    pub fn new(name: BoundedName, now: DateTime<Utc>) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into_inner(),
            share_token: ShareToken::generate(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the share token, e.g. after a uniqueness collision in storage.
    pub fn regenerate_token(&mut self) {
        self.share_token = ShareToken::generate();
    }
}

/// A group with its children eagerly loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupWithChildren {
    #[serde(flatten)]
    pub group: Group,
    pub children: Vec<Child>,
}
