use crate::alias::Alias;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Numeric user identifier.
///
/// Assigned by the relational backend when a user is created and copied
/// verbatim into the document backend's `user_id` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single shortened URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    /// Unique lookup key.
    pub alias: Alias,
    /// The URL the alias redirects to.
    pub target_url: String,
    /// The user allowed to read or delete this link.
    pub owner: UserId,
}

impl ShortLink {
    pub fn new(alias: Alias, target_url: impl Into<String>, owner: UserId) -> Self {
        Self {
            alias,
            target_url: target_url.into(),
            owner,
        }
    }
}

/// A registered user as stored by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user_id: UserId,
    pub nickname: String,
    pub password_hash: String,
}
