//! Backend adapter contracts.
//!
//! Every adapter translates its native errors into [`StoreError`] before
//! returning, so callers can branch on [`StoreError::kind`] without knowing
//! which engine answered.
//!
//! [`StoreError`]: crate::error::StoreError
//! [`StoreError::kind`]: crate::error::StoreError::kind

use crate::alias::Alias;
use crate::error::Result;
use crate::model::{ShortLink, UserAccount, UserId};
use async_trait::async_trait;

#[async_trait]
pub trait LinkStore: Send + Sync + 'static {
    /// Stores a new link.
    ///
    /// Returns `Err(AlreadyExists)` if the alias is taken.
    async fn save_link(&self, link: &ShortLink) -> Result<()>;

    /// Returns the target URL of `alias`.
    ///
    /// Fails with `NotFound` if the alias is absent and `Unauthorized`
    /// if it belongs to someone other than `owner`.
    async fn get_link(&self, alias: &Alias, owner: UserId) -> Result<String>;

    /// Deletes `alias` after the same ownership check as [`get_link`](Self::get_link).
    async fn delete_link(&self, alias: &Alias, owner: UserId) -> Result<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Looks a user up by nickname. Fails with `NotFound` if absent.
    async fn get_user(&self, nickname: &str) -> Result<UserAccount>;

    /// Deletes the user together with every link it owns.
    ///
    /// The deletion is atomic within this backend.
    async fn delete_user_cascade(&self, nickname: &str) -> Result<()>;
}

/// The backend that assigns canonical user identifiers.
///
/// Its [`UserStore::delete_user_cascade`] fails with `Precondition`, deleting
/// nothing, when the user owns no links.
#[async_trait]
pub trait PrimaryBackend: LinkStore + UserStore {
    /// Creates a user and returns the identifier assigned to it.
    ///
    /// Returns `Err(AlreadyExists)` on a nickname collision.
    async fn create_user(&self, nickname: &str, password_hash: &str) -> Result<UserId>;
}

/// A backend that mirrors users under identifiers assigned elsewhere.
#[async_trait]
pub trait SecondaryBackend: LinkStore + UserStore {
    /// Stores `account` keeping its `user_id` as a plain field.
    ///
    /// Returns `Err(AlreadyExists)` on a nickname collision.
    async fn insert_user(&self, account: &UserAccount) -> Result<()>;
}
