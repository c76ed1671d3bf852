use crate::error::Result;
use crate::lookup::UserLookup;
use async_trait::async_trait;
use twinlink_core::{Alias, UserId};

/// The operations the HTTP layer needs from storage.
///
/// Implementations decide how the backends are combined; callers only see
/// [`CoordinatorError`](crate::CoordinatorError) and its kind.
#[async_trait]
pub trait LinkService: Send + Sync + 'static {
    async fn save_url(&self, target_url: &str, alias: &Alias, owner: UserId) -> Result<()>;

    async fn get_url(&self, alias: &Alias, owner: UserId) -> Result<String>;

    async fn delete_url(&self, alias: &Alias, owner: UserId) -> Result<()>;

    /// Creates a user and returns its canonical identifier.
    async fn save_user(&self, nickname: &str, password_hash: &str) -> Result<UserId>;

    async fn get_user_by_nickname(&self, nickname: &str) -> Result<UserLookup>;

    /// Deletes the user and every link it owns.
    async fn delete_user_by_nickname(&self, nickname: &str) -> Result<()>;
}
