use crate::error::{CoordinatorError, Operation, Result};
use crate::lookup::UserLookup;
use crate::service::LinkService;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};
use twinlink_core::{Alias, PrimaryBackend, SecondaryBackend, ShortLink, UserAccount, UserId};

/// Keeps a relational and a document backend in agreement.
///
/// # Operation Strategy
///
/// - **Writes**: relational first. A relational failure aborts before the
///   document backend is touched. A document failure after a relational
///   commit is reported as [`CoordinatorError::Diverged`] and nothing is
///   rolled back.
/// - **Link reads**: relational first, falling back to the document
///   backend on any relational error.
/// - **User reads**: both backends are always queried and the outcome is
///   classified into a [`UserLookup`].
///
/// Calls are sequential on the caller's task. Dropping the returned future
/// abandons whichever backend call is in flight.
#[derive(Debug)]
pub struct DualStore<R, D> {
    relational: Arc<R>,
    document: Arc<D>,
}

impl<R, D> Clone for DualStore<R, D> {
    fn clone(&self) -> Self {
        Self {
            relational: Arc::clone(&self.relational),
            document: Arc::clone(&self.document),
        }
    }
}

impl<R, D> DualStore<R, D> {
    pub fn new(relational: R, document: D) -> Self {
        Self {
            relational: Arc::new(relational),
            document: Arc::new(document),
        }
    }

    /// Returns a reference to the relational backend.
    pub fn relational(&self) -> &R {
        &self.relational
    }

    /// Returns a reference to the document backend.
    pub fn document(&self) -> &D {
        &self.document
    }
}

#[async_trait]
impl<R, D> LinkService for DualStore<R, D>
where
    R: PrimaryBackend,
    D: SecondaryBackend,
{
    async fn save_url(&self, target_url: &str, alias: &Alias, owner: UserId) -> Result<()> {
        info!(%alias, %owner, "saving url");
        let link = ShortLink::new(alias.clone(), target_url, owner);

        if let Err(err) = self.relational.save_link(&link).await {
            error!(%alias, error = %err, "relational save failed");
            return Err(CoordinatorError::Relational(err));
        }

        if let Err(err) = self.document.save_link(&link).await {
            error!(%alias, error = %err, "document save failed after relational commit");
            return Err(CoordinatorError::Diverged {
                operation: Operation::SaveUrl,
                source: err,
            });
        }

        info!(%alias, "url saved");
        Ok(())
    }

    async fn get_url(&self, alias: &Alias, owner: UserId) -> Result<String> {
        info!(%alias, %owner, "getting url");

        let relational_err = match self.relational.get_link(alias, owner).await {
            Ok(url) => {
                info!(%alias, "url found in relational backend");
                return Ok(url);
            }
            Err(err) => err,
        };

        warn!(%alias, error = %relational_err, "relational read failed, trying document backend");

        match self.document.get_link(alias, owner).await {
            Ok(url) => {
                info!(%alias, "url found in document backend");
                Ok(url)
            }
            Err(err) => {
                error!(%alias, error = %err, "document read failed");
                Err(CoordinatorError::Document(err))
            }
        }
    }

    async fn delete_url(&self, alias: &Alias, owner: UserId) -> Result<()> {
        info!(%alias, %owner, "deleting url");

        if let Err(err) = self.relational.delete_link(alias, owner).await {
            error!(%alias, error = %err, "relational delete failed");
            return Err(CoordinatorError::Relational(err));
        }

        if let Err(err) = self.document.delete_link(alias, owner).await {
            error!(%alias, error = %err, "document delete failed after relational commit");
            return Err(CoordinatorError::Diverged {
                operation: Operation::DeleteUrl,
                source: err,
            });
        }

        info!(%alias, "url deleted");
        Ok(())
    }

    async fn save_user(&self, nickname: &str, password_hash: &str) -> Result<UserId> {
        info!(nickname, "saving user");

        let user_id = self
            .relational
            .create_user(nickname, password_hash)
            .await
            .map_err(|err| {
                error!(nickname, error = %err, "relational user insert failed");
                CoordinatorError::Relational(err)
            })?;

        let account = UserAccount {
            user_id,
            nickname: nickname.to_owned(),
            password_hash: password_hash.to_owned(),
        };

        if let Err(err) = self.document.insert_user(&account).await {
            error!(nickname, %user_id, error = %err, "document user insert failed after relational commit");
            return Err(CoordinatorError::Diverged {
                operation: Operation::SaveUser,
                source: err,
            });
        }

        info!(nickname, %user_id, "user saved");
        Ok(user_id)
    }

    async fn get_user_by_nickname(&self, nickname: &str) -> Result<UserLookup> {
        info!(nickname, "getting user");

        let relational = self.relational.get_user(nickname).await;
        let document = self.document.get_user(nickname).await;

        match (relational, document) {
            (Ok(account), Ok(_)) => {
                info!(nickname, user_id = %account.user_id, "user found in both backends");
                Ok(UserLookup::Found(account))
            }
            (Ok(account), Err(error)) => {
                warn!(nickname, error = %error, "user missing from document backend");
                Ok(UserLookup::DocumentDegraded { account, error })
            }
            (Err(error), Ok(account)) => {
                warn!(nickname, error = %error, "user only found in document backend");
                Ok(UserLookup::RelationalDegraded {
                    user_id: account.user_id,
                    error,
                })
            }
            (Err(relational), Err(document)) => {
                error!(
                    nickname,
                    relational_error = %relational,
                    document_error = %document,
                    "user lookup failed in both backends"
                );
                Err(CoordinatorError::Both {
                    relational,
                    document,
                })
            }
        }
    }

    async fn delete_user_by_nickname(&self, nickname: &str) -> Result<()> {
        info!(nickname, "deleting user");

        if let Err(err) = self.relational.delete_user_cascade(nickname).await {
            error!(nickname, error = %err, "relational user delete failed");
            return Err(CoordinatorError::Relational(err));
        }

        if let Err(err) = self.document.delete_user_cascade(nickname).await {
            error!(nickname, error = %err, "document user delete failed after relational commit");
            return Err(CoordinatorError::Diverged {
                operation: Operation::DeleteUser,
                source: err,
            });
        }

        info!(nickname, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinlink_core::{ErrorKind, LinkStore, StoreError, UserStore};
    use twinlink_storage::MemoryStore;

    fn store() -> DualStore<MemoryStore, MemoryStore> {
        DualStore::new(MemoryStore::primary(), MemoryStore::secondary())
    }

    fn alias(s: &str) -> Alias {
        Alias::new_unchecked(s)
    }

    #[tokio::test]
    async fn save_writes_both_backends() {
        let store = store();

        store
            .save_url("https://example.com", &alias("abc123"), UserId::new(1))
            .await
            .unwrap();

        assert!(store.relational().contains_link(&alias("abc123")));
        assert!(store.document().contains_link(&alias("abc123")));
    }

    #[tokio::test]
    async fn relational_conflict_never_reaches_document() {
        let store = store();
        store
            .relational()
            .save_link(&ShortLink::new(alias("abc123"), "https://one", UserId::new(1)))
            .await
            .unwrap();

        let err = store
            .save_url("https://two", &alias("abc123"), UserId::new(2))
            .await
            .unwrap_err();

        assert!(matches!(err, CoordinatorError::Relational(_)));
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(store.document().link_count(), 0);
    }

    #[tokio::test]
    async fn document_failure_after_save_is_divergence() {
        let store = store();
        store.document().set_offline(true);

        let err = store
            .save_url("https://example.com", &alias("abc123"), UserId::new(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CoordinatorError::Diverged {
                operation: Operation::SaveUrl,
                ..
            }
        ));
        assert!(store.relational().contains_link(&alias("abc123")));
    }

    #[tokio::test]
    async fn get_falls_back_to_document() {
        let store = store();
        store
            .save_url("https://example.com", &alias("abc123"), UserId::new(1))
            .await
            .unwrap();
        store.relational().set_offline(true);

        let url = store.get_url(&alias("abc123"), UserId::new(1)).await.unwrap();
        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn fallback_result_is_final() {
        let store = store();
        store.relational().set_offline(true);

        let err = store
            .get_url(&alias("nope"), UserId::new(1))
            .await
            .unwrap_err();

        assert!(matches!(err, CoordinatorError::Document(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn get_reports_owner_mismatch() {
        let store = store();
        store
            .save_url("https://example.com", &alias("abc123"), UserId::new(1))
            .await
            .unwrap();

        let err = store
            .get_url(&alias("abc123"), UserId::new(2))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn delete_removes_from_both_backends() {
        let store = store();
        store
            .save_url("https://example.com", &alias("abc123"), UserId::new(1))
            .await
            .unwrap();

        store.delete_url(&alias("abc123"), UserId::new(1)).await.unwrap();

        assert_eq!(store.relational().link_count(), 0);
        assert_eq!(store.document().link_count(), 0);
    }

    #[tokio::test]
    async fn delete_divergence_keeps_relational_delete() {
        let store = store();
        store
            .save_url("https://example.com", &alias("abc123"), UserId::new(1))
            .await
            .unwrap();
        store.document().set_offline(true);

        let err = store
            .delete_url(&alias("abc123"), UserId::new(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CoordinatorError::Diverged {
                operation: Operation::DeleteUrl,
                ..
            }
        ));
        assert!(!store.relational().contains_link(&alias("abc123")));
        assert!(store.document().contains_link(&alias("abc123")));
    }

    #[tokio::test]
    async fn save_user_copies_relational_id() {
        let store = store();

        let first = store.save_user("alice", "h1").await.unwrap();
        let second = store.save_user("bob", "h2").await.unwrap();

        assert_ne!(first, second);
        let mirrored = store.document().get_user("bob").await.unwrap();
        assert_eq!(mirrored.user_id, second);
        assert_eq!(mirrored.password_hash, "h2");
    }

    #[tokio::test]
    async fn save_user_conflict_aborts_before_document() {
        let store = store();
        store.relational().create_user("alice", "h").await.unwrap();

        let err = store.save_user("alice", "h").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert!(!store.document().contains_user("alice"));
    }

    #[tokio::test]
    async fn lookup_found_in_both() {
        let store = store();
        let id = store.save_user("alice", "hash").await.unwrap();

        let lookup = store.get_user_by_nickname("alice").await.unwrap();

        assert!(matches!(lookup, UserLookup::Found(_)));
        assert_eq!(lookup.user_id(), id);
        assert_eq!(lookup.password_hash(), Some("hash"));
    }

    #[tokio::test]
    async fn lookup_with_document_down_keeps_credentials() {
        let store = store();
        let id = store.save_user("alice", "hash").await.unwrap();
        store.document().set_offline(true);

        let lookup = store.get_user_by_nickname("alice").await.unwrap();

        assert!(matches!(lookup, UserLookup::DocumentDegraded { .. }));
        assert_eq!(lookup.user_id(), id);
        assert_eq!(lookup.password_hash(), Some("hash"));
    }

    #[tokio::test]
    async fn lookup_with_relational_down_yields_id_without_hash() {
        let store = store();
        store
            .document()
            .insert_user(&UserAccount {
                user_id: UserId::new(42),
                nickname: "alice".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        store.relational().set_offline(true);

        let lookup = store.get_user_by_nickname("alice").await.unwrap();

        assert_eq!(lookup.user_id(), UserId::new(42));
        assert_eq!(lookup.password_hash(), None);
        assert!(matches!(lookup.error(), Some(StoreError::Unavailable(_))));
        assert!(lookup.credentials().is_none());
    }

    #[tokio::test]
    async fn lookup_failing_in_both_names_both_causes() {
        let store = store();
        store.relational().set_offline(true);

        let err = store.get_user_by_nickname("ghost").await.unwrap_err();

        let CoordinatorError::Both {
            relational,
            document,
        } = &err
        else {
            panic!("expected Both, got {err:?}");
        };
        assert!(matches!(relational, StoreError::Unavailable(_)));
        assert!(matches!(document, StoreError::NotFound(_)));
        assert_eq!(err.kind(), ErrorKind::Operational);
    }

    #[tokio::test]
    async fn delete_user_cascades_in_both_backends() {
        let store = store();
        let id = store.save_user("carol", "h").await.unwrap();
        store
            .save_url("https://one", &alias("c-one"), id)
            .await
            .unwrap();

        store.delete_user_by_nickname("carol").await.unwrap();

        assert!(!store.relational().contains_user("carol"));
        assert!(!store.document().contains_user("carol"));
        let err = store.get_url(&alias("c-one"), id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_user_relational_failure_leaves_document_untouched() {
        let store = store();
        store.save_user("carol", "h").await.unwrap();
        store.relational().set_offline(true);

        let err = store.delete_user_by_nickname("carol").await.unwrap_err();

        assert!(matches!(err, CoordinatorError::Relational(_)));
        assert!(store.document().contains_user("carol"));
    }

    #[tokio::test]
    async fn delete_user_without_links_is_refused_by_relational() {
        let store = store();
        store.save_user("bob", "h").await.unwrap();

        let err = store.delete_user_by_nickname("bob").await.unwrap_err();

        assert!(matches!(
            err,
            CoordinatorError::Relational(StoreError::Precondition(_))
        ));
        assert_eq!(err.kind(), ErrorKind::Operational);
        assert!(store.relational().contains_user("bob"));
        assert!(store.document().contains_user("bob"));
    }

    #[tokio::test]
    async fn clones_share_backends() {
        let store = store();
        let clone = store.clone();

        clone
            .save_url("https://example.com", &alias("abc123"), UserId::new(1))
            .await
            .unwrap();

        assert!(store.relational().contains_link(&alias("abc123")));
    }
}
