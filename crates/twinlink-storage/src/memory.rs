use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use twinlink_core::error::{Result, StoreError};
use twinlink_core::repository::{LinkStore, PrimaryBackend, SecondaryBackend, UserStore};
use twinlink_core::{Alias, ShortLink, UserAccount, UserId};

#[derive(Debug, Clone)]
struct LinkEntry {
    target_url: String,
    owner: UserId,
}

/// In-memory implementation of both backend roles using DashMap.
///
/// Inserts go through the `entry` API, so uniqueness is atomic per key.
/// The outage switch makes every call fail with `Unavailable` until it is
/// flipped back.
///
/// A store built with [`primary`](Self::primary) refuses to delete users
/// that own no links, like [`SqliteStore`](crate::SqliteStore). One built
/// with [`secondary`](Self::secondary) deletes them unconditionally.
#[derive(Debug)]
pub struct MemoryStore {
    links: DashMap<String, LinkEntry>,
    users: DashMap<String, UserAccount>,
    next_user_id: AtomicI64,
    offline: AtomicBool,
    require_owned_links: bool,
}

impl MemoryStore {
    /// Creates an empty store for the relational role. Assigned user ids start at 1.
    pub fn primary() -> Self {
        Self::with_policy(true)
    }

    /// Creates an empty store for the document role.
    pub fn secondary() -> Self {
        Self::with_policy(false)
    }

    fn with_policy(require_owned_links: bool) -> Self {
        Self {
            links: DashMap::new(),
            users: DashMap::new(),
            next_user_id: AtomicI64::new(1),
            offline: AtomicBool::new(false),
            require_owned_links,
        }
    }

    /// Toggles the simulated outage.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Whether `alias` is stored, regardless of owner and outage state.
    pub fn contains_link(&self, alias: &Alias) -> bool {
        self.links.contains_key(alias.as_str())
    }

    /// Whether `nickname` is stored, regardless of outage state.
    pub fn contains_user(&self, nickname: &str) -> bool {
        self.users.contains_key(nickname)
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn owned_link(&self, alias: &Alias, owner: UserId) -> Result<LinkEntry> {
        let Some(entry) = self.links.get(alias.as_str()) else {
            return Err(StoreError::NotFound(alias.to_string()));
        };

        if entry.owner != owner {
            return Err(StoreError::Unauthorized(alias.to_string()));
        }

        Ok(entry.value().clone())
    }

    fn insert_account(&self, account: UserAccount) -> Result<()> {
        match self.users.entry(account.nickname.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(account.nickname)),
            Entry::Vacant(slot) => {
                slot.insert(account);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn save_link(&self, link: &ShortLink) -> Result<()> {
        self.ensure_online()?;

        match self.links.entry(link.alias.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(link.alias.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(LinkEntry {
                    target_url: link.target_url.clone(),
                    owner: link.owner,
                });
                Ok(())
            }
        }
    }

    async fn get_link(&self, alias: &Alias, owner: UserId) -> Result<String> {
        self.ensure_online()?;
        Ok(self.owned_link(alias, owner)?.target_url)
    }

    async fn delete_link(&self, alias: &Alias, owner: UserId) -> Result<()> {
        self.ensure_online()?;
        self.owned_link(alias, owner)?;

        self.links
            .remove_if(alias.as_str(), |_, entry| entry.owner == owner)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(alias.to_string()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, nickname: &str) -> Result<UserAccount> {
        self.ensure_online()?;

        self.users
            .get(nickname)
            .map(|account| account.value().clone())
            .ok_or_else(|| StoreError::NotFound(nickname.to_owned()))
    }

    async fn delete_user_cascade(&self, nickname: &str) -> Result<()> {
        self.ensure_online()?;

        let user_id = self
            .users
            .get(nickname)
            .map(|account| account.user_id)
            .ok_or_else(|| StoreError::NotFound(nickname.to_owned()))?;

        if self.require_owned_links && !self.links.iter().any(|entry| entry.owner == user_id) {
            return Err(StoreError::Precondition(format!(
                "user '{nickname}' owns no links"
            )));
        }

        self.users
            .remove(nickname)
            .ok_or_else(|| StoreError::NotFound(nickname.to_owned()))?;

        self.links.retain(|_, entry| entry.owner != user_id);
        Ok(())
    }
}

#[async_trait]
impl PrimaryBackend for MemoryStore {
    async fn create_user(&self, nickname: &str, password_hash: &str) -> Result<UserId> {
        self.ensure_online()?;

        if self.users.contains_key(nickname) {
            return Err(StoreError::AlreadyExists(nickname.to_owned()));
        }

        let user_id = UserId::new(self.next_user_id.fetch_add(1, Ordering::SeqCst));
        self.insert_account(UserAccount {
            user_id,
            nickname: nickname.to_owned(),
            password_hash: password_hash.to_owned(),
        })?;

        Ok(user_id)
    }
}

#[async_trait]
impl SecondaryBackend for MemoryStore {
    async fn insert_user(&self, account: &UserAccount) -> Result<()> {
        self.ensure_online()?;
        self.insert_account(account.clone())
    }
}
