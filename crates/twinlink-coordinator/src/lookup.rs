use twinlink_core::{StoreError, UserAccount, UserId};

/// Outcome of a user lookup that reached at least one backend.
#[derive(Debug, Clone)]
pub enum UserLookup {
    /// Both backends answered; the relational account is returned.
    Found(UserAccount),
    /// Only the relational backend answered.
    DocumentDegraded {
        account: UserAccount,
        error: StoreError,
    },
    /// Only the document backend answered. The password hash is withheld.
    RelationalDegraded { user_id: UserId, error: StoreError },
}

impl UserLookup {
    pub fn user_id(&self) -> UserId {
        match self {
            UserLookup::Found(account) | UserLookup::DocumentDegraded { account, .. } => {
                account.user_id
            }
            UserLookup::RelationalDegraded { user_id, .. } => *user_id,
        }
    }

    /// `None` when the hash only came from the document backend.
    pub fn password_hash(&self) -> Option<&str> {
        self.credentials()
            .map(|account| account.password_hash.as_str())
    }

    /// The backend error accompanying a degraded lookup.
    pub fn error(&self) -> Option<&StoreError> {
        match self {
            UserLookup::Found(_) => None,
            UserLookup::DocumentDegraded { error, .. }
            | UserLookup::RelationalDegraded { error, .. } => Some(error),
        }
    }

    /// The relational account, suitable for verifying a password.
    pub fn credentials(&self) -> Option<&UserAccount> {
        match self {
            UserLookup::Found(account) | UserLookup::DocumentDegraded { account, .. } => {
                Some(account)
            }
            UserLookup::RelationalDegraded { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, UserLookup::Found(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> UserAccount {
        UserAccount {
            user_id: UserId::new(7),
            nickname: "alice".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[test]
    fn found_exposes_credentials() {
        let lookup = UserLookup::Found(account());

        assert_eq!(lookup.user_id(), UserId::new(7));
        assert_eq!(lookup.password_hash(), Some("hash"));
        assert!(lookup.error().is_none());
        assert!(!lookup.is_degraded());
    }

    #[test]
    fn document_degraded_keeps_relational_credentials() {
        let lookup = UserLookup::DocumentDegraded {
            account: account(),
            error: StoreError::Unavailable("down".into()),
        };

        assert_eq!(lookup.password_hash(), Some("hash"));
        assert!(lookup.credentials().is_some());
        assert!(lookup.error().is_some());
    }

    #[test]
    fn relational_degraded_withholds_hash() {
        let lookup = UserLookup::RelationalDegraded {
            user_id: UserId::new(42),
            error: StoreError::Unavailable("down".into()),
        };

        assert_eq!(lookup.user_id(), UserId::new(42));
        assert_eq!(lookup.password_hash(), None);
        assert!(lookup.credentials().is_none());
        assert!(lookup.is_degraded());
    }
}
