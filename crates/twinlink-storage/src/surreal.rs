use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::debug;
use twinlink_core::error::{Result, StoreError};
use twinlink_core::repository::{LinkStore, SecondaryBackend, UserStore};
use twinlink_core::{Alias, ShortLink, UserAccount, UserId};
use typed_builder::TypedBuilder;

const SCHEMA: &str = include_str!("../ddl/surreal/schema.surql");

/// Connection settings for [`SurrealStore`].
#[derive(Clone, TypedBuilder)]
pub struct SurrealConfig {
    /// `mem://` for an embedded in-memory store, `ws://host:port` for a server.
    #[builder(default = "mem://".to_string(), setter(into))]
    endpoint: String,
    #[builder(default = "twinlink".to_string(), setter(into))]
    namespace: String,
    #[builder(default = "main".to_string(), setter(into))]
    database: String,
    /// Root credentials; sign-in is skipped when either is missing.
    #[builder(default)]
    username: Option<String>,
    #[builder(default)]
    password: Option<String>,
}

impl std::fmt::Debug for SurrealConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealConfig")
            .field("endpoint", &self.endpoint)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UrlDocument {
    alias: String,
    url: String,
    user_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    nickname: String,
    password_hash: String,
    user_id: i64,
}

/// SurrealDB implementation of the document backend.
///
/// Links live in the `urls` table and users in `users`, both schemaless.
/// Uniqueness is checked with an explicit lookup before each insert; the
/// unique indexes defined at connect time only catch writers racing
/// between that lookup and the insert.
///
/// Users carry the relational identifier in their `user_id` field. The
/// SurrealDB record id is never exposed.
#[derive(Clone)]
pub struct SurrealStore {
    db: Surreal<Any>,
}

impl std::fmt::Debug for SurrealStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealStore").finish_non_exhaustive()
    }
}

fn is_unique_violation(err: &surrealdb::Error) -> bool {
    err.to_string().contains("already contains")
}

fn map_surreal_error(err: surrealdb::Error) -> StoreError {
    classify_error(err.to_string())
}

fn classify_error(message: String) -> StoreError {
    let lowered = message.to_ascii_lowercase();

    if lowered.contains("timed out") || lowered.contains("timeout") {
        StoreError::Timeout(message)
    } else if lowered.contains("connection") || lowered.contains("not connected") {
        StoreError::Unavailable(message)
    } else if lowered.contains("transaction") {
        StoreError::Transaction(message)
    } else if lowered.contains("serializ") || lowered.contains("deserializ") {
        StoreError::InvalidData(message)
    } else {
        StoreError::Query(message)
    }
}

impl SurrealStore {
    /// Creates a store from an already configured client. The schema is not touched.
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    /// Connects using `config` and defines the tables and indexes.
    pub async fn connect(config: SurrealConfig) -> Result<Self> {
        let db = any::connect(config.endpoint.clone())
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))?;
        }

        db.use_ns(config.namespace.clone())
            .use_db(config.database.clone())
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))?;

        let store = Self::new(db);
        store.define_schema().await?;

        debug!(endpoint = %config.endpoint, "connected to SurrealDB");
        Ok(store)
    }

    /// Connects to a fresh embedded in-memory database.
    pub async fn connect_in_memory() -> Result<Self> {
        Self::connect(SurrealConfig::builder().build()).await
    }

    /// Returns a reference to the underlying client.
    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }

    async fn define_schema(&self) -> Result<()> {
        self.db
            .query(SCHEMA)
            .await
            .and_then(|response| response.check())
            .map_err(|e| StoreError::Initialization(e.to_string()))?;
        Ok(())
    }

    async fn find_link(&self, alias: &Alias) -> Result<Option<UrlDocument>> {
        let mut response = self
            .db
            .query("SELECT alias, url, user_id FROM urls WHERE alias = $alias LIMIT 1")
            .bind(("alias", alias.as_str().to_owned()))
            .await
            .map_err(map_surreal_error)?;

        response.take(0).map_err(map_surreal_error)
    }

    async fn find_user(&self, nickname: &str) -> Result<Option<UserDocument>> {
        let mut response = self
            .db
            .query(
                "SELECT nickname, password_hash, user_id FROM users WHERE nickname = $nickname LIMIT 1",
            )
            .bind(("nickname", nickname.to_owned()))
            .await
            .map_err(map_surreal_error)?;

        response.take(0).map_err(map_surreal_error)
    }

    /// Fetches the link and checks it belongs to `owner`.
    async fn owned_link(&self, alias: &Alias, owner: UserId) -> Result<UrlDocument> {
        let doc = self
            .find_link(alias)
            .await?
            .ok_or_else(|| StoreError::NotFound(alias.to_string()))?;

        if doc.user_id != owner.get() {
            return Err(StoreError::Unauthorized(alias.to_string()));
        }

        Ok(doc)
    }

    async fn create<T>(&self, table: &'static str, key: &str, doc: T) -> Result<()>
    where
        T: Serialize + Send + 'static,
    {
        let result = self
            .db
            .query(format!("CREATE {table} CONTENT $doc"))
            .bind(("doc", doc))
            .await
            .and_then(|response| response.check());

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StoreError::AlreadyExists(key.to_owned())),
            Err(err) => Err(map_surreal_error(err)),
        }
    }
}

#[async_trait]
impl LinkStore for SurrealStore {
    async fn save_link(&self, link: &ShortLink) -> Result<()> {
        if self.find_link(&link.alias).await?.is_some() {
            return Err(StoreError::AlreadyExists(link.alias.to_string()));
        }

        let doc = UrlDocument {
            alias: link.alias.as_str().to_owned(),
            url: link.target_url.clone(),
            user_id: link.owner.get(),
        };

        self.create("urls", link.alias.as_str(), doc).await
    }

    async fn get_link(&self, alias: &Alias, owner: UserId) -> Result<String> {
        let doc = self.owned_link(alias, owner).await?;
        Ok(doc.url)
    }

    async fn delete_link(&self, alias: &Alias, owner: UserId) -> Result<()> {
        self.owned_link(alias, owner).await?;

        self.db
            .query("DELETE urls WHERE alias = $alias")
            .bind(("alias", alias.as_str().to_owned()))
            .await
            .and_then(|response| response.check())
            .map_err(map_surreal_error)?;

        Ok(())
    }
}

#[async_trait]
impl UserStore for SurrealStore {
    async fn get_user(&self, nickname: &str) -> Result<UserAccount> {
        let doc = self
            .find_user(nickname)
            .await?
            .ok_or_else(|| StoreError::NotFound(nickname.to_owned()))?;

        Ok(UserAccount {
            user_id: UserId::new(doc.user_id),
            nickname: doc.nickname,
            password_hash: doc.password_hash,
        })
    }

    async fn delete_user_cascade(&self, nickname: &str) -> Result<()> {
        let user_id = self
            .find_user(nickname)
            .await?
            .ok_or_else(|| StoreError::NotFound(nickname.to_owned()))?
            .user_id;

        self.db
            .query(
                r#"
                BEGIN TRANSACTION;
                DELETE urls WHERE user_id = $user_id;
                DELETE users WHERE user_id = $user_id;
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("user_id", user_id))
            .await
            .and_then(|response| response.check())
            .map_err(map_surreal_error)?;

        debug!(nickname, user_id, "deleted user document and owned links");
        Ok(())
    }
}

#[async_trait]
impl SecondaryBackend for SurrealStore {
    async fn insert_user(&self, account: &UserAccount) -> Result<()> {
        if self.find_user(&account.nickname).await?.is_some() {
            return Err(StoreError::AlreadyExists(account.nickname.clone()));
        }

        let doc = UserDocument {
            nickname: account.nickname.clone(),
            password_hash: account.password_hash.clone(),
            user_id: account.user_id.get(),
        };

        self.create("users", &account.nickname, doc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_embedded_memory() {
        let config = SurrealConfig::builder().build();
        assert_eq!(config.endpoint, "mem://");
        assert_eq!(config.namespace, "twinlink");
        assert_eq!(config.database, "main");
        assert!(config.username.is_none());
    }

    #[test]
    fn debug_redacts_password() {
        let config = SurrealConfig::builder()
            .username(Some("root".to_string()))
            .password(Some("hunter2".to_string()))
            .build();

        let printed = format!("{config:?}");

        assert!(printed.contains("root"));
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn classifies_error_messages() {
        let cases = [
            ("The query was not executed due to a timeout", "timeout"),
            ("There was an error with the connection", "unavailable"),
            ("Couldn't commit a transaction", "transaction"),
            ("Failed to deserialize a value", "invalid data"),
            ("Parse error: unexpected token", "query"),
        ];

        for (message, expected) in cases {
            let kind = match classify_error(message.to_string()) {
                StoreError::Timeout(_) => "timeout",
                StoreError::Unavailable(_) => "unavailable",
                StoreError::Transaction(_) => "transaction",
                StoreError::InvalidData(_) => "invalid data",
                StoreError::Query(_) => "query",
                other => panic!("unexpected variant for {message:?}: {other:?}"),
            };
            assert_eq!(kind, expected, "{message}");
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unique_index_rejects_duplicate_alias_past_the_existence_check() {
        let store = SurrealStore::connect_in_memory().await.unwrap();
        let doc = || UrlDocument {
            alias: "abc123".to_string(),
            url: "https://example.com".to_string(),
            user_id: 1,
        };

        store.create("urls", "abc123", doc()).await.unwrap();
        let err = store.create("urls", "abc123", doc()).await.unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists(ref key) if key == "abc123"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unique_index_rejects_duplicate_nickname_past_the_existence_check() {
        let store = SurrealStore::connect_in_memory().await.unwrap();
        let doc = |user_id| UserDocument {
            nickname: "alice".to_string(),
            password_hash: "hash".to_string(),
            user_id,
        };

        store.create("users", "alice", doc(1)).await.unwrap();
        let err = store.create("users", "alice", doc(2)).await.unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists(ref key) if key == "alice"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn document_id_is_the_relational_user_id_field() {
        let store = SurrealStore::connect_in_memory().await.unwrap();
        let account = UserAccount {
            user_id: UserId::new(42),
            nickname: "alice".to_string(),
            password_hash: "hash".to_string(),
        };

        store.insert_user(&account).await.unwrap();

        let got = store.get_user("alice").await.unwrap();
        assert_eq!(got.user_id, UserId::new(42));
    }
}
