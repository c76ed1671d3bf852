use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::debug;
use twinlink_core::error::{Result, StoreError};
use twinlink_core::repository::{LinkStore, PrimaryBackend, UserStore};
use twinlink_core::{Alias, ShortLink, UserAccount, UserId};

/// SQLite implementation of the relational backend.
///
/// Aliases and nicknames are guarded by unique indexes, and every link row
/// references its owner with a foreign key. Ownership is checked with an
/// explicit read before the link is returned or deleted.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a store from an existing pool. The schema is not touched.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `database_url` and
    /// applies the embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(map_sqlx_error)?
            .create_if_missing(true)
            .foreign_keys(true);

        if let Some(dir) = options.get_filename().parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| StoreError::Initialization(e.to_string()))?;
            }
        }
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Opens a private in-memory database with the schema applied.
    ///
    /// The pool is pinned to a single connection that never expires,
    /// since every new SQLite memory connection starts out empty.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(map_sqlx_error)?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the pool. Subsequent calls fail with `Unavailable`.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Resolves the owner of `alias` and compares it with `owner`.
    async fn authorize(&self, alias: &Alias, owner: UserId) -> Result<()> {
        let stored_owner: Option<i64> =
            sqlx::query_scalar("SELECT user_id FROM urls WHERE alias = ?")
                .bind(alias.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        match stored_owner {
            None => Err(StoreError::NotFound(alias.to_string())),
            Some(id) if id != owner.get() => Err(StoreError::Unauthorized(alias.to_string())),
            Some(_) => Ok(()),
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StoreError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StoreError::InvalidData(message),
        sqlx::Error::Configuration(_) | sqlx::Error::Migrate(_) => {
            StoreError::Initialization(message)
        }
        _ => StoreError::Query(message),
    }
}

#[async_trait]
impl LinkStore for SqliteStore {
    async fn save_link(&self, link: &ShortLink) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO urls (url, alias, user_id)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(link.target_url.as_str())
        .bind(link.alias.as_str())
        .bind(link.owner.get())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::AlreadyExists(link.alias.to_string()))
            }
            // foreign key violations (unknown owner) stay operational
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn get_link(&self, alias: &Alias, owner: UserId) -> Result<String> {
        self.authorize(alias, owner).await?;

        let url: Option<String> =
            sqlx::query_scalar("SELECT url FROM urls WHERE alias = ? AND user_id = ?")
                .bind(alias.as_str())
                .bind(owner.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        url.ok_or_else(|| StoreError::NotFound(alias.to_string()))
    }

    async fn delete_link(&self, alias: &Alias, owner: UserId) -> Result<()> {
        self.authorize(alias, owner).await?;

        let result = sqlx::query("DELETE FROM urls WHERE alias = ? AND user_id = ?")
            .bind(alias.as_str())
            .bind(owner.get())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(alias.to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn get_user(&self, nickname: &str) -> Result<UserAccount> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, password_hash FROM users WHERE nickname = ?")
                .bind(nickname)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        let (id, password_hash) = row.ok_or_else(|| StoreError::NotFound(nickname.to_owned()))?;

        Ok(UserAccount {
            user_id: UserId::new(id),
            nickname: nickname.to_owned(),
            password_hash,
        })
    }

    async fn delete_user_cascade(&self, nickname: &str) -> Result<()> {
        // Dropping `tx` on any early return rolls the whole cascade back.
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let user_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE nickname = ?")
            .bind(nickname)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| StoreError::NotFound(nickname.to_owned()))?;

        let owned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        // Accounts without links are not deletable; kept pending product confirmation.
        if owned == 0 {
            return Err(StoreError::Precondition(format!(
                "user '{nickname}' owns no links"
            )));
        }

        let deleted = sqlx::query("DELETE FROM urls WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        debug!(
            nickname,
            user_id,
            links = deleted.rows_affected(),
            "deleted user and owned links"
        );
        Ok(())
    }
}

#[async_trait]
impl PrimaryBackend for SqliteStore {
    async fn create_user(&self, nickname: &str, password_hash: &str) -> Result<UserId> {
        let result = sqlx::query("INSERT INTO users (nickname, password_hash) VALUES (?, ?)")
            .bind(nickname)
            .bind(password_hash)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(UserId::new(done.last_insert_rowid())),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::AlreadyExists(nickname.to_owned()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }
}
