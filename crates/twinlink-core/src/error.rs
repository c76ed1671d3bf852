use thiserror::Error;

/// Result type for backend adapter operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Coarse classification of a [`StoreError`].
///
/// The first three kinds carry the same meaning regardless of which backend
/// produced them. Everything else is an operational failure that callers
/// must not branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The lookup key is absent.
    NotFound,
    /// The lookup key violates a uniqueness constraint.
    AlreadyExists,
    /// The lookup key exists but belongs to another owner.
    Unauthorized,
    /// Connectivity, malformed data, aborted transactions and the like.
    Operational,
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage transaction failed: {0}")]
    Transaction(String),
    #[error("operation rejected: {0}")]
    Precondition(String),
    #[error("storage initialization failed: {0}")]
    Initialization(String),
}

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("invalid alias: {0}")]
    InvalidAlias(String),
}

impl StoreError {
    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            StoreError::Unauthorized(_) => ErrorKind::Unauthorized,
            StoreError::Unavailable(_)
            | StoreError::Timeout(_)
            | StoreError::Query(_)
            | StoreError::InvalidData(_)
            | StoreError::Transaction(_)
            | StoreError::Precondition(_)
            | StoreError::Initialization(_) => ErrorKind::Operational,
        }
    }

    /// Returns `true` for `NotFound`, `AlreadyExists` and `Unauthorized`.
    pub fn is_domain(&self) -> bool {
        self.kind() != ErrorKind::Operational
    }
}
