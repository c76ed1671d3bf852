use std::fmt::Display;
use thiserror::Error;
use twinlink_core::{ErrorKind, StoreError};

/// Result type for coordinator operations.
pub type Result<T> = std::result::Result<T, CoordinatorError>;

/// The mutating operations that can leave the backends diverged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SaveUrl,
    DeleteUrl,
    SaveUser,
    DeleteUser,
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::SaveUrl => "save_url",
            Operation::DeleteUrl => "delete_url",
            Operation::SaveUser => "save_user",
            Operation::DeleteUser => "delete_user",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error)]
pub enum CoordinatorError {
    /// The relational backend failed; the document backend was not written.
    #[error("relational backend: {0}")]
    Relational(#[source] StoreError),

    /// The relational backend committed and the document backend did not.
    #[error("{operation} diverged, document backend: {source}")]
    Diverged {
        operation: Operation,
        source: StoreError,
    },

    /// The document backend answered a read after the relational one failed.
    #[error("document backend: {0}")]
    Document(#[source] StoreError),

    #[error("relational error: {relational}, document error: {document}")]
    Both {
        relational: StoreError,
        document: StoreError,
    },
}

impl CoordinatorError {
    /// The kind of the underlying backend error.
    ///
    /// `Both` carries two unrelated causes and is always `Operational`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoordinatorError::Relational(err)
            | CoordinatorError::Document(err)
            | CoordinatorError::Diverged { source: err, .. } => err.kind(),
            CoordinatorError::Both { .. } => ErrorKind::Operational,
        }
    }

    pub fn is_diverged(&self) -> bool {
        matches!(self, CoordinatorError::Diverged { .. })
    }
}
