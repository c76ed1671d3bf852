//! Backend adapters for twinlink.
//!
//! - [`SqliteStore`]: the relational backend, authoritative for user ids.
//! - [`SurrealStore`]: the document backend.
//! - [`MemoryStore`]: an in-process store usable in either role.

pub mod memory;
pub mod sqlite;
pub mod surreal;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use surreal::{SurrealConfig, SurrealStore};
pub use twinlink_core::repository::{LinkStore, PrimaryBackend, SecondaryBackend, UserStore};
pub use twinlink_core::StoreError;
