//! Dual-backend coordination for twinlink.
//!
//! [`DualStore`] writes every record to a relational backend and then to a
//! document backend, prefers the relational backend on reads and reports
//! partial failures as [`CoordinatorError::Diverged`].

mod dual;
mod error;
mod lookup;
mod service;

pub use dual::DualStore;
pub use error::{CoordinatorError, Operation, Result};
pub use lookup::UserLookup;
pub use service::LinkService;
