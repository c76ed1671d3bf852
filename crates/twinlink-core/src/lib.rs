//! Core types and traits for the twinlink short-link service.
//!
//! This crate provides the error taxonomy, domain types and backend adapter
//! contracts shared by the storage adapters and the coordinator.

pub mod alias;
pub mod error;
pub mod model;
pub mod repository;

pub use alias::Alias;
pub use error::{CoreError, ErrorKind, Result, StoreError};
pub use model::{ShortLink, UserAccount, UserId};
pub use repository::{LinkStore, PrimaryBackend, SecondaryBackend, UserStore};
