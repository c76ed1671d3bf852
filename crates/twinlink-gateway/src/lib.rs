//! HTTP gateway for twinlink.
//!
//! Every storage call goes through an `Arc<dyn LinkService>`, so the same
//! router serves the dual-backend coordinator in production and an
//! in-memory pair in tests.

pub mod app;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use auth::{AuthConfig, AuthUser, TokenIssuer};
pub use state::AppState;
