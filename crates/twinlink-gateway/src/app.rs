use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::Router;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    delete_url_handler, delete_user_handler, health_handler, login_handler, redirect_handler,
    register_handler, save_url_handler,
};
use crate::state::AppState;

/// Budget for one request, backend calls included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(4);

pub struct App {}

impl App {
    /// Builds the router. Handlers still running after `request_timeout`
    /// are dropped, which cancels any in-flight backend call.
    pub fn router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/register", post(register_handler))
            .route("/login", post(login_handler))
            .route("/url/save", post(save_url_handler))
            .route("/url/{alias}", delete(delete_url_handler))
            .route("/redirect/{alias}", get(redirect_handler))
            .route("/user/{nickname}", delete(delete_user_handler))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::SERVICE_UNAVAILABLE,
                request_timeout,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
