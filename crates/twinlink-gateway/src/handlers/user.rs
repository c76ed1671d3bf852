use crate::auth::{self, AuthUser};
use crate::error::{AppError, Result};
use crate::model::{CredentialsRequest, LoginResponse, StatusResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, warn};
use twinlink_coordinator::CoordinatorError;
use twinlink_core::ErrorKind;

fn validate_credentials(request: &CredentialsRequest) -> Result<()> {
    if request.nickname.trim().is_empty() {
        return Err(AppError::BadRequest("nickname is required".to_string()));
    }
    if request.password.is_empty() {
        return Err(AppError::BadRequest("password is required".to_string()));
    }
    Ok(())
}

/// Both backends reporting the nickname missing.
fn is_unknown_user(err: &CoordinatorError) -> bool {
    matches!(
        err,
        CoordinatorError::Both { relational, document }
            if relational.kind() == ErrorKind::NotFound && document.kind() == ErrorKind::NotFound
    )
}

pub async fn register_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StatusResponse>)> {
    let Json(request) = payload?;
    validate_credentials(&request)?;

    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let user_id = state
        .service()
        .save_user(&request.nickname, &password_hash)
        .await?;

    info!(nickname = %request.nickname, %user_id, "user registered");
    Ok((StatusCode::CREATED, Json(StatusResponse::ok())))
}

pub async fn login_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(request) = payload?;
    validate_credentials(&request)?;

    let lookup = match state.service().get_user_by_nickname(&request.nickname).await {
        Ok(lookup) => lookup,
        Err(err) if is_unknown_user(&err) => return Err(AppError::InvalidCredentials),
        Err(err) => return Err(err.into()),
    };

    let Some(password_hash) = lookup.password_hash().map(str::to_owned) else {
        warn!(nickname = %request.nickname, "login refused, no authoritative password hash");
        return Err(AppError::InvalidCredentials);
    };

    let password = request.password;
    let matches =
        tokio::task::spawn_blocking(move || auth::verify_password(&password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
    if !matches {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens().issue(&request.nickname)?;

    info!(nickname = %request.nickname, "user logged in");
    Ok(Json(LoginResponse::new(token)))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Path(nickname): Path<String>,
) -> Result<Json<StatusResponse>> {
    if user.nickname != nickname {
        return Err(AppError::Forbidden(
            "users can only delete their own account".to_string(),
        ));
    }

    state.service().delete_user_by_nickname(&nickname).await?;

    info!(nickname, "user deleted");
    Ok(Json(StatusResponse::ok()))
}
