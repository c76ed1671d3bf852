use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::model::{SaveUrlRequest, SaveUrlResponse, StatusResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{info, warn};
use twinlink_core::{Alias, UserId};

/// Checks that `url` is an absolute http(s) URL with a host.
fn validate_url(url: &str) -> Result<()> {
    let parsed =
        ::url::Url::parse(url).map_err(|e| AppError::BadRequest(format!("invalid url: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::BadRequest(format!(
            "url scheme must be http or https: {}",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none() {
        return Err(AppError::BadRequest("url must have a host".to_string()));
    }

    Ok(())
}

/// Resolves the token subject to the identifier links are stored under.
///
/// A lookup answered by only one backend still yields an id.
async fn resolve_owner(state: &AppState, user: &AuthUser) -> Result<UserId> {
    let lookup = state.service().get_user_by_nickname(&user.nickname).await?;

    if let Some(error) = lookup.error() {
        warn!(nickname = %user.nickname, %error, "owner resolved from a degraded lookup");
    }

    Ok(lookup.user_id())
}

pub async fn save_url_handler(
    State(state): State<AppState>,
    user: AuthUser,
    payload: std::result::Result<Json<SaveUrlRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;
    validate_url(&request.url)?;

    let alias = match request.alias.filter(|alias| !alias.is_empty()) {
        Some(alias) => Alias::new(alias)?,
        None => state.generate_alias(),
    };

    let owner = resolve_owner(&state, &user).await?;
    state.service().save_url(&request.url, &alias, owner).await?;

    info!(%alias, nickname = %user.nickname, "url saved");
    Ok((StatusCode::CREATED, Json(SaveUrlResponse::new(alias.as_str()))).into_response())
}

pub async fn redirect_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Path(alias): Path<String>,
) -> Result<Response> {
    let alias = Alias::new(alias)?;
    let owner = resolve_owner(&state, &user).await?;

    let target = state.service().get_url(&alias, owner).await?;

    info!(%alias, target = %target, "redirecting");
    Ok((StatusCode::FOUND, [(header::LOCATION, target)]).into_response())
}

pub async fn delete_url_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Path(alias): Path<String>,
) -> Result<Json<StatusResponse>> {
    let alias = Alias::new(alias)?;
    let owner = resolve_owner(&state, &user).await?;

    state.service().delete_url(&alias, owner).await?;

    info!(%alias, nickname = %user.nickname, "url deleted");
    Ok(Json(StatusResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/path?q=1").is_ok());
    }

    #[test]
    fn rejects_other_urls() {
        assert!(validate_url("").is_err());
        assert!(validate_url("example.com").is_err());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("mailto:alice@example.com").is_err());
    }
}
