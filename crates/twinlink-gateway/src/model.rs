use serde::{Deserialize, Serialize};

const STATUS_OK: &str = "OK";
const STATUS_ERROR: &str = "Error";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub nickname: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveUrlRequest {
    pub url: String,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: STATUS_OK }
    }
}

#[derive(Debug, Serialize)]
pub struct SaveUrlResponse {
    pub status: &'static str,
    pub alias: String,
}

impl SaveUrlResponse {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            status: STATUS_OK,
            alias: alias.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub token: String,
}

impl LoginResponse {
    pub fn new(token: String) -> Self {
        Self {
            status: STATUS_OK,
            token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR,
            error: error.into(),
        }
    }
}
