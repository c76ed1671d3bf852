use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use twinlink_gateway::app::DEFAULT_REQUEST_TIMEOUT;

pub const LISTEN_ADDR_ENV: &str = "TWINLINK_LISTEN_ADDR";
pub const ENV_ENV: &str = "TWINLINK_ENV";
pub const STORAGE_BACKEND_ENV: &str = "TWINLINK_STORAGE";
pub const SQLITE_URL_ENV: &str = "TWINLINK_SQLITE_URL";
pub const SURREAL_ENDPOINT_ENV: &str = "TWINLINK_SURREAL_ENDPOINT";
pub const SURREAL_NAMESPACE_ENV: &str = "TWINLINK_SURREAL_NAMESPACE";
pub const SURREAL_DATABASE_ENV: &str = "TWINLINK_SURREAL_DATABASE";
pub const SURREAL_USERNAME_ENV: &str = "TWINLINK_SURREAL_USERNAME";
pub const SURREAL_PASSWORD_ENV: &str = "TWINLINK_SURREAL_PASSWORD";
pub const JWT_SECRET_ENV: &str = "TWINLINK_JWT_SECRET";
pub const TOKEN_TTL_ENV: &str = "TWINLINK_TOKEN_TTL_SECS";
pub const REQUEST_TIMEOUT_ENV: &str = "TWINLINK_REQUEST_TIMEOUT_SECS";
pub const OTLP_ENDPOINT_ENV: &str = "TWINLINK_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8082";
pub const DEFAULT_ENV: &str = "local";
pub const DEFAULT_SQLITE_URL: &str = "sqlite://storage/twinlink.db";
pub const DEFAULT_SURREAL_ENDPOINT: &str = "mem://";
pub const DEFAULT_SURREAL_NAMESPACE: &str = "twinlink";
pub const DEFAULT_SURREAL_DATABASE: &str = "main";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = DEFAULT_REQUEST_TIMEOUT.as_secs();

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    /// SQLite and SurrealDB kept in agreement.
    #[value(name = "dual")]
    Dual,
    /// Two in-process stores; nothing survives a restart.
    #[value(name = "memory")]
    Memory,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::Dual => write!(f, "dual"),
            StorageBackendArg::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "twinlink-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// `local`, `dev` or `prod`; anything else is treated as `prod`.
    #[arg(long = "env", env = ENV_ENV, default_value = DEFAULT_ENV)]
    pub environment: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::Dual
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = SQLITE_URL_ENV, default_value = DEFAULT_SQLITE_URL)]
    pub sqlite_url: String,

    #[arg(long, env = SURREAL_ENDPOINT_ENV, default_value = DEFAULT_SURREAL_ENDPOINT)]
    pub surreal_endpoint: String,

    #[arg(long, env = SURREAL_NAMESPACE_ENV, default_value = DEFAULT_SURREAL_NAMESPACE)]
    pub surreal_namespace: String,

    #[arg(long, env = SURREAL_DATABASE_ENV, default_value = DEFAULT_SURREAL_DATABASE)]
    pub surreal_database: String,

    #[arg(long, env = SURREAL_USERNAME_ENV)]
    pub surreal_username: Option<String>,

    #[arg(long, env = SURREAL_PASSWORD_ENV, hide_env_values = true)]
    pub surreal_password: Option<String>,

    #[arg(long, env = JWT_SECRET_ENV, hide_env_values = true)]
    pub jwt_secret: String,

    #[arg(long, env = TOKEN_TTL_ENV, default_value_t = DEFAULT_TOKEN_TTL_SECS)]
    pub token_ttl_secs: u64,

    #[arg(long, env = REQUEST_TIMEOUT_ENV, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}
