use thiserror::Error;

pub type Result<T> = std::result::Result<T, TelemetryError>;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Config(String),
    #[error("failed to build span exporter: {0}")]
    Exporter(String),
    #[error("failed to install subscriber: {0}")]
    Init(String),
}
