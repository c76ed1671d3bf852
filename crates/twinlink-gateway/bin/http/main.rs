mod cli;

use crate::cli::{StorageBackendArg, CLI};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use twinlink_coordinator::{DualStore, LinkService};
use twinlink_gateway::{App, AppState, AuthConfig, TokenIssuer};
use twinlink_generator::RandomGenerator;
use twinlink_storage::{MemoryStore, SqliteStore, SurrealConfig, SurrealStore};
use twinlink_telemetry::{Environment, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CLI::try_parse()?;

    let telemetry = TelemetryConfig::builder()
        .environment(Environment::from(config.environment.as_str()))
        .otlp_endpoint(config.otlp_endpoint.clone())
        .build();
    let _guard = twinlink_telemetry::init(&telemetry)?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        environment = %telemetry.environment(),
        "starting twinlink gateway"
    );

    let tokens = TokenIssuer::new(
        AuthConfig::builder()
            .secret(config.jwt_secret.as_str())
            .token_ttl(Duration::from_secs(config.token_ttl_secs))
            .build(),
    );
    let request_timeout = Duration::from_secs(config.request_timeout_secs);

    match config.storage {
        StorageBackendArg::Memory => {
            let service = DualStore::new(MemoryStore::primary(), MemoryStore::secondary());
            run_server(config.listen_addr, Arc::new(service), tokens, request_timeout).await?;
        }
        StorageBackendArg::Dual => {
            let relational = SqliteStore::connect(&config.sqlite_url).await?;
            info!(url = %config.sqlite_url, "connected to SQLite");

            let surreal = SurrealConfig::builder()
                .endpoint(config.surreal_endpoint.as_str())
                .namespace(config.surreal_namespace.as_str())
                .database(config.surreal_database.as_str())
                .username(config.surreal_username.clone())
                .password(config.surreal_password.clone())
                .build();
            let document = SurrealStore::connect(surreal).await?;
            info!(endpoint = %config.surreal_endpoint, "connected to SurrealDB");

            let service = DualStore::new(relational.clone(), document);
            let served =
                run_server(config.listen_addr, Arc::new(service), tokens, request_timeout).await;

            relational.close().await;
            info!("SQLite pool closed");
            served?;
        }
    }

    Ok(())
}

async fn run_server(
    listen_addr: SocketAddr,
    service: Arc<dyn LinkService>,
    tokens: TokenIssuer,
    request_timeout: Duration,
) -> std::io::Result<()> {
    let state = AppState::new(service, tokens, Arc::new(RandomGenerator::default()));
    let router = App::router(state, request_timeout);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining connections");
}
