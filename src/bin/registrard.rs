//! Serves the target registration API.
//!
//! Usage:
//!
//! ```text
//! registrard --app-id 1234 --app-private-key-path /etc/registrar/app.pem
//! ```
//!
//! Targets are stored in `PostgreSQL` when `--database-url` is given and in
//! process memory otherwise.

use std::sync::Arc;

use clap::Parser;
use eyre::WrapErr;
use mockable::DefaultClock;
use runner_registrar::{
    api::build_router,
    config::{Args, RegistrarConfig},
    target::{
        adapters::{
            github::{GitHubApp, GitHubPlatformClient, build_http_client},
            memory::InMemoryTargetRepository,
            postgres::{PostgresTargetRepository, build_pool},
        },
        ports::TargetRepository,
        services::{RegistrationSettings, TargetRegistrationService},
    },
    telemetry,
};
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();
    telemetry::init(args.log_format)?;
    let config = RegistrarConfig::load(args).wrap_err("invalid configuration")?;

    match config.database_url.clone() {
        Some(url) => {
            let pool = tokio::task::spawn_blocking(move || build_pool(url.expose_secret()))
                .await
                .wrap_err("connection pool task panicked")??;
            let repository = PostgresTargetRepository::new(pool);
            repository
                .ensure_schema()
                .await
                .wrap_err("failed to prepare the targets table")?;
            info!(storage = "postgres", "target store ready");
            serve(Arc::new(repository), config).await
        }
        None => {
            warn!(storage = "memory", "no database configured; targets are lost on restart");
            serve(Arc::new(InMemoryTargetRepository::new()), config).await
        }
    }
}

async fn serve<R>(repository: Arc<R>, config: RegistrarConfig) -> eyre::Result<()>
where
    R: TargetRepository + 'static,
{
    let http = build_http_client(config.request_timeout)?;
    let clock = Arc::new(DefaultClock);
    let platform = Arc::new(GitHubPlatformClient::new(http.clone()));
    let app = Arc::new(GitHubApp::new(
        config.app_id,
        config.app_private_key,
        config.platform.clone(),
        http,
        Arc::clone(&clock),
    ));
    let settings = RegistrationSettings {
        platform: config.platform,
        merge_policy: config.merge_policy,
    };
    info!(
        platform = %settings.platform,
        merge_policy = %settings.merge_policy,
        timeout_secs = config.request_timeout.as_secs(),
        "registration service configured"
    );

    let service = Arc::new(TargetRegistrationService::new(
        repository, platform, app, clock, settings,
    ));
    let router = build_router(service, config.request_timeout);

    let listener = TcpListener::bind(config.listen)
        .await
        .wrap_err_with(|| format!("failed to bind {}", config.listen))?;
    info!(address = %config.listen, "registrar listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    info!("registrar stopped");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for interrupt");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
        () = interrupt => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
