use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plex_tvtime::config::AppConfig;
use plex_tvtime::server::{self, AppState};
use plex_tvtime::service::ScrobbleService;
use plex_tvtime::shutdown::cancel_on_signal;
use plex_tvtime::tracking::{HttpTrackingClient, TrackingClient};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plex_tvtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let client = match HttpTrackingClient::new(&config.tvtime_base_url, config.credentials.clone())
    {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "Unable to build TV Time client");
            return ExitCode::FAILURE;
        }
    };

    match client.login().await {
        Ok(()) => info!(user = %config.credentials.username, "Logged in to TV Time"),
        Err(e) if e.kind.is_fatal() => {
            error!(error = %e, "Unable to authenticate with TV Time, please check your credentials");
            return ExitCode::FAILURE;
        }
        Err(e) => warn!(error = %e, "Initial TV Time login failed, will retry on first delivery"),
    }

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "Unable to bind listener");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = CancellationToken::new();
    cancel_on_signal(shutdown.clone());

    let (service, supervisor) = ScrobbleService::start(
        config.filter(),
        client,
        config.delivery_policy(),
        shutdown.clone(),
    );

    let server_shutdown = shutdown.clone();
    let server = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, AppState::new(service), server_shutdown.clone()).await
        {
            error!(error = %e, "HTTP server failed");
            server_shutdown.cancel();
        }
    });

    let reason = supervisor.wait().await;
    shutdown.cancel();
    if let Err(e) = server.await {
        error!(error = %e, "HTTP server task failed");
    }

    info!(?reason, code = reason.exit_code(), "Exiting");
    ExitCode::from(reason.exit_code() as u8)
}
