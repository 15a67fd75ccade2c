use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use talent_api::background;
use talent_api::config::ServerConfig;
use talent_api::router::build_app_router;
use talent_api::state::AppState;
use talent_api::store::CandidateStore;
use talent_integration::{ConnectorKeys, HttpIntegrationClient, TemplateCatalog};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talent_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Candidates ---
    let candidates = CandidateStore::load(config.candidates_file.as_deref())
        .expect("Failed to load candidates");
    tracing::info!(count = candidates.len(), "Candidate directory loaded");

    // --- Integration platform ---
    let client = HttpIntegrationClient::new(
        config.integration.api_url.clone(),
        config.integration.token.clone(),
    );
    let catalog = Arc::new(TemplateCatalog::new(
        Arc::new(client),
        ConnectorKeys {
            connection: config.integration.connection_key.clone(),
        },
    ));
    tracing::info!(
        api_url = %config.integration.api_url,
        connection = %config.integration.connection_key,
        "Integration client configured"
    );

    // --- App state ---
    let state = AppState::new(config.clone(), candidates, catalog);
    let sessions = Arc::clone(&state.sessions);

    // --- Background: idle session sweeper ---
    let sweeper_cancel = tokio_util::sync::CancellationToken::new();
    let sweeper = tokio::spawn(background::session_sweeper::run(
        Arc::clone(&sessions),
        config.session_idle_timeout,
        config.session_sweep_interval,
        sweeper_cancel.clone(),
    ));

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweeper_cancel.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Session sweeper task ended abnormally");
    }

    let open = sessions.len();
    tracing::info!(open, "Closing remaining onboarding sessions");
    let drain = tokio::task::spawn_blocking(move || sessions.close_all());
    if tokio::time::timeout(Duration::from_secs(config.shutdown_timeout_secs), drain)
        .await
        .is_err()
    {
        tracing::warn!("Timed out closing onboarding sessions");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
