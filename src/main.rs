use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fridge_monitor::{
    api::{self, AppState},
    config::Config,
    db,
    notifier::Notifier,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env; a missing file is fine, env vars may be set externally
    let _ = dotenvy::dotenv();

    // Initialise tracing; RUST_LOG overrides the default filter
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx::query=warn")),
        )
        .init();

    // Load config
    let config = Config::from_env()?;
    config.log_config();

    // Connect to DB and run migrations
    let pool = db::create_pool(&config.database_url, config.db_pool_max).await?;
    db::run_migrations(&pool).await?;
    info!("Database ready");

    // Outbound alerts
    let notifier = Notifier::new(config.notifier.clone())?;
    info!(enabled = notifier.is_enabled(), "Notifier ready");

    // Start HTTP server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    let state = AppState::new(pool, notifier, config.utc_offset);
    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
