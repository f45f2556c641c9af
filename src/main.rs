use anyhow::Context;
use chatroom::{
    app,
    config::{Config, STALE_AFTER, SWEEP_EVERY},
    db,
    participants::Sweeper,
    AppState,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let db_pool = db::connect(&config.database_url)
        .await
        .with_context(|| format!("could not open {}", config.database_url))?;

    let app_state = AppState::new(db_pool.clone());
    let sweeper = Sweeper::new(app_state.participants.clone(), STALE_AFTER, SWEEP_EVERY).spawn();

    let listener = tokio::net::TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("could not bind {}", config.listen_addr()))?;
    info!(addr = %config.listen_addr(), "server running");

    axum::serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    db_pool.close().await;
    info!("bye");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "no ctrl-c handler, running until killed");
        std::future::pending::<()>().await;
    }
}
