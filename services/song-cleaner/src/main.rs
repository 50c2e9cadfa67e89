//!
//! src/main.rs
//!
//! Reads configuration, starts the logger and serves the
//! cleaned song api until interrupted
//!

use song_cleaner::{api, config, fetch, logging, CleanerError};

#[tokio::main]
async fn main() -> Result<(), CleanerError> {
    let cfgs = config::load_config()?;
    let _guard = logging::init_logging(&cfgs.logging)?;

    tracing::info!(
        service="song-cleaner",
        version=%env!("CARGO_PKG_VERSION"),
        source=%cfgs.source.source,
        "starting"
    );

    let loader = fetch::SourceLoader::new(&cfgs.http)?;
    let state  = api::AppState::new(loader, cfgs.source.source.clone());
    let app    = api::build_router(state);

    let addr = cfgs.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    tracing::info!(addr=%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error=%e, "shutdown.signal");
        // no signal handler, serve until killed
        std::future::pending::<()>().await;
    }
}
