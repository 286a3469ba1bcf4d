use std::sync::Arc;

use folio::{
    app, auth,
    config::Config,
    db::SqliteStore,
    store::{CachedStore, DiskObjectStore},
    AppState, STORAGE_ROUTE,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;

    let db = SqliteStore::connect(&config.database_url).await?;
    info!("connected to {}", config.database_url);

    let app_state = AppState {
        store: Arc::new(CachedStore::new(db)),
        objects: Arc::new(DiskObjectStore::new(&config.storage_dir, STORAGE_ROUTE)),
        auth: auth::from_config(&config.auth),
    };

    let app = app(app_state, &config);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("listening on http://{}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await?;
    Ok(())
}

async fn shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("couldn't listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
