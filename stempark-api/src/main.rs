use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use stempark_api::{app, AppState, MediaServing};
use stempark_store::{Config, FsMediaStore, InMemoryProductRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(config: &stempark_store::app_config::LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.filter.as_str().into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;
    init_tracing(&config.logging);
    tracing::info!("Starting STEM Park catalog API on port {}", config.server.port);

    let defaults = config
        .catalog
        .variant_defaults()
        .context("Invalid catalog pricing regions")?;

    tokio::fs::create_dir_all(&config.media.root_dir)
        .await
        .with_context(|| format!("Failed to create media dir {}", config.media.root_dir.display()))?;
    let media_store = FsMediaStore::new(&config.media.root_dir, &config.media.public_prefix);

    let app_state = AppState::new(
        Arc::new(InMemoryProductRepository::new()),
        Arc::new(media_store),
        defaults,
        MediaServing {
            root_dir: config.media.root_dir.clone(),
            public_prefix: config.media.public_prefix.clone(),
        },
        config.server.max_upload_bytes,
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
