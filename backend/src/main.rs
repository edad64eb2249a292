//! Contract Farming Marketplace - Backend Server

use std::{net::SocketAddr, sync::Arc};

use contract_farming::{create_app, store, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "contract_farming=debug,cfm_server=debug,tower_http=debug,sqlx=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Contract Farming Marketplace Server");
    tracing::info!("Environment: {}", config.environment);

    if config.is_production() && config.jwt.secret == "development-secret-key" {
        anyhow::bail!("jwt.secret must be set in production");
    }

    // Connect to the remote store
    let store = store::connect(&config).await?;
    tracing::info!("Remote store: {}", store.name());

    // Create application state
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
