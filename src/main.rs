use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use krishi::api::{api_router, ApiContext};
use krishi::config;
use krishi::gateway::market::MarketGateway;
use krishi::gateway::weather::WeatherGateway;
use krishi::pipeline::classify::MockClassifier;
use krishi::store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    std::fs::create_dir_all(config::app_data_dir())?;
    let conn = store::open_store(&config::db_path())?;

    let ctx = ApiContext::new(
        Arc::new(MockClassifier),
        WeatherGateway::from_env(),
        MarketGateway::from_env(),
        conn,
    );

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config::bind_port()));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");
    axum::serve(listener, api_router(ctx)).await?;

    Ok(())
}
