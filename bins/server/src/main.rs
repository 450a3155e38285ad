//! Gallery API Server
//!
//! Main entry point for the gallery media backend.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gallery_api::{AppState, create_router};
use gallery_core::storage::StorageRegistry;
use gallery_db::connect;
use gallery_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gallery=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    let storage = StorageRegistry::from_settings(&config.storage)?;
    for profile in storage.profiles() {
        info!(
            storage_id = %profile.id,
            endpoint = %profile.endpoint_url,
            bucket = %profile.bucket_name,
            "Storage instance configured"
        );
    }

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        audience: config.jwt.audience.clone(),
        ..JwtConfig::default()
    });

    let app = create_router(AppState::new(db, jwt_service, storage));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
