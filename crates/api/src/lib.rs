//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for storage selection, health, and upload quotas
//! - Authentication middleware for Supabase access tokens
//! - Error rendering for domain errors

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use gallery_core::storage::{HealthProbe, StorageRegistry, SupabaseReachability};
use gallery_shared::JwtService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Storage instance table.
    pub storage: Arc<StorageRegistry>,
    /// Reachability probe over `storage`.
    pub health_probe: Arc<HealthProbe<SupabaseReachability>>,
}

impl AppState {
    /// Build state, wiring the health probe to the registry.
    #[must_use]
    pub fn new(db: DatabaseConnection, jwt_service: JwtService, storage: StorageRegistry) -> Self {
        let storage = Arc::new(storage);
        Self {
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            health_probe: Arc::new(HealthProbe::new(storage.clone(), SupabaseReachability)),
            storage,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
