//! Storage instance routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, middleware::AuthUser};
use gallery_core::storage::{HealthStatus, SelectionStrategy, StorageProfile, StorageSelector};
use gallery_core::units::format_file_size;

/// Creates the storage routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/storage/instances", get(list_instances))
        .route("/storage/select", get(select_instance))
        .route("/storage/instances/{id}", get(get_instance))
        .route("/storage/instances/{id}/health", get(check_instance_health))
}

/// Query parameters for instance selection.
#[derive(Debug, Deserialize)]
pub struct SelectQuery {
    /// Strategy name; defaults to `load_balance`.
    pub strategy: Option<String>,
}

/// Public view of a storage instance.
#[derive(Debug, Serialize)]
pub struct StorageInstanceResponse {
    /// Instance fields minus the access key.
    #[serde(flatten)]
    pub profile: StorageProfile,
    /// `max_object_size` for display.
    pub max_object_size_display: String,
}

impl From<&StorageProfile> for StorageInstanceResponse {
    fn from(profile: &StorageProfile) -> Self {
        Self {
            max_object_size_display: format_file_size(profile.max_object_size),
            profile: profile.clone(),
        }
    }
}

/// Response for a selection.
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    /// Strategy that was applied.
    pub strategy: &'static str,
    /// Chosen instance.
    pub instance: StorageInstanceResponse,
}

/// GET `/storage/instances` - List configured instances in priority order.
async fn list_instances(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Json<Vec<StorageInstanceResponse>> {
    Json(
        state
            .storage
            .profiles()
            .iter()
            .map(StorageInstanceResponse::from)
            .collect(),
    )
}

/// GET `/storage/select` - Pick an instance for an upload.
async fn select_instance(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SelectQuery>,
) -> Json<SelectionResponse> {
    let strategy = query
        .strategy
        .as_deref()
        .map_or(SelectionStrategy::LoadBalance, SelectionStrategy::parse);
    let profile = StorageSelector::new(&state.storage).select_profile(strategy);

    Json(SelectionResponse {
        strategy: strategy.as_str(),
        instance: profile.into(),
    })
}

/// GET `/storage/instances/{id}` - Resolve an instance; unknown ids get the default.
async fn get_instance(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Json<StorageInstanceResponse> {
    Json(state.storage.get_profile(Some(id.as_str())).into())
}

/// GET `/storage/instances/{id}/health` - Probe an instance.
async fn check_instance_health(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Json<HealthStatus> {
    Json(state.health_probe.check(Some(id.as_str())).await)
}
