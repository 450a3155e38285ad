//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod health;
pub mod quota;
pub mod storage;

/// Creates the API router with public routes only.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(health::routes())
}

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(storage::routes())
        .merge(quota::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    api_routes().merge(protected_routes)
}
