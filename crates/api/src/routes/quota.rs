//! Upload quota routes for the signed-in user and administrators.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use gallery_core::quota::{
    ProfileStore, QuotaLedger, UploadLimit, UploadLimitInfo, UserUsageStats,
};
use gallery_core::units::{format_file_size, mb_to_bytes};
use gallery_db::ProfileRepository;
use gallery_shared::AppError;

/// Creates the quota routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me/upload-limit", get(check_upload_limit))
        .route("/me/uploads", post(record_upload))
        .route("/admin/users/{user_id}/upload-limit", put(update_upload_limit))
        .route("/admin/upload-stats", get(list_upload_stats))
}

fn ledger(state: &AppState) -> QuotaLedger<ProfileRepository> {
    QuotaLedger::new(Arc::new(ProfileRepository::new(state.db.clone())))
}

/// Rejects callers whose profile is missing or not flagged admin.
async fn require_admin(repo: &ProfileRepository, user_id: Uuid) -> Result<(), ApiError> {
    let is_admin = repo
        .find_quota(user_id)
        .await?
        .is_some_and(|record| record.is_admin);

    if is_admin {
        Ok(())
    } else {
        warn!(user_id = %user_id, "Non-admin attempted an admin quota operation");
        Err(AppError::Forbidden("administrator access required".to_string()).into())
    }
}

fn display_mb(limit: UploadLimit) -> String {
    match limit {
        UploadLimit::Limited(mb) => format_file_size(mb_to_bytes(mb)),
        UploadLimit::Unlimited => "Unlimited".to_string(),
    }
}

/// Query parameters for a limit check.
#[derive(Debug, Deserialize)]
pub struct UploadLimitQuery {
    /// Candidate file size in bytes; omitted means 0.
    pub file_size: Option<u64>,
}

/// Limit check with display strings.
#[derive(Debug, Serialize)]
pub struct UploadLimitResponse {
    /// Raw figures; unlimited values appear as `-1`.
    #[serde(flatten)]
    pub info: UploadLimitInfo,
    /// Candidate file size in bytes.
    pub file_size: u64,
    /// Candidate file size for display.
    pub file_size_display: String,
    /// Usage for display.
    pub used_display: String,
    /// Remaining allowance for display.
    pub remaining_display: String,
}

/// Request body for recording a finished upload.
#[derive(Debug, Deserialize)]
pub struct RecordUploadRequest {
    /// Uploaded size in bytes.
    pub file_size: u64,
}

/// Request body for changing a user's limit.
#[derive(Debug, Deserialize)]
pub struct UpdateLimitRequest {
    /// New limit in MB.
    pub limit_mb: Decimal,
}

/// Response for a limit change.
#[derive(Debug, Serialize)]
pub struct UpdateLimitResponse {
    /// Affected profile.
    pub user_id: Uuid,
    /// Limit now in effect, as a decimal string.
    #[serde(with = "rust_decimal::serde::str")]
    pub limit_mb: Decimal,
}

/// GET `/me/upload-limit` - Check whether a file fits the caller's allowance.
async fn check_upload_limit(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UploadLimitQuery>,
) -> Result<Json<UploadLimitResponse>, ApiError> {
    let file_size = query.file_size.unwrap_or(0);
    let info = ledger(&state).check_limit(auth.user_id(), file_size).await?;

    Ok(Json(UploadLimitResponse {
        file_size,
        file_size_display: format_file_size(file_size),
        used_display: display_mb(UploadLimit::Limited(info.used_mb)),
        remaining_display: display_mb(info.remaining),
        info,
    }))
}

/// POST `/me/uploads` - Add a finished upload to the caller's usage.
async fn record_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<RecordUploadRequest>,
) -> Result<StatusCode, ApiError> {
    ledger(&state)
        .record_upload(auth.user_id(), payload.file_size)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT `/admin/users/{user_id}/upload-limit` - Change a user's limit.
async fn update_upload_limit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateLimitRequest>,
) -> Result<Json<UpdateLimitResponse>, ApiError> {
    let repo = ProfileRepository::new(state.db.clone());
    require_admin(&repo, auth.user_id()).await?;

    let updated = QuotaLedger::new(Arc::new(repo))
        .set_limit(user_id, payload.limit_mb)
        .await?;
    if !updated {
        return Err(AppError::NotFound(format!("profile {user_id}")).into());
    }

    info!(admin_id = %auth.user_id(), user_id = %user_id, "Upload limit updated by admin");
    Ok(Json(UpdateLimitResponse {
        user_id,
        limit_mb: payload.limit_mb,
    }))
}

/// GET `/admin/upload-stats` - Usage of all users, heaviest first.
async fn list_upload_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserUsageStats>>, ApiError> {
    let repo = ProfileRepository::new(state.db.clone());
    require_admin(&repo, auth.user_id()).await?;

    let stats = QuotaLedger::new(Arc::new(repo)).list_usage_stats().await?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use serde_json::json;
    use uuid::Uuid;

    use crate::routes::test_support::{json_body, send, state, token};
    use gallery_db::entities::profiles;

    fn profile(
        id: Uuid,
        is_admin: bool,
        limit: Option<Decimal>,
        used: Option<Decimal>,
    ) -> profiles::Model {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap().into();
        profiles::Model {
            id,
            email: Some("mira@example.com".to_string()),
            full_name: None,
            is_admin,
            upload_limit_mb: limit,
            total_uploaded_mb: used,
            created_at: created,
            updated_at: created,
        }
    }

    fn one_row_updated() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    #[tokio::test]
    async fn test_upload_limit_requires_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let response = send(state(db), "GET", "/api/v1/me/upload-limit", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_limit_over_allowance() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![profile(user_id, false, Some(dec!(500)), Some(dec!(450.01)))]])
            .into_connection();
        let state = state(db);
        let token = token(&state, user_id);

        let response = send(
            state,
            "GET",
            "/api/v1/me/upload-limit?file_size=52428800",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["can_upload"], false);
        assert_eq!(body["limit"], "500");
        assert_eq!(body["remaining"], "49.99");
        assert_eq!(body["file_size_display"], "50 MB");
    }

    #[tokio::test]
    async fn test_upload_limit_admin_sentinel() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![profile(user_id, true, Some(dec!(10)), Some(dec!(9000)))]])
            .into_connection();
        let state = state(db);
        let token = token(&state, user_id);

        let body = json_body(
            send(
                state,
                "GET",
                "/api/v1/me/upload-limit?file_size=10737418240",
                Some(&token),
                None,
            )
            .await,
        )
        .await;

        assert_eq!(body["can_upload"], true);
        assert_eq!(body["is_admin"], true);
        assert_eq!(body["limit"], "-1");
        assert_eq!(body["remaining"], "-1");
        assert_eq!(body["remaining_display"], "Unlimited");
    }

    #[tokio::test]
    async fn test_upload_limit_store_failure_is_500() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let state = state(db);
        let token = token(&state, Uuid::new_v4());

        let response = send(state, "GET", "/api/v1/me/upload-limit", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "DATABASE_ERROR");
    }

    #[tokio::test]
    async fn test_record_upload_returns_no_content() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([one_row_updated()])
            .into_connection();
        let state = state(db);
        let token = token(&state, Uuid::new_v4());

        let response = send(
            state,
            "POST",
            "/api/v1/me/uploads",
            Some(&token),
            Some(json!({ "file_size": 3_145_728 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        let caller = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![profile(caller, false, None, None)],
                vec![profile(caller, false, None, None)],
            ])
            .into_connection();
        let state = state(db);
        let token = token(&state, caller);

        let response = send(
            state.clone(),
            "PUT",
            &format!("/api/v1/admin/users/{}/upload-limit", Uuid::new_v4()),
            Some(&token),
            Some(json!({ "limit_mb": 1000 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(state, "GET", "/api/v1/admin/upload-stats", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_caller_profile_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<profiles::Model>::new()])
            .into_connection();
        let state = state(db);
        let token = token(&state, Uuid::new_v4());

        let response = send(state, "GET", "/api/v1/admin/upload-stats", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_updates_limit() {
        let admin = Uuid::new_v4();
        let target = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![profile(admin, true, None, None)]])
            .append_exec_results([one_row_updated()])
            .into_connection();
        let state = state(db);
        let token = token(&state, admin);

        let response = send(
            state,
            "PUT",
            &format!("/api/v1/admin/users/{target}/upload-limit"),
            Some(&token),
            Some(json!({ "limit_mb": "1000" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["user_id"], target.to_string());
        assert_eq!(body["limit_mb"], "1000");
    }

    #[tokio::test]
    async fn test_admin_update_unknown_user_not_found() {
        let admin = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![profile(admin, true, None, None)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let state = state(db);
        let token = token(&state, admin);

        let response = send(
            state,
            "PUT",
            &format!("/api/v1/admin/users/{}/upload-limit", Uuid::new_v4()),
            Some(&token),
            Some(json!({ "limit_mb": 250 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_negative_limit_rejected() {
        let admin = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![profile(admin, true, None, None)]])
            .into_connection();
        let state = state(db);
        let token = token(&state, admin);

        let response = send(
            state,
            "PUT",
            &format!("/api/v1/admin/users/{}/upload-limit", Uuid::new_v4()),
            Some(&token),
            Some(json!({ "limit_mb": -5 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_admin_lists_usage_heaviest_first() {
        let admin = Uuid::new_v4();
        let light = Uuid::new_v4();
        let heavy = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![profile(admin, true, None, None)]])
            .append_query_results([vec![
                profile(light, false, None, Some(dec!(12))),
                profile(heavy, false, Some(dec!(2000)), Some(dec!(1500))),
            ]])
            .into_connection();
        let state = state(db);
        let token = token(&state, admin);

        let response = send(state, "GET", "/api/v1/admin/upload-stats", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body[0]["user_id"], heavy.to_string());
        assert_eq!(body[0]["used_mb"], "1500");
        assert_eq!(body[1]["limit_mb"], "500");
    }
}
