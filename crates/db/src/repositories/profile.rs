//! Profile repository for quota bookkeeping.
//!
//! Implements the core `ProfileStore` trait using SeaORM.

use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::profiles;
use gallery_core::quota::{
    DEFAULT_UPLOAD_LIMIT_MB, ProfileStore, QuotaError, QuotaRecord, UserUsageStats,
};

/// Profile repository implementation.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl ProfileStore for ProfileRepository {
    async fn find_quota(&self, user_id: Uuid) -> Result<Option<QuotaRecord>, QuotaError> {
        let model = profiles::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| QuotaError::lookup(e.to_string()))?;

        Ok(model.map(|m| QuotaRecord {
            upload_limit_mb: m.upload_limit_mb,
            total_uploaded_mb: m.total_uploaded_mb,
            is_admin: m.is_admin,
        }))
    }

    async fn update_limit(&self, user_id: Uuid, limit_mb: Decimal) -> Result<bool, QuotaError> {
        let result = profiles::Entity::update_many()
            .col_expr(profiles::Column::UploadLimitMb, Expr::value(limit_mb))
            .col_expr(profiles::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(profiles::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| QuotaError::update(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn add_usage(&self, user_id: Uuid, delta_mb: Decimal) -> Result<bool, QuotaError> {
        // Single UPDATE so concurrent recordings never lose an increment
        let incremented = Expr::expr(Func::coalesce([
            Expr::col(profiles::Column::TotalUploadedMb).into(),
            Expr::value(Decimal::ZERO),
        ]))
        .add(delta_mb);

        let result = profiles::Entity::update_many()
            .col_expr(profiles::Column::TotalUploadedMb, incremented)
            .col_expr(profiles::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(profiles::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| QuotaError::update(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn list_usage(&self) -> Result<Vec<UserUsageStats>, QuotaError> {
        let models = profiles::Entity::find()
            .order_by_desc(profiles::Column::TotalUploadedMb)
            .all(self.db.as_ref())
            .await
            .map_err(|e| QuotaError::lookup(e.to_string()))?;

        Ok(models.into_iter().map(to_usage_stats).collect())
    }
}

/// Convert database model to a usage row.
fn to_usage_stats(model: profiles::Model) -> UserUsageStats {
    UserUsageStats {
        user_id: model.id,
        email: model.email,
        full_name: model.full_name,
        is_admin: model.is_admin,
        limit_mb: model
            .upload_limit_mb
            .unwrap_or_else(|| Decimal::from(DEFAULT_UPLOAD_LIMIT_MB)),
        used_mb: model.total_uploaded_mb.unwrap_or(Decimal::ZERO),
        created_at: model.created_at.with_timezone(&chrono::Utc),
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
