//! Quota ledger implementation.

use std::future::Future;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::QuotaError;
use super::types::{
    DEFAULT_UPLOAD_LIMIT_MB, QuotaRecord, UploadLimit, UploadLimitInfo, UserUsageStats,
};
use crate::units::bytes_to_mb;

/// Repository trait for the `profiles` relation.
///
/// This trait is implemented by the db crate to provide actual database operations.
/// Implementations report read failures as `QuotaError::Lookup` and write
/// failures as `QuotaError::Update`.
pub trait ProfileStore: Send + Sync {
    /// Read the quota columns of one profile.
    fn find_quota(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Option<QuotaRecord>, QuotaError>> + Send;

    /// Overwrite the upload limit. Returns whether a profile matched.
    fn update_limit(
        &self,
        user_id: Uuid,
        limit_mb: Decimal,
    ) -> impl Future<Output = Result<bool, QuotaError>> + Send;

    /// Atomically add to the cumulative usage. Returns whether a profile matched.
    fn add_usage(
        &self,
        user_id: Uuid,
        delta_mb: Decimal,
    ) -> impl Future<Output = Result<bool, QuotaError>> + Send;

    /// Usage rows for every profile.
    fn list_usage(&self) -> impl Future<Output = Result<Vec<UserUsageStats>, QuotaError>> + Send;
}

/// Computes and enforces per-user upload limits.
pub struct QuotaLedger<S: ProfileStore> {
    store: Arc<S>,
}

impl<S: ProfileStore> QuotaLedger<S> {
    /// Create a new ledger.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Check whether a file of `file_size_bytes` fits the user's allowance.
    ///
    /// # Errors
    ///
    /// Returns `QuotaError::Lookup` if the profile cannot be read or does not exist.
    pub async fn check_limit(
        &self,
        user_id: Uuid,
        file_size_bytes: u64,
    ) -> Result<UploadLimitInfo, QuotaError> {
        let record = self
            .store
            .find_quota(user_id)
            .await?
            .ok_or_else(|| QuotaError::lookup(format!("profile {user_id} not found")))?;

        let info = Self::evaluate(&record, file_size_bytes);
        debug!(
            user_id = %user_id,
            file_size_bytes,
            can_upload = info.can_upload,
            "Upload limit checked"
        );

        Ok(info)
    }

    /// Pure limit evaluation over stored quota columns.
    #[must_use]
    pub fn evaluate(record: &QuotaRecord, file_size_bytes: u64) -> UploadLimitInfo {
        let limit_mb = record
            .upload_limit_mb
            .unwrap_or_else(|| Decimal::from(DEFAULT_UPLOAD_LIMIT_MB));
        let used_mb = record
            .total_uploaded_mb
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO);
        let file_mb = bytes_to_mb(file_size_bytes);

        if record.is_admin {
            return UploadLimitInfo {
                limit: UploadLimit::Unlimited,
                used_mb,
                remaining: UploadLimit::Unlimited,
                is_admin: true,
                can_upload: true,
            };
        }

        UploadLimitInfo {
            limit: UploadLimit::Limited(limit_mb),
            used_mb,
            remaining: UploadLimit::Limited((limit_mb - used_mb).max(Decimal::ZERO)),
            is_admin: false,
            can_upload: used_mb + file_mb <= limit_mb,
        }
    }

    /// Change a user's upload limit.
    ///
    /// Performs no authorization check. Returns `false` when no profile matched.
    ///
    /// # Errors
    ///
    /// Returns `QuotaError::InvalidLimit` for negative limits and
    /// `QuotaError::Update` if the store write fails.
    pub async fn set_limit(&self, user_id: Uuid, new_limit_mb: Decimal) -> Result<bool, QuotaError> {
        if new_limit_mb < Decimal::ZERO {
            return Err(QuotaError::InvalidLimit(format!(
                "{new_limit_mb} MB is negative"
            )));
        }

        let updated = self.store.update_limit(user_id, new_limit_mb).await?;
        info!(user_id = %user_id, limit_mb = %new_limit_mb, updated, "Upload limit changed");

        Ok(updated)
    }

    /// Record a completed upload against the user's usage.
    ///
    /// Separate from [`QuotaLedger::check_limit`]: two concurrent uploads for
    /// the same user can both pass the check before either is recorded.
    ///
    /// # Errors
    ///
    /// Returns `QuotaError::Update` if the write fails or no profile matched.
    pub async fn record_upload(&self, user_id: Uuid, file_size_bytes: u64) -> Result<(), QuotaError> {
        let delta_mb = bytes_to_mb(file_size_bytes);

        if !self.store.add_usage(user_id, delta_mb).await? {
            return Err(QuotaError::update(format!("profile {user_id} not found")));
        }

        debug!(user_id = %user_id, delta_mb = %delta_mb, "Upload recorded");
        Ok(())
    }

    /// Usage of every user, heaviest first.
    ///
    /// Performs no authorization check.
    ///
    /// # Errors
    ///
    /// Returns `QuotaError::Lookup` if the store read fails.
    pub async fn list_usage_stats(&self) -> Result<Vec<UserUsageStats>, QuotaError> {
        let mut stats = self.store.list_usage().await?;
        stats.sort_by(|a, b| b.used_mb.cmp(&a.used_mb));
        Ok(stats)
    }
}
