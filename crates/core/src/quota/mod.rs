//! Per-user upload quotas.
//!
//! This module provides business logic for upload limits including:
//! - Limit checks before an upload
//! - Usage accounting after an upload
//! - Administrative limit changes and usage listings
//!
//! Authorization is not enforced here. Callers must restrict `set_limit`
//! and `list_usage_stats` to administrators.

mod error;
mod service;
mod types;


pub use error::QuotaError;
pub use service::{ProfileStore, QuotaLedger};
pub use types::{DEFAULT_UPLOAD_LIMIT_MB, QuotaRecord, UploadLimit, UploadLimitInfo, UserUsageStats};
