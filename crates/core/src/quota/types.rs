//! Quota domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Limit applied when a profile has none stored, in MB.
pub const DEFAULT_UPLOAD_LIMIT_MB: i64 = 500;

/// Upload allowance in megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadLimit {
    /// Bounded allowance.
    Limited(Decimal),
    /// No bound (administrators).
    Unlimited,
}

impl UploadLimit {
    /// External value for `Unlimited`.
    pub const UNLIMITED_SENTINEL: Decimal = Decimal::NEGATIVE_ONE;

    /// Megabytes, or `-1` for `Unlimited`.
    #[must_use]
    pub const fn as_sentinel_mb(self) -> Decimal {
        match self {
            Self::Limited(mb) => mb,
            Self::Unlimited => Self::UNLIMITED_SENTINEL,
        }
    }
}

/// Serialized as a decimal string with `"-1"` for `Unlimited`, like every
/// other MB quantity in responses. Clients parse it before comparing.
impl Serialize for UploadLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::str::serialize(&self.as_sentinel_mb(), serializer)
    }
}

/// Raw quota columns of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaRecord {
    /// Stored limit; `None` means the default applies.
    pub upload_limit_mb: Option<Decimal>,
    /// Stored cumulative usage; `None` means nothing uploaded yet.
    pub total_uploaded_mb: Option<Decimal>,
    /// Administrator flag.
    pub is_admin: bool,
}

/// Result of an upload limit check.
///
/// MB fields serialize as decimal strings (`"49.99"`, `"-1"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadLimitInfo {
    /// Allowance, `Unlimited` for administrators.
    pub limit: UploadLimit,
    /// Megabytes already uploaded.
    #[serde(with = "rust_decimal::serde::str")]
    pub used_mb: Decimal,
    /// `max(0, limit - used)`, `Unlimited` for administrators.
    pub remaining: UploadLimit,
    /// Administrator flag.
    pub is_admin: bool,
    /// Whether the candidate file fits.
    pub can_upload: bool,
}

/// Usage row for the administrator overview. MB fields serialize as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserUsageStats {
    /// Profile ID.
    pub user_id: Uuid,
    /// Email address.
    pub email: Option<String>,
    /// Display name.
    pub full_name: Option<String>,
    /// Administrator flag.
    pub is_admin: bool,
    /// Stored limit, or the default when none is stored.
    #[serde(with = "rust_decimal::serde::str")]
    pub limit_mb: Decimal,
    /// Megabytes uploaded.
    #[serde(with = "rust_decimal::serde::str")]
    pub used_mb: Decimal,
    /// Profile creation time.
    pub created_at: DateTime<Utc>,
}
