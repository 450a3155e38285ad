//! Advisory reachability checks for storage instances.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use opendal::{Operator, services};
use serde::Serialize;
use tracing::{debug, warn};

use super::error::StorageError;
use super::registry::{StorageProfile, StorageRegistry};

/// Outcome of a health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Instance that was probed (after default resolution).
    pub storage_id: String,
    /// Whether the instance answered.
    pub healthy: bool,
    /// Round-trip time of a successful probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Failure description of an unsuccessful probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// External reachability call behind a health probe.
pub trait Reachability: Send + Sync {
    /// Contact the instance. Any error means unreachable.
    fn probe(
        &self,
        profile: &StorageProfile,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Probes Supabase Storage through its S3-compatible endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct SupabaseReachability;

impl SupabaseReachability {
    /// Build an OpenDAL S3 operator for a profile.
    fn create_operator(profile: &StorageProfile) -> Result<Operator, StorageError> {
        let builder = services::S3::default()
            .endpoint(&profile.s3_endpoint())
            .bucket(&profile.bucket_name)
            .region(&profile.region)
            .access_key_id(&profile.access_key)
            .secret_access_key(&profile.secret_key);

        Ok(Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish())
    }
}

impl Reachability for SupabaseReachability {
    async fn probe(&self, profile: &StorageProfile) -> Result<(), StorageError> {
        let operator = Self::create_operator(profile)?;
        operator.check().await.map_err(StorageError::from)
    }
}

/// Best-effort health check. Never fails; errors become `healthy: false`.
pub struct HealthProbe<R: Reachability> {
    registry: Arc<StorageRegistry>,
    reachability: R,
}

impl<R: Reachability> HealthProbe<R> {
    /// Create a probe over a registry.
    #[must_use]
    pub fn new(registry: Arc<StorageRegistry>, reachability: R) -> Self {
        Self {
            registry,
            reachability,
        }
    }

    /// Check one instance. Unknown ids probe the default instance.
    pub async fn check(&self, storage_id: Option<&str>) -> HealthStatus {
        let profile = self.registry.get_profile(storage_id);
        let started = Instant::now();

        match self.reachability.probe(profile).await {
            Ok(()) => {
                let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                debug!(storage_id = %profile.id, latency_ms, "Storage instance healthy");
                HealthStatus {
                    storage_id: profile.id.clone(),
                    healthy: true,
                    latency_ms: Some(latency_ms),
                    error_message: None,
                }
            }
            Err(e) => {
                warn!(storage_id = %profile.id, error = %e, "Storage health check failed");
                HealthStatus {
                    storage_id: profile.id.clone(),
                    healthy: false,
                    latency_ms: None,
                    error_message: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::registry::tests::registry;

    struct AlwaysUp;

    impl Reachability for AlwaysUp {
        async fn probe(&self, _profile: &StorageProfile) -> Result<(), StorageError> {
            Ok(())
        }
    }

    /// Fails for one instance id.
    struct DownFor(&'static str);

    impl Reachability for DownFor {
        async fn probe(&self, profile: &StorageProfile) -> Result<(), StorageError> {
            if profile.id == self.0 {
                Err(StorageError::operation("connection refused"))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_healthy_instance_reports_latency() {
        let probe = HealthProbe::new(Arc::new(registry(4)), AlwaysUp);
        let status = probe.check(Some("storage2")).await;

        assert!(status.healthy);
        assert_eq!(status.storage_id, "storage2");
        assert!(status.latency_ms.is_some());
        assert!(status.error_message.is_none());
    }

    #[tokio::test]
    async fn test_failure_becomes_structured_result() {
        let probe = HealthProbe::new(Arc::new(registry(4)), DownFor("storage3"));
        let status = probe.check(Some("storage3")).await;

        assert!(!status.healthy);
        assert!(status.latency_ms.is_none());
        assert_eq!(
            status.error_message.as_deref(),
            Some("storage operation failed: connection refused")
        );
    }

    #[tokio::test]
    async fn test_unknown_id_probes_default_instance() {
        let probe = HealthProbe::new(Arc::new(registry(4)), DownFor("storage1"));
        let status = probe.check(Some("storage99")).await;

        assert_eq!(status.storage_id, "storage1");
        assert!(!status.healthy);
    }

    #[test]
    fn test_operator_builds_for_configured_profile() {
        let registry = registry(1);
        assert!(SupabaseReachability::create_operator(registry.primary()).is_ok());
    }

    #[test]
    fn test_serialized_status_omits_empty_fields() {
        let status = HealthStatus {
            storage_id: "storage1".to_string(),
            healthy: false,
            latency_ms: None,
            error_message: Some("timeout".to_string()),
        };
        let json = serde_json::to_value(&status).expect("serializable");
        assert!(json.get("latency_ms").is_none());
        assert_eq!(json["error_message"], "timeout");
    }
}
