//! Storage instance table.

use std::collections::HashSet;

use gallery_shared::{StorageInstanceConfig, StorageSettings};
use serde::Serialize;

use super::error::StorageError;

/// Id every unknown or missing lookup resolves to.
pub const DEFAULT_STORAGE_ID: &str = "storage1";

/// One configured storage back-end.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct StorageProfile {
    /// Instance id (`storage1..storageN`).
    pub id: String,
    /// Supabase project URL.
    pub endpoint_url: String,
    /// S3 access key id. Never serialized.
    #[serde(skip)]
    pub access_key: String,
    /// S3 secret access key. Never serialized.
    #[serde(skip)]
    pub secret_key: String,
    /// Bucket uploads land in.
    pub bucket_name: String,
    /// Largest object the instance accepts, in bytes.
    pub max_object_size: u64,
    /// Region label.
    pub region: String,
}

impl std::fmt::Debug for StorageProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageProfile")
            .field("id", &self.id)
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key", &"[hidden]")
            .field("secret_key", &"[hidden]")
            .field("bucket_name", &self.bucket_name)
            .field("max_object_size", &self.max_object_size)
            .field("region", &self.region)
            .finish()
    }
}

impl StorageProfile {
    /// S3-compatible endpoint of the project (`{url}/storage/v1/s3`).
    #[must_use]
    pub fn s3_endpoint(&self) -> String {
        format!("{}/storage/v1/s3", self.endpoint_url.trim_end_matches('/'))
    }
}

impl From<&StorageInstanceConfig> for StorageProfile {
    fn from(config: &StorageInstanceConfig) -> Self {
        Self {
            id: config.id.clone(),
            endpoint_url: config.url.clone(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
            bucket_name: config.bucket.clone(),
            max_object_size: config.max_size_bytes,
            region: config.region.clone(),
        }
    }
}

/// Immutable, ordered table of storage instances.
///
/// Built once at startup and shared. Order is configuration order and is
/// stable for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct StorageRegistry {
    profiles: Vec<StorageProfile>,
}

impl StorageRegistry {
    /// Create a registry from profiles in priority order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the table is empty or ids repeat.
    pub fn new(profiles: Vec<StorageProfile>) -> Result<Self, StorageError> {
        if profiles.is_empty() {
            return Err(StorageError::configuration(
                "at least one storage instance is required",
            ));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = profiles.iter().find(|p| !seen.insert(p.id.as_str())) {
            return Err(StorageError::configuration(format!(
                "duplicate storage instance id: {}",
                dup.id
            )));
        }

        Ok(Self { profiles })
    }

    /// Create a registry from loaded settings.
    ///
    /// # Errors
    ///
    /// See [`StorageRegistry::new`].
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        Self::new(settings.instances.iter().map(StorageProfile::from).collect())
    }

    /// Resolve an instance by id.
    ///
    /// Unknown or missing ids resolve to the default profile instead of
    /// failing. Callers that need to know whether the id matched should
    /// compare the returned profile's id.
    #[must_use]
    pub fn get_profile(&self, id: Option<&str>) -> &StorageProfile {
        id.and_then(|id| self.find(id))
            .unwrap_or_else(|| self.default_profile())
    }

    /// Exact lookup without fallback.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&StorageProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// `storage1` if configured, else the primary.
    #[must_use]
    pub fn default_profile(&self) -> &StorageProfile {
        self.find(DEFAULT_STORAGE_ID)
            .unwrap_or_else(|| self.primary())
    }

    /// First configured instance.
    #[must_use]
    pub fn primary(&self) -> &StorageProfile {
        // Non-empty by construction.
        &self.profiles[0]
    }

    /// All profiles in configuration order.
    #[must_use]
    pub fn profiles(&self) -> &[StorageProfile] {
        &self.profiles
    }

    /// Number of configured instances. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the table is empty. Never true after construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Instance ids in configuration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.id.as_str())
    }
}
