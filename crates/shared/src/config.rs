//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Storage instances uploads are spread across.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Supabase project JWT secret.
    pub secret: String,
    /// Expected audience claim.
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_audience() -> String {
    "authenticated".to_string()
}

/// Storage instance table.
///
/// Order matters: the first entry is the primary instance and the
/// round-robin strategy indexes into this list.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Configured instances, `storage1..storageN`.
    #[serde(default = "default_storage_instances")]
    pub instances: Vec<StorageInstanceConfig>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            instances: default_storage_instances(),
        }
    }
}

/// Number of instances synthesized when none are configured.
pub const DEFAULT_STORAGE_INSTANCES: usize = 4;

/// Default per-object size cap: 50MB (Supabase free tier).
pub const DEFAULT_MAX_OBJECT_SIZE: u64 = 50 * 1024 * 1024;

fn default_storage_instances() -> Vec<StorageInstanceConfig> {
    (1..=DEFAULT_STORAGE_INSTANCES)
        .map(StorageInstanceConfig::from_env_or_placeholder)
        .collect()
}

/// One storage back-end (Supabase project + bucket).
#[derive(Clone, Deserialize)]
pub struct StorageInstanceConfig {
    /// Instance id, e.g. `storage1`.
    pub id: String,
    /// Project endpoint URL.
    pub url: String,
    /// S3 access key id from the project's storage settings.
    pub access_key: String,
    /// S3 secret access key paired with `access_key`.
    pub secret_key: String,
    /// Bucket name.
    pub bucket: String,
    /// Maximum object size in bytes.
    #[serde(default = "default_max_object_size")]
    pub max_size_bytes: u64,
    /// Region label.
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_max_object_size() -> u64 {
    DEFAULT_MAX_OBJECT_SIZE
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl std::fmt::Debug for StorageInstanceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageInstanceConfig")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("access_key", &"[hidden]")
            .field("secret_key", &"[hidden]")
            .field("bucket", &self.bucket)
            .field("max_size_bytes", &self.max_size_bytes)
            .field("region", &self.region)
            .finish()
    }
}

impl StorageInstanceConfig {
    /// Builds instance `n` from `GALLERY_STORAGE{n}_*` variables.
    ///
    /// Any variable that is unset falls back to a literal placeholder. The
    /// placeholders are not checked here; a misconfigured instance only shows
    /// up as an unhealthy probe.
    #[must_use]
    pub fn from_env_or_placeholder(n: usize) -> Self {
        let var = |field: &str| std::env::var(format!("GALLERY_STORAGE{n}_{field}")).ok();

        Self {
            id: format!("storage{n}"),
            url: var("URL").unwrap_or_else(|| format!("https://your-project-{n}.supabase.co")),
            access_key: var("KEY").unwrap_or_else(|| format!("your-access-key-id-{n}")),
            secret_key: var("SECRET").unwrap_or_else(|| format!("your-secret-key-{n}")),
            bucket: var("BUCKET").unwrap_or_else(|| "gallery-media".to_string()),
            max_size_bytes: var("MAX_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_OBJECT_SIZE),
            region: var("REGION").unwrap_or_else(default_region),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("GALLERY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
