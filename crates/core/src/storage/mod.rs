//! Multi-instance storage routing.
//!
//! Uploads are spread across several Supabase storage projects. This module
//! holds the immutable instance table, the strategies that pick an instance
//! for an upload, and an advisory reachability probe.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   select(strategy)   ┌──────────────────┐
//! │ StorageSelector  │ ───────────────────▶ │ StorageRegistry  │
//! └──────────────────┘                      │ storage1..N      │
//! ┌──────────────────┐   get_profile(id)    │ (config order)   │
//! │ HealthProbe      │ ───────────────────▶ └──────────────────┘
//! │  └ Reachability  │ ── OpenDAL Supabase operator.check()
//! └──────────────────┘
//! ```

mod error;
mod health;
mod registry;
mod selector;

pub use error::StorageError;
pub use health::{HealthProbe, HealthStatus, Reachability, SupabaseReachability};
pub use registry::{DEFAULT_STORAGE_ID, StorageProfile, StorageRegistry};
pub use selector::{SelectionStrategy, StorageSelector};
