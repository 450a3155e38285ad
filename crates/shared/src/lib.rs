//! Shared errors, configuration, and auth primitives for the gallery backend.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management (server, database, JWT, storage instances)
//! - JWT validation for Supabase-issued access tokens

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

pub use auth::Claims;
pub use config::{AppConfig, StorageInstanceConfig, StorageSettings};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
