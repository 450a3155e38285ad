//! Storage routing and upload quota logic for the gallery backend.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached through the [`quota::ProfileStore`] trait, which the
//! db crate implements.
//!
//! # Modules
//!
//! - `storage` - Storage instance registry, selection strategies, health probes
//! - `quota` - Per-user upload limits and usage accounting
//! - `units` - Byte/megabyte conversion and human-readable sizes

pub mod quota;
pub mod storage;
pub mod units;
