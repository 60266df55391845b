//! Persistence traits for the unified storage abstraction layer
//!
//! This module defines the core persistence traits that abstract over different
//! storage backends: external database (MySQL/PostgreSQL) and the embedded
//! in-process store.

pub mod deployment_config;
pub mod legacy;

pub use deployment_config::DeploymentConfigPersistence;
pub use legacy::{ChartReader, InstalledAppReader, LegacyReader, PipelineReader};

use async_trait::async_trait;

use crate::model::StorageMode;

/// Unified persistence service trait
///
/// This is the main interface for all storage operations. Implementations
/// dispatch to the appropriate storage backend based on the configured mode.
#[async_trait]
pub trait PersistenceService: DeploymentConfigPersistence + LegacyReader + Send + Sync {
    /// Get the current storage mode
    fn storage_mode(&self) -> StorageMode;

    /// Health check for the storage backend
    async fn health_check(&self) -> anyhow::Result<()>;
}
