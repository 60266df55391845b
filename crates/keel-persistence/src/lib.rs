//! Keel Persistence - Database entities and persistence layer
//!
//! This crate provides:
//! - SeaORM entity definitions for the canonical `deployment_config` table
//!   and the legacy `charts`, `pipeline` and `installed_apps` tables
//! - Persistence trait abstractions (canonical store gateway, legacy readers)
//! - An external database backend and an embedded in-memory backend
//! - Domain model types for persistence operations

pub mod embedded;
pub mod entity;
pub mod model;
pub mod schema;
pub mod sql;
pub mod traits;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export persistence traits
pub use traits::{
    ChartReader, DeploymentConfigPersistence, InstalledAppReader, LegacyReader,
    PersistenceService, PipelineReader,
};

// Re-export SQL backend
pub use sql::ExternalDbPersistService;

// Re-export embedded backend
pub use embedded::EmbeddedPersistService;

// Re-export model types
pub use model::{
    AppEnvScopes, ChartRecord, DeploymentConfigRow, InstalledAppRecord, PipelineRecord,
    StorageMode,
};
