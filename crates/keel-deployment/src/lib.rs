//! Keel Deployment - deployment config resolution and lazy migration
//!
//! Resolves the deployment config of an application (optionally scoped to an
//! environment) from either the canonical `deployment_config` table or the
//! legacy chart/pipeline/installed-app tables, and backfills canonical rows
//! on first access when running in canonical mode.

pub mod mode;
pub mod model;
pub mod service;

pub use mode::{DeploymentMode, DeploymentServiceTypeConfig};
pub use model::{CdPipeline, ConfigType, DeploymentAppType, DeploymentConfig, ReleaseMode};
pub use service::{DeploymentConfigService, LegacyConfigSynthesizer, ScopeResolution};
