//! Deployment config service
//!
//! - `resolver`: read paths and migration-on-read
//! - `upsert`: explicit create/update requests
//! - `bulk`: fleet-wide deployment app type lookups
//! - `synthesizer`: legacy table reads shaped as canonical rows

mod bulk;
mod resolver;
mod synthesizer;
mod upsert;

pub use resolver::ScopeResolution;
pub use synthesizer::LegacyConfigSynthesizer;

use std::sync::Arc;

use keel_persistence::{DeploymentConfigPersistence, LegacyReader, PersistenceService};

use crate::mode::{DeploymentMode, DeploymentServiceTypeConfig};

/// Resolves, migrates and persists deployment configs
///
/// The service holds no locks. Concurrent first-time migrations of the same
/// scope are settled by the store, which admits one active row per scope.
#[derive(Clone)]
pub struct DeploymentConfigService {
    store: Arc<dyn DeploymentConfigPersistence>,
    synthesizer: LegacyConfigSynthesizer,
    service_type_config: DeploymentServiceTypeConfig,
}

impl DeploymentConfigService {
    pub fn new(
        store: Arc<dyn DeploymentConfigPersistence>,
        legacy: Arc<dyn LegacyReader>,
        service_type_config: DeploymentServiceTypeConfig,
    ) -> Self {
        tracing::info!(
            mode = %service_type_config.mode(),
            "Deployment config service initialized"
        );
        Self {
            store,
            synthesizer: LegacyConfigSynthesizer::new(legacy),
            service_type_config,
        }
    }

    /// Build the service over one backend serving both the canonical and the
    /// legacy tables
    pub fn from_persistence<P>(
        persistence: Arc<P>,
        service_type_config: DeploymentServiceTypeConfig,
    ) -> Self
    where
        P: PersistenceService + 'static,
    {
        Self::new(persistence.clone(), persistence, service_type_config)
    }

    /// Whether the canonical table is the source of truth
    pub fn is_deployment_config_used(&self) -> bool {
        self.service_type_config.use_deployment_config_data
    }

    pub fn mode(&self) -> DeploymentMode {
        self.service_type_config.mode()
    }
}
