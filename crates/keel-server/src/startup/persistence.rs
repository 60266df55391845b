//! Persistence wiring: picks the storage backend and builds the deployment
//! config service on top of it.

use std::sync::Arc;

use keel_common::KeelError;
use keel_deployment::DeploymentConfigService;
use keel_persistence::{
    ChartRecord, EmbeddedPersistService, ExternalDbPersistService, InstalledAppRecord,
    PersistenceService, PipelineRecord, StorageMode, schema,
};
use serde::Deserialize;

use crate::model::Configuration;

/// Legacy records loaded into the embedded store at startup
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddedSeed {
    pub charts: Vec<ChartRecord>,
    pub pipelines: Vec<PipelineRecord>,
    pub installed_apps: Vec<InstalledAppRecord>,
}

impl EmbeddedSeed {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            KeelError::ConfigError(format!("cannot read seed file {}: {}", path, e))
        })?;
        let seed = serde_json::from_str(&contents)
            .map_err(|e| KeelError::ConfigError(format!("invalid seed file {}: {}", path, e)))?;
        Ok(seed)
    }

    pub fn apply(self, store: &EmbeddedPersistService) {
        for chart in self.charts {
            store.put_chart(chart);
        }
        for pipeline in self.pipelines {
            store.put_pipeline(pipeline);
        }
        for installed_app in self.installed_apps {
            store.put_installed_app(installed_app);
        }
    }
}

/// Build the embedded store, seeded from `keel.storage.embedded.seed_file` if set
pub fn embedded_persistence(
    configuration: &Configuration,
) -> anyhow::Result<EmbeddedPersistService> {
    let store = EmbeddedPersistService::new();
    if let Some(path) = configuration.embedded_seed_file() {
        tracing::info!(path = %path, "Loading embedded seed data");
        EmbeddedSeed::from_file(&path)?.apply(&store);
    }
    Ok(store)
}

/// Connect the configured backend and build the deployment config service
pub async fn build_deployment_service(
    configuration: &Configuration,
) -> anyhow::Result<DeploymentConfigService> {
    let storage_mode = configuration.storage_mode()?;
    let service_type_config = configuration.deployment_service_type_config();
    tracing::info!(%storage_mode, "Persistence mode");

    let service = match storage_mode {
        StorageMode::ExternalDb => {
            let db = configuration.database_connection().await?;
            if configuration.db_init_schema() {
                schema::create_schema(&db).await?;
            }
            let persistence = Arc::new(ExternalDbPersistService::new(db));
            persistence.health_check().await?;
            DeploymentConfigService::from_persistence(persistence, service_type_config)
        }
        StorageMode::Embedded => {
            let persistence = Arc::new(embedded_persistence(configuration)?);
            DeploymentConfigService::from_persistence(persistence, service_type_config)
        }
    };

    Ok(service)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use keel_deployment::{ConfigType, DeploymentAppType};

    use super::*;
    use crate::model::ConfigOverrides;

    const SEED: &str = r#"{
        "charts": [
            {"id": 1, "app_id": 7, "git_repo_url": "https://x/7", "is_custom_git_repository": true}
        ],
        "pipelines": [
            {"id": 70, "app_id": 7, "environment_id": 3, "deployment_app_type": "argo_cd"}
        ]
    }"#;

    fn embedded_configuration(
        seed: &tempfile::NamedTempFile,
    ) -> (tempfile::NamedTempFile, Configuration) {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        write!(
            file,
            "keel:\n  storage:\n    mode: embedded\n    embedded:\n      seed_file: {}\n  deployment:\n    use_deployment_config_data: true\n",
            seed.path().display()
        )
        .unwrap();
        let configuration = Configuration::new(
            file.path().to_str().unwrap(),
            &ConfigOverrides::default(),
        )
        .unwrap();
        (file, configuration)
    }

    #[tokio::test]
    async fn test_build_embedded_service_from_seed() {
        let mut seed = tempfile::NamedTempFile::new().unwrap();
        seed.write_all(SEED.as_bytes()).unwrap();

        let (_file, configuration) = embedded_configuration(&seed);

        let service = build_deployment_service(&configuration).await.unwrap();
        assert!(service.is_deployment_config_used());

        let config = service.resolve_and_migrate(7, 3).await.unwrap();
        assert!(config.id > 0);
        assert_eq!(config.config_type, ConfigType::Custom);
        assert_eq!(config.deployment_app_type, Some(DeploymentAppType::ArgoCd));
    }

    #[test]
    fn test_invalid_seed_file() {
        let mut seed = tempfile::NamedTempFile::new().unwrap();
        seed.write_all(b"not json").unwrap();

        let err = EmbeddedSeed::from_file(seed.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KeelError>(),
            Some(KeelError::ConfigError(_))
        ));
    }
}
