//! Bulk deployment app type resolution

use std::collections::HashMap;

use keel_persistence::AppEnvScopes;

use super::DeploymentConfigService;
use crate::model::{CdPipeline, DeploymentAppType};

impl DeploymentConfigService {
    /// Deployment app type for each pipeline, keyed by pipeline id
    ///
    /// In canonical mode one bulk lookup fills every pipeline whose scope has
    /// a canonical row with a deployment app type. Every pipeline still
    /// missing afterwards takes the type recorded on its legacy row, so each
    /// input pipeline id appears in the result exactly once.
    pub async fn resolve_deployment_app_type_bulk(
        &self,
        pipelines: &[CdPipeline],
    ) -> anyhow::Result<HashMap<i32, DeploymentAppType>> {
        let mut resp = HashMap::with_capacity(pipelines.len());

        if self.mode().is_canonical() && !pipelines.is_empty() {
            let mut scopes = AppEnvScopes::new();
            let mut pipeline_ids_by_scope: HashMap<(i32, i32), Vec<i32>> =
                HashMap::with_capacity(pipelines.len());
            for pipeline in pipelines {
                scopes
                    .entry(pipeline.app_id)
                    .or_default()
                    .push(pipeline.environment_id);
                pipeline_ids_by_scope
                    .entry((pipeline.app_id, pipeline.environment_id))
                    .or_default()
                    .push(pipeline.id);
            }

            let configs = self
                .store
                .deployment_config_find_by_scopes(&scopes)
                .await
                .inspect_err(|e| {
                    tracing::error!(count = pipelines.len(), error = %e, "Failed to fetch deployment configs in bulk");
                })?;

            for config in configs {
                if config.deployment_app_type.is_empty() {
                    continue;
                }
                let Some(pipeline_ids) =
                    pipeline_ids_by_scope.get(&(config.app_id, config.environment_id))
                else {
                    continue;
                };
                let deployment_app_type = DeploymentAppType::from(config.deployment_app_type.as_str());
                for pipeline_id in pipeline_ids {
                    resp.insert(*pipeline_id, deployment_app_type.clone());
                }
            }
        }

        // Legacy mode, or not migrated yet
        for pipeline in pipelines {
            resp.entry(pipeline.id)
                .or_insert_with(|| DeploymentAppType::from(pipeline.deployment_app_type.as_str()));
        }

        Ok(resp)
    }
}
