//! Legacy config synthesizer
//!
//! Builds transient deployment config rows out of the legacy chart, pipeline
//! and installed-app records. Nothing here writes to any store.

use std::sync::Arc;

use keel_common::{APP_LEVEL_ENV_ID, KeelError};
use keel_persistence::{DeploymentConfigRow, LegacyReader};

use crate::model::{ConfigType, ReleaseMode};

/// Reads legacy records and shapes them like canonical rows
#[derive(Clone)]
pub struct LegacyConfigSynthesizer {
    legacy: Arc<dyn LegacyReader>,
}

impl LegacyConfigSynthesizer {
    pub fn new(legacy: Arc<dyn LegacyReader>) -> Self {
        Self { legacy }
    }

    /// App-level config from the application's latest chart
    ///
    /// # Errors
    ///
    /// `KeelError::ChartNotFound` when the application has no chart: nothing
    /// can be derived for it.
    pub async fn synthesize_app_level(&self, app_id: i32) -> anyhow::Result<DeploymentConfigRow> {
        let chart = self
            .legacy
            .chart_find_latest_by_app_id(app_id)
            .await
            .inspect_err(|e| {
                tracing::error!(app_id, error = %e, "Failed to fetch latest chart");
            })?
            .ok_or(KeelError::ChartNotFound { app_id })?;

        Ok(DeploymentConfigRow {
            app_id,
            environment_id: APP_LEVEL_ENV_ID,
            config_type: ConfigType::from_custom_repo_flag(chart.is_custom_git_repository)
                .as_str()
                .to_string(),
            repo_url: chart.git_repo_url,
            active: true,
            ..Default::default()
        })
    }

    /// Env-level config inheriting config type and repo url from `app_level`,
    /// with the deployment app type of the (app_id, env_id) pipeline
    pub async fn synthesize_env_level(
        &self,
        app_level: &DeploymentConfigRow,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<DeploymentConfigRow> {
        let deployment_app_type = self
            .legacy
            .pipeline_find_deployment_app_type(app_id, env_id)
            .await
            .inspect_err(|e| {
                tracing::error!(app_id, env_id, error = %e, "Failed to fetch deployment app type");
            })?
            .ok_or(KeelError::PipelineNotFound { app_id, env_id })?;

        Ok(DeploymentConfigRow {
            app_id,
            environment_id: env_id,
            config_type: app_level.config_type.clone(),
            repo_url: app_level.repo_url.clone(),
            deployment_app_type,
            // Only pre-existing pipelines are ever synthesized
            release_mode: ReleaseMode::Create.as_str().to_string(),
            active: true,
            ..Default::default()
        })
    }

    /// Config of a store-installed helm application in env_id
    pub async fn synthesize_helm_app(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<DeploymentConfigRow> {
        let installed_app = self
            .legacy
            .installed_app_find_by_app_id(app_id)
            .await
            .inspect_err(|e| {
                tracing::error!(app_id, error = %e, "Failed to fetch installed app");
            })?
            .filter(|installed_app| installed_app.environment_id == env_id)
            .ok_or(KeelError::InstalledAppNotFound { app_id, env_id })?;

        Ok(DeploymentConfigRow {
            app_id,
            environment_id: env_id,
            config_type: ConfigType::from_custom_repo_flag(installed_app.is_custom_repository)
                .as_str()
                .to_string(),
            repo_url: installed_app.git_ops_repo_url,
            repo_name: installed_app.git_ops_repo_name,
            deployment_app_type: installed_app.deployment_app_type,
            active: true,
            ..Default::default()
        })
    }
}
