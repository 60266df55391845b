//! Canonical deployment config persistence trait
//!
//! "No rows" is always reported as `Ok(None)` (or an empty `Vec`) and never
//! as an error. Any `Err` is a storage failure, except that inserts report a
//! second active row for the same scope as `KeelError::MigrationConflict`.

use async_trait::async_trait;

use crate::model::{AppEnvScopes, DeploymentConfigRow};

/// Canonical deployment config store operations
#[async_trait]
pub trait DeploymentConfigPersistence: Send + Sync {
    /// Find the active row for (app_id, env_id)
    async fn deployment_config_find_by_scope(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<Option<DeploymentConfigRow>>;

    /// Find the active application-level row (env id 0)
    async fn deployment_config_find_app_level(
        &self,
        app_id: i32,
    ) -> anyhow::Result<Option<DeploymentConfigRow>>;

    /// Find the most recent row for (app_id, env_id), active or not
    async fn deployment_config_find_by_scope_even_if_inactive(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<Option<DeploymentConfigRow>>;

    /// Find all active rows matching any of the requested scopes
    async fn deployment_config_find_by_scopes(
        &self,
        scopes: &AppEnvScopes,
    ) -> anyhow::Result<Vec<DeploymentConfigRow>>;

    /// Find all active rows belonging to the given applications
    async fn deployment_config_find_by_app_ids(
        &self,
        app_ids: &[i32],
    ) -> anyhow::Result<Vec<DeploymentConfigRow>>;

    /// Insert a new row, returning it with its assigned id
    async fn deployment_config_insert(
        &self,
        row: DeploymentConfigRow,
    ) -> anyhow::Result<DeploymentConfigRow>;

    /// Update an existing row by id
    async fn deployment_config_update(
        &self,
        row: DeploymentConfigRow,
    ) -> anyhow::Result<DeploymentConfigRow>;

    /// Insert a batch of rows
    async fn deployment_config_insert_many(
        &self,
        rows: Vec<DeploymentConfigRow>,
    ) -> anyhow::Result<()>;

    /// Update a batch of rows by id
    async fn deployment_config_update_many(
        &self,
        rows: Vec<DeploymentConfigRow>,
    ) -> anyhow::Result<()>;

    /// Set only the repository url of the active row for (app_id, env_id)
    async fn deployment_config_update_repo_url(
        &self,
        repo_url: &str,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<()>;
}
