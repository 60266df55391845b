//! Explicit deployment config writes

use keel_persistence::{DeploymentConfigPersistence, DeploymentConfigRow};

use super::DeploymentConfigService;
use crate::model::DeploymentConfig;

impl DeploymentConfigService {
    fn store_or<'a>(
        &'a self,
        tx: Option<&'a dyn DeploymentConfigPersistence>,
    ) -> &'a dyn DeploymentConfigPersistence {
        tx.unwrap_or(self.store.as_ref())
    }

    /// Insert or update the config of `config`'s scope
    ///
    /// Create vs update is decided by whether an active row already exists
    /// for (app_id, environment_id), not by `config.id`. Updates keep the
    /// existing id and created stamp. Pass `tx` to run against a
    /// transactional store.
    pub async fn create_or_update(
        &self,
        tx: Option<&dyn DeploymentConfigPersistence>,
        config: DeploymentConfig,
        user_id: i32,
    ) -> anyhow::Result<DeploymentConfig> {
        let store = self.store_or(tx);
        let (app_id, env_id) = (config.app_id, config.environment_id);

        let existing = store
            .deployment_config_find_by_scope(app_id, env_id)
            .await
            .inspect_err(|e| {
                tracing::error!(app_id, env_id, error = %e, "Failed to fetch deployment config");
            })?
            .filter(DeploymentConfigRow::is_persisted);

        let mut row = DeploymentConfigRow::from(config);
        let saved = match existing {
            None => {
                row.id = 0;
                row.audit.create(user_id);
                store.deployment_config_insert(row).await.inspect_err(|e| {
                    tracing::error!(app_id, env_id, error = %e, "Failed to save deployment config");
                })?
            }
            Some(existing) => {
                row.id = existing.id;
                row.audit = existing.audit;
                row.audit.update(user_id);
                store.deployment_config_update(row).await.inspect_err(|e| {
                    tracing::error!(app_id, env_id, error = %e, "Failed to update deployment config");
                })?
            }
        };

        Ok(saved.into())
    }

    /// Insert `to_create` then update `to_update`, as two batches
    ///
    /// A failure of the update batch does not undo the insert batch unless
    /// `tx` is a transactional store covering both.
    pub async fn create_or_update_in_bulk(
        &self,
        tx: Option<&dyn DeploymentConfigPersistence>,
        to_create: Vec<DeploymentConfig>,
        to_update: Vec<DeploymentConfig>,
        user_id: i32,
    ) -> anyhow::Result<()> {
        let store = self.store_or(tx);

        let create_rows: Vec<DeploymentConfigRow> = to_create
            .into_iter()
            .map(|config| {
                let mut row = DeploymentConfigRow::from(config);
                row.id = 0;
                row.audit.create(user_id);
                row
            })
            .collect();

        let update_rows: Vec<DeploymentConfigRow> = to_update
            .into_iter()
            .map(|config| {
                let mut row = DeploymentConfigRow::from(config);
                row.audit.update(user_id);
                row
            })
            .collect();

        if !create_rows.is_empty() {
            let count = create_rows.len();
            store
                .deployment_config_insert_many(create_rows)
                .await
                .inspect_err(|e| {
                    tracing::error!(count, error = %e, "Failed to save deployment configs");
                })?;
        }

        if !update_rows.is_empty() {
            let count = update_rows.len();
            store
                .deployment_config_update_many(update_rows)
                .await
                .inspect_err(|e| {
                    tracing::error!(count, error = %e, "Failed to update deployment configs");
                })?;
        }

        Ok(())
    }

    /// Set only the repo url of the active (app_id, env_id) row
    pub async fn update_repo_url(
        &self,
        repo_url: &str,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<()> {
        self.store
            .deployment_config_update_repo_url(repo_url, app_id, env_id)
            .await
            .inspect_err(|e| {
                tracing::error!(app_id, env_id, error = %e, "Failed to update repo url");
            })
    }

    /// All active canonical rows of the given applications
    pub async fn configs_by_app_ids(
        &self,
        app_ids: &[i32],
    ) -> anyhow::Result<Vec<DeploymentConfig>> {
        if app_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self
            .store
            .deployment_config_find_by_app_ids(app_ids)
            .await
            .inspect_err(|e| {
                tracing::error!(?app_ids, error = %e, "Failed to fetch deployment configs");
            })?;

        Ok(rows.into_iter().map(DeploymentConfig::from).collect())
    }
}
