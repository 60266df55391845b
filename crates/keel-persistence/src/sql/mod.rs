//! SQL-based persistence backend (MySQL/PostgreSQL via SeaORM)
//!
//! The service is generic over the SeaORM connection so the same code runs
//! against a pooled `DatabaseConnection` or inside a caller-owned
//! `DatabaseTransaction`:
//!
//! ```ignore
//! let txn = db.begin().await?;
//! let tx_store = ExternalDbPersistService::new(txn);
//! service.create_or_update_in_bulk(Some(&tx_store), to_create, to_update, user_id).await?;
//! tx_store.into_inner().commit().await?;
//! ```

use async_trait::async_trait;
use keel_common::{APP_LEVEL_ENV_ID, AuditLog, KeelError};
use sea_orm::{prelude::Expr, *};

use crate::entity::{charts, deployment_config, installed_apps, pipeline};
use crate::model::*;
use crate::traits::*;

/// External database persistence service
///
/// Wraps a SeaORM connection (or transaction) and implements all persistence
/// traits by delegating to direct database queries.
pub struct ExternalDbPersistService<C = DatabaseConnection> {
    db: C,
}

impl<C> ExternalDbPersistService<C> {
    /// Create a new ExternalDbPersistService with the given connection
    pub fn new(db: C) -> Self {
        Self { db }
    }

    /// Get a reference to the underlying connection
    pub fn db(&self) -> &C {
        &self.db
    }

    /// Give back the connection, e.g. to commit a transaction
    pub fn into_inner(self) -> C {
        self.db
    }
}

// ============================================================================
// PersistenceService implementation
// ============================================================================

#[async_trait]
impl<C> PersistenceService for ExternalDbPersistService<C>
where
    C: ConnectionTrait + Send + Sync,
{
    fn storage_mode(&self) -> StorageMode {
        StorageMode::ExternalDb
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        self.db.execute_unprepared("SELECT 1").await?;
        Ok(())
    }
}

// ============================================================================
// Conversions
// ============================================================================

#[inline]
fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn deployment_config_to_row(model: deployment_config::Model) -> DeploymentConfigRow {
    DeploymentConfigRow {
        id: model.id,
        app_id: model.app_id,
        environment_id: model.environment_id,
        config_type: model.config_type,
        repo_url: model.repo_url.unwrap_or_default(),
        repo_name: model.repo_name.unwrap_or_default(),
        deployment_app_type: model.deployment_app_type.unwrap_or_default(),
        release_mode: model.release_mode.unwrap_or_default(),
        active: model.active,
        audit: AuditLog {
            created_on: model.created_on,
            created_by: model.created_by,
            updated_on: model.updated_on,
            updated_by: model.updated_by,
        },
    }
}

fn row_to_active_model(row: DeploymentConfigRow) -> deployment_config::ActiveModel {
    deployment_config::ActiveModel {
        id: if row.id > 0 { Set(row.id) } else { NotSet },
        app_id: Set(row.app_id),
        environment_id: Set(row.environment_id),
        config_type: Set(row.config_type),
        repo_url: Set(non_empty(row.repo_url)),
        repo_name: Set(non_empty(row.repo_name)),
        deployment_app_type: Set(non_empty(row.deployment_app_type)),
        release_mode: Set(non_empty(row.release_mode)),
        active: Set(row.active),
        created_on: Set(row.audit.created_on),
        created_by: Set(row.audit.created_by),
        updated_on: Set(row.audit.updated_on),
        updated_by: Set(row.audit.updated_by),
    }
}

/// Surface unique-index violations as a typed conflict, everything else as-is
fn map_insert_error(err: DbErr, app_id: i32, env_id: i32) -> anyhow::Error {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        tracing::debug!(app_id, env_id, "deployment config insert hit the active scope index");
        KeelError::MigrationConflict { app_id, env_id }.into()
    } else {
        err.into()
    }
}

// ============================================================================
// DeploymentConfigPersistence implementation
// ============================================================================

#[async_trait]
impl<C> DeploymentConfigPersistence for ExternalDbPersistService<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn deployment_config_find_by_scope(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<Option<DeploymentConfigRow>> {
        let model = deployment_config::Entity::find()
            .filter(deployment_config::Column::AppId.eq(app_id))
            .filter(deployment_config::Column::EnvironmentId.eq(env_id))
            .filter(deployment_config::Column::Active.eq(true))
            .one(&self.db)
            .await?;

        Ok(model.map(deployment_config_to_row))
    }

    async fn deployment_config_find_app_level(
        &self,
        app_id: i32,
    ) -> anyhow::Result<Option<DeploymentConfigRow>> {
        self.deployment_config_find_by_scope(app_id, APP_LEVEL_ENV_ID)
            .await
    }

    async fn deployment_config_find_by_scope_even_if_inactive(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<Option<DeploymentConfigRow>> {
        let model = deployment_config::Entity::find()
            .filter(deployment_config::Column::AppId.eq(app_id))
            .filter(deployment_config::Column::EnvironmentId.eq(env_id))
            .order_by_desc(deployment_config::Column::Id)
            .one(&self.db)
            .await?;

        Ok(model.map(deployment_config_to_row))
    }

    async fn deployment_config_find_by_scopes(
        &self,
        scopes: &AppEnvScopes,
    ) -> anyhow::Result<Vec<DeploymentConfigRow>> {
        if scopes.is_empty() {
            return Ok(Vec::new());
        }

        let mut scope_condition = Condition::any();
        for (app_id, env_ids) in scopes {
            scope_condition = scope_condition.add(
                Condition::all()
                    .add(deployment_config::Column::AppId.eq(*app_id))
                    .add(deployment_config::Column::EnvironmentId.is_in(env_ids.clone())),
            );
        }

        let models = deployment_config::Entity::find()
            .filter(deployment_config::Column::Active.eq(true))
            .filter(scope_condition)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(deployment_config_to_row).collect())
    }

    async fn deployment_config_find_by_app_ids(
        &self,
        app_ids: &[i32],
    ) -> anyhow::Result<Vec<DeploymentConfigRow>> {
        if app_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = deployment_config::Entity::find()
            .filter(deployment_config::Column::AppId.is_in(app_ids.to_vec()))
            .filter(deployment_config::Column::Active.eq(true))
            .order_by_asc(deployment_config::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(deployment_config_to_row).collect())
    }

    async fn deployment_config_insert(
        &self,
        row: DeploymentConfigRow,
    ) -> anyhow::Result<DeploymentConfigRow> {
        let (app_id, env_id) = (row.app_id, row.environment_id);
        let mut active_model = row_to_active_model(row);
        active_model.id = NotSet;

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_insert_error(e, app_id, env_id))?;

        Ok(deployment_config_to_row(model))
    }

    async fn deployment_config_update(
        &self,
        row: DeploymentConfigRow,
    ) -> anyhow::Result<DeploymentConfigRow> {
        if !row.is_persisted() {
            return Err(KeelError::IllegalArgument(format!(
                "cannot update deployment config of app {} env {} without an id",
                row.app_id, row.environment_id
            ))
            .into());
        }

        let model = row_to_active_model(row).update(&self.db).await?;

        Ok(deployment_config_to_row(model))
    }

    async fn deployment_config_insert_many(
        &self,
        rows: Vec<DeploymentConfigRow>,
    ) -> anyhow::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let models = rows.into_iter().map(|row| {
            let mut active_model = row_to_active_model(row);
            active_model.id = NotSet;
            active_model
        });

        deployment_config::Entity::insert_many(models)
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn deployment_config_update_many(
        &self,
        rows: Vec<DeploymentConfigRow>,
    ) -> anyhow::Result<()> {
        for row in rows {
            self.deployment_config_update(row).await?;
        }

        Ok(())
    }

    async fn deployment_config_update_repo_url(
        &self,
        repo_url: &str,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<()> {
        deployment_config::Entity::update_many()
            .col_expr(deployment_config::Column::RepoUrl, Expr::value(repo_url))
            .filter(deployment_config::Column::AppId.eq(app_id))
            .filter(deployment_config::Column::EnvironmentId.eq(env_id))
            .filter(deployment_config::Column::Active.eq(true))
            .exec(&self.db)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Legacy reader implementations
// ============================================================================

#[async_trait]
impl<C> ChartReader for ExternalDbPersistService<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn chart_find_latest_by_app_id(
        &self,
        app_id: i32,
    ) -> anyhow::Result<Option<ChartRecord>> {
        let model = charts::Entity::find()
            .filter(charts::Column::AppId.eq(app_id))
            .filter(charts::Column::Latest.eq(true))
            .filter(charts::Column::Active.eq(true))
            .one(&self.db)
            .await?;

        Ok(model.map(|m| ChartRecord {
            id: m.id,
            app_id: m.app_id,
            git_repo_url: m.git_repo_url.unwrap_or_default(),
            is_custom_git_repository: m.is_custom_gitops_repo,
        }))
    }
}

#[async_trait]
impl<C> PipelineReader for ExternalDbPersistService<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn pipeline_find_deployment_app_type(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<Option<String>> {
        let model = pipeline::Entity::find()
            .filter(pipeline::Column::AppId.eq(app_id))
            .filter(pipeline::Column::EnvironmentId.eq(env_id))
            .filter(pipeline::Column::Deleted.eq(false))
            .one(&self.db)
            .await?;

        Ok(model.map(|m| m.deployment_app_type.unwrap_or_default()))
    }
}

#[async_trait]
impl<C> InstalledAppReader for ExternalDbPersistService<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn installed_app_find_by_app_id(
        &self,
        app_id: i32,
    ) -> anyhow::Result<Option<InstalledAppRecord>> {
        let model = installed_apps::Entity::find()
            .filter(installed_apps::Column::AppId.eq(app_id))
            .filter(installed_apps::Column::Active.eq(true))
            .one(&self.db)
            .await?;

        Ok(model.map(|m| InstalledAppRecord {
            id: m.id,
            app_id: m.app_id,
            environment_id: m.environment_id,
            deployment_app_type: m.deployment_app_type.unwrap_or_default(),
            git_ops_repo_url: m.git_ops_repo_url.unwrap_or_default(),
            git_ops_repo_name: m.git_ops_repo_name.unwrap_or_default(),
            is_custom_repository: m.is_custom_repository,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_model() -> deployment_config::Model {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        deployment_config::Model {
            id: 11,
            app_id: 7,
            environment_id: 3,
            config_type: "SYSTEM_GENERATED".to_string(),
            repo_url: None,
            repo_name: Some("app-7".to_string()),
            deployment_app_type: Some("helm".to_string()),
            release_mode: Some("create".to_string()),
            active: true,
            created_on: ts,
            created_by: 1,
            updated_on: ts,
            updated_by: 2,
        }
    }

    #[test]
    fn test_model_to_row_maps_nulls_to_empty() {
        let row = deployment_config_to_row(sample_model());
        assert_eq!(row.id, 11);
        assert_eq!(row.repo_url, "");
        assert_eq!(row.repo_name, "app-7");
        assert_eq!(row.audit.updated_by, 2);
    }

    #[test]
    fn test_row_to_active_model_maps_empty_to_null() {
        let row = deployment_config_to_row(sample_model());
        let active_model = row_to_active_model(row);
        assert_eq!(active_model.id, Set(11));
        assert_eq!(active_model.repo_url, Set(None));
        assert_eq!(active_model.release_mode, Set(Some("create".to_string())));
    }

    #[test]
    fn test_unpersisted_row_leaves_id_unset() {
        let row = DeploymentConfigRow {
            app_id: 1,
            ..Default::default()
        };
        let active_model = row_to_active_model(row);
        assert_eq!(active_model.id, NotSet);
    }
}
