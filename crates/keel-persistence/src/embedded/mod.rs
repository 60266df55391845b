//! Embedded in-process persistence backend
//!
//! Keeps the canonical table and the legacy tables in memory behind a single
//! `RwLock`. Inserts enforce the same "one active row per scope" guarantee the
//! external database gets from its unique index, so concurrent migrations see
//! the same conflict semantics on both backends.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use keel_common::{APP_LEVEL_ENV_ID, KeelError};
use parking_lot::RwLock;

use crate::model::*;
use crate::traits::*;

#[derive(Default)]
struct Tables {
    next_id: i32,
    deployment_configs: BTreeMap<i32, DeploymentConfigRow>,
    charts: Vec<ChartRecord>,
    pipelines: Vec<PipelineRecord>,
    installed_apps: Vec<InstalledAppRecord>,
}

impl Tables {
    fn active_scope_taken(&self, app_id: i32, env_id: i32, except_id: i32) -> bool {
        self.deployment_configs.values().any(|row| {
            row.active
                && row.id != except_id
                && row.app_id == app_id
                && row.environment_id == env_id
        })
    }

    fn insert(&mut self, mut row: DeploymentConfigRow) -> anyhow::Result<DeploymentConfigRow> {
        if row.active && self.active_scope_taken(row.app_id, row.environment_id, 0) {
            return Err(KeelError::MigrationConflict {
                app_id: row.app_id,
                env_id: row.environment_id,
            }
            .into());
        }
        self.next_id += 1;
        row.id = self.next_id;
        self.deployment_configs.insert(row.id, row.clone());
        Ok(row)
    }

    fn update(&mut self, row: DeploymentConfigRow) -> anyhow::Result<DeploymentConfigRow> {
        if !self.deployment_configs.contains_key(&row.id) {
            return Err(KeelError::DatabaseError(format!(
                "deployment config {} does not exist",
                row.id
            ))
            .into());
        }
        if row.active && self.active_scope_taken(row.app_id, row.environment_id, row.id) {
            return Err(KeelError::MigrationConflict {
                app_id: row.app_id,
                env_id: row.environment_id,
            }
            .into());
        }
        self.deployment_configs.insert(row.id, row.clone());
        Ok(row)
    }
}

/// Embedded persistence service
#[derive(Default)]
pub struct EmbeddedPersistService {
    tables: RwLock<Tables>,
    legacy_reads: AtomicUsize,
}

impl EmbeddedPersistService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the latest chart of an application
    pub fn put_chart(&self, chart: ChartRecord) {
        let mut tables = self.tables.write();
        tables.charts.retain(|c| c.app_id != chart.app_id);
        tables.charts.push(chart);
    }

    /// Add (or replace) the pipeline of (app, env)
    pub fn put_pipeline(&self, pipeline: PipelineRecord) {
        let mut tables = self.tables.write();
        tables.pipelines.retain(|p| {
            !(p.app_id == pipeline.app_id && p.environment_id == pipeline.environment_id)
        });
        tables.pipelines.push(pipeline);
    }

    /// Add (or replace) the installed app record of an application
    pub fn put_installed_app(&self, installed_app: InstalledAppRecord) {
        let mut tables = self.tables.write();
        tables
            .installed_apps
            .retain(|i| i.app_id != installed_app.app_id);
        tables.installed_apps.push(installed_app);
    }

    /// Every canonical row, active or not, ordered by id
    pub fn deployment_configs(&self) -> Vec<DeploymentConfigRow> {
        self.tables
            .read()
            .deployment_configs
            .values()
            .cloned()
            .collect()
    }

    /// Number of legacy table lookups served so far
    pub fn legacy_read_count(&self) -> usize {
        self.legacy_reads.load(Ordering::Relaxed)
    }

    fn record_legacy_read(&self) {
        self.legacy_reads.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl PersistenceService for EmbeddedPersistService {
    fn storage_mode(&self) -> StorageMode {
        StorageMode::Embedded
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl DeploymentConfigPersistence for EmbeddedPersistService {
    async fn deployment_config_find_by_scope(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<Option<DeploymentConfigRow>> {
        Ok(self
            .tables
            .read()
            .deployment_configs
            .values()
            .find(|row| row.active && row.app_id == app_id && row.environment_id == env_id)
            .cloned())
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
        Ok(self
            .tables
            .read()
            .deployment_configs
            .values()
            .rev()
            .find(|row| row.app_id == app_id && row.environment_id == env_id)
            .cloned())
    }

    async fn deployment_config_find_by_scopes(
        &self,
        scopes: &AppEnvScopes,
    ) -> anyhow::Result<Vec<DeploymentConfigRow>> {
        Ok(self
            .tables
            .read()
            .deployment_configs
            .values()
            .filter(|row| {
                row.active
                    && scopes
                        .get(&row.app_id)
                        .is_some_and(|env_ids| env_ids.contains(&row.environment_id))
            })
            .cloned()
            .collect())
    }

    async fn deployment_config_find_by_app_ids(
        &self,
        app_ids: &[i32],
    ) -> anyhow::Result<Vec<DeploymentConfigRow>> {
        Ok(self
            .tables
            .read()
            .deployment_configs
            .values()
            .filter(|row| row.active && app_ids.contains(&row.app_id))
            .cloned()
            .collect())
    }

    async fn deployment_config_insert(
        &self,
        row: DeploymentConfigRow,
    ) -> anyhow::Result<DeploymentConfigRow> {
        self.tables.write().insert(row)
    }

    async fn deployment_config_update(
        &self,
        row: DeploymentConfigRow,
    ) -> anyhow::Result<DeploymentConfigRow> {
        self.tables.write().update(row)
    }

    async fn deployment_config_insert_many(
        &self,
        rows: Vec<DeploymentConfigRow>,
    ) -> anyhow::Result<()> {
        let mut tables = self.tables.write();
        for row in rows {
            tables.insert(row)?;
        }
        Ok(())
    }

    async fn deployment_config_update_many(
        &self,
        rows: Vec<DeploymentConfigRow>,
    ) -> anyhow::Result<()> {
        let mut tables = self.tables.write();
        for row in rows {
            tables.update(row)?;
        }
        Ok(())
    }

    async fn deployment_config_update_repo_url(
        &self,
        repo_url: &str,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<()> {
        let mut tables = self.tables.write();
        for row in tables.deployment_configs.values_mut() {
            if row.active && row.app_id == app_id && row.environment_id == env_id {
                row.repo_url = repo_url.to_string();
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ChartReader for EmbeddedPersistService {
    async fn chart_find_latest_by_app_id(
        &self,
        app_id: i32,
    ) -> anyhow::Result<Option<ChartRecord>> {
        self.record_legacy_read();
        Ok(self
            .tables
            .read()
            .charts
            .iter()
            .find(|c| c.app_id == app_id)
            .cloned())
    }
}

#[async_trait]
impl PipelineReader for EmbeddedPersistService {
    async fn pipeline_find_deployment_app_type(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<Option<String>> {
        self.record_legacy_read();
        Ok(self
            .tables
            .read()
            .pipelines
            .iter()
            .find(|p| p.app_id == app_id && p.environment_id == env_id)
            .map(|p| p.deployment_app_type.clone()))
    }
}

#[async_trait]
impl InstalledAppReader for EmbeddedPersistService {
    async fn installed_app_find_by_app_id(
        &self,
        app_id: i32,
    ) -> anyhow::Result<Option<InstalledAppRecord>> {
        self.record_legacy_read();
        Ok(self
            .tables
            .read()
            .installed_apps
            .iter()
            .find(|i| i.app_id == app_id)
            .cloned())
    }
}
