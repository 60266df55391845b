//! Shared fixtures for deployment config service tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use keel_common::AuditLog;
use keel_deployment::{DeploymentConfigService, DeploymentServiceTypeConfig};
use keel_persistence::{
    AppEnvScopes, ChartRecord, DeploymentConfigPersistence, DeploymentConfigRow,
    EmbeddedPersistService, InstalledAppRecord, PipelineRecord,
};

pub const LEGACY: DeploymentServiceTypeConfig = DeploymentServiceTypeConfig {
    use_deployment_config_data: false,
};

pub const CANONICAL: DeploymentServiceTypeConfig = DeploymentServiceTypeConfig {
    use_deployment_config_data: true,
};

/// Embedded store seeded with app 7: chart "https://x/7" (platform generated)
/// and a helm pipeline in env 3
pub fn seeded_store() -> Arc<EmbeddedPersistService> {
    let store = Arc::new(EmbeddedPersistService::new());
    store.put_chart(ChartRecord {
        id: 1,
        app_id: 7,
        git_repo_url: "https://x/7".to_string(),
        is_custom_git_repository: false,
    });
    store.put_pipeline(PipelineRecord {
        id: 70,
        app_id: 7,
        environment_id: 3,
        deployment_app_type: "helm".to_string(),
    });
    store.put_installed_app(InstalledAppRecord {
        id: 9,
        app_id: 9,
        environment_id: 2,
        deployment_app_type: "argo_cd".to_string(),
        git_ops_repo_url: "https://x/9".to_string(),
        git_ops_repo_name: "app-9".to_string(),
        is_custom_repository: true,
    });
    store
}

pub fn service(
    store: &Arc<EmbeddedPersistService>,
    config: DeploymentServiceTypeConfig,
) -> DeploymentConfigService {
    DeploymentConfigService::from_persistence(store.clone(), config)
}

/// A canonical row as an earlier migration would have left it
pub fn canonical_row(app_id: i32, env_id: i32, repo_url: &str) -> DeploymentConfigRow {
    let mut audit = AuditLog::default();
    audit.create(1);
    DeploymentConfigRow {
        app_id,
        environment_id: env_id,
        config_type: "SYSTEM_GENERATED".to_string(),
        repo_url: repo_url.to_string(),
        deployment_app_type: if env_id > 0 {
            "helm".to_string()
        } else {
            String::new()
        },
        release_mode: "create".to_string(),
        active: true,
        audit,
        ..Default::default()
    }
}

pub fn active_rows(store: &EmbeddedPersistService) -> Vec<DeploymentConfigRow> {
    store
        .deployment_configs()
        .into_iter()
        .filter(|r| r.active)
        .collect()
}

/// Canonical store wrapper that injects failures and stale reads
pub struct FlakyStore {
    pub inner: Arc<EmbeddedPersistService>,
    pub fail_lookups: AtomicBool,
    pub fail_updates: AtomicBool,
    /// Number of upcoming scope lookups that report "no rows" regardless of
    /// what is stored, as a reader racing a concurrent migration would see
    pub stale_scope_lookups: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<EmbeddedPersistService>) -> Self {
        Self {
            inner,
            fail_lookups: AtomicBool::new(false),
            fail_updates: AtomicBool::new(false),
            stale_scope_lookups: AtomicUsize::new(0),
        }
    }

    fn check_lookup(&self) -> anyhow::Result<()> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            anyhow::bail!("injected lookup failure: connection refused");
        }
        Ok(())
    }

    fn check_update(&self) -> anyhow::Result<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            anyhow::bail!("injected update failure: serialization failure");
        }
        Ok(())
    }

    fn take_stale(&self) -> bool {
        self.stale_scope_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl DeploymentConfigPersistence for FlakyStore {
    async fn deployment_config_find_by_scope(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<Option<DeploymentConfigRow>> {
        self.check_lookup()?;
        if self.take_stale() {
            return Ok(None);
        }
        self.inner
            .deployment_config_find_by_scope(app_id, env_id)
            .await
    }

    async fn deployment_config_find_app_level(
        &self,
        app_id: i32,
    ) -> anyhow::Result<Option<DeploymentConfigRow>> {
        self.check_lookup()?;
        self.inner.deployment_config_find_app_level(app_id).await
    }

    async fn deployment_config_find_by_scope_even_if_inactive(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<Option<DeploymentConfigRow>> {
        self.check_lookup()?;
        self.inner
            .deployment_config_find_by_scope_even_if_inactive(app_id, env_id)
            .await
    }

    async fn deployment_config_find_by_scopes(
        &self,
        scopes: &AppEnvScopes,
    ) -> anyhow::Result<Vec<DeploymentConfigRow>> {
        self.check_lookup()?;
        self.inner.deployment_config_find_by_scopes(scopes).await
    }

    async fn deployment_config_find_by_app_ids(
        &self,
        app_ids: &[i32],
    ) -> anyhow::Result<Vec<DeploymentConfigRow>> {
        self.check_lookup()?;
        self.inner.deployment_config_find_by_app_ids(app_ids).await
    }

    async fn deployment_config_insert(
        &self,
        row: DeploymentConfigRow,
    ) -> anyhow::Result<DeploymentConfigRow> {
        self.inner.deployment_config_insert(row).await
    }

    async fn deployment_config_update(
        &self,
        row: DeploymentConfigRow,
    ) -> anyhow::Result<DeploymentConfigRow> {
        self.check_update()?;
        self.inner.deployment_config_update(row).await
    }

    async fn deployment_config_insert_many(
        &self,
        rows: Vec<DeploymentConfigRow>,
    ) -> anyhow::Result<()> {
        self.inner.deployment_config_insert_many(rows).await
    }

    async fn deployment_config_update_many(
        &self,
        rows: Vec<DeploymentConfigRow>,
    ) -> anyhow::Result<()> {
        self.check_update()?;
        self.inner.deployment_config_update_many(rows).await
    }

    async fn deployment_config_update_repo_url(
        &self,
        repo_url: &str,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<()> {
        self.check_update()?;
        self.inner
            .deployment_config_update_repo_url(repo_url, app_id, env_id)
            .await
    }
}

/// Service whose canonical store is a `FlakyStore` over `inner`, with legacy
/// reads served by `inner` directly
pub fn flaky_service(
    inner: &Arc<EmbeddedPersistService>,
    config: DeploymentServiceTypeConfig,
) -> (Arc<FlakyStore>, DeploymentConfigService) {
    let flaky = Arc::new(FlakyStore::new(inner.clone()));
    let service = DeploymentConfigService::new(flaky.clone(), inner.clone(), config);
    (flaky, service)
}
