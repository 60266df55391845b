//! Deployment config read paths
//!
//! Every scope is resolved into a [`ScopeResolution`] first. What happens next
//! (persist it or hand it back as is) depends only on the tag and the
//! [`MigrationPolicy`] of the call, never on which public operation ran.

use keel_common::{
    APP_LEVEL_ENV_ID, KeelError, SYSTEM_USER_ID, error::find_keel_error,
    is_git_ops_repo_configured, is_git_ops_repo_not_configured,
};
use keel_persistence::DeploymentConfigRow;

use super::DeploymentConfigService;
use crate::mode::DeploymentMode;
use crate::model::{DeploymentConfig, ReleaseMode};

/// Where a scope's config came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScopeResolution {
    /// Read from the canonical table
    FromCanonical(DeploymentConfigRow),
    /// Built from legacy tables, not persisted
    FromLegacySynthesis(DeploymentConfigRow),
}

impl ScopeResolution {
    pub fn row(&self) -> &DeploymentConfigRow {
        match self {
            ScopeResolution::FromCanonical(row) | ScopeResolution::FromLegacySynthesis(row) => row,
        }
    }

    pub fn into_row(self) -> DeploymentConfigRow {
        match self {
            ScopeResolution::FromCanonical(row) | ScopeResolution::FromLegacySynthesis(row) => row,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        matches!(self, ScopeResolution::FromLegacySynthesis(_))
    }
}

/// Whether a read may write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MigrationPolicy {
    ReadOnly,
    Migrate,
}

/// Copy the app-level repo url onto an env-level row that has none.
/// Returns whether the row changed.
fn inherit_repo_url(env_level: &mut DeploymentConfigRow, app_level: &DeploymentConfigRow) -> bool {
    if is_git_ops_repo_not_configured(&env_level.repo_url)
        && is_git_ops_repo_configured(&app_level.repo_url)
    {
        env_level.repo_url = app_level.repo_url.clone();
        true
    } else {
        false
    }
}

impl DeploymentConfigService {
    /// Resolve the deployment config of (app_id, env_id) without writing
    ///
    /// `env_id == 0` resolves the application-level config.
    ///
    /// # Errors
    ///
    /// A NotFound-class `KeelError` when neither the canonical table nor the
    /// legacy tables can produce the config. Storage failures are propagated
    /// unchanged.
    pub async fn resolve(&self, app_id: i32, env_id: i32) -> anyhow::Result<DeploymentConfig> {
        match self.mode() {
            DeploymentMode::Legacy => self.resolve_from_legacy(app_id, env_id).await,
            DeploymentMode::Canonical => {
                self.resolve_canonical(app_id, env_id, MigrationPolicy::ReadOnly)
                    .await
            }
        }
    }

    /// Resolve the deployment config of (app_id, env_id), persisting any scope
    /// that had to be synthesized from legacy tables
    ///
    /// In canonical mode this also persists the app-level repo url onto an
    /// env-level row that lacks one; a failure of that update fails the call.
    /// In legacy mode nothing is written.
    pub async fn resolve_and_migrate(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<DeploymentConfig> {
        match self.mode() {
            DeploymentMode::Legacy => self.resolve_from_legacy(app_id, env_id).await,
            DeploymentMode::Canonical => {
                self.resolve_canonical(app_id, env_id, MigrationPolicy::Migrate)
                    .await
            }
        }
    }

    /// Application-level config, migrated on first access in canonical mode
    pub async fn app_level_config(&self, app_id: i32) -> anyhow::Result<DeploymentConfig> {
        self.resolve_and_migrate(app_id, APP_LEVEL_ENV_ID).await
    }

    /// Deployment config of a store-installed helm application
    pub async fn resolve_helm_app(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<DeploymentConfig> {
        self.resolve_helm_app_with(app_id, env_id, MigrationPolicy::ReadOnly)
            .await
    }

    /// Deployment config of a store-installed helm application, migrated on
    /// first access in canonical mode
    pub async fn resolve_and_migrate_helm_app(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<DeploymentConfig> {
        self.resolve_helm_app_with(app_id, env_id, MigrationPolicy::Migrate)
            .await
    }

    /// Latest canonical row of (app_id, env_id), retired or not
    pub async fn get_config_even_if_inactive(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<DeploymentConfig> {
        let row = self
            .store
            .deployment_config_find_by_scope_even_if_inactive(app_id, env_id)
            .await
            .inspect_err(|e| {
                tracing::error!(app_id, env_id, error = %e, "Failed to fetch deployment config");
            })?
            .ok_or(KeelError::ConfigNotFound { app_id, env_id })?;
        Ok(row.into())
    }

    // ------------------------------------------------------------------------
    // Legacy mode
    // ------------------------------------------------------------------------

    async fn resolve_from_legacy(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<DeploymentConfig> {
        let app_level = self.synthesizer.synthesize_app_level(app_id).await?;
        if env_id == APP_LEVEL_ENV_ID {
            return Ok(app_level.into());
        }

        let mut env_level = self
            .synthesizer
            .synthesize_env_level(&app_level, app_id, env_id)
            .await?;

        // Release mode has no legacy column; take it from the canonical row if one exists
        env_level.release_mode = match self
            .store
            .deployment_config_find_by_scope(app_id, env_id)
            .await
            .inspect_err(|e| {
                tracing::error!(app_id, env_id, error = %e, "Failed to fetch deployment config");
            })? {
            Some(canonical) => canonical.release_mode,
            None => ReleaseMode::Create.as_str().to_string(),
        };

        Ok(env_level.into())
    }

    // ------------------------------------------------------------------------
    // Canonical mode
    // ------------------------------------------------------------------------

    async fn resolve_canonical(
        &self,
        app_id: i32,
        env_id: i32,
        policy: MigrationPolicy,
    ) -> anyhow::Result<DeploymentConfig> {
        tracing::debug!(app_id, env_id, ?policy, "Resolving deployment config");

        let app_level = self.resolve_app_scope(app_id).await?;
        let app_level = self.settle(app_level, policy).await?;
        if env_id == APP_LEVEL_ENV_ID {
            return Ok(app_level.into());
        }

        let env_level = match self.resolve_env_scope(&app_level, app_id, env_id).await? {
            ScopeResolution::FromCanonical(mut row) => {
                if inherit_repo_url(&mut row, &app_level) && policy == MigrationPolicy::Migrate {
                    self.persist_inherited_repo_url(row).await?
                } else {
                    row
                }
            }
            synthesized => self.settle(synthesized, policy).await?,
        };

        Ok(env_level.into())
    }

    async fn resolve_app_scope(&self, app_id: i32) -> anyhow::Result<ScopeResolution> {
        let found = self
            .store
            .deployment_config_find_app_level(app_id)
            .await
            .inspect_err(|e| {
                tracing::error!(app_id, error = %e, "Failed to fetch app level deployment config");
            })?;

        match found {
            Some(row) => Ok(ScopeResolution::FromCanonical(row)),
            None => {
                let row = self.synthesizer.synthesize_app_level(app_id).await?;
                Ok(ScopeResolution::FromLegacySynthesis(row))
            }
        }
    }

    async fn resolve_env_scope(
        &self,
        app_level: &DeploymentConfigRow,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<ScopeResolution> {
        let found = self
            .store
            .deployment_config_find_by_scope(app_id, env_id)
            .await
            .inspect_err(|e| {
                tracing::error!(app_id, env_id, error = %e, "Failed to fetch env level deployment config");
            })?;

        match found {
            Some(row) => Ok(ScopeResolution::FromCanonical(row)),
            None => {
                let row = self
                    .synthesizer
                    .synthesize_env_level(app_level, app_id, env_id)
                    .await?;
                Ok(ScopeResolution::FromLegacySynthesis(row))
            }
        }
    }

    async fn resolve_helm_app_with(
        &self,
        app_id: i32,
        env_id: i32,
        policy: MigrationPolicy,
    ) -> anyhow::Result<DeploymentConfig> {
        if self.mode() == DeploymentMode::Legacy {
            return Ok(self
                .synthesizer
                .synthesize_helm_app(app_id, env_id)
                .await?
                .into());
        }

        let found = self
            .store
            .deployment_config_find_by_scope(app_id, env_id)
            .await
            .inspect_err(|e| {
                tracing::error!(app_id, env_id, error = %e, "Failed to fetch helm app deployment config");
            })?;

        let resolution = match found {
            Some(row) => ScopeResolution::FromCanonical(row),
            None => ScopeResolution::FromLegacySynthesis(
                self.synthesizer.synthesize_helm_app(app_id, env_id).await?,
            ),
        };

        Ok(self.settle(resolution, policy).await?.into())
    }

    // ------------------------------------------------------------------------
    // Writes on read
    // ------------------------------------------------------------------------

    /// Turn a resolution into the row to return, persisting synthesized rows
    /// when the policy allows it
    async fn settle(
        &self,
        resolution: ScopeResolution,
        policy: MigrationPolicy,
    ) -> anyhow::Result<DeploymentConfigRow> {
        match (resolution, policy) {
            (ScopeResolution::FromLegacySynthesis(row), MigrationPolicy::Migrate) => {
                self.migrate(row).await
            }
            (resolution, _) => Ok(resolution.into_row()),
        }
    }

    /// Persist a synthesized row. Losing an insert race to a concurrent
    /// migration of the same scope returns the winner's row.
    async fn migrate(&self, mut row: DeploymentConfigRow) -> anyhow::Result<DeploymentConfigRow> {
        let (app_id, env_id) = (row.app_id, row.environment_id);
        tracing::info!(
            app_id,
            env_id,
            "Deployment config not found, migrating from legacy tables"
        );

        row.id = 0;
        row.active = true;
        row.release_mode = ReleaseMode::Create.as_str().to_string();
        row.audit.create(SYSTEM_USER_ID);

        match self.store.deployment_config_insert(row).await {
            Ok(saved) => Ok(saved),
            Err(e) if find_keel_error(&e).is_some_and(KeelError::is_conflict) => {
                let winner = self
                    .store
                    .deployment_config_find_by_scope(app_id, env_id)
                    .await?;
                match winner {
                    Some(winner) => {
                        tracing::info!(
                            app_id,
                            env_id,
                            id = winner.id,
                            "Deployment config migrated concurrently, using existing row"
                        );
                        Ok(winner)
                    }
                    None => Err(e),
                }
            }
            Err(e) => {
                tracing::error!(app_id, env_id, error = %e, "Failed to save deployment config");
                Err(e)
            }
        }
    }

    /// The one write-on-read fix-up: an env-level row that lost its repo url
    /// gets the app-level one. Happens for cloned apps with custom GitOps
    /// configured at app level after cloning.
    async fn persist_inherited_repo_url(
        &self,
        mut row: DeploymentConfigRow,
    ) -> anyhow::Result<DeploymentConfigRow> {
        row.audit.update(SYSTEM_USER_ID);
        self.store
            .deployment_config_update(row)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, "Failed to copy app level repo url to env level deployment config");
            })
    }
}
