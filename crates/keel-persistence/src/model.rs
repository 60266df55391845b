//! Domain model types for the persistence abstraction layer
//!
//! These types are used as return values from the persistence traits,
//! decoupled from specific storage backends.

use std::collections::BTreeMap;

use keel_common::{APP_LEVEL_ENV_ID, AuditLog};
use serde::{Deserialize, Serialize};

/// Requested scopes for bulk lookups: app id to the env ids wanted for it
pub type AppEnvScopes = BTreeMap<i32, Vec<i32>>;

/// Storage mode for the persistence layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMode {
    /// External database (MySQL/PostgreSQL via SeaORM)
    ExternalDb,
    /// In-process store, used for standalone runs and tests
    Embedded,
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::ExternalDb => write!(f, "external_db"),
            StorageMode::Embedded => write!(f, "embedded"),
        }
    }
}

impl std::str::FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "external_db" => Ok(StorageMode::ExternalDb),
            "embedded" => Ok(StorageMode::Embedded),
            _ => Err(format!("Invalid storage mode: {}", s)),
        }
    }
}

/// A row of the canonical `deployment_config` table
///
/// `id == 0` means the row has not been persisted yet. Empty strings stand in
/// for NULL columns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfigRow {
    pub id: i32,
    pub app_id: i32,
    pub environment_id: i32,
    pub config_type: String,
    pub repo_url: String,
    pub repo_name: String,
    pub deployment_app_type: String,
    pub release_mode: String,
    pub active: bool,
    pub audit: AuditLog,
}

impl DeploymentConfigRow {
    pub fn is_app_level(&self) -> bool {
        self.environment_id == APP_LEVEL_ENV_ID
    }

    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }
}

/// Latest chart of an application, the legacy source of app-level settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub id: i32,
    pub app_id: i32,
    pub git_repo_url: String,
    pub is_custom_git_repository: bool,
}

/// CD pipeline of an application in one environment
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub id: i32,
    pub app_id: i32,
    pub environment_id: i32,
    pub deployment_app_type: String,
}

/// Store-installed (helm) application record
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledAppRecord {
    pub id: i32,
    pub app_id: i32,
    pub environment_id: i32,
    pub deployment_app_type: String,
    pub git_ops_repo_url: String,
    pub git_ops_repo_name: String,
    pub is_custom_repository: bool,
}
