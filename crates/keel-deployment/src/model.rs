//! Deployment config domain model
//!
//! `DeploymentConfig` is what callers see regardless of which storage
//! generation produced it. Conversions to and from the storage row keep every
//! value the row can hold; empty columns map to `None`.

use keel_common::{APP_LEVEL_ENV_ID, AuditLog};
use keel_persistence::DeploymentConfigRow;
use serde::{Deserialize, Serialize};

/// Whether the backing GitOps repository was generated by the platform or
/// supplied by a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigType {
    Custom,
    #[default]
    SystemGenerated,
}

impl ConfigType {
    pub fn from_custom_repo_flag(is_custom: bool) -> Self {
        if is_custom {
            ConfigType::Custom
        } else {
            ConfigType::SystemGenerated
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigType::Custom => "CUSTOM",
            ConfigType::SystemGenerated => "SYSTEM_GENERATED",
        }
    }
}

impl std::fmt::Display for ConfigType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for ConfigType {
    fn from(value: &str) -> Self {
        if value == "CUSTOM" {
            ConfigType::Custom
        } else {
            ConfigType::SystemGenerated
        }
    }
}

/// How a pipeline's deployment came to exist
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReleaseMode {
    /// Created by the platform. Every migrated row carries this.
    Create,
    /// Adopted from a deployment that existed outside the platform
    Migrate,
    /// Any value written by a newer platform version
    Other(String),
}

impl ReleaseMode {
    pub fn as_str(&self) -> &str {
        match self {
            ReleaseMode::Create => "create",
            ReleaseMode::Migrate => "migrate",
            ReleaseMode::Other(value) => value,
        }
    }
}

impl std::fmt::Display for ReleaseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for ReleaseMode {
    fn from(value: &str) -> Self {
        match value {
            "create" => ReleaseMode::Create,
            "migrate" => ReleaseMode::Migrate,
            other => ReleaseMode::Other(other.to_string()),
        }
    }
}

impl From<String> for ReleaseMode {
    fn from(value: String) -> Self {
        ReleaseMode::from(value.as_str())
    }
}

impl From<ReleaseMode> for String {
    fn from(value: ReleaseMode) -> Self {
        value.as_str().to_string()
    }
}

/// Deployment mechanism of a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeploymentAppType {
    /// Helm-native release
    Helm,
    /// GitOps-managed through Argo CD
    ArgoCd,
    ManifestDownload,
    ManifestPush,
    /// Any value written by a newer platform version
    Other(String),
}

impl DeploymentAppType {
    pub fn as_str(&self) -> &str {
        match self {
            DeploymentAppType::Helm => "helm",
            DeploymentAppType::ArgoCd => "argo_cd",
            DeploymentAppType::ManifestDownload => "manifest_download",
            DeploymentAppType::ManifestPush => "manifest_push",
            DeploymentAppType::Other(value) => value,
        }
    }
}

impl std::fmt::Display for DeploymentAppType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for DeploymentAppType {
    fn from(value: &str) -> Self {
        match value {
            "helm" => DeploymentAppType::Helm,
            "argo_cd" => DeploymentAppType::ArgoCd,
            "manifest_download" => DeploymentAppType::ManifestDownload,
            "manifest_push" => DeploymentAppType::ManifestPush,
            other => DeploymentAppType::Other(other.to_string()),
        }
    }
}

impl From<String> for DeploymentAppType {
    fn from(value: String) -> Self {
        DeploymentAppType::from(value.as_str())
    }
}

impl From<DeploymentAppType> for String {
    fn from(value: DeploymentAppType) -> Self {
        value.as_str().to_string()
    }
}

/// Resolved deployment config of an application, optionally scoped to one
/// environment (`environment_id > 0`)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    /// 0 until persisted
    pub id: i32,
    pub app_id: i32,
    pub environment_id: i32,
    pub config_type: ConfigType,
    pub repo_url: String,
    pub repo_name: String,
    pub deployment_app_type: Option<DeploymentAppType>,
    pub release_mode: Option<ReleaseMode>,
    pub active: bool,
    #[serde(default)]
    pub audit: AuditLog,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            id: 0,
            app_id: 0,
            environment_id: APP_LEVEL_ENV_ID,
            config_type: ConfigType::default(),
            repo_url: String::new(),
            repo_name: String::new(),
            deployment_app_type: None,
            release_mode: None,
            active: true,
            audit: AuditLog::default(),
        }
    }
}

impl DeploymentConfig {
    /// A fresh active config for (app_id, env_id)
    pub fn new(app_id: i32, environment_id: i32) -> Self {
        Self {
            app_id,
            environment_id,
            ..Default::default()
        }
    }

    pub fn is_app_level(&self) -> bool {
        self.environment_id == APP_LEVEL_ENV_ID
    }
}

#[inline]
fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

impl From<DeploymentConfigRow> for DeploymentConfig {
    fn from(row: DeploymentConfigRow) -> Self {
        Self {
            id: row.id,
            app_id: row.app_id,
            environment_id: row.environment_id,
            config_type: ConfigType::from(row.config_type.as_str()),
            repo_url: row.repo_url,
            repo_name: row.repo_name,
            deployment_app_type: non_empty(row.deployment_app_type).map(DeploymentAppType::from),
            release_mode: non_empty(row.release_mode).map(ReleaseMode::from),
            active: row.active,
            audit: row.audit,
        }
    }
}

impl From<DeploymentConfig> for DeploymentConfigRow {
    fn from(config: DeploymentConfig) -> Self {
        Self {
            id: config.id,
            app_id: config.app_id,
            environment_id: config.environment_id,
            config_type: config.config_type.as_str().to_string(),
            repo_url: config.repo_url,
            repo_name: config.repo_name,
            deployment_app_type: config
                .deployment_app_type
                .map(String::from)
                .unwrap_or_default(),
            release_mode: config.release_mode.map(String::from).unwrap_or_default(),
            active: config.active,
            audit: config.audit,
        }
    }
}

/// CD pipeline as seen by the bulk resolver: its id, scope and the
/// deployment app type recorded on the legacy pipeline row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdPipeline {
    pub id: i32,
    pub app_id: i32,
    pub environment_id: i32,
    pub deployment_app_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_type_from_flag() {
        assert_eq!(ConfigType::from_custom_repo_flag(true), ConfigType::Custom);
        assert_eq!(
            ConfigType::from_custom_repo_flag(false),
            ConfigType::SystemGenerated
        );
        assert_eq!(ConfigType::from("CUSTOM"), ConfigType::Custom);
        assert_eq!(ConfigType::from(""), ConfigType::SystemGenerated);
    }

    #[test]
    fn test_release_mode_keeps_unknown_values() {
        assert_eq!(ReleaseMode::from("create"), ReleaseMode::Create);
        assert_eq!(ReleaseMode::from("migrate"), ReleaseMode::Migrate);
        let other = ReleaseMode::from("link");
        assert_eq!(other, ReleaseMode::Other("link".to_string()));
        assert_eq!(other.as_str(), "link");
    }

    #[test]
    fn test_row_conversion_keeps_unknown_release_mode() {
        let row = DeploymentConfigRow {
            id: 5,
            app_id: 7,
            environment_id: 3,
            config_type: "CUSTOM".to_string(),
            release_mode: "link".to_string(),
            active: true,
            ..Default::default()
        };
        let config = DeploymentConfig::from(row.clone());
        assert_eq!(
            config.release_mode,
            Some(ReleaseMode::Other("link".to_string()))
        );
        assert_eq!(DeploymentConfigRow::from(config), row);
    }

    #[test]
    fn test_deployment_app_type_keeps_unknown_values() {
        assert_eq!(DeploymentAppType::from("helm"), DeploymentAppType::Helm);
        assert_eq!(DeploymentAppType::from("argo_cd"), DeploymentAppType::ArgoCd);
        let other = DeploymentAppType::from("flux_cd");
        assert_eq!(other, DeploymentAppType::Other("flux_cd".to_string()));
        assert_eq!(other.as_str(), "flux_cd");
    }

    #[test]
    fn test_default_config_is_active_app_level() {
        let config = DeploymentConfig::new(7, 0);
        assert!(config.active);
        assert!(config.is_app_level());
        assert_eq!(config.id, 0);
    }

    #[test]
    fn test_row_conversion_maps_empty_columns_to_none() {
        let row = DeploymentConfigRow {
            id: 4,
            app_id: 7,
            environment_id: 0,
            config_type: "SYSTEM_GENERATED".to_string(),
            repo_url: "https://x/7".to_string(),
            active: true,
            ..Default::default()
        };
        let config = DeploymentConfig::from(row.clone());
        assert_eq!(config.deployment_app_type, None);
        assert_eq!(config.release_mode, None);

        let back = DeploymentConfigRow::from(config);
        assert_eq!(back, row);
    }

    #[test]
    fn test_serialized_field_names() {
        let mut config = DeploymentConfig::new(7, 3);
        config.deployment_app_type = Some(DeploymentAppType::Helm);
        config.release_mode = Some(ReleaseMode::Create);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["appId"], 7);
        assert_eq!(json["configType"], "SYSTEM_GENERATED");
        assert_eq!(json["deploymentAppType"], "helm");
        assert_eq!(json["releaseMode"], "create");
    }
}
