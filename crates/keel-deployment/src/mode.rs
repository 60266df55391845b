//! Deployment mode toggle
//!
//! Decides whether the canonical `deployment_config` table or the legacy
//! tables answer deployment config reads. The value is read once at startup
//! and handed to the service by value; nothing mutates it afterwards.

use serde::{Deserialize, Serialize};

/// Which storage generation is the source of truth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    /// Legacy chart and pipeline tables are authoritative
    #[default]
    Legacy,
    /// The canonical table is authoritative, legacy tables are a fallback
    Canonical,
}

impl DeploymentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DeploymentMode::Legacy => "legacy",
            DeploymentMode::Canonical => "canonical",
        }
    }

    pub fn is_canonical(self) -> bool {
        self == DeploymentMode::Canonical
    }
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Startup configuration of the deployment config service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentServiceTypeConfig {
    /// `USE_DEPLOYMENT_CONFIG_DATA`
    pub use_deployment_config_data: bool,
}

impl DeploymentServiceTypeConfig {
    pub fn new(use_deployment_config_data: bool) -> Self {
        Self {
            use_deployment_config_data,
        }
    }

    pub fn mode(&self) -> DeploymentMode {
        if self.use_deployment_config_data {
            DeploymentMode::Canonical
        } else {
            DeploymentMode::Legacy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(
            DeploymentServiceTypeConfig::new(true).mode(),
            DeploymentMode::Canonical
        );
        assert_eq!(
            DeploymentServiceTypeConfig::new(false).mode(),
            DeploymentMode::Legacy
        );
        assert_eq!(
            DeploymentServiceTypeConfig::default().mode(),
            DeploymentMode::Legacy
        );
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(DeploymentMode::Legacy.to_string(), "legacy");
        assert_eq!(DeploymentMode::Canonical.to_string(), "canonical");
        assert!(DeploymentMode::Canonical.is_canonical());
    }
}
