pub use super::charts::Entity as Charts;
pub use super::deployment_config::Entity as DeploymentConfig;
pub use super::installed_apps::Entity as InstalledApps;
pub use super::pipeline::Entity as Pipeline;
