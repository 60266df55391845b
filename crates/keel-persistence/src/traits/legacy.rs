//! Legacy table readers
//!
//! The legacy tables are read-only inputs to config synthesis. A missing
//! record is `Ok(None)`.

use async_trait::async_trait;

use crate::model::{ChartRecord, InstalledAppRecord};

#[async_trait]
pub trait ChartReader: Send + Sync {
    /// Find the latest chart of an application
    async fn chart_find_latest_by_app_id(
        &self,
        app_id: i32,
    ) -> anyhow::Result<Option<ChartRecord>>;
}

#[async_trait]
pub trait PipelineReader: Send + Sync {
    /// Find the deployment app type recorded on the live pipeline of (app_id, env_id)
    async fn pipeline_find_deployment_app_type(
        &self,
        app_id: i32,
        env_id: i32,
    ) -> anyhow::Result<Option<String>>;
}

#[async_trait]
pub trait InstalledAppReader: Send + Sync {
    /// Find the active installed app record of an application
    async fn installed_app_find_by_app_id(
        &self,
        app_id: i32,
    ) -> anyhow::Result<Option<InstalledAppRecord>>;
}

/// All legacy readers together
pub trait LegacyReader: ChartReader + PipelineReader + InstalledAppReader {}

impl<T: ChartReader + PipelineReader + InstalledAppReader> LegacyReader for T {}
