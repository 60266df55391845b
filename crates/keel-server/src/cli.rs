//! Command line interface of the admin binary

use clap::{Parser, Subcommand};
use keel_deployment::CdPipeline;

use crate::model::ConfigOverrides;
use crate::model::constants::DEFAULT_CONFIG_FILE;

#[derive(Debug, Parser)]
#[command(name = "keel-server", version, about = "Deployment config resolution and migration")]
pub struct Cli {
    /// Configuration file
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve the deployment config of an application, optionally in one environment
    Resolve {
        #[arg(long)]
        app_id: i32,
        /// 0 resolves the application-level config
        #[arg(long, default_value_t = 0)]
        env_id: i32,
        /// Persist configs that had to be built from legacy tables
        #[arg(long)]
        migrate: bool,
        /// Resolve a store-installed helm application
        #[arg(long)]
        helm: bool,
    },
    /// Latest config of a scope, including retired ones
    Inspect {
        #[arg(long)]
        app_id: i32,
        #[arg(long, default_value_t = 0)]
        env_id: i32,
    },
    /// All active configs of the given applications
    List {
        #[arg(long = "app-id", required = true)]
        app_ids: Vec<i32>,
    },
    /// Deployment app type of many pipelines at once
    Bulk {
        /// id:app_id:env_id:deployment_app_type
        #[arg(long = "pipeline", value_parser = parse_pipeline, required = true)]
        pipelines: Vec<CdPipeline>,
    },
    /// Set the repo url of an active config
    UpdateRepoUrl {
        #[arg(long)]
        app_id: i32,
        #[arg(long)]
        env_id: i32,
        #[arg(long)]
        repo_url: String,
    },
    /// Create the canonical and legacy tables if missing
    InitSchema,
}

fn parse_pipeline(value: &str) -> Result<CdPipeline, String> {
    let parts: Vec<&str> = value.splitn(4, ':').collect();
    let [id, app_id, env_id, deployment_app_type] = parts.as_slice() else {
        return Err(format!(
            "expected id:app_id:env_id:deployment_app_type, got {}",
            value
        ));
    };
    let number = |s: &str| {
        s.parse::<i32>()
            .map_err(|e| format!("invalid number {:?} in {}: {}", s, value, e))
    };

    Ok(CdPipeline {
        id: number(*id)?,
        app_id: number(*app_id)?,
        environment_id: number(*env_id)?,
        deployment_app_type: deployment_app_type.to_string(),
    })
}
