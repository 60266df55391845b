//! Admin command execution
//!
//! Each command prints its result as one line of JSON to the given writer, so
//! the output does not depend on the configured log level.

use std::io::Write;

use keel_deployment::DeploymentConfigService;
use serde::Serialize;
use tracing::info;

use crate::cli::Command;

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Run one command against the service. `InitSchema` needs a raw database
/// connection and is handled by the caller.
pub async fn execute<W: Write>(
    service: &DeploymentConfigService,
    command: Command,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Resolve {
            app_id,
            env_id,
            migrate,
            helm,
        } => {
            let config = match (helm, migrate) {
                (false, false) => service.resolve(app_id, env_id).await?,
                (false, true) => service.resolve_and_migrate(app_id, env_id).await?,
                (true, false) => service.resolve_helm_app(app_id, env_id).await?,
                (true, true) => service.resolve_and_migrate_helm_app(app_id, env_id).await?,
            };
            info!(app_id, env_id, id = config.id, "Resolved deployment config");
            print_json(out, &config)?;
        }
        Command::Inspect { app_id, env_id } => {
            let config = service.get_config_even_if_inactive(app_id, env_id).await?;
            info!(app_id, env_id, id = config.id, "Latest deployment config");
            print_json(out, &config)?;
        }
        Command::List { app_ids } => {
            let configs = service.configs_by_app_ids(&app_ids).await?;
            info!(count = configs.len(), "Active deployment configs");
            print_json(out, &configs)?;
        }
        Command::Bulk { pipelines } => {
            let types = service.resolve_deployment_app_type_bulk(&pipelines).await?;
            info!(count = types.len(), "Resolved deployment app types");
            print_json(out, &types)?;
        }
        Command::UpdateRepoUrl {
            app_id,
            env_id,
            repo_url,
        } => {
            service.update_repo_url(&repo_url, app_id, env_id).await?;
            info!(app_id, env_id, repo_url = %repo_url, "Repo url updated");
            print_json(
                out,
                &serde_json::json!({ "appId": app_id, "environmentId": env_id, "repoUrl": repo_url }),
            )?;
        }
        Command::InitSchema => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use keel_deployment::{CdPipeline, DeploymentServiceTypeConfig};
    use keel_persistence::{ChartRecord, EmbeddedPersistService, PipelineRecord};

    use super::*;

    fn seeded_service() -> DeploymentConfigService {
        let store = EmbeddedPersistService::new();
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
        DeploymentConfigService::from_persistence(
            Arc::new(store),
            DeploymentServiceTypeConfig::new(true),
        )
    }

    #[tokio::test]
    async fn test_resolve_prints_config_json() {
        let service = seeded_service();
        let mut out = Vec::new();

        execute(
            &service,
            Command::Resolve {
                app_id: 7,
                env_id: 3,
                migrate: true,
                helm: false,
            },
            &mut out,
        )
        .await
        .unwrap();

        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["appId"], 7);
        assert_eq!(printed["environmentId"], 3);
        assert_eq!(printed["repoUrl"], "https://x/7");
        assert_eq!(printed["deploymentAppType"], "helm");
        assert!(printed["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_bulk_prints_type_per_pipeline() {
        let service = seeded_service();
        let mut out = Vec::new();

        execute(
            &service,
            Command::Bulk {
                pipelines: vec![CdPipeline {
                    id: 70,
                    app_id: 7,
                    environment_id: 3,
                    deployment_app_type: "helm".to_string(),
                }],
            },
            &mut out,
        )
        .await
        .unwrap();

        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["70"], "helm");
    }

    #[tokio::test]
    async fn test_failed_command_prints_nothing() {
        let service = seeded_service();
        let mut out = Vec::new();

        let result = execute(
            &service,
            Command::Inspect {
                app_id: 99,
                env_id: 1,
            },
            &mut out,
        )
        .await;

        assert!(result.is_err());
        assert!(out.is_empty());
    }
}
