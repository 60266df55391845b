//! Main entry point for the Keel admin binary.
//!
//! Loads configuration, initializes logging, wires the configured storage
//! backend and runs one deployment config command, printing its result as
//! JSON on stdout.

use clap::Parser;
use keel_common::AppError;
use keel_persistence::schema;
use keel_server::{
    Configuration,
    cli::{Cli, Command},
    command, startup,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    let configuration = Configuration::new(&args.config_file, &args.overrides)?;

    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    if let Err(e) = run(&configuration, args.command).await {
        let app_error = AppError::from(e);
        error!(code = app_error.error_code().code, error = %app_error, "Command failed");
        return Err(app_error.to_string().into());
    }

    Ok(())
}

async fn run(configuration: &Configuration, cmd: Command) -> anyhow::Result<()> {
    if let Command::InitSchema = cmd {
        let db = configuration.database_connection().await?;
        schema::create_schema(&db).await?;
        info!("Schema created");
        return Ok(());
    }

    let service = startup::build_deployment_service(configuration).await?;
    info!(mode = %service.mode(), "Deployment config service ready");

    command::execute(&service, cmd, &mut std::io::stdout()).await
}
