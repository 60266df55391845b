//! Schema bootstrap for the external database backend
//!
//! Creates the tables from the entity definitions and the index that admits
//! at most one active deployment config per (app_id, environment_id).
//! Concurrent migrations rely on that index to pick a single winner.

use sea_orm::{ConnectionTrait, DatabaseBackend, EntityTrait, Schema};

use crate::entity::{charts, deployment_config, installed_apps, pipeline};

const ACTIVE_SCOPE_INDEX: &str = "uq_deployment_config_active_scope";

async fn create_table<C, E>(db: &C, entity: E) -> anyhow::Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Create all tables and the active scope index if they do not exist
pub async fn create_schema<C: ConnectionTrait>(db: &C) -> anyhow::Result<()> {
    create_table(db, deployment_config::Entity).await?;
    create_table(db, charts::Entity).await?;
    create_table(db, pipeline::Entity).await?;
    create_table(db, installed_apps::Entity).await?;
    create_active_scope_index(db).await
}

async fn create_active_scope_index<C: ConnectionTrait>(db: &C) -> anyhow::Result<()> {
    match db.get_database_backend() {
        DatabaseBackend::Postgres | DatabaseBackend::Sqlite => {
            db.execute_unprepared(&format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {ACTIVE_SCOPE_INDEX} \
                 ON deployment_config (app_id, environment_id) WHERE active"
            ))
            .await?;
        }
        DatabaseBackend::MySql => {
            // No partial indexes: NULL key parts for inactive rows never collide
            let result = db
                .execute_unprepared(&format!(
                    "CREATE UNIQUE INDEX {ACTIVE_SCOPE_INDEX} ON deployment_config \
                     ((CASE WHEN active THEN app_id END), \
                     (CASE WHEN active THEN environment_id END))"
                ))
                .await;
            if let Err(e) = result
                && !e.to_string().contains("Duplicate key name")
            {
                return Err(e.into());
            }
        }
    }
    Ok(())
}
