//! Canonical deployment config entity
//!
//! One active row per (app_id, environment_id). `environment_id = 0` is the
//! application-level row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "deployment_config")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub app_id: i32,
    pub environment_id: i32,
    /// CUSTOM or SYSTEM_GENERATED
    pub config_type: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub repo_url: Option<String>,
    #[sea_orm(nullable)]
    pub repo_name: Option<String>,
    #[sea_orm(nullable)]
    pub deployment_app_type: Option<String>,
    #[sea_orm(nullable)]
    pub release_mode: Option<String>,
    pub active: bool,
    pub created_on: DateTime,
    pub created_by: i32,
    pub updated_on: DateTime,
    pub updated_by: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
