//! Legacy installed (helm store) app entity (read-only)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "installed_apps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub app_id: i32,
    pub environment_id: i32,
    #[sea_orm(nullable)]
    pub deployment_app_type: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub git_ops_repo_url: Option<String>,
    #[sea_orm(nullable)]
    pub git_ops_repo_name: Option<String>,
    pub is_custom_repository: bool,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
