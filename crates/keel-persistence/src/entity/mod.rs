//! SeaORM entity definitions

pub mod prelude;

pub mod charts;
pub mod deployment_config;
pub mod installed_apps;
pub mod pipeline;
