//! Error types and error codes for Keel
//!
//! This module defines:
//! - `KeelError`: Application-specific error enum
//! - `AppError`: Wrapper for integration with the API layer
//! - `ErrorCode`: Structured error codes for API responses

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Application-specific error types
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KeelError {
    #[error("no chart found for app {app_id}, deployment config cannot be derived")]
    ChartNotFound { app_id: i32 },

    #[error("no cd pipeline found for app {app_id} in env {env_id}")]
    PipelineNotFound { app_id: i32, env_id: i32 },

    #[error("no installed app found for app {app_id} in env {env_id}")]
    InstalledAppNotFound { app_id: i32, env_id: i32 },

    #[error("deployment config not found for app {app_id} in env {env_id}")]
    ConfigNotFound { app_id: i32, env_id: i32 },

    #[error("an active deployment config already exists for app {app_id} in env {env_id}")]
    MigrationConflict { app_id: i32, env_id: i32 },

    #[error("caused: {0}")]
    IllegalArgument(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl KeelError {
    /// Whether the error belongs to the "no configuration derivable" class
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            KeelError::ChartNotFound { .. }
                | KeelError::PipelineNotFound { .. }
                | KeelError::InstalledAppNotFound { .. }
                | KeelError::ConfigNotFound { .. }
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, KeelError::MigrationConflict { .. })
    }

    pub fn error_code(&self) -> ErrorCode<'static> {
        match self {
            KeelError::ChartNotFound { .. }
            | KeelError::PipelineNotFound { .. }
            | KeelError::InstalledAppNotFound { .. }
            | KeelError::ConfigNotFound { .. } => RESOURCE_NOT_FOUND,
            KeelError::MigrationConflict { .. } => RESOURCE_CONFLICT,
            KeelError::IllegalArgument(_) => PARAMETER_VALIDATE_ERROR,
            KeelError::DatabaseError(_) => DATA_ACCESS_ERROR,
            KeelError::ConfigError(_) | KeelError::InternalError(_) => SERVER_ERROR,
        }
    }
}

/// Find a `KeelError` anywhere in an `anyhow` chain
pub fn find_keel_error(err: &anyhow::Error) -> Option<&KeelError> {
    err.chain().find_map(|cause| cause.downcast_ref::<KeelError>())
}

/// Wrapper for application errors
#[derive(Debug)]
pub struct AppError {
    inner: anyhow::Error,
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError { inner: value }
    }
}

impl AppError {
    /// Error code for the API layer. Untyped failures count as data access errors.
    pub fn error_code(&self) -> ErrorCode<'static> {
        find_keel_error(&self.inner)
            .map(KeelError::error_code)
            .unwrap_or(DATA_ACCESS_ERROR)
    }
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

pub const DATA_ACCESS_ERROR: ErrorCode<'static> = ErrorCode {
    code: 10002,
    message: "data access error",
};

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "parameter validate error",
};

pub const RESOURCE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20004,
    message: "resource not found",
};

pub const RESOURCE_CONFLICT: ErrorCode<'static> = ErrorCode {
    code: 20005,
    message: "resource conflict",
};

pub const SERVER_ERROR: ErrorCode<'static> = ErrorCode {
    code: 30000,
    message: "server error",
};
