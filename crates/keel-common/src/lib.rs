//! Keel Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all Keel components:
//! - Error types and error codes
//! - Audit stamping for persisted rows
//! - GitOps repository helpers
//! - Common constants

pub mod audit;
pub mod error;
pub mod gitops;

// Re-exports for convenience
pub use audit::AuditLog;
pub use error::{AppError, ErrorCode, KeelError};
pub use gitops::{is_git_ops_repo_configured, is_git_ops_repo_not_configured};

/// User id used for rows written by the platform itself (migrations, fix-ups)
pub const SYSTEM_USER_ID: i32 = 1;

/// Environment id of the application-level scope
pub const APP_LEVEL_ENV_ID: i32 = 0;
