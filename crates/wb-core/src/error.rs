//! # AppError
//!
//! Centralized error handling for the wall-board ecosystem.
//!
//! The taxonomy is deliberately small: bad input is rejected before any
//! store access, and store faults carry the offending statement plus its
//! bound parameters so a 400 response can include actionable detail.

use serde_json::json;
use thiserror::Error;

/// The primary error type for all wb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed required fields, bad pagination values.
    #[error("{0}")]
    InvalidParameters(String),

    /// Connection or query failure in the underlying store.
    #[error("{message}")]
    Store {
        message: String,
        sql: String,
        params: Vec<String>,
    },
}

/// A specialized Result type for wall-board logic.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn store(cause: impl std::fmt::Display, sql: &str, params: Vec<String>) -> Self {
        AppError::Store {
            message: cause.to_string(),
            sql: sql.to_string(),
            params,
        }
    }

    /// Diagnostic payload for the response body, when one exists.
    pub fn detail(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Store { sql, params, .. } => {
                Some(json!({ "sql": sql, "params": params }))
            }
            AppError::InvalidParameters(_) => None,
        }
    }
}
