//! Custom error types for widget-stats.
//!
//! This module provides structured error types for the aggregation engine.
//! Every validation failure is raised before any record is processed, so a
//! caller never observes partially computed content.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for widget aggregation
#[derive(Error, Debug)]
pub enum WidgetError {
    // =========================================================================
    // Request Errors
    // =========================================================================
    /// Widget type key is not registered
    #[error("Unknown widget type: '{key}'")]
    UnknownWidgetType { key: String },

    /// A mandatory widget option is absent
    #[error("Widget '{widget}' requires option '{option}'")]
    MissingRequiredOption { widget: String, option: String },

    /// A widget option could not be parsed
    #[error("Invalid value '{value}' for option '{option}' (expected {expected})")]
    InvalidOptionValue {
        option: String,
        value: String,
        expected: String,
    },

    /// Content or metadata fields are missing or malformed
    #[error("Widget '{widget}' cannot load content: {reason}")]
    MissingContentFields { widget: String, reason: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WidgetError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create an unknown widget type error
    pub fn unknown_widget(key: impl Into<String>) -> Self {
        Self::UnknownWidgetType { key: key.into() }
    }

    /// Create a missing option error
    pub fn missing_option(widget: impl Into<String>, option: impl Into<String>) -> Self {
        Self::MissingRequiredOption {
            widget: widget.into(),
            option: option.into(),
        }
    }

    /// Create an invalid option value error
    pub fn invalid_option(
        option: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidOptionValue {
            option: option.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a content fields error
    pub fn content_fields(widget: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MissingContentFields {
            widget: widget.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// Check if this error was caused by the caller's request.
    ///
    /// Bad-request errors are never worth retrying with the same input.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::UnknownWidgetType { .. }
                | Self::MissingRequiredOption { .. }
                | Self::InvalidOptionValue { .. }
                | Self::MissingContentFields { .. }
        )
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownWidgetType { .. } => 2,
            Self::MissingRequiredOption { .. } | Self::InvalidOptionValue { .. } => 3,
            Self::MissingContentFields { .. } => 4,
            Self::Config { .. } | Self::InvalidConfig { .. } => 7,
            _ => 1,
        }
    }
}

/// Type alias for widget-stats results
pub type Result<T> = std::result::Result<T, WidgetError>;
