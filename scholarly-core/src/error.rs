//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};

pub type ScholarlyResult<T> = Result<T, ScholarlyError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type shared by the scholarly crates
#[derive(Error, Debug)]
pub enum ScholarlyError {
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        /// Every missing or malformed variable found while loading
        variables: Vec<String>,
        context: ErrorContext,
    },

    #[error("Upstream error ({service}): {message}")]
    Upstream {
        service: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },
}

impl ScholarlyError {
    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            ScholarlyError::Config { context, .. } => context,
            ScholarlyError::Upstream { context, .. } => context,
            ScholarlyError::Timeout { context, .. } => context,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ScholarlyError::Upstream { .. } | ScholarlyError::Timeout { .. } => true,
            ScholarlyError::Config { .. } => false,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let context = self.context();
        match self {
            ScholarlyError::Config { .. } => {
                error!(
                    error_id = %context.error_id,
                    component = %context.component,
                    error = %self,
                    "Configuration error"
                );
            }
            ScholarlyError::Upstream { .. } | ScholarlyError::Timeout { .. } => {
                warn!(
                    error_id = %context.error_id,
                    component = %context.component,
                    operation = ?context.operation,
                    error = %self,
                    "Upstream or timeout error (may be recoverable)"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::ScholarlyError::Config {
            message: $msg.to_string(),
            variables: Vec::new(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your environment or .env file"),
        }
    };
    ($msg:expr, $component:expr, $variables:expr) => {
        $crate::ScholarlyError::Config {
            message: $msg.to_string(),
            variables: $variables,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your environment or .env file"),
        }
    };
}

#[macro_export]
macro_rules! upstream_error {
    ($service:expr, $msg:expr, $component:expr) => {
        $crate::ScholarlyError::Upstream {
            service: $service.to_string(),
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($service:expr, $msg:expr, $component:expr, $source:expr) => {
        $crate::ScholarlyError::Upstream {
            service: $service.to_string(),
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}
