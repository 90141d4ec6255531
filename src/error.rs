//! Error types for casebridge
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while bridging cases to issues
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Network, HTTP or authentication failure talking to either API
    #[error("Remote error: {0}")]
    Remote(String),

    /// Referenced case no longer exists on the case source
    #[error("Case not found: {0}")]
    NotFound(String),

    /// Missing severity mapping or invalid startup configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl BridgeError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, BridgeError::Configuration(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BridgeError::NotFound(_))
    }
}

/// Result type alias for casebridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
