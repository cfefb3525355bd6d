use thiserror::Error;

/// Errors returned by state component operations
#[derive(Error, Debug)]
pub enum ComponentError {
    /// `update` was called with something other than a JSON object
    #[error("State update must be a JSON object, found {found}")]
    InvalidUpdate { found: &'static str },

    /// Configuration had the wrong shape
    #[error("Invalid component configuration: {0}")]
    Config(String),

    /// Configuration was not valid JSON
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for state component operations
pub type Result<T> = std::result::Result<T, ComponentError>;
