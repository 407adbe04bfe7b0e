use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status} for {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CartError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CartError::ApiError(_) | CartError::HttpStatusError { .. } => ErrorSeverity::Medium,
            CartError::IoError(_) | CartError::SerializationError(_) => ErrorSeverity::High,
            CartError::UrlError(_)
            | CartError::ConfigError { .. }
            | CartError::ConfigValidationError { .. }
            | CartError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CartError::ApiError(_) => "Could not reach the storefront API".to_string(),
            CartError::HttpStatusError { status, .. } => {
                format!("The storefront API answered with status {}", status)
            }
            CartError::IoError(e) => format!("Could not access cart storage: {}", e),
            CartError::SerializationError(_) => "Stored cart data could not be encoded".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CartError::ApiError(_) | CartError::HttpStatusError { .. } => {
                "Check that the API server is running and --api-url points at it"
            }
            CartError::IoError(_) => "Check that the storage directory exists and is writable",
            CartError::SerializationError(_) => "Remove the stored cart file and try again",
            _ => "Review the configuration file and command line flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, CartError>;
