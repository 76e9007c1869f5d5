use std::fmt;

/// Failure raised by a protocol adapter or its transport.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdapterError {
    /// Endpoint unreachable, timed out or answered with a non-success status.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Pool not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Operation not supported: {0}")]
    Unsupported(String),
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        AdapterError::Transport(format!("HTTP request failed: {}", err))
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::InvalidData(format!("JSON decode failed: {}", err))
    }
}

#[derive(Debug)]
pub enum AppError {
    ConfigError(String),
    AdapterError(AdapterError),
    UnknownProtocol(String),
    InvalidRiskProfile(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::AdapterError(err) => write!(f, "Adapter error: {}", err),
            AppError::UnknownProtocol(id) => write!(f, "Unknown protocol: {}", id),
            AppError::InvalidRiskProfile(profile) => write!(f, "Invalid risk profile: {}", profile),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::AdapterError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AdapterError> for AppError {
    fn from(err: AdapterError) -> Self {
        AppError::AdapterError(err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::InternalError(format!("HTTP request error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(AdapterError::NotFound("hydro_x".into()));
        assert_eq!(err.to_string(), "Adapter error: Pool not found: hydro_x");
        assert_eq!(
            AppError::UnknownProtocol("osmosis".into()).to_string(),
            "Unknown protocol: osmosis"
        );
    }
}
