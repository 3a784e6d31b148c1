use thiserror::Error;

use crate::types::Platform;

/// Errors surfaced while validating configuration, talking to GitHub or
/// posting to a chat platform.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PullbugError {
    /// A required flag or credential is missing or malformed.
    #[error("{message}")]
    Configuration { message: String },

    /// The owner, context or repository did not resolve on GitHub.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The request failed on the network, timed out or got an error status
    /// other than "not found".
    #[error("transport error: {message}")]
    Transport { message: String },

    /// A chat platform rejected the message.
    #[error("{platform} rejected the message: {message}")]
    PlatformApi { platform: Platform, message: String },
}

impl PullbugError {
    /// The message used when a required flag is missing.
    pub fn missing(flag: &str) -> Self {
        PullbugError::Configuration {
            message: format!("No {flag} set. Please correct and try again."),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, PullbugError::Configuration { .. })
    }
}

pub type Result<T> = std::result::Result<T, PullbugError>;
