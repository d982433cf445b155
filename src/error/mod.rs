//! Error types for registry authentication

use crate::http::ResponseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Non-success HTTP response, passed through exactly as the transport produced it
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// A 401 arrived without any challenge to answer
    #[error("Tried to {action} but failed because: 'WWW-Authenticate' header not found")]
    ChallengeHeaderMissing { action: String },

    /// Challenges were present but none of them was a usable Bearer challenge
    #[error(
        "Tried to {action} but failed because: Failed getting supported authentication method from 'WWW-Authenticate' header"
    )]
    UnsupportedAuthenticationMethod {
        action: String,
        challenges: Vec<String>,
    },

    /// Bearer challenge named a realm that is not a valid URL
    #[error("Invalid realm '{realm}' in 'WWW-Authenticate' header: {source}")]
    InvalidRealm {
        realm: String,
        #[source]
        source: url::ParseError,
    },

    /// Network related errors
    #[error("Network error: {0}")]
    Network(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RegistryError {
    /// Whether the caller may try again. Only transport failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RegistryError::Network(_))
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            RegistryError::Response(err) => Some(err.status()),
            _ => None,
        }
    }
}

impl From<url::ParseError> for RegistryError {
    fn from(err: url::ParseError) -> Self {
        RegistryError::Validation(err.to_string())
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        RegistryError::Network(err.to_string())
    }
}
