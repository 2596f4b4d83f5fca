use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected call options. Raised before any network activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "{}: {}", field, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<String> for ValidationError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ValidationError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// A service binding that is missing or unusable for the requested instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BindingError {
    pub instance: String,
    pub message: String,
}

impl BindingError {
    pub fn new(instance: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service binding {:?}: {}", self.instance, self.message)
    }
}

impl std::error::Error for BindingError {}

/// Failure acquiring an OAuth access token from the authorization server.
#[derive(Debug)]
pub struct AuthError {
    pub message: String,
    /// HTTP status of the token endpoint reply, when one was received.
    pub status: Option<u16>,
    pub source: Option<reqwest::Error>,
}

impl AuthError {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            status: None,
            source: Some(err),
        }
    }

    pub(crate) fn status(status: reqwest::StatusCode, body: String) -> Self {
        let message = if body.is_empty() {
            format!("token endpoint returned {status}")
        } else {
            format!("token endpoint returned {status}: {body}")
        };
        Self {
            message,
            status: Some(status.as_u16()),
            source: None,
        }
    }

    pub(crate) fn decode(err: reqwest::Error) -> Self {
        Self {
            message: format!("failed to decode token response: {err}"),
            status: None,
            source: Some(err),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token acquisition failed: {}", self.message)
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// Failure resolving a named destination through the destination API.
#[derive(Debug)]
pub struct DestinationLookupError {
    pub name: String,
    pub message: String,
    /// HTTP status of the destination API reply, when one was received.
    pub status: Option<u16>,
    pub source: Option<reqwest::Error>,
}

impl DestinationLookupError {
    pub(crate) fn transport(name: impl Into<String>, err: reqwest::Error) -> Self {
        Self {
            name: name.into(),
            message: err.to_string(),
            status: None,
            source: Some(err),
        }
    }

    pub(crate) fn status(
        name: impl Into<String>,
        status: reqwest::StatusCode,
        body: String,
    ) -> Self {
        let message = if body.is_empty() {
            format!("destination API returned {status}")
        } else {
            format!("destination API returned {status}: {body}")
        };
        Self {
            name: name.into(),
            message,
            status: Some(status.as_u16()),
            source: None,
        }
    }

    pub(crate) fn decode(name: impl Into<String>, err: serde_json::Error) -> Self {
        Self {
            name: name.into(),
            message: format!("destination document is not valid JSON: {err}"),
            status: None,
            source: None,
        }
    }
}

impl fmt::Display for DestinationLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "destination {:?}: {}", self.name, self.message)
    }
}

impl std::error::Error for DestinationLookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// Failure of the final call to the backend resource.
#[derive(Debug)]
pub struct RequestError {
    pub message: String,
    /// HTTP status of the backend reply, when one was received.
    pub status: Option<u16>,
    /// Raw response body for debugging (when available).
    pub body: Option<String>,
    pub source: Option<reqwest::Error>,
}

impl RequestError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            body: None,
            source: None,
        }
    }

    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            status: None,
            body: None,
            source: Some(err),
        }
    }

    pub(crate) fn status(status: reqwest::StatusCode, body: String) -> Self {
        Self {
            message: format!("backend returned {status}"),
            status: Some(status.as_u16()),
            body: (!body.is_empty()).then_some(body),
            source: None,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backend request failed: {}", self.message)
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// Convenience alias for fallible results across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type surfaced to callers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Binding(#[from] BindingError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Destination(#[from] DestinationLookupError),

    #[error("{0}")]
    Request(#[from] RequestError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
