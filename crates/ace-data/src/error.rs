use thiserror::Error;

/// Failure of the network layer. This is the only error a single-action
/// call hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {status_text}")]
    Status { status: u16, status_text: String },

    #[error("network error: {0}")]
    Network(String),

    /// The response body was present but not valid JSON.
    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Numeric HTTP status, when the failure came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure raised while running a named success/error handler.
///
/// Handler errors are logged where they happen and never reach the caller
/// of an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("handler not registered: {0}")]
    NotRegistered(String),

    #[error("handler failed: {0}")]
    Failed(String),

    #[error("handler panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("home directory not found: set HOME or configure token_store")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("token store is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by [`crate::binding::ComponentBinding`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("No action found with type: {0}")]
    NoActionOfType(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, TransportError>;
