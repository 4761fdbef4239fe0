use thiserror::Error;

#[derive(Error, Debug)]
pub enum GemHookError {
    #[error("not configured")]
    NotConfigured,

    #[error("Failed to read context document {path}: {source}")]
    ContextRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Failures raised by a model client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("{0}")]
    Network(String),

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("rate limited: {0}")]
    RateLimit(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("model client not initialized")]
    Unavailable,
}

pub type Result<T> = std::result::Result<T, GemHookError>;
