use std::error::Error;

/// Failure reported by [`Handler::handle`](crate::handler::Handler::handle).
///
/// [`ContextHandler`](crate::context_handler::ContextHandler) never
/// produces one of its own; it returns whatever the wrapped handler
/// reported, unchanged.
#[derive(thiserror::Error, Debug)]
pub enum HandleError {
    #[error("failed to write log record: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),

    /// Escape hatch for handlers defined outside this crate.
    #[error("log handler failed: {0}")]
    Other(Box<dyn Error + Send + Sync>),
}

impl HandleError {
    pub fn other(err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        HandleError::Other(err.into())
    }
}

/// Error returned when a level name cannot be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(pub String);

/// Error returned by the helpers in [`init`](crate::init).
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("invalid level: {0}")]
    Level(#[from] ParseLevelError),

    #[error("unknown log format: {0:?}")]
    Format(String),

    #[error("a global tracing subscriber is already installed")]
    SubscriberAlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("tracing bridge requested but the `bridge` feature is not enabled")]
    BridgeFeatureDisabled,
}
