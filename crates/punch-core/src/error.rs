use punch_store::StoreError;
use punch_types::TypeError;
use thiserror::Error;

/// Errors from the clock pipeline.
#[derive(Debug, Error)]
pub enum ClockError {
    /// Missing or malformed request fields. Not retryable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No tag binding for the presented uid. Not retryable.
    #[error("unknown tag: {0}")]
    UnknownTag(String),

    /// The tag or event store could not be read.
    #[error("store lookup failed: {0}")]
    Lookup(#[source] StoreError),

    /// The event could not be persisted. Retrying the whole request may
    /// record a second event.
    #[error("failed to persist clock event: {0}")]
    Persistence(#[source] StoreError),
}

impl ClockError {
    /// `true` for errors caused by the request itself.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::UnknownTag(_))
    }
}

impl From<TypeError> for ClockError {
    fn from(e: TypeError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

pub type ClockResult<T> = Result<T, ClockError>;
