use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown clock action: {0:?} (expected \"in\" or \"out\")")]
    UnknownAction(String),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}
