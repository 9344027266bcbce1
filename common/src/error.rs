//! Error kinds surfaced by the pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// An address or CIDR failed structural validation.
    #[error("malformed {kind} '{input}': {reason}")]
    MalformedInput {
        kind: &'static str,
        input: String,
        reason: String,
    },

    /// A query reported more results than the safety ceiling allows.
    #[error("{scope} reported {reported} results, above the ceiling of {ceiling}; narrow the scope")]
    OverCapacity {
        scope: String,
        reported: usize,
        ceiling: usize,
    },

    /// Any failed call to the inventory store.
    #[error("{operation} failed: {source}")]
    External {
        operation: String,
        #[source]
        source: StoreError,
    },

    /// A resource looked up by exact name does not exist.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },
}

impl Error {
    pub fn external(operation: impl Into<String>, source: StoreError) -> Self {
        Self::External {
            operation: operation.into(),
            source,
        }
    }
}

/// Failure of a single call to the inventory store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("undecodable response: {0}")]
    Decode(String),
}
