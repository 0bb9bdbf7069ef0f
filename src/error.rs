use thiserror::Error;

/// Failure at the network/protocol layer, distinct from a non-2xx response.
///
/// Carries the underlying client's message only; client-library error types
/// never cross this boundary.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("search options must be a JSON object")]
    OptionsNotAnObject,

    #[error("the option `{0}` does not exist")]
    UnknownOption(String),

    #[error("the option `{option}` is expected to be of type {expected}, got {actual}")]
    TypeMismatch {
        option: &'static str,
        expected: &'static str,
        actual: String,
    },

    #[error("the option `{option}` has the invalid value `{value}`; allowed values are {allowed:?}")]
    InvalidValue {
        option: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("search request failed: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, Error>;
