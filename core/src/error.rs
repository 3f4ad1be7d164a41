//! Error types for the StubHub client.
//!
//! # Design
//! Every failure is a typed `ApiError` returned to the caller; nothing in
//! the library terminates the process. A non-200 search response is not an
//! error at all: the search returns an empty mapping instead.

use std::fmt;
use std::path::PathBuf;

/// Errors returned by credential loading, authentication and search.
#[derive(Debug)]
pub enum ApiError {
    /// A secret file needed for the fallback credential path is missing or
    /// unreadable.
    MissingSecret { path: PathBuf },

    /// One or more query parameters are not accepted by the endpoint.
    DisallowedParams {
        disallowed: Vec<String>,
        allowed: Vec<String>,
    },

    /// A query parameter has a value the client cannot use.
    InvalidParam { name: String, value: String },

    /// The server returned an unexpected status (token endpoint only).
    HttpError { status: u16, body: String },

    /// The request never produced a response.
    Transport(String),

    /// The response body could not be deserialized into the expected shape.
    DeserializationError(String),

    /// The request payload could not be serialized.
    SerializationError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingSecret { path } => write!(
                f,
                "could not read {}: store your credentials in the secrets directory \
                 or pass them explicitly when building the client",
                path.display()
            ),
            ApiError::DisallowedParams { disallowed, allowed } => write!(
                f,
                "the following parameters are not allowed: {}; \
                 only specify parameters from: {}",
                disallowed.join(", "),
                allowed.join(", ")
            ),
            ApiError::InvalidParam { name, value } => {
                write!(f, "invalid value for `{name}`: {value:?}")
            }
            ApiError::HttpError { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::Transport(msg) => write!(f, "transport failed: {msg}"),
            ApiError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
