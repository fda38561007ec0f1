//! Error types for the consent engine.
//!
//! Most of these never reach a caller of the store or resolver: they are
//! recovered at the component boundary and logged. Configuration errors are
//! the exception and surface at construction time.

/// Consent engine errors.
#[derive(Debug, thiserror::Error)]
pub enum ConsentError {
    /// The underlying key-value store rejected a read, write or removal.
    #[error("storage unavailable: {message}")]
    StorageUnavailable { message: String },

    /// A stored record could not be parsed.
    #[error("malformed consent record: {message}")]
    MalformedRecord { message: String },

    /// Region lookup failed (transport error, timeout or non-success status).
    #[error("region lookup failed: {message}")]
    RegionLookup { message: String },

    /// Region lookup answered, but the body was not usable.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl From<reqwest::Error> for ConsentError {
    fn from(err: reqwest::Error) -> Self {
        Self::RegionLookup {
            message: err.to_string(),
        }
    }
}

/// Result type for consent operations.
pub type ConsentResult<T> = Result<T, ConsentError>;
