use thiserror::Error;

/// Errors produced by the weatherdeck core.
///
/// Gateway and resolver failures are caught by [`crate::Dashboard`] and turned
/// into toasts; they never reach a crash boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// The provider does not know the requested location.
    #[error("location not found: {0}")]
    LocationNotFound(String),

    /// The query was rejected, either locally or by the provider.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// No response from the remote service.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A response arrived but its body could not be understood.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Neither location tier produced a usable position.
    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    /// The stored card collection could not be decoded.
    #[error("persisted state is corrupt: {0}")]
    PersistedStateCorrupt(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
