use thiserror::Error;

/// Result type alias for repository calls.
pub type Result<T> = std::result::Result<T, RepoError>;

/// Failures of a read against the remote posts collection.
#[derive(Error, Debug)]
pub enum RepoError {
    /// Transport failure or a non-success status other than 404.
    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },

    /// The request was valid but no such resource exists.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The body was not JSON of the expected shape.
    #[error("malformed response from {url}: {source}")]
    MalformedResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound { .. })
    }
}
