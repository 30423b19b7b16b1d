use thiserror::Error;

/// Every way a TMDB call can end other than success. Each branch of the
/// response space (200, 401, 404, other statuses, transport failure,
/// decode failure) maps to exactly one variant, and the `Display` impl is
/// the single place error messages are formatted for presentation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("the URL for the request was invalid")]
    InvalidUrl,
    #[error("TMDB API error: {0}")]
    Api(String),
    #[error("no movie was found for that id")]
    NotFound,
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("network request failed: HTTP {0}")]
    Status(u16),
    /// Produced by embedders when they abandon an operation; the HTTP
    /// client itself never constructs this.
    #[error("request was cancelled")]
    Cancelled,
}

impl ApiError {
    /// Cancellation is supersession, not failure; callers suppress it from
    /// user-visible error state.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}
