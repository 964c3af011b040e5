use thiserror::Error;

/// Error types that can occur when talking to the webhook endpoint.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Input was empty after trimming; callers treat this as a no-op.
    #[error("empty input")]
    EmptyInput,
    /// A request is already in flight for this conversation.
    #[error("a request is already in flight")]
    Busy,
    /// The request exceeded the configured timeout and was aborted.
    #[error("request timed out")]
    Timeout,
    /// Connection, DNS, or transport-level failure. The transport does not
    /// distinguish these reliably, so they collapse into one kind.
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx HTTP status from the endpoint.
    #[error("HTTP error: status {status}")]
    Http { status: u16 },
    /// The endpoint answered with an explicit error field of its own.
    #[error("remote error: {0}")]
    Remote(String),
    /// The configured endpoint URL could not be parsed.
    #[error("invalid webhook URL: {0}")]
    InvalidUrl(String),
}

/// Converts reqwest transport errors into ChatErrors
impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Timeout
        } else if let Some(status) = err.status() {
            ChatError::Http {
                status: status.as_u16(),
            }
        } else {
            ChatError::Network(err.to_string())
        }
    }
}
