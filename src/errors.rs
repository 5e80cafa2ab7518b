use thiserror::Error;
use reqwest::StatusCode;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("TRENDING_MAX_ATTEMPTS must be at least 1")]
    ZeroAttempts,
    #[error("invalid {role} url {url:?}: {reason}")]
    InvalidUrl { role: &'static str, url: String, reason: String },
    #[error("invalid bind address {0:?}")]
    InvalidBindAddr(String),
}

/// Reasons a health probe did not confirm the primary endpoint. Only logged.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out")]
    Timeout,
    #[error("probe returned status {0}")]
    Status(StatusCode),
    #[error("probe failed: {0}")]
    Network(reqwest::Error),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else {
            ProbeError::Network(err)
        }
    }
}

#[derive(Error, Debug)]
pub enum TrendingError {
    #[error("Request timed out")]
    RequestTimeout,
    #[error("Ratelimited")]
    RateLimited,
    #[error("Network failure: {0}")]
    NetworkFailure(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Unexpected status code {0}")]
    UnexpectedStatus(StatusCode),
}

impl TrendingError {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TrendingError::RequestTimeout
        } else if err.is_decode() {
            TrendingError::MalformedResponse(err.to_string())
        } else {
            TrendingError::NetworkFailure(err.to_string())
        }
    }

    /// Message shown to the user in place of the video list.
    pub fn user_message(&self) -> String {
        match self {
            TrendingError::RequestTimeout => {
                "The request timed out. The server may be busy, please try again.".to_string()
            }
            TrendingError::RateLimited => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            TrendingError::NetworkFailure(_) => {
                "Failed to fetch trending videos. It's likely that the backend server is down. Please try again later.".to_string()
            }
            TrendingError::MalformedResponse(_) => {
                "The server returned an unexpected response. Please try again later.".to_string()
            }
            TrendingError::UnexpectedStatus(status) => format!(
                "The server responded with an error ({}). Please try again later.",
                status.as_u16()
            ),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Endpoint resolution is still pending")]
    ResolutionPending,
    #[error("A trending fetch is already in flight")]
    FetchInFlight,
    #[error(transparent)]
    Trending(#[from] TrendingError),
}
