use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use crate::errors::{SessionError, TrendingError};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Trending(TrendingError),
    Conflict(String),
    InvalidRequest(String),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Trending(e) => ApiError::Trending(e),
            other => ApiError::Conflict(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Trending(err) => {
                let (status, code) = match err {
                    TrendingError::RequestTimeout => (StatusCode::GATEWAY_TIMEOUT, "request_timeout"),
                    TrendingError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
                    TrendingError::NetworkFailure(_) => (StatusCode::BAD_GATEWAY, "network_failure"),
                    TrendingError::MalformedResponse(_) => (StatusCode::BAD_GATEWAY, "malformed_response"),
                    TrendingError::UnexpectedStatus(_) => (StatusCode::BAD_GATEWAY, "unexpected_status"),
                };
                (status, code, err.user_message())
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg),
        };

        (status, Json(json!({
            "error": error_code,
            "message": message
        }))).into_response()
    }
}
