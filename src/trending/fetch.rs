use std::time::Duration;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use crate::errors::TrendingError;
use crate::models::{RequestParams, VideoSummary};

pub const TRENDING_PATH: &str = "/api/trending";

const LOGGED_BODY_CHARS: usize = 256;

fn body_excerpt(body: &str) -> &str {
    match body.char_indices().nth(LOGGED_BODY_CHARS) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

/// One `GET <base_url>/api/trending` with the four filter parameters.
/// `timeout` covers the whole exchange, body included. Never retries.
pub async fn fetch_trending(
    client: &Client,
    base_url: &str,
    params: &RequestParams,
    timeout: Duration,
) -> Result<Vec<VideoSummary>, TrendingError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), TRENDING_PATH);

    let resp = client
        .get(&url)
        .query(params)
        .timeout(timeout)
        .send()
        .await
        .map_err(TrendingError::from_reqwest)?;

    match resp.status() {
        StatusCode::TOO_MANY_REQUESTS => return Err(TrendingError::RateLimited),
        status if status.is_success() => (),
        status => {
            let body = resp.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), body = body_excerpt(&body), "Unexpected status from trending endpoint");
            return Err(TrendingError::UnexpectedStatus(status));
        }
    }

    let body = resp.bytes().await.map_err(TrendingError::from_reqwest)?;

    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| TrendingError::MalformedResponse(e.to_string()))?;

    if !value.is_array() {
        return Err(TrendingError::MalformedResponse(
            "expected a JSON array of videos".to_string(),
        ));
    }

    let videos: Vec<VideoSummary> = serde_json::from_value(value)
        .map_err(|e| TrendingError::MalformedResponse(e.to_string()))?;

    debug!(url = %url, count = videos.len(), "Fetched trending videos");
    Ok(videos)
}
