use std::time::Duration;
use reqwest::Client;
use crate::errors::ProbeError;

pub const HEALTH_PATH: &str = "/health";

/// `HEAD <base_url>/health`. Any 2xx confirms the endpoint.
pub async fn check_health(
    client: &Client,
    base_url: &str,
    timeout: Duration,
) -> Result<(), ProbeError> {
    let resp = client
        .head(format!("{}{}", base_url, HEALTH_PATH))
        .timeout(timeout)
        .send()
        .await?;

    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ProbeError::Status(status))
    }
}
