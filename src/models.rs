use serde::{Deserialize, Deserializer, Serialize};
use crate::errors::ConfigError;

pub const MIN_RESULTS: u32 = 10;
pub const MAX_RESULTS: u32 = 50;

pub const REGIONS: &[&str] = &["US", "IN", "UK", "CA", "AU"];
pub const CATEGORIES: &[&str] = &["", "Music", "Gaming", "Education", "Entertainment"];
pub const DEFINITIONS: &[&str] = &["", "HD", "SD"];

pub const FALLBACK_NOTICE: &str = "Using fallback server; functionality may be limited.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Primary,
    Fallback,
}

impl EndpointRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointRole::Primary => "primary",
            EndpointRole::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    url: String,
    role: EndpointRole,
}

impl EndpointCandidate {
    pub fn new(url: &str, role: EndpointRole) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            role: role.as_str(),
            url: url.to_string(),
            reason,
        };

        let parsed = reqwest::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            role,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn role(&self) -> EndpointRole {
        self.role
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    Pending,
    Resolved,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionState {
    pub resolved_url: Option<String>,
    /// Failed probes so far.
    pub attempt: u32,
    pub status: ResolutionStatus,
    pub finished_at: Option<i64>,
}

impl ResolutionState {
    pub fn pending() -> Self {
        Self {
            resolved_url: None,
            attempt: 0,
            status: ResolutionStatus::Pending,
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != ResolutionStatus::Pending
    }

    pub fn notice(&self) -> Option<&'static str> {
        match self.status {
            ResolutionStatus::Fallback => Some(FALLBACK_NOTICE),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestParams {
    pub region: String,
    #[serde(deserialize_with = "deserialize_max_results")]
    pub max_results: u32,
    pub category: String,
    pub video_definition: String,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            region: "US".to_string(),
            max_results: MAX_RESULTS,
            category: String::new(),
            video_definition: String::new(),
        }
    }
}

impl RequestParams {
    pub fn apply(&mut self, update: ParamsUpdate) {
        if let Some(region) = update.region {
            self.region = region;
        }
        if let Some(max_results) = update.max_results {
            self.max_results = clamp_max_results(max_results);
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(video_definition) = update.video_definition {
            self.video_definition = video_definition;
        }
    }
}

/// Field-wise update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamsUpdate {
    pub region: Option<String>,
    pub max_results: Option<u32>,
    pub category: Option<String>,
    pub video_definition: Option<String>,
}

pub fn clamp_max_results(value: u32) -> u32 {
    value.clamp(MIN_RESULTS, MAX_RESULTS)
}

fn deserialize_max_results<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = u32::deserialize(deserializer)?;
    Ok(clamp_max_results(value))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoSummary {
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub channel_name: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub thumbnail: String,
    #[serde(deserialize_with = "deserialize_view_count")]
    pub view_count: Option<u64>,
}

impl Default for VideoSummary {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            channel_name: String::new(),
            thumbnail: String::new(),
            view_count: None,
        }
    }
}

// Display-only text: null becomes empty, other scalars keep their JSON form.
fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

// The backend forwards YouTube statistics, which encode counts as strings.
fn deserialize_view_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsOptions {
    pub regions: &'static [&'static str],
    pub categories: &'static [&'static str],
    pub video_definitions: &'static [&'static str],
    pub min_results: u32,
    pub max_results: u32,
}

impl Default for SettingsOptions {
    fn default() -> Self {
        Self {
            regions: REGIONS,
            categories: CATEGORIES,
            video_definitions: DEFINITIONS,
            min_results: MIN_RESULTS,
            max_results: MAX_RESULTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidate_trims_trailing_slash() {
        let candidate = EndpointCandidate::new(
            "http://tubemetricsbackend.vercel.app/",
            EndpointRole::Primary,
        ).unwrap();
        assert_eq!(candidate.url(), "http://tubemetricsbackend.vercel.app");
        assert_eq!(candidate.role(), EndpointRole::Primary);
    }

    #[test]
    fn test_candidate_rejects_bad_urls() {
        assert!(EndpointCandidate::new("not a url", EndpointRole::Primary).is_err());
        assert!(matches!(
            EndpointCandidate::new("ftp://example.com", EndpointRole::Fallback),
            Err(ConfigError::InvalidUrl { role: "fallback", .. })
        ));
    }

    #[test]
    fn test_max_results_clamped_on_deserialize() {
        let params: RequestParams = serde_json::from_value(json!({
            "region": "IN",
            "maxResults": 500
        })).unwrap();
        assert_eq!(params.region, "IN");
        assert_eq!(params.max_results, 50);
        assert_eq!(params.category, "");

        let params: RequestParams = serde_json::from_value(json!({ "maxResults": 1 })).unwrap();
        assert_eq!(params.max_results, 10);
        assert_eq!(params.region, "US");
    }

    #[test]
    fn test_apply_update_keeps_unset_fields() {
        let mut params = RequestParams::default();
        params.apply(ParamsUpdate {
            category: Some("Music".to_string()),
            max_results: Some(5),
            ..Default::default()
        });

        assert_eq!(params.region, "US");
        assert_eq!(params.category, "Music");
        assert_eq!(params.max_results, 10);
        assert_eq!(params.video_definition, "");
    }

    #[test]
    fn test_video_summary_view_count_forms() {
        let videos: Vec<VideoSummary> = serde_json::from_value(json!([
            { "id": "a", "title": "A", "channelName": "C", "thumbnail": "http://img/a", "viewCount": "1234" },
            { "id": "b", "viewCount": 99 },
            { "id": "c", "viewCount": "n/a" },
            { "id": "d" }
        ])).unwrap();

        assert_eq!(videos[0].view_count, Some(1234));
        assert_eq!(videos[0].channel_name, "C");
        assert_eq!(videos[1].view_count, Some(99));
        assert_eq!(videos[1].title, "");
        assert_eq!(videos[2].view_count, None);
        assert_eq!(videos[3].view_count, None);
    }

    #[test]
    fn test_video_summary_text_fields_tolerate_odd_types() {
        let videos: Vec<VideoSummary> = serde_json::from_value(json!([
            { "id": 123, "title": null, "channelName": true, "thumbnail": ["x"], "viewCount": null }
        ])).unwrap();

        assert_eq!(videos[0].id, "123");
        assert_eq!(videos[0].title, "");
        assert_eq!(videos[0].channel_name, "true");
        assert_eq!(videos[0].thumbnail, "");
        assert_eq!(videos[0].view_count, None);
    }

    #[test]
    fn test_notice_only_on_fallback() {
        let mut state = ResolutionState::pending();
        assert!(!state.is_terminal());
        assert_eq!(state.notice(), None);

        state.status = ResolutionStatus::Resolved;
        assert!(state.is_terminal());
        assert_eq!(state.notice(), None);

        state.status = ResolutionStatus::Fallback;
        assert_eq!(state.notice(), Some(FALLBACK_NOTICE));
    }
}
