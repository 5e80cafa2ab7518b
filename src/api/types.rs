use std::sync::Arc;
use serde::Serialize;
use crate::models::{RequestParams, ResolutionState, SettingsOptions, VideoSummary};
use crate::session::Session;

pub struct AppState {
    pub session: Arc<Session>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[serde(flatten)]
    pub resolution: ResolutionState,
    pub notice: Option<&'static str>,
    pub fetch_enabled: bool,
}

impl SessionResponse {
    pub fn from_session(session: &Session) -> Self {
        let resolution = session.resolution();
        Self {
            notice: resolution.notice(),
            fetch_enabled: resolution.is_terminal() && !session.is_loading(),
            resolution,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub params: RequestParams,
    pub options: SettingsOptions,
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub items: Vec<VideoSummary>,
    pub count: usize,
}
