use axum::{
    routing::{get, post},
    Router,
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;
use crate::models::{ParamsUpdate, SettingsOptions};
use crate::session::{Session, TrendingView};
use super::types::{AppState, SessionResponse, SettingsResponse, TrendingResponse};
use super::error::ApiError;

async fn session_handler(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    Json(SessionResponse::from_session(&state.session))
}

async fn resolve_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    if !state.session.start_resolution() {
        return Err(ApiError::Conflict("Endpoint resolution is already running".to_string()));
    }

    Ok((StatusCode::ACCEPTED, Json(SessionResponse::from_session(&state.session))))
}

async fn settings_handler(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    Json(SettingsResponse {
        params: state.session.params(),
        options: SettingsOptions::default(),
    })
}

async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ParamsUpdate>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let Json(update) = payload.map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let params = state.session.update_params(update)?;

    Ok(Json(SettingsResponse {
        params,
        options: SettingsOptions::default(),
    }))
}

async fn trending_view_handler(State(state): State<Arc<AppState>>) -> Json<TrendingView> {
    Json(state.session.view())
}

async fn fetch_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TrendingResponse>, ApiError> {
    let items = state.session.fetch_trending().await?;

    Ok(Json(TrendingResponse {
        count: items.len(),
        items,
    }))
}

pub fn create_router(session: Arc<Session>) -> Router {
    let state = Arc::new(AppState { session });

    Router::new()
        .route("/api/session", get(session_handler))
        .route("/api/session/resolve", post(resolve_handler))
        .route("/api/settings", get(settings_handler).put(update_settings_handler))
        .route("/api/trending", get(trending_view_handler).post(fetch_handler))
        .with_state(state)
}
