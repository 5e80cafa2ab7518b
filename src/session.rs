use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use parking_lot::Mutex;
use reqwest::Client;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};
use crate::config::Config;
use crate::errors::SessionError;
use crate::models::{ParamsUpdate, RequestParams, ResolutionState, VideoSummary};
use crate::resolver::{EndpointResolver, RetryPolicy};
use crate::trending::fetch::fetch_trending;
use crate::trending::params_store::ParamsStore;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingView {
    pub videos: Vec<VideoSummary>,
    pub error: Option<String>,
    pub loading: bool,
    pub fetched_at: Option<i64>,
}

/// Everything one client session shares: the resolved endpoint, the
/// current filters and the last fetch result.
pub struct Session {
    client: Client,
    config: Config,
    resolution: watch::Sender<ResolutionState>,
    started: AtomicBool,
    params: Mutex<RequestParams>,
    store: ParamsStore,
    view: Mutex<TrendingView>,
}

impl Session {
    pub fn new(config: Config) -> Arc<Self> {
        let store = ParamsStore::new(config.params_file.clone());
        let params = store.load();
        let (resolution, _) = watch::channel(ResolutionState::pending());

        Arc::new(Self {
            client: Client::new(),
            config,
            resolution,
            started: AtomicBool::new(false),
            params: Mutex::new(params),
            store,
            view: Mutex::new(TrendingView::default()),
        })
    }

    /// Spawns a fresh resolver. Returns false if one is still running.
    pub fn start_resolution(self: &Arc<Self>) -> bool {
        // Claimed under the watch lock: the first call, or any call once the
        // previous run reached a terminal state.
        let claimed = self.resolution.send_if_modified(|state| {
            if state.is_terminal() || !self.started.swap(true, Ordering::SeqCst) {
                *state = ResolutionState::pending();
                true
            } else {
                false
            }
        });
        if !claimed {
            return false;
        }

        let resolver = EndpointResolver::new(
            self.config.primary.clone(),
            self.config.fallback.clone(),
            RetryPolicy {
                max_attempts: self.config.max_attempts,
                retry_delay: self.config.retry_delay,
                probe_timeout: self.config.probe_timeout,
            },
        );

        let session = Arc::clone(self);
        tokio::spawn(async move {
            let state = resolver.resolve(&session.client, &session.resolution).await;
            info!(
                status = ?state.status,
                url = state.resolved_url.as_deref().unwrap_or_default(),
                "Endpoint resolution finished"
            );
        });

        true
    }

    pub fn resolution(&self) -> ResolutionState {
        self.resolution.borrow().clone()
    }

    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<ResolutionState> {
        self.resolution.subscribe()
    }

    /// Fetching needs a committed endpoint and no fetch already running.
    /// A fallback commitment still allows fetching.
    pub fn fetch_enabled(&self) -> bool {
        self.resolution.borrow().is_terminal() && !self.is_loading()
    }

    pub fn is_loading(&self) -> bool {
        self.view.lock().loading
    }

    pub fn params(&self) -> RequestParams {
        self.params.lock().clone()
    }

    pub fn update_params(&self, update: ParamsUpdate) -> Result<RequestParams, SessionError> {
        // `view` before `params`, held together so no fetch starts mid-update.
        let params = {
            let view = self.view.lock();
            if view.loading {
                return Err(SessionError::FetchInFlight);
            }
            let mut params = self.params.lock();
            params.apply(update);
            params.clone()
        };
        self.store.save(&params);
        Ok(params)
    }

    pub fn view(&self) -> TrendingView {
        self.view.lock().clone()
    }

    /// Fetches with the current params. On failure the previous video list
    /// is kept and only the error message changes.
    pub async fn fetch_trending(&self) -> Result<Vec<VideoSummary>, SessionError> {
        let base_url = {
            let state = self.resolution.borrow();
            match (&state.resolved_url, state.is_terminal()) {
                (Some(url), true) => url.clone(),
                _ => return Err(SessionError::ResolutionPending),
            }
        };

        {
            let mut view = self.view.lock();
            if view.loading {
                return Err(SessionError::FetchInFlight);
            }
            view.loading = true;
            view.error = None;
        }
        let _loading = LoadingGuard(&self.view);

        let params = self.params();
        let result = fetch_trending(&self.client, &base_url, &params, self.config.fetch_timeout).await;

        let mut view = self.view.lock();
        match result {
            Ok(videos) => {
                view.videos = videos.clone();
                view.error = None;
                view.fetched_at = Some(chrono::Utc::now().timestamp());
                Ok(videos)
            }
            Err(e) => {
                warn!(url = %base_url, error = %e, "Trending fetch failed");
                view.error = Some(e.user_message());
                Err(e.into())
            }
        }
    }
}

// Clears `loading` even when the fetch future is dropped mid-request.
struct LoadingGuard<'a>(&'a Mutex<TrendingView>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().loading = false;
    }
}
