use std::path::PathBuf;
use tracing::warn;
use crate::models::RequestParams;

/// Last-used filter values, stored as a JSON object keyed by field name.
/// Every operation is best-effort: failures are logged, never returned.
#[derive(Debug, Clone, Default)]
pub struct ParamsStore {
    path: Option<PathBuf>,
}

impl ParamsStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn load(&self) -> RequestParams {
        let Some(path) = &self.path else {
            return RequestParams::default();
        };

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return RequestParams::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read saved params");
                return RequestParams::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable saved params");
            RequestParams::default()
        })
    }

    pub fn save(&self, params: &RequestParams) {
        let Some(path) = &self.path else {
            return;
        };

        let json = match serde_json::to_string_pretty(params) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize params");
                return;
            }
        };

        if let Err(e) = std::fs::write(path, json) {
            warn!(path = %path.display(), error = %e, "Failed to save params");
        }
    }
}
