//! Session endpoint resolution.
//!
//! The primary endpoint is probed up to `max_attempts` times with a fixed
//! delay between probes. The first healthy probe commits to the primary;
//! exhausting every attempt commits to the fallback. Either way the caller
//! ends up with a usable base URL, so resolution never fails.

pub mod probe;

use std::time::Duration;
use reqwest::Client;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use crate::models::{EndpointCandidate, ResolutionState, ResolutionStatus};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub probe_timeout: Duration,
}

/// Single-use: `resolve` consumes the resolver. Re-resolving needs a new one.
#[derive(Debug)]
pub struct EndpointResolver {
    primary: EndpointCandidate,
    fallback: EndpointCandidate,
    policy: RetryPolicy,
}

impl EndpointResolver {
    pub fn new(primary: EndpointCandidate, fallback: EndpointCandidate, policy: RetryPolicy) -> Self {
        Self {
            primary,
            fallback,
            // at least one probe always runs
            policy: RetryPolicy {
                max_attempts: policy.max_attempts.max(1),
                ..policy
            },
        }
    }

    /// Runs to a terminal state, publishing every transition on `state`.
    pub async fn resolve(
        self,
        client: &Client,
        state: &watch::Sender<ResolutionState>,
    ) -> ResolutionState {
        let mut current = ResolutionState::pending();
        state.send_replace(current.clone());

        loop {
            match probe::check_health(client, self.primary.url(), self.policy.probe_timeout).await {
                Ok(()) => {
                    current.status = ResolutionStatus::Resolved;
                    current.resolved_url = Some(self.primary.url().to_string());
                    current.finished_at = Some(chrono::Utc::now().timestamp());
                    info!(
                        url = self.primary.url(),
                        failed_attempts = current.attempt,
                        "Primary endpoint confirmed"
                    );
                    break;
                }
                Err(e) => {
                    current.attempt += 1;
                    debug!(
                        role = self.primary.role().as_str(),
                        url = self.primary.url(),
                        attempt = current.attempt,
                        max_attempts = self.policy.max_attempts,
                        error = %e,
                        "Health probe failed"
                    );

                    if current.attempt >= self.policy.max_attempts {
                        current.status = ResolutionStatus::Fallback;
                        current.resolved_url = Some(self.fallback.url().to_string());
                        current.finished_at = Some(chrono::Utc::now().timestamp());
                        warn!(
                            primary = self.primary.url(),
                            fallback = self.fallback.url(),
                            attempts = current.attempt,
                            "Primary endpoint unreachable, using fallback"
                        );
                        break;
                    }

                    state.send_replace(current.clone());
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
            }
        }

        state.send_replace(current.clone());
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;
    use axum::{extract::State, http::StatusCode, routing::get, Router};
    use crate::models::EndpointRole;
    use crate::test_support::{unused_url, MockServer};

    const FALLBACK: &str = "http://localhost:5000";

    /// Health route that fails until `healthy_from` probes have been made.
    /// `healthy_from == 0` never turns healthy.
    async fn flaky_primary(healthy_from: u32) -> (MockServer, Arc<AtomicU32>) {
        let hits = Arc::new(AtomicU32::new(0));
        let router = Router::new()
            .route("/health", get(move |State(hits): State<Arc<AtomicU32>>| async move {
                let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
                if healthy_from != 0 && n >= healthy_from {
                    StatusCode::OK
                } else {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            }))
            .with_state(hits.clone());
        (MockServer::start(router).await, hits)
    }

    fn resolver(primary: &str, max_attempts: u32, retry_delay: Duration) -> EndpointResolver {
        EndpointResolver::new(
            EndpointCandidate::new(primary, EndpointRole::Primary).unwrap(),
            EndpointCandidate::new(FALLBACK, EndpointRole::Fallback).unwrap(),
            RetryPolicy {
                max_attempts,
                retry_delay,
                probe_timeout: Duration::from_millis(500),
            },
        )
    }

    #[tokio::test]
    async fn test_all_attempts_fail_commits_to_fallback() {
        for max_attempts in 1..=4 {
            let (server, hits) = flaky_primary(0).await;
            let (tx, rx) = watch::channel(ResolutionState::pending());
            let delay = Duration::from_millis(30);

            let started = Instant::now();
            let result = resolver(&server.url(), max_attempts, delay).resolve(&Client::new(), &tx).await;

            assert_eq!(hits.load(Ordering::SeqCst), max_attempts);
            assert!(started.elapsed() >= delay * (max_attempts - 1));
            assert_eq!(result.status, ResolutionStatus::Fallback);
            assert_eq!(result.resolved_url.as_deref(), Some(FALLBACK));
            assert_eq!(result.attempt, max_attempts);
            assert!(result.finished_at.is_some());
            assert_eq!(*rx.borrow(), result);
        }
    }

    #[tokio::test]
    async fn test_success_on_kth_attempt_stops_probing() {
        for k in 1..=3 {
            let (server, hits) = flaky_primary(k).await;
            let (tx, _rx) = watch::channel(ResolutionState::pending());

            let result = resolver(&server.url(), 3, Duration::from_millis(10))
                .resolve(&Client::new(), &tx)
                .await;

            assert_eq!(hits.load(Ordering::SeqCst), k);
            assert_eq!(result.status, ResolutionStatus::Resolved);
            assert_eq!(result.resolved_url, Some(server.url()));
            assert_eq!(result.attempt, k - 1);
        }
    }

    #[tokio::test]
    async fn test_unreachable_primary_falls_back() {
        let primary = unused_url().await;
        let (tx, _rx) = watch::channel(ResolutionState::pending());

        let result = resolver(&primary, 2, Duration::from_millis(10))
            .resolve(&Client::new(), &tx)
            .await;

        assert_eq!(result.status, ResolutionStatus::Fallback);
        assert_eq!(result.resolved_url.as_deref(), Some(FALLBACK));
    }

    #[tokio::test]
    async fn test_probe_timeout_counts_as_failure() {
        let hits = Arc::new(AtomicU32::new(0));
        let router = Router::new()
            .route("/health", get(|State(hits): State<Arc<AtomicU32>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(2)).await;
                StatusCode::OK
            }))
            .with_state(hits.clone());
        let server = MockServer::start(router).await;

        let resolver = EndpointResolver::new(
            EndpointCandidate::new(&server.url(), EndpointRole::Primary).unwrap(),
            EndpointCandidate::new(FALLBACK, EndpointRole::Fallback).unwrap(),
            RetryPolicy {
                max_attempts: 2,
                retry_delay: Duration::from_millis(10),
                probe_timeout: Duration::from_millis(50),
            },
        );
        let (tx, _rx) = watch::channel(ResolutionState::pending());
        let result = resolver.resolve(&Client::new(), &tx).await;

        assert_eq!(result.status, ResolutionStatus::Fallback);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_pending_state_visible_between_attempts() {
        let (server, _hits) = flaky_primary(0).await;
        let (tx, mut rx) = watch::channel(ResolutionState::pending());
        let resolver = resolver(&server.url(), 3, Duration::from_millis(200));

        let task = tokio::spawn(async move {
            resolver.resolve(&Client::new(), &tx).await
        });

        rx.wait_for(|s| s.attempt == 1).await.unwrap();
        {
            let observed = rx.borrow();
            assert_eq!(observed.status, ResolutionStatus::Pending);
            assert_eq!(observed.resolved_url, None);
        }

        let result = task.await.unwrap();
        assert_eq!(result.status, ResolutionStatus::Fallback);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_probes_once() {
        let (server, hits) = flaky_primary(1).await;
        let (tx, _rx) = watch::channel(ResolutionState::pending());

        let result = resolver(&server.url(), 0, Duration::from_millis(10))
            .resolve(&Client::new(), &tx)
            .await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(result.status, ResolutionStatus::Resolved);
    }
}
