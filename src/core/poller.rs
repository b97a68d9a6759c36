//! Readiness polling for asynchronously produced provider resources.
//!
//! ```text
//! pending --(not complete)--> pending
//! pending --(complete)------> ready     (terminal)
//! pending --(failure)-------> failed    (terminal)
//! pending --(exhausted)-----> unknown   (terminal, "gave up")
//! ```
//!
//! Transport and decode failures on a single attempt are transient: they use
//! up the attempt and the loop continues. The wait between attempts is a
//! `tokio` timer, so an idle poll does not hold a worker thread.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::dispatcher::{DispatchError, RemoteResult, RequestDispatcher};
use super::signing::Params;

/// Readiness of a remote resource as seen by one poll attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessState {
    Pending,
    Ready,
    Failed,
    /// Attempts exhausted before the provider reported a terminal state
    Unknown,
}

impl ReadinessState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReadinessState::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessState::Pending => "pending",
            ReadinessState::Ready => "ready",
            ReadinessState::Failed => "failed",
            ReadinessState::Unknown => "unknown",
        }
    }

    /// Derive the state reported by a status query.
    ///
    /// - HTTP 5xx: transient, `Pending`
    /// - payload `"status": "error"`: `Failed`
    /// - otherwise the payload's `state` field decides; unrecognised or
    ///   missing values count as `Pending`
    pub fn from_result(result: &RemoteResult) -> Self {
        if result.is_server_error() {
            return ReadinessState::Pending;
        }
        if result
            .provider_status()
            .is_some_and(|s| s.eq_ignore_ascii_case("error"))
        {
            return ReadinessState::Failed;
        }

        match result
            .str_field("state")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("ready" | "complete" | "completed" | "done" | "success") => ReadinessState::Ready,
            Some("failed" | "failure" | "error" | "cancelled" | "canceled") => {
                ReadinessState::Failed
            }
            Some("pending" | "queued" | "processing" | "in_progress") | None => {
                ReadinessState::Pending
            }
            Some(other) => {
                debug!(state = %other, "Unrecognised resource state, treating as pending");
                ReadinessState::Pending
            }
        }
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state plus the number of status queries it took.
///
/// Exactly one of `last_result` and `last_error` is set when at least one
/// query was made; they describe the final attempt only.
#[derive(Debug, Clone, PartialEq)]
pub struct PollReport {
    pub state: ReadinessState,
    pub attempts: u32,
    pub last_result: Option<RemoteResult>,
    pub last_error: Option<DispatchError>,
}

impl PollReport {
    /// True when polling gave up and the final query never reached a usable answer
    pub fn ended_in_dispatch_error(&self) -> bool {
        self.state == ReadinessState::Unknown && self.last_error.is_some()
    }
}

/// Polls a status endpoint until a resource becomes terminal.
pub struct ReadinessPoller {
    dispatcher: Arc<dyn RequestDispatcher>,
    status_path: String,
}

impl ReadinessPoller {
    pub fn new(dispatcher: Arc<dyn RequestDispatcher>, status_path: impl Into<String>) -> Self {
        Self {
            dispatcher,
            status_path: status_path.into(),
        }
    }

    pub fn status_path(&self) -> &str {
        &self.status_path
    }

    /// Wait until `resource_id` is terminal or `max_attempts` queries were made.
    ///
    /// Blocks the calling task for at most roughly
    /// `max_attempts × interval` plus request time.
    pub async fn wait_until_ready(
        &self,
        resource_id: &str,
        max_attempts: u32,
        interval: Duration,
    ) -> ReadinessState {
        self.wait_until_ready_tracked(resource_id, max_attempts, interval)
            .await
            .state
    }

    /// Same as [`wait_until_ready`](Self::wait_until_ready), also reporting
    /// how many attempts were consumed.
    pub async fn wait_until_ready_tracked(
        &self,
        resource_id: &str,
        max_attempts: u32,
        interval: Duration,
    ) -> PollReport {
        let mut params = Params::new();
        params.insert("id".to_string(), resource_id.to_string());

        let mut attempts = 0;
        let mut last_result = None;
        let mut last_error = None;
        while attempts < max_attempts {
            attempts += 1;

            let state = match self
                .dispatcher
                .execute(Method::GET, &self.status_path, &params)
                .await
            {
                Ok(result) => {
                    let state = ReadinessState::from_result(&result);
                    last_result = Some(result);
                    last_error = None;
                    state
                }
                Err(e) => {
                    warn!(
                        resource_id = %resource_id,
                        attempt = attempts,
                        error = %e,
                        "Status query failed, will retry"
                    );
                    last_result = None;
                    last_error = Some(e);
                    ReadinessState::Pending
                }
            };

            debug!(
                resource_id = %resource_id,
                attempt = attempts,
                max_attempts,
                state = %state,
                "Polled resource status"
            );

            if state.is_terminal() {
                return PollReport {
                    state,
                    attempts,
                    last_result,
                    last_error,
                };
            }

            if attempts < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }

        info!(
            resource_id = %resource_id,
            attempts,
            last_error = ?last_error,
            "Gave up waiting for resource"
        );
        PollReport {
            state: ReadinessState::Unknown,
            attempts,
            last_result,
            last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::MockDispatcher;
    use serde_json::json;

    const STATUS_PATH: &str = "/v1/speech/status/";

    fn pending() -> RemoteResult {
        RemoteResult::ok(json!({"status": "success", "state": "pending"}))
    }

    fn ready() -> RemoteResult {
        RemoteResult::ok(json!({"status": "success", "state": "ready"}))
    }

    fn poller(mock: &Arc<MockDispatcher>) -> ReadinessPoller {
        ReadinessPoller::new(mock.clone(), STATUS_PATH)
    }

    #[tokio::test]
    async fn test_ready_after_k_pending() {
        for k in 0..4usize {
            let mock = Arc::new(MockDispatcher::new());
            mock.reply_times(STATUS_PATH, pending(), k);
            mock.reply(STATUS_PATH, ready());

            let report = poller(&mock)
                .wait_until_ready_tracked("r1", 10, Duration::from_millis(1))
                .await;

            assert_eq!(report.state, ReadinessState::Ready);
            assert_eq!(report.attempts as usize, k + 1);
            assert_eq!(mock.calls_to(STATUS_PATH), k + 1);
        }
    }

    #[tokio::test]
    async fn test_always_pending_gives_up_after_max_attempts() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(STATUS_PATH, pending());

        let state = poller(&mock)
            .wait_until_ready("r1", 5, Duration::from_millis(1))
            .await;

        assert_eq!(state, ReadinessState::Unknown);
        assert_eq!(mock.calls_to(STATUS_PATH), 5);
    }

    #[tokio::test]
    async fn test_provider_failure_is_terminal() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(STATUS_PATH, pending());
        mock.reply(
            STATUS_PATH,
            RemoteResult::ok(json!({"status": "success", "state": "failed"})),
        );

        let report = poller(&mock)
            .wait_until_ready_tracked("r1", 10, Duration::from_millis(1))
            .await;

        assert_eq!(report.state, ReadinessState::Failed);
        assert_eq!(report.attempts, 2);
    }

    #[tokio::test]
    async fn test_transport_errors_consume_attempts() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(STATUS_PATH, DispatchError::Transport("connection reset".into()));

        let report = poller(&mock)
            .wait_until_ready_tracked("r1", 3, Duration::from_millis(1))
            .await;

        assert_eq!(report.state, ReadinessState::Unknown);
        assert_eq!(report.attempts, 3);
        assert_eq!(mock.calls_to(STATUS_PATH), 3);
        assert!(report.ended_in_dispatch_error());
        assert_eq!(
            report.last_error,
            Some(DispatchError::Transport("connection reset".into()))
        );
        assert_eq!(report.last_result, None);
    }

    #[tokio::test]
    async fn test_late_answer_clears_earlier_error() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(STATUS_PATH, DispatchError::Transport("connection reset".into()));
        mock.reply(STATUS_PATH, pending());

        let report = poller(&mock)
            .wait_until_ready_tracked("r1", 3, Duration::from_millis(1))
            .await;

        assert_eq!(report.state, ReadinessState::Unknown);
        assert!(!report.ended_in_dispatch_error());
        assert_eq!(report.last_error, None);
        assert_eq!(report.last_result, Some(pending()));
    }

    #[tokio::test]
    async fn test_failed_report_keeps_provider_payload() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(
            STATUS_PATH,
            RemoteResult::ok(
                json!({"status": "success", "state": "failed", "message": "unsupported voice"}),
            ),
        );

        let report = poller(&mock)
            .wait_until_ready_tracked("r1", 3, Duration::from_millis(1))
            .await;

        assert_eq!(report.state, ReadinessState::Failed);
        let payload = report.last_result.map(|r| r.payload).unwrap();
        assert_eq!(payload["message"], "unsupported voice");
    }

    #[tokio::test]
    async fn test_decode_error_then_ready() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(
            STATUS_PATH,
            DispatchError::Decode {
                status: 200,
                body: "oops".into(),
                reason: "expected value".into(),
            },
        );
        mock.reply(STATUS_PATH, ready());

        let report = poller(&mock)
            .wait_until_ready_tracked("r1", 3, Duration::from_millis(1))
            .await;

        assert_eq!(report.state, ReadinessState::Ready);
        assert_eq!(report.attempts, 2);
    }

    #[tokio::test]
    async fn test_zero_attempts_issues_no_query() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(STATUS_PATH, ready());

        let report = poller(&mock)
            .wait_until_ready_tracked("r1", 0, Duration::from_millis(1))
            .await;

        assert_eq!(report.state, ReadinessState::Unknown);
        assert_eq!(report.attempts, 0);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_status_query_carries_resource_id() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(STATUS_PATH, ready());

        poller(&mock)
            .wait_until_ready("abc-123", 1, Duration::ZERO)
            .await;

        let calls = mock.calls();
        assert_eq!(calls[0].method, Method::GET);
        assert_eq!(calls[0].params.get("id").map(String::as_str), Some("abc-123"));
    }

    #[test]
    fn test_state_classification() {
        let cases = [
            (RemoteResult::ok(json!({"state": "READY"})), ReadinessState::Ready),
            (RemoteResult::ok(json!({"state": "completed"})), ReadinessState::Ready),
            (RemoteResult::ok(json!({"state": "processing"})), ReadinessState::Pending),
            (RemoteResult::ok(json!({"state": "weird"})), ReadinessState::Pending),
            (RemoteResult::ok(json!({"status": "success"})), ReadinessState::Pending),
            (RemoteResult::ok(json!({"state": "cancelled"})), ReadinessState::Failed),
            (
                RemoteResult::new(404, json!({"status": "error", "message": "not found"})),
                ReadinessState::Failed,
            ),
            (
                RemoteResult::new(503, json!({"status": "error"})),
                ReadinessState::Pending,
            ),
        ];

        for (result, expected) in cases {
            assert_eq!(ReadinessState::from_result(&result), expected, "{result:?}");
        }
    }

    #[test]
    fn test_state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ReadinessState::Unknown).unwrap(),
            json!("unknown")
        );
        assert_eq!(ReadinessState::Failed.to_string(), "failed");
    }
}
