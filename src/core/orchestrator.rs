//! Voice call workflow.
//!
//! One run executes three provider steps strictly in order:
//!
//! 1. submit a speech synthesis job for the message
//! 2. poll the synthesized resource until it is ready
//! 3. originate a call that plays the resource
//!
//! The first failing step ends the run. Nothing is rolled back: the provider
//! has no way to cancel a finished synthesis job, so an unused resource is
//! left as is. Dropping the run future during step 2 stops polling before any
//! call is placed; once step 3 is dispatched it cannot be recalled.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::dispatcher::{DispatchError, RemoteResult};
use super::poller::{ReadinessPoller, ReadinessState};
use super::provider::{ProviderClient, SynthesisOptions};
use crate::utils::validate_phone_number;

/// Caller identity that lets the provider choose one of the account's numbers
pub const AUTO_CALLER_ID: &str = "auto";

/// Workflow step, used to label failures and run records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    Validate,
    SubmitSynthesis,
    AwaitResource,
    OriginateCall,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::Validate => "validate",
            WorkflowStep::SubmitSynthesis => "submit_synthesis",
            WorkflowStep::AwaitResource => "await_resource",
            WorkflowStep::OriginateCall => "originate_call",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is to blame for a failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The caller's input was rejected before any remote call
    InvalidInput,
    /// The provider answered and refused or failed the operation
    WorkflowFailure,
    /// The provider could not be reached or answered garbage
    InfrastructureFailure,
}

/// Failure of a voice call run.
///
/// Every variant names its step; provider-side variants carry the raw
/// provider payload when one was received and the dispatch error when the
/// exchange itself failed.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Synthesis submission failed: {reason}")]
    SynthesisFailed {
        reason: String,
        payload: Option<Value>,
        cause: Option<DispatchError>,
    },

    #[error("Resource {resource_id} not ready after {attempts} attempts: {state}")]
    ResourceNotReady {
        resource_id: String,
        state: ReadinessState,
        attempts: u32,
        /// Payload of the last status answer
        payload: Option<Value>,
        /// Set when polling gave up and the last status query itself failed
        cause: Option<DispatchError>,
    },

    #[error("Call initiation failed: {reason}")]
    CallInitiationFailed {
        reason: String,
        payload: Option<Value>,
        cause: Option<DispatchError>,
    },
}

impl WorkflowError {
    pub fn step(&self) -> WorkflowStep {
        match self {
            WorkflowError::InvalidInput { .. } => WorkflowStep::Validate,
            WorkflowError::SynthesisFailed { .. } => WorkflowStep::SubmitSynthesis,
            WorkflowError::ResourceNotReady { .. } => WorkflowStep::AwaitResource,
            WorkflowError::CallInitiationFailed { .. } => WorkflowStep::OriginateCall,
        }
    }

    /// Stable machine readable error code
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::InvalidInput { .. } => "invalid_input",
            WorkflowError::SynthesisFailed { .. } => "synthesis_failed",
            WorkflowError::ResourceNotReady { .. } => "resource_not_ready",
            WorkflowError::CallInitiationFailed { .. } => "call_initiation_failed",
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            WorkflowError::InvalidInput { .. } => FailureKind::InvalidInput,
            WorkflowError::SynthesisFailed { cause, .. }
            | WorkflowError::ResourceNotReady { cause, .. }
            | WorkflowError::CallInitiationFailed { cause, .. } => match cause {
                Some(_) => FailureKind::InfrastructureFailure,
                None => FailureKind::WorkflowFailure,
            },
        }
    }

    /// Raw provider payload, or the raw body of an undecodable response
    pub fn payload(&self) -> Option<Value> {
        match self {
            WorkflowError::InvalidInput { .. } => None,
            WorkflowError::SynthesisFailed { payload, cause, .. }
            | WorkflowError::ResourceNotReady { payload, cause, .. }
            | WorkflowError::CallInitiationFailed { payload, cause, .. } => {
                payload.clone().or_else(|| {
                    cause
                        .as_ref()
                        .and_then(DispatchError::raw_body)
                        .map(|body| Value::String(body.to_string()))
                })
            }
        }
    }

    /// Underlying dispatch error, if the exchange itself failed
    pub fn cause(&self) -> Option<&DispatchError> {
        match self {
            WorkflowError::InvalidInput { .. } => None,
            WorkflowError::SynthesisFailed { cause, .. }
            | WorkflowError::ResourceNotReady { cause, .. }
            | WorkflowError::CallInitiationFailed { cause, .. } => cause.as_ref(),
        }
    }

    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        WorkflowError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Successful run result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationOutcome {
    pub resource_id: String,
    /// Call tracking id, when the provider returned one
    pub call_id: Option<String>,
    pub poll_attempts: u32,
}

/// Record of a completed step within a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: WorkflowStep,
    pub http_status: Option<u16>,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.http_status {
            Some(status) => write!(f, "{}:{status}", self.step),
            None => write!(f, "{}", self.step),
        }
    }
}

/// Transient state of one run. Owned by the orchestrator call driving it and
/// dropped when the run ends.
#[derive(Debug)]
pub struct OrchestrationRun {
    pub run_id: Uuid,
    pub resource_id: Option<String>,
    pub poll_attempts: u32,
    pub completed: Vec<StepRecord>,
}

impl OrchestrationRun {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            resource_id: None,
            poll_attempts: 0,
            completed: Vec::with_capacity(3),
        }
    }

    fn complete(&mut self, step: WorkflowStep, http_status: Option<u16>) {
        self.completed.push(StepRecord { step, http_status });
    }

    /// Completed steps in order, e.g. `submit_synthesis:200,await_resource`
    pub fn completed_summary(&self) -> String {
        self.completed
            .iter()
            .map(StepRecord::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Settings the workflow needs from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub default_caller_id: String,
    pub poll_max_attempts: u32,
    pub poll_interval: Duration,
    pub synthesis: SynthesisOptions,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            default_caller_id: AUTO_CALLER_ID.to_string(),
            poll_max_attempts: 10,
            poll_interval: Duration::from_secs(2),
            synthesis: SynthesisOptions::default(),
        }
    }
}

/// Reason text for a provider payload that did not report success
fn rejection_reason(result: &RemoteResult) -> String {
    match result.provider_message() {
        Some(message) => format!(
            "provider rejected the request (HTTP {}): {message}",
            result.status
        ),
        None => format!("provider did not report success (HTTP {})", result.status),
    }
}

/// Drives voice call runs
pub struct CallOrchestrator {
    provider: ProviderClient,
    poller: ReadinessPoller,
    settings: WorkflowSettings,
}

impl CallOrchestrator {
    pub fn new(provider: ProviderClient, settings: WorkflowSettings) -> Self {
        let poller = ReadinessPoller::new(
            provider.dispatcher(),
            provider.endpoints().synthesis_status.clone(),
        );
        Self {
            provider,
            poller,
            settings,
        }
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    /// Synthesize `message`, wait for the audio, and call `target_number`.
    ///
    /// `caller_identity` falls back to the configured default caller id when
    /// absent or blank.
    pub async fn run_voice_call_workflow(
        &self,
        target_number: &str,
        caller_identity: Option<&str>,
        message: &str,
    ) -> WorkflowResult<OrchestrationOutcome> {
        let target = validate_phone_number(target_number)
            .map_err(|e| WorkflowError::invalid("targetNumber", e.to_string()))?;
        let message = message.trim();
        if message.is_empty() {
            return Err(WorkflowError::invalid("message", "message must not be empty"));
        }
        let caller = caller_identity
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.settings.default_caller_id.as_str())
            .to_string();

        let mut run = OrchestrationRun::new();
        info!(
            run_id = %run.run_id,
            target = %target,
            caller = %caller,
            message_chars = message.chars().count(),
            "Starting voice call workflow"
        );

        let result = self.execute(&mut run, &target, &caller, message).await;
        match &result {
            Ok(outcome) => info!(
                run_id = %run.run_id,
                resource_id = %outcome.resource_id,
                call_id = ?outcome.call_id,
                poll_attempts = outcome.poll_attempts,
                "Voice call workflow completed"
            ),
            Err(e) => warn!(
                run_id = %run.run_id,
                step = %e.step(),
                resource_id = ?run.resource_id,
                completed = %run.completed_summary(),
                error = %e,
                "Voice call workflow failed"
            ),
        }
        result
    }

    async fn execute(
        &self,
        run: &mut OrchestrationRun,
        target: &str,
        caller: &str,
        message: &str,
    ) -> WorkflowResult<OrchestrationOutcome> {
        // Step 1: submit synthesis
        let submitted = self
            .provider
            .submit_synthesis(message, &self.settings.synthesis)
            .await
            .map_err(|e| WorkflowError::SynthesisFailed {
                reason: e.to_string(),
                payload: None,
                cause: Some(e),
            })?;

        if !submitted.is_provider_success() {
            return Err(WorkflowError::SynthesisFailed {
                reason: rejection_reason(&submitted),
                payload: Some(submitted.payload),
                cause: None,
            });
        }
        let resource_id = submitted
            .id_field("id")
            .ok_or_else(|| WorkflowError::SynthesisFailed {
                reason: "provider response contained no resource id".to_string(),
                payload: Some(submitted.payload.clone()),
                cause: None,
            })?;

        run.resource_id = Some(resource_id.clone());
        run.complete(WorkflowStep::SubmitSynthesis, Some(submitted.status));
        info!(run_id = %run.run_id, resource_id = %resource_id, "Synthesis job submitted");

        // Step 2: wait for the resource
        let report = self
            .poller
            .wait_until_ready_tracked(
                &resource_id,
                self.settings.poll_max_attempts,
                self.settings.poll_interval,
            )
            .await;
        run.poll_attempts = report.attempts;

        if report.state != ReadinessState::Ready {
            let cause = if report.ended_in_dispatch_error() {
                report.last_error
            } else {
                None
            };
            return Err(WorkflowError::ResourceNotReady {
                resource_id,
                state: report.state,
                attempts: report.attempts,
                payload: report.last_result.map(|r| r.payload),
                cause,
            });
        }
        run.complete(WorkflowStep::AwaitResource, None);
        info!(
            run_id = %run.run_id,
            resource_id = %resource_id,
            attempts = report.attempts,
            "Resource ready"
        );

        // Step 3: originate the call
        let call = self
            .provider
            .originate_call(caller, target, &resource_id)
            .await
            .map_err(|e| WorkflowError::CallInitiationFailed {
                reason: e.to_string(),
                payload: None,
                cause: Some(e),
            })?;

        if !call.is_provider_success() {
            return Err(WorkflowError::CallInitiationFailed {
                reason: rejection_reason(&call),
                payload: Some(call.payload),
                cause: None,
            });
        }
        run.complete(WorkflowStep::OriginateCall, Some(call.status));

        Ok(OrchestrationOutcome {
            resource_id,
            call_id: call.id_field("call_id").or_else(|| call.id_field("pbx_call_id")),
            poll_attempts: run.poll_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::MockDispatcher;
    use crate::core::provider::{
        DEFAULT_ORIGINATE_CALL_PATH, DEFAULT_SYNTHESIS_STATUS_PATH, DEFAULT_SYNTHESIS_SUBMIT_PATH,
        ProviderEndpoints,
    };
    use serde_json::json;
    use std::sync::Arc;

    const SUBMIT: &str = DEFAULT_SYNTHESIS_SUBMIT_PATH;
    const STATUS: &str = DEFAULT_SYNTHESIS_STATUS_PATH;
    const CALL: &str = DEFAULT_ORIGINATE_CALL_PATH;

    fn settings(attempts: u32) -> WorkflowSettings {
        WorkflowSettings {
            default_caller_id: "+15550001".to_string(),
            poll_max_attempts: attempts,
            poll_interval: Duration::from_millis(1),
            synthesis: SynthesisOptions::default(),
        }
    }

    fn orchestrator(mock: &Arc<MockDispatcher>, attempts: u32) -> CallOrchestrator {
        let provider = ProviderClient::new(mock.clone(), ProviderEndpoints::default());
        CallOrchestrator::new(provider, settings(attempts))
    }

    fn happy_mock() -> Arc<MockDispatcher> {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(SUBMIT, RemoteResult::ok(json!({"status": "success", "id": "r1"})));
        mock.reply(STATUS, RemoteResult::ok(json!({"status": "success", "state": "ready"})));
        mock.reply(CALL, RemoteResult::ok(json!({"status": "success", "call_id": "c1"})));
        mock
    }

    #[tokio::test]
    async fn test_happy_path() {
        let mock = happy_mock();
        let outcome = orchestrator(&mock, 3)
            .run_voice_call_workflow("+15551234", None, "Hello")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            OrchestrationOutcome {
                resource_id: "r1".to_string(),
                call_id: Some("c1".to_string()),
                poll_attempts: 1,
            }
        );

        let calls = mock.calls();
        let paths: Vec<_> = calls.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec![SUBMIT, STATUS, CALL]);
        assert_eq!(calls[0].params["text"], "Hello");
        assert_eq!(calls[1].params["id"], "r1");
        assert_eq!(calls[2].params["from"], "+15550001");
        assert_eq!(calls[2].params["to"], "+15551234");
        assert_eq!(calls[2].params["audio_id"], "r1");
    }

    #[tokio::test]
    async fn test_explicit_caller_identity_wins() {
        let mock = happy_mock();
        orchestrator(&mock, 3)
            .run_voice_call_workflow("+15551234", Some("+15559999"), "Hello")
            .await
            .unwrap();
        assert_eq!(mock.calls()[2].params["from"], "+15559999");
    }

    #[tokio::test]
    async fn test_blank_caller_identity_falls_back_to_default() {
        let mock = happy_mock();
        orchestrator(&mock, 3)
            .run_voice_call_workflow("+15551234", Some("  "), "Hello")
            .await
            .unwrap();
        assert_eq!(mock.calls()[2].params["from"], "+15550001");
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_remote_calls() {
        let mock = happy_mock();
        let orchestrator = orchestrator(&mock, 3);

        let err = orchestrator
            .run_voice_call_workflow("", None, "Hello")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidInput { field: "targetNumber", .. }));

        let err = orchestrator
            .run_voice_call_workflow("+15551234", None, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidInput { field: "message", .. }));
        assert_eq!(err.kind(), FailureKind::InvalidInput);
        assert_eq!(err.step(), WorkflowStep::Validate);

        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_synthesis_rejection_short_circuits() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(
            SUBMIT,
            RemoteResult::ok(json!({"status": "error", "message": "quota exceeded"})),
        );

        let err = orchestrator(&mock, 3)
            .run_voice_call_workflow("+15551234", None, "Hello")
            .await
            .unwrap_err();

        assert_eq!(err.step(), WorkflowStep::SubmitSynthesis);
        assert_eq!(err.kind(), FailureKind::WorkflowFailure);
        assert_eq!(err.code(), "synthesis_failed");
        assert_eq!(err.payload().unwrap()["message"], "quota exceeded");
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(mock.calls_to(SUBMIT), 1);
        assert_eq!(mock.calls_to(STATUS), 0);
        assert_eq!(mock.calls_to(CALL), 0);
    }

    #[tokio::test]
    async fn test_synthesis_without_id_fails() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(SUBMIT, RemoteResult::ok(json!({"status": "success"})));

        let err = orchestrator(&mock, 3)
            .run_voice_call_workflow("+15551234", None, "Hello")
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::SynthesisFailed { cause: None, .. }));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_synthesis_transport_error_is_infrastructure() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(SUBMIT, DispatchError::Transport("connection refused".into()));

        let err = orchestrator(&mock, 3)
            .run_voice_call_workflow("+15551234", None, "Hello")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::InfrastructureFailure);
        assert!(err.cause().is_some_and(DispatchError::is_transport));
        assert!(err.payload().is_none());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_synthesis_decode_error_exposes_raw_body() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(
            SUBMIT,
            DispatchError::Decode {
                status: 502,
                body: "<html>upstream</html>".into(),
                reason: "expected value".into(),
            },
        );

        let err = orchestrator(&mock, 3)
            .run_voice_call_workflow("+15551234", None, "Hello")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::InfrastructureFailure);
        assert_eq!(err.payload(), Some(json!("<html>upstream</html>")));
    }

    #[tokio::test]
    async fn test_resource_never_ready() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(SUBMIT, RemoteResult::ok(json!({"status": "success", "id": "r1"})));
        mock.reply(STATUS, RemoteResult::ok(json!({"status": "success", "state": "processing"})));

        let err = orchestrator(&mock, 3)
            .run_voice_call_workflow("+15551234", None, "Hello")
            .await
            .unwrap_err();

        match &err {
            WorkflowError::ResourceNotReady {
                resource_id,
                state,
                attempts,
                cause,
                ..
            } => {
                assert_eq!(resource_id, "r1");
                assert_eq!(*state, ReadinessState::Unknown);
                assert_eq!(*attempts, 3);
                assert!(cause.is_none());
            }
            other => panic!("Expected ResourceNotReady, got {other:?}"),
        }
        assert_eq!(err.step(), WorkflowStep::AwaitResource);
        assert_eq!(err.kind(), FailureKind::WorkflowFailure);
        assert_eq!(err.payload().unwrap()["state"], "processing");
        assert_eq!(mock.calls_to(STATUS), 3);
        assert_eq!(mock.calls_to(CALL), 0);
    }

    #[tokio::test]
    async fn test_resource_failed() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(SUBMIT, RemoteResult::ok(json!({"status": "success", "id": 77})));
        mock.reply(STATUS, RemoteResult::ok(json!({"status": "success", "state": "failed"})));

        let err = orchestrator(&mock, 5)
            .run_voice_call_workflow("+15551234", None, "Hello")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::ResourceNotReady {
                state: ReadinessState::Failed,
                attempts: 1,
                ..
            }
        ));
        assert_eq!(mock.calls()[1].params["id"], "77");
        assert_eq!(mock.calls_to(CALL), 0);
    }

    #[tokio::test]
    async fn test_resource_failed_carries_provider_message() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(SUBMIT, RemoteResult::ok(json!({"status": "success", "id": "r1"})));
        mock.reply(
            STATUS,
            RemoteResult::ok(
                json!({"status": "success", "state": "failed", "message": "unsupported voice"}),
            ),
        );

        let err = orchestrator(&mock, 3)
            .run_voice_call_workflow("+15551234", None, "Hello")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::WorkflowFailure);
        assert!(err.cause().is_none());
        assert_eq!(err.payload().unwrap()["message"], "unsupported voice");
    }

    #[tokio::test]
    async fn test_status_unreachable_is_infrastructure_failure() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(SUBMIT, RemoteResult::ok(json!({"status": "success", "id": "r1"})));
        mock.reply(STATUS, DispatchError::Transport("connection refused".into()));

        let err = orchestrator(&mock, 3)
            .run_voice_call_workflow("+15551234", None, "Hello")
            .await
            .unwrap_err();

        assert_eq!(err.step(), WorkflowStep::AwaitResource);
        assert_eq!(err.code(), "resource_not_ready");
        assert_eq!(err.kind(), FailureKind::InfrastructureFailure);
        assert!(err.cause().is_some_and(DispatchError::is_transport));
        assert_eq!(mock.calls_to(STATUS), 3);
        assert_eq!(mock.calls_to(CALL), 0);
    }

    #[tokio::test]
    async fn test_status_garbage_keeps_raw_body() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(SUBMIT, RemoteResult::ok(json!({"status": "success", "id": "r1"})));
        mock.reply(
            STATUS,
            DispatchError::Decode {
                status: 502,
                body: "<html>upstream</html>".into(),
                reason: "expected value".into(),
            },
        );

        let err = orchestrator(&mock, 2)
            .run_voice_call_workflow("+15551234", None, "Hello")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::InfrastructureFailure);
        assert_eq!(err.payload(), Some(json!("<html>upstream</html>")));
    }

    #[test]
    fn test_completed_summary_lists_steps_in_order() {
        let mut run = OrchestrationRun::new();
        assert_eq!(run.completed_summary(), "");

        run.complete(WorkflowStep::SubmitSynthesis, Some(200));
        run.complete(WorkflowStep::AwaitResource, None);
        assert_eq!(run.completed_summary(), "submit_synthesis:200,await_resource");
    }

    #[tokio::test]
    async fn test_call_rejection() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(SUBMIT, RemoteResult::ok(json!({"status": "success", "id": "r1"})));
        mock.reply(STATUS, RemoteResult::ok(json!({"status": "success", "state": "ready"})));
        mock.reply(
            CALL,
            RemoteResult::new(400, json!({"status": "error", "message": "wrong number"})),
        );

        let err = orchestrator(&mock, 3)
            .run_voice_call_workflow("+15551234", None, "Hello")
            .await
            .unwrap_err();

        assert_eq!(err.step(), WorkflowStep::OriginateCall);
        assert_eq!(err.kind(), FailureKind::WorkflowFailure);
        assert_eq!(err.code(), "call_initiation_failed");
        assert_eq!(err.payload().unwrap()["message"], "wrong number");
        assert_eq!(mock.calls_to(CALL), 1);
    }

    #[tokio::test]
    async fn test_call_id_is_optional() {
        let mock = Arc::new(MockDispatcher::new());
        mock.reply(SUBMIT, RemoteResult::ok(json!({"status": "success", "id": "r1"})));
        mock.reply(STATUS, RemoteResult::ok(json!({"status": "success", "state": "ready"})));
        mock.reply(CALL, RemoteResult::ok(json!({"status": "success", "time": 1700000000})));

        let outcome = orchestrator(&mock, 3)
            .run_voice_call_workflow("+15551234", None, "Hello")
            .await
            .unwrap();
        assert_eq!(outcome.call_id, None);
    }

    #[test]
    fn test_outcome_serializes_camel_case() {
        let outcome = OrchestrationOutcome {
            resource_id: "r1".into(),
            call_id: Some("c1".into()),
            poll_attempts: 2,
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"resourceId": "r1", "callId": "c1", "pollAttempts": 2})
        );
    }
}
