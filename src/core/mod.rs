pub mod dispatcher;
pub mod mock;
pub mod orchestrator;
pub mod poller;
pub mod provider;
pub mod signing;

// Re-export commonly used types for convenience
pub use dispatcher::{DispatchError, DispatchResult, HttpDispatcher, RemoteResult, RequestDispatcher};
pub use mock::{MockDispatcher, MockReply, RecordedCall};
pub use orchestrator::{
    AUTO_CALLER_ID, CallOrchestrator, FailureKind, OrchestrationOutcome, OrchestrationRun,
    StepRecord, WorkflowError, WorkflowResult, WorkflowSettings, WorkflowStep,
};
pub use poller::{PollReport, ReadinessPoller, ReadinessState};
pub use provider::{
    PRODUCTION_API_URL, ProviderClient, ProviderEndpoints, SANDBOX_API_URL, SynthesisOptions,
};
pub use signing::{Credentials, Params, SignedRequest, canonical_encoding, sign};
