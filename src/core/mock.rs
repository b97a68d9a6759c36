//! In-memory dispatcher with scripted replies.
//!
//! Used by the unit and integration tests to drive the poller and the
//! workflow without a network, and to assert exactly which provider calls
//! were made.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use http::Method;
use parking_lot::Mutex;
use serde_json::json;

use super::dispatcher::{DispatchError, DispatchResult, RemoteResult, RequestDispatcher};
use super::signing::Params;

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    Result(RemoteResult),
    Error(DispatchError),
}

impl From<RemoteResult> for MockReply {
    fn from(result: RemoteResult) -> Self {
        MockReply::Result(result)
    }
}

impl From<DispatchError> for MockReply {
    fn from(error: DispatchError) -> Self {
        MockReply::Error(error)
    }
}

/// A call observed by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub params: Params,
}

/// Dispatcher that answers from per-path reply queues.
///
/// Replies queued for a path are consumed in order; the last one keeps being
/// returned once the queue is down to a single entry. Paths with no script
/// answer HTTP 404 with a provider style error payload.
#[derive(Default)]
pub struct MockDispatcher {
    replies: Mutex<HashMap<String, VecDeque<MockReply>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `path`
    pub fn reply(&self, path: &str, reply: impl Into<MockReply>) -> &Self {
        self.replies
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(reply.into());
        self
    }

    /// Queue the same reply `times` times
    pub fn reply_times(&self, path: &str, reply: impl Into<MockReply>, times: usize) -> &Self {
        let reply = reply.into();
        let mut replies = self.replies.lock();
        let queue = replies.entry(path.to_string()).or_default();
        for _ in 0..times {
            queue.push_back(reply.clone());
        }
        drop(replies);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.path == path).count()
    }

    fn next_reply(&self, path: &str) -> Option<MockReply> {
        let mut replies = self.replies.lock();
        let queue = replies.get_mut(path)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl RequestDispatcher for MockDispatcher {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        params: &Params,
    ) -> DispatchResult<RemoteResult> {
        self.calls.lock().push(RecordedCall {
            method,
            path: path.to_string(),
            params: params.clone(),
        });

        match self.next_reply(path) {
            Some(MockReply::Result(result)) => Ok(result),
            Some(MockReply::Error(error)) => Err(error),
            None => Ok(RemoteResult::new(
                404,
                json!({"status": "error", "message": format!("no mock reply for {path}")}),
            )),
        }
    }
}
