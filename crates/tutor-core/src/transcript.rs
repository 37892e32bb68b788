//! Transcript aggregation with an explicit request lifecycle.

use crate::blocks::{Block, classify};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one logical request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestLifecycle {
    #[default]
    Idle,
    InProgress,
    Completed,
    Failed,
}

impl RequestLifecycle {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestLifecycle::Completed | RequestLifecycle::Failed)
    }
}

/// Identifies a request; the most recent `start()` wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns the transcript of the current request.
///
/// Not synchronized: callers deliver events serially (one UI loop or task),
/// which `&mut self` enforces within safe code.
#[derive(Debug, Default)]
pub struct Aggregator {
    transcript: String,
    state: RequestLifecycle,
    request: RequestId,
    failure: Option<Error>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new request, discarding whatever the previous one produced.
    pub fn start(&mut self) -> RequestId {
        if self.state == RequestLifecycle::InProgress {
            tracing::debug!(
                request = %self.request,
                discarded = self.transcript.len(),
                "superseding in-flight request"
            );
        }
        self.request = RequestId(self.request.0 + 1);
        self.transcript.clear();
        self.failure = None;
        self.state = RequestLifecycle::InProgress;
        tracing::debug!(request = %self.request, "request started");
        self.request
    }

    /// Append a fragment in arrival order.
    ///
    /// Returns `false` when ignored because no request is in progress.
    pub fn append(&mut self, fragment: &str) -> bool {
        if self.state != RequestLifecycle::InProgress {
            tracing::debug!(state = ?self.state, "fragment ignored outside an in-progress request");
            return false;
        }
        self.transcript.push_str(fragment);
        true
    }

    /// End of a streaming sequence. An empty transcript is a failure.
    pub fn complete(&mut self) -> Result<()> {
        if self.state != RequestLifecycle::InProgress {
            tracing::warn!(state = ?self.state, "complete() outside an in-progress request");
            return self.terminal_result();
        }
        if self.transcript.is_empty() {
            self.fail(Error::EmptyResult);
            return Err(Error::EmptyResult);
        }
        self.state = RequestLifecycle::Completed;
        tracing::debug!(request = %self.request, chars = self.transcript.len(), "request completed");
        Ok(())
    }

    /// Single-shot shape: replace the transcript and finish in one step.
    pub fn complete_with_full_text(&mut self, text: impl Into<String>) -> Result<()> {
        if self.state.is_terminal() {
            tracing::warn!(state = ?self.state, "complete_with_full_text() on a finished request");
            return self.terminal_result();
        }
        if self.state == RequestLifecycle::Idle {
            self.request = RequestId(self.request.0 + 1);
            self.state = RequestLifecycle::InProgress;
        }
        self.transcript = text.into();
        self.complete()
    }

    /// Fail the current request. The partial transcript is dropped.
    pub fn fail(&mut self, error: Error) {
        if self.state.is_terminal() {
            tracing::debug!(state = ?self.state, "fail() ignored on a finished request");
            return;
        }
        tracing::warn!(request = %self.request, %error, "request failed");
        self.transcript.clear();
        self.failure = Some(error);
        self.state = RequestLifecycle::Failed;
    }

    /// Back to Idle, e.g. when the user clears the input.
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.failure = None;
        self.state = RequestLifecycle::Idle;
    }

    /// Transcript as of now; empty in Idle and Failed.
    pub fn current_transcript(&self) -> &str {
        &self.transcript
    }

    pub fn current_state(&self) -> RequestLifecycle {
        self.state
    }

    /// Id of the most recently started request
    pub fn current_request(&self) -> RequestId {
        self.request
    }

    /// Why the request failed, when Failed
    pub fn failure(&self) -> Option<&Error> {
        self.failure.as_ref()
    }

    /// Re-derive the block sequence from the current transcript.
    pub fn blocks(&self) -> Vec<Block> {
        classify(&self.transcript)
    }

    fn terminal_result(&self) -> Result<()> {
        match (self.state, &self.failure) {
            (RequestLifecycle::Completed, _) => Ok(()),
            (_, Some(error)) => Err(error.clone()),
            _ => Err(Error::generation("no request in progress")),
        }
    }
}
