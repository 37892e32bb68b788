//! Request driver: gate → generation client → aggregator.

use std::sync::Arc;

use async_stream::stream;
use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tutor_ai::{GenerationClient, GenerationEvent, GenerationEventStream, Model, Request};

use crate::error::{Error, Result};
use crate::events::TutorEvent;
use crate::gate::validate_input;
use crate::handle::TutorHandle;
use crate::prompt::{SYSTEM_INSTRUCTION, build_prompt};
use crate::transcript::{Aggregator, RequestId, RequestLifecycle};

const ABORTED: &str = "Request aborted";

/// Which call shape to use against the generation client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseMode {
    /// Fragments delivered over time
    #[default]
    Stream,
    /// One complete string
    Single,
}

/// Configuration for the tutor
#[derive(Debug, Clone)]
pub struct TutorConfig {
    pub model: Model,
    pub mode: ResponseMode,
    pub temperature: Option<f32>,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            model: tutor_ai::models::default_model(),
            mode: ResponseMode::default(),
            temperature: None,
        }
    }
}

/// Response of a started request, independent of the `Tutor` borrow so an
/// event loop can poll it next to other event sources.
pub struct PendingResponse {
    request: RequestId,
    events: GenerationEventStream,
    cancel: CancellationToken,
}

impl PendingResponse {
    pub fn request(&self) -> RequestId {
        self.request
    }

    /// Next client event; `None` once the client sequence is exhausted.
    pub async fn next(&mut self) -> Option<GenerationEvent> {
        self.events.next().await
    }

    /// Like [`PendingResponse::next`], but a sequence that ends without a
    /// terminal event ends normally, as an empty `Done`.
    pub async fn next_or_done(&mut self) -> GenerationEvent {
        self.next().await.unwrap_or_else(|| GenerationEvent::Done {
            text: String::new(),
            finish_reason: None,
            usage: Default::default(),
        })
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Drives one request at a time and owns its lifecycle.
pub struct Tutor {
    config: TutorConfig,
    client: Arc<dyn GenerationClient>,
    aggregator: Aggregator,
    active_mode: ResponseMode,
    event_tx: broadcast::Sender<TutorEvent>,
    handle: TutorHandle,
}

impl Tutor {
    /// Create a new tutor
    pub fn new(config: TutorConfig, client: Arc<dyn GenerationClient>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            active_mode: config.mode,
            config,
            client,
            aggregator: Aggregator::new(),
            event_tx,
            handle: TutorHandle::new(),
        }
    }

    /// Subscribe to tutor events
    pub fn subscribe(&self) -> broadcast::Receiver<TutorEvent> {
        self.event_tx.subscribe()
    }

    /// Get a cloneable handle for aborting from outside
    pub fn handle(&self) -> TutorHandle {
        self.handle.clone()
    }

    /// Read access to the transcript and lifecycle
    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Change the call shape for subsequent requests
    pub fn set_mode(&mut self, mode: ResponseMode) {
        self.config.mode = mode;
    }

    /// Validate `input` and start a request for it.
    ///
    /// A previous in-flight request is superseded: its transcript is dropped and
    /// its late events are ignored by [`Tutor::apply`].
    pub fn begin(&mut self, input: &str) -> Result<PendingResponse> {
        let expression = match validate_input(input) {
            Ok(expression) => expression,
            Err(e) => {
                self.emit(TutorEvent::Rejected {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        if self.aggregator.current_state() == RequestLifecycle::InProgress {
            self.handle.abort();
        }

        let request_id = self.aggregator.start();
        let cancel = self.handle.reset();
        self.handle.set_running(true);
        self.active_mode = self.config.mode;
        self.emit(TutorEvent::Started {
            request: request_id,
        });

        let mut request = Request::new(self.config.model.clone(), build_prompt(expression))
            .with_system(SYSTEM_INSTRUCTION);
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }

        tracing::debug!(
            request = %request_id,
            model = %request.model.id,
            mode = ?self.active_mode,
            "sending expression"
        );

        let events = match self.active_mode {
            ResponseMode::Stream => open_stream(Arc::clone(&self.client), request),
            ResponseMode::Single => single_shot(Arc::clone(&self.client), request),
        };

        Ok(PendingResponse {
            request: request_id,
            events,
            cancel,
        })
    }

    /// Feed one client event for `request` into the aggregator.
    ///
    /// Returns `Some` with the outcome once the request reaches a terminal state,
    /// `None` while it is still running or when the event was stale.
    pub fn apply(&mut self, request: RequestId, event: GenerationEvent) -> Option<Result<()>> {
        if request != self.aggregator.current_request()
            || self.aggregator.current_state() != RequestLifecycle::InProgress
        {
            tracing::debug!(%request, "dropping event from a superseded request");
            return None;
        }

        match event {
            GenerationEvent::Start { .. } => None,
            GenerationEvent::TextDelta { delta } => {
                if self.aggregator.append(&delta) {
                    self.emit(TutorEvent::Fragment { request, delta });
                }
                None
            }
            GenerationEvent::Done {
                text,
                finish_reason,
                ..
            } => {
                tracing::debug!(%request, ?finish_reason, "client finished");
                let outcome = match self.active_mode {
                    ResponseMode::Stream => self.aggregator.complete(),
                    ResponseMode::Single => self.aggregator.complete_with_full_text(text),
                };
                Some(self.finish(request, outcome))
            }
            GenerationEvent::Error { message } => {
                Some(self.fail(request, Error::generation(message)))
            }
        }
    }

    /// Stop awaiting the current request; it ends as Failed.
    pub fn abort(&mut self) {
        self.handle.abort();
        if self.aggregator.current_state() == RequestLifecycle::InProgress {
            let request = self.aggregator.current_request();
            let _ = self.fail(request, Error::generation(ABORTED));
        }
    }

    /// Reset to Idle, e.g. when the user clears the input.
    pub fn clear(&mut self) {
        self.handle.abort();
        self.handle.set_running(false);
        self.aggregator.clear();
        self.emit(TutorEvent::Cleared);
    }

    /// Run a whole request and return the final transcript.
    pub async fn solve(&mut self, input: &str) -> Result<String> {
        let mut pending = self.begin(input)?;
        let request = pending.request();
        let cancel = pending.cancel_token().clone();

        let outcome = loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.abort();
                    break Err(Error::generation(ABORTED));
                }
                event = pending.next_or_done() => event,
            };

            if let Some(outcome) = self.apply(request, event) {
                break outcome;
            }
        };

        outcome.map(|()| self.aggregator.current_transcript().to_string())
    }

    fn fail(&mut self, request: RequestId, error: Error) -> Result<()> {
        self.aggregator.fail(error.clone());
        self.finish(request, Err(error))
    }

    fn finish(&mut self, request: RequestId, outcome: Result<()>) -> Result<()> {
        self.handle.set_running(false);
        match &outcome {
            Ok(()) => self.emit(TutorEvent::Completed {
                request,
                transcript: self.aggregator.current_transcript().to_string(),
            }),
            Err(e) => self.emit(TutorEvent::Failed {
                request,
                message: e.to_string(),
            }),
        }
        outcome
    }

    fn emit(&self, event: TutorEvent) {
        let _ = self.event_tx.send(event);
    }
}

fn open_stream(client: Arc<dyn GenerationClient>, request: Request) -> GenerationEventStream {
    Box::pin(stream! {
        match client.stream(&request).await {
            Ok(mut events) => {
                while let Some(event) = events.next().await {
                    let terminal = event.is_terminal();
                    yield event;
                    if terminal {
                        return;
                    }
                }
            }
            Err(e) => {
                yield GenerationEvent::Error { message: e.to_string() };
            }
        }
    })
}

fn single_shot(client: Arc<dyn GenerationClient>, request: Request) -> GenerationEventStream {
    Box::pin(stream! {
        match client.generate(&request).await {
            Ok(text) => {
                yield GenerationEvent::Done {
                    text,
                    finish_reason: None,
                    usage: Default::default(),
                };
            }
            // An empty payload is not a transport failure
            Err(tutor_ai::Error::EmptyResponse(_)) => {
                yield GenerationEvent::Done {
                    text: String::new(),
                    finish_reason: None,
                    usage: Default::default(),
                };
            }
            Err(e) => {
                yield GenerationEvent::Error { message: e.to_string() };
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockKind;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Replays canned events; `generate` returns a canned string.
    struct ScriptedClient {
        events: Vec<GenerationEvent>,
        full_text: std::result::Result<String, String>,
        requests: Mutex<Vec<Request>>,
    }

    impl ScriptedClient {
        fn streaming(deltas: &[&str]) -> Self {
            let mut events: Vec<GenerationEvent> = deltas
                .iter()
                .map(|d| GenerationEvent::TextDelta {
                    delta: d.to_string(),
                })
                .collect();
            events.push(GenerationEvent::Done {
                text: deltas.concat(),
                finish_reason: None,
                usage: Default::default(),
            });
            Self::with_events(events)
        }

        fn with_events(events: Vec<GenerationEvent>) -> Self {
            Self {
                events,
                full_text: Err("not scripted".into()),
                requests: Mutex::new(vec![]),
            }
        }

        fn single(text: std::result::Result<&str, &str>) -> Self {
            Self {
                events: vec![],
                full_text: text.map(str::to_string).map_err(str::to_string),
                requests: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl GenerationClient for ScriptedClient {
        async fn stream(&self, request: &Request) -> tutor_ai::Result<GenerationEventStream> {
            self.requests.lock().push(request.clone());
            let events = self.events.clone();
            Ok(Box::pin(stream! {
                for event in events {
                    yield event;
                }
            }))
        }

        async fn generate(&self, request: &Request) -> tutor_ai::Result<String> {
            self.requests.lock().push(request.clone());
            match &self.full_text {
                Ok(text) if text.is_empty() => {
                    Err(tutor_ai::Error::EmptyResponse("no text".into()))
                }
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(tutor_ai::Error::api("UNAVAILABLE", message.clone())),
            }
        }
    }

    struct FailingClient;

    #[async_trait]
    impl GenerationClient for FailingClient {
        async fn stream(&self, _request: &Request) -> tutor_ai::Result<GenerationEventStream> {
            Err(tutor_ai::Error::InvalidApiKey)
        }
    }

    fn tutor_with(client: ScriptedClient, mode: ResponseMode) -> (Tutor, Arc<ScriptedClient>) {
        let client = Arc::new(client);
        let config = TutorConfig {
            mode,
            ..Default::default()
        };
        (Tutor::new(config, client.clone()), client)
    }

    fn drain(rx: &mut broadcast::Receiver<TutorEvent>) -> Vec<TutorEvent> {
        let mut events = vec![];
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_streaming_success() {
        let (mut tutor, client) = tutor_with(
            ScriptedClient::streaming(&["### Ste", "p 1\n* $2x", " = 10$\n", "x = 5"]),
            ResponseMode::Stream,
        );
        let mut rx = tutor.subscribe();

        let transcript = tutor.solve("  2x+5=15 ").await.unwrap();
        assert_eq!(transcript, "### Step 1\n* $2x = 10$\nx = 5");
        assert_eq!(
            tutor.aggregator().current_state(),
            RequestLifecycle::Completed
        );

        let blocks = tutor.aggregator().blocks();
        assert_eq!(blocks[0].kind, BlockKind::Heading3);
        assert_eq!(blocks[1].kind, BlockKind::Bullet);
        assert_eq!(blocks[1].content, "2x = 10");

        let sent = client.requests.lock();
        assert_eq!(
            sent[0].prompt,
            "Solve the following equation or math problem: 2x+5=15"
        );
        assert_eq!(sent[0].system_instruction.as_deref(), Some(SYSTEM_INSTRUCTION));

        let events = drain(&mut rx);
        assert!(matches!(events.first(), Some(TutorEvent::Started { .. })));
        let fragments = events
            .iter()
            .filter(|e| matches!(e, TutorEvent::Fragment { .. }))
            .count();
        assert_eq!(fragments, 4);
        assert!(matches!(events.last(), Some(TutorEvent::Completed { .. })));
        assert!(!tutor.handle().is_running());
    }

    #[tokio::test]
    async fn test_stream_error_discards_partial() {
        let (mut tutor, _) = tutor_with(
            ScriptedClient::with_events(vec![
                GenerationEvent::TextDelta {
                    delta: "## Step 1\npartial".into(),
                },
                GenerationEvent::Error {
                    message: "SSE error: connection reset".into(),
                },
            ]),
            ResponseMode::Stream,
        );
        let mut rx = tutor.subscribe();

        let err = tutor.solve("x+1=2").await.unwrap_err();
        assert_eq!(
            err,
            Error::GenerationFailed("SSE error: connection reset".into())
        );
        assert_eq!(tutor.aggregator().current_state(), RequestLifecycle::Failed);
        assert_eq!(tutor.aggregator().current_transcript(), "");

        let events = drain(&mut rx);
        match events.last() {
            Some(TutorEvent::Failed { message, .. }) => {
                assert!(message.contains("connection reset"))
            }
            other => panic!("unexpected last event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_stream_is_empty_result() {
        let (mut tutor, _) = tutor_with(ScriptedClient::streaming(&[]), ResponseMode::Stream);
        assert_eq!(tutor.solve("1+1").await, Err(Error::EmptyResult));
        assert_eq!(tutor.aggregator().current_state(), RequestLifecycle::Failed);
    }

    #[tokio::test]
    async fn test_stream_without_done_completes() {
        let (mut tutor, _) = tutor_with(
            ScriptedClient::with_events(vec![GenerationEvent::TextDelta {
                delta: "x = 1".into(),
            }]),
            ResponseMode::Stream,
        );
        assert_eq!(tutor.solve("x=1").await.unwrap(), "x = 1");
    }

    #[tokio::test]
    async fn test_single_shot() {
        let (mut tutor, _) = tutor_with(
            ScriptedClient::single(Ok("# Answer\nx = 5")),
            ResponseMode::Single,
        );
        let mut rx = tutor.subscribe();
        assert_eq!(tutor.solve("2x=10").await.unwrap(), "# Answer\nx = 5");
        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], TutorEvent::Completed { .. }));
    }

    #[tokio::test]
    async fn test_single_shot_empty_is_empty_result() {
        let (mut tutor, _) = tutor_with(ScriptedClient::single(Ok("")), ResponseMode::Single);
        assert_eq!(tutor.solve("2x=10").await, Err(Error::EmptyResult));
    }

    #[tokio::test]
    async fn test_single_shot_failure() {
        let (mut tutor, _) = tutor_with(
            ScriptedClient::single(Err("model overloaded")),
            ResponseMode::Single,
        );
        match tutor.solve("2x=10").await {
            Err(Error::GenerationFailed(msg)) => assert!(msg.contains("model overloaded")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_client_open_failure() {
        let mut tutor = Tutor::new(TutorConfig::default(), Arc::new(FailingClient));
        match tutor.solve("2x=10").await {
            Err(Error::GenerationFailed(msg)) => assert!(msg.contains("API key")),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(tutor.aggregator().current_state(), RequestLifecycle::Failed);
    }

    #[tokio::test]
    async fn test_rejected_input_starts_nothing() {
        let (mut tutor, client) = tutor_with(ScriptedClient::streaming(&["x"]), ResponseMode::Stream);
        let mut rx = tutor.subscribe();

        assert_eq!(tutor.solve("hello").await, Err(Error::InputRejected));
        assert_eq!(tutor.aggregator().current_state(), RequestLifecycle::Idle);
        assert!(client.requests.lock().is_empty());

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![TutorEvent::Rejected {
                message: Error::InputRejected.to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_new_request_supersedes_pending() {
        let (mut tutor, _) = tutor_with(
            ScriptedClient::streaming(&["old ", "text"]),
            ResponseMode::Stream,
        );

        let mut first = tutor.begin("1+1").unwrap();
        let old_request = first.request();
        let event = first.next().await.unwrap();
        assert!(tutor.apply(old_request, event).is_none());
        assert_eq!(tutor.aggregator().current_transcript(), "old ");
        assert!(!first.cancel_token().is_cancelled());

        let mut second = tutor.begin("2+2").unwrap();
        assert!(first.cancel_token().is_cancelled());
        assert_eq!(tutor.aggregator().current_transcript(), "");

        // Late fragment from the superseded request is dropped
        let late = first.next().await.unwrap();
        assert!(tutor.apply(old_request, late).is_none());
        assert_eq!(tutor.aggregator().current_transcript(), "");

        while let Some(event) = second.next().await {
            if let Some(outcome) = tutor.apply(second.request(), event) {
                outcome.unwrap();
                break;
            }
        }
        assert_eq!(tutor.aggregator().current_transcript(), "old text");
    }

    #[tokio::test]
    async fn test_abort_fails_request() {
        let (mut tutor, _) = tutor_with(
            ScriptedClient::streaming(&["partial"]),
            ResponseMode::Stream,
        );
        let mut pending = tutor.begin("x=2").unwrap();
        let event = pending.next().await.unwrap();
        tutor.apply(pending.request(), event);

        tutor.abort();
        assert_eq!(tutor.aggregator().current_state(), RequestLifecycle::Failed);
        assert_eq!(tutor.aggregator().current_transcript(), "");
        assert_eq!(
            tutor.aggregator().failure(),
            Some(&Error::generation("Request aborted"))
        );
    }

    #[tokio::test]
    async fn test_running_flag_follows_lifecycle() {
        let (mut tutor, _) = tutor_with(
            ScriptedClient::streaming(&["x = ", "5"]),
            ResponseMode::Stream,
        );
        let handle = tutor.handle();
        assert!(!handle.is_running());

        let mut pending = tutor.begin("x=5").unwrap();
        assert!(handle.is_running());
        loop {
            let event = pending.next_or_done().await;
            if tutor.apply(pending.request(), event).is_some() {
                break;
            }
            assert!(handle.is_running());
        }
        assert!(!handle.is_running());

        tutor.begin("x=6").unwrap();
        assert!(handle.is_running());
        tutor.abort();
        assert!(!handle.is_running());

        tutor.begin("x=7").unwrap();
        tutor.clear();
        assert!(!handle.is_running());
    }

    #[tokio::test]
    async fn test_temperature_reaches_request() {
        let client = Arc::new(ScriptedClient::streaming(&["x = 5"]));
        let config = TutorConfig {
            temperature: Some(0.3),
            ..Default::default()
        };
        let mut tutor = Tutor::new(config, client.clone());
        tutor.solve("x=5").await.unwrap();
        assert_eq!(client.requests.lock()[0].temperature, Some(0.3));
    }

    #[tokio::test]
    async fn test_clear_returns_to_idle() {
        let (mut tutor, _) = tutor_with(ScriptedClient::streaming(&["x = 5"]), ResponseMode::Stream);
        let mut rx = tutor.subscribe();
        tutor.solve("x=5").await.unwrap();
        tutor.clear();
        assert_eq!(tutor.aggregator().current_state(), RequestLifecycle::Idle);
        assert_eq!(tutor.aggregator().current_transcript(), "");
        assert_eq!(drain(&mut rx).last(), Some(&TutorEvent::Cleared));
    }
}
