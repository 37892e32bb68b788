//! Streaming event types and utilities

use crate::types::{FinishReason, Usage};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

/// Events emitted while a response streams in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationEvent {
    /// The connection is open and the model id is known
    Start { model: String },
    /// A fragment of text, in delivery order
    TextDelta { delta: String },
    /// The sequence ended normally
    Done {
        /// Concatenation of every delta
        text: String,
        finish_reason: Option<FinishReason>,
        usage: Usage,
    },
    /// The sequence ended abnormally
    Error { message: String },
}

impl GenerationEvent {
    /// Check if this is a terminal event (Done or Error)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationEvent::Done { .. } | GenerationEvent::Error { .. }
        )
    }
}

/// A stream of generation events
pub type GenerationEventStream = Pin<Box<dyn Stream<Item = GenerationEvent> + Send>>;

/// Accumulates deltas into the full text, mirroring what a consumer sees
#[derive(Debug, Default)]
pub struct TextCollector {
    text: String,
    finish_reason: Option<FinishReason>,
    failed: Option<String>,
}

impl TextCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a streaming event
    pub fn process_event(&mut self, event: &GenerationEvent) {
        match event {
            GenerationEvent::TextDelta { delta } => self.text.push_str(delta),
            GenerationEvent::Done { finish_reason, .. } => {
                self.finish_reason = *finish_reason;
            }
            GenerationEvent::Error { message } => {
                self.failed = Some(message.clone());
            }
            GenerationEvent::Start { .. } => {}
        }
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    /// Consume the collector: the full text, or the error message if the
    /// stream failed.
    pub fn finish(self) -> std::result::Result<String, String> {
        match self.failed {
            Some(message) => Err(message),
            None => Ok(self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(s: &str) -> GenerationEvent {
        GenerationEvent::TextDelta {
            delta: s.to_string(),
        }
    }

    #[test]
    fn test_terminal_events() {
        assert!(
            GenerationEvent::Error {
                message: "boom".into()
            }
            .is_terminal()
        );
        assert!(
            GenerationEvent::Done {
                text: String::new(),
                finish_reason: None,
                usage: Usage::default(),
            }
            .is_terminal()
        );
        assert!(!delta("x").is_terminal());
    }

    #[test]
    fn test_collector_concatenates_in_order() {
        let mut collector = TextCollector::new();
        for ev in [delta("## Ste"), delta("p 1\n"), delta("* x")] {
            collector.process_event(&ev);
        }
        collector.process_event(&GenerationEvent::Done {
            text: "## Step 1\n* x".into(),
            finish_reason: Some(FinishReason::Stop),
            usage: Usage::default(),
        });
        assert_eq!(collector.finish_reason(), Some(FinishReason::Stop));
        assert_eq!(collector.finish().unwrap(), "## Step 1\n* x");
    }

    #[test]
    fn test_collector_reports_error() {
        let mut collector = TextCollector::new();
        collector.process_event(&delta("partial"));
        collector.process_event(&GenerationEvent::Error {
            message: "SSE error: reset".into(),
        });
        assert_eq!(collector.finish().unwrap_err(), "SSE error: reset");
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_string(&delta("x=5")).unwrap();
        assert_eq!(json, r#"{"type":"text_delta","delta":"x=5"}"#);
    }
}
