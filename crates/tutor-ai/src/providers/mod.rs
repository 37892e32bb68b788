//! Generation client implementations

pub mod google;

use crate::{Error, GenerationEventStream, Request, Result, stream::TextCollector};
use async_trait::async_trait;
use futures::StreamExt;

/// A remote text generation service.
///
/// Both call shapes are offered: `stream` delivers fragments over time, `generate`
/// returns one complete string.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Stream a response as a finite, non-restartable sequence of events
    async fn stream(&self, request: &Request) -> Result<GenerationEventStream>;

    /// Produce the whole response at once.
    ///
    /// The default drains `stream`; providers with a native single-shot endpoint
    /// override it.
    async fn generate(&self, request: &Request) -> Result<String> {
        let mut events = self.stream(request).await?;
        let mut collector = TextCollector::new();
        while let Some(event) = events.next().await {
            let terminal = event.is_terminal();
            collector.process_event(&event);
            if terminal {
                break;
            }
        }
        tracing::debug!(finish_reason = ?collector.finish_reason(), "stream drained");
        collector.finish().map_err(Error::Sse)
    }
}

/// Get an API key from a provided value or the first set environment variable
pub fn get_api_key(provided: Option<&str>, env_vars: &[&str]) -> Result<String> {
    if let Some(key) = provided.filter(|k| !k.trim().is_empty()) {
        return Ok(key.to_string());
    }

    env_vars
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .ok_or(Error::InvalidApiKey)
}
