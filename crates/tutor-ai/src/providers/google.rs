//! Google Generative AI (Gemini) API provider

use crate::{
    error::{Error, Result},
    providers::{GenerationClient, get_api_key},
    stream::{GenerationEvent, GenerationEventStream},
    types::{FinishReason, Request, Usage},
};
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};

/// Environment variables checked for the Gemini API key, in order
pub const API_KEY_ENV_VARS: &[&str] = &["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Google Generative AI client
pub struct GoogleProvider {
    client: reqwest::Client,
    api_key: String,
}

impl GoogleProvider {
    /// Create a new Google provider with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Use `api_key` when given, otherwise fall back to the environment
    pub fn with_optional_key(api_key: Option<&str>) -> Result<Self> {
        Ok(Self::new(get_api_key(api_key, API_KEY_ENV_VARS)?))
    }

    /// An empty key is accepted here and reported when a request is made.
    fn require_key(&self) -> Result<&str> {
        if self.api_key.trim().is_empty() {
            return Err(Error::InvalidApiKey);
        }
        Ok(&self.api_key)
    }

    fn endpoint(&self, request: &Request, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            request.model.base_url.trim_end_matches('/'),
            request.model.id,
            method
        )
    }
}

#[async_trait]
impl GenerationClient for GoogleProvider {
    /// Stream a response from Gemini
    async fn stream(&self, request: &Request) -> Result<GenerationEventStream> {
        let api_key = self.require_key()?;
        let body = build_request(request);
        let url = format!("{}?alt=sse", self.endpoint(request, "streamGenerateContent"));

        tracing::debug!(model = %request.model.id, "opening Gemini stream");

        let request_builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body);

        let event_source = EventSource::new(request_builder)
            .map_err(|e| Error::Sse(format!("Failed to create event source: {}", e)))?;

        Ok(Box::pin(create_stream(
            event_source,
            request.model.id.clone(),
        )))
    }

    /// Single-shot `generateContent` call
    async fn generate(&self, request: &Request) -> Result<String> {
        let api_key = self.require_key()?;
        let body = build_request(request);
        let url = self.endpoint(request, "generateContent");

        tracing::debug!(model = %request.model.id, "calling Gemini generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &text));
        }

        let parsed = parse_chunk(&text)?;
        match parsed.text() {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(Error::EmptyResponse(
                "Gemini returned no text in the response".to_string(),
            )),
        }
    }
}

/// Decode one response body or SSE payload. An in-band error object becomes an API error.
fn parse_chunk(data: &str) -> Result<GeminiResponse> {
    if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(data) {
        return Err(Error::api(
            error_response.error.status.unwrap_or_default(),
            error_response.error.message,
        ));
    }
    serde_json::from_str(data)
        .map_err(|e| Error::UnexpectedResponse(format!("failed to parse chunk: {}", e)))
}

fn build_request(request: &Request) -> GeminiRequest {
    let system_instruction = request
        .system_instruction
        .as_ref()
        .map(|instruction| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: instruction.clone(),
            }],
        });

    GeminiRequest {
        contents: vec![GeminiContent {
            role: Some("user".to_string()),
            parts: vec![GeminiPart {
                text: request.prompt.clone(),
            }],
        }],
        system_instruction,
        generation_config: Some(GeminiGenerationConfig {
            max_output_tokens: Some(request.model.max_tokens),
            temperature: request.temperature,
            response_modalities: Some(vec!["TEXT".to_string()]),
        }),
    }
}

fn parse_error_body(status: u16, body: &str) -> Error {
    match serde_json::from_str::<GeminiErrorResponse>(body) {
        Ok(err) => Error::api(
            err.error.status.unwrap_or_else(|| status.to_string()),
            err.error.message,
        ),
        Err(_) => Error::api(status.to_string(), body.to_string()),
    }
}

fn create_stream(
    mut event_source: EventSource,
    model: String,
) -> impl futures::Stream<Item = GenerationEvent> {
    stream! {
        let mut accumulated_text = String::new();
        let mut finish_reason: Option<FinishReason> = None;
        let mut usage = Usage::default();

        yield GenerationEvent::Start { model };

        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => {}
                Ok(Event::Message(msg)) => {
                    if msg.data.is_empty() || msg.data == "[DONE]" {
                        continue;
                    }

                    match parse_chunk(&msg.data) {
                        Ok(response) => {
                            if let Some(reason) = response.finish_reason() {
                                finish_reason = Some(FinishReason::from_gemini(reason));
                            }
                            if let Some(ref meta) = response.usage_metadata {
                                usage.input = meta.prompt_token_count.unwrap_or(0);
                                usage.output = meta.candidates_token_count.unwrap_or(0);
                            }

                            // Chunks without candidate content carry no text
                            let Some(text) = response.text() else {
                                continue;
                            };
                            if text.is_empty() {
                                continue;
                            }
                            accumulated_text.push_str(&text);
                            yield GenerationEvent::TextDelta { delta: text };
                        }
                        Err(e) => {
                            event_source.close();
                            yield GenerationEvent::Error { message: e.to_string() };
                            return;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    event_source.close();
                    break;
                }
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    event_source.close();
                    let body = response.text().await.unwrap_or_default();
                    yield GenerationEvent::Error {
                        message: parse_error_body(status.as_u16(), &body).to_string(),
                    };
                    return;
                }
                Err(e) => {
                    event_source.close();
                    yield GenerationEvent::Error {
                        message: format!("SSE error: {}", e),
                    };
                    return;
                }
            }
        }

        yield GenerationEvent::Done {
            text: accumulated_text,
            finish_reason,
            usage,
        };
    }
}

// Request types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

// Response types (shared by the SSE chunks and generateContent)

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

impl GeminiResponse {
    /// Text of the first candidate, or `None` when the chunk has no
    /// candidate, content or parts.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let parts = content.parts.as_ref()?;
        Some(
            parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>(),
        )
    }

    fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    parts: Option<Vec<GeminiResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}
