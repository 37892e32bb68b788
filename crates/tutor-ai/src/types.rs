//! Core types for generation requests

use serde::{Deserialize, Serialize};

/// Default Gemini API base URL
pub const GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Model identifier (e.g., "gemini-2.0-flash-exp")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Base URL for API calls
    pub base_url: String,
    /// Maximum output tokens
    pub max_tokens: u32,
}

impl Model {
    /// Construct a Gemini model with default settings for an unknown id
    pub fn gemini(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            base_url: GOOGLE_BASE_URL.to_string(),
            max_tokens: 8192,
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input: u32,
    pub output: u32,
}

/// Reason why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of response
    Stop,
    /// Maximum tokens reached
    Length,
    /// Blocked by the provider's safety filters
    Safety,
    /// Anything else the provider reported
    Other,
}

impl FinishReason {
    /// Map a Gemini `finishReason` string
    pub fn from_gemini(reason: &str) -> Self {
        match reason {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::Length,
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => FinishReason::Safety,
            _ => FinishReason::Other,
        }
    }
}

/// One generation request: a fixed system instruction plus the user prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Persona / instruction sent as the system instruction
    pub system_instruction: Option<String>,
    /// The user turn
    pub prompt: String,
    /// Model to run against
    pub model: Model,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: Option<f32>,
}

impl Request {
    /// Create a request for `model` with the given prompt
    pub fn new(model: Model, prompt: impl Into<String>) -> Self {
        Self {
            system_instruction: None,
            prompt: prompt.into(),
            model,
            temperature: None,
        }
    }

    /// Set the system instruction
    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}
