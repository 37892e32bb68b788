//! tutor-ai: Text generation client layer
//!
//! This crate talks to the remote generation service (Google Gemini) in both the
//! streaming and the single-shot call shapes, and exposes a provider-neutral
//! event stream to the rest of the workspace.

pub mod error;
pub mod models;
pub mod providers;
pub mod stream;
pub mod types;

pub use error::{Error, Result};
pub use providers::GenerationClient;
pub use stream::{GenerationEvent, GenerationEventStream};
pub use types::*;
