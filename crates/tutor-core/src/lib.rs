//! tutor-core: Response aggregation and block classification
//!
//! Collects streamed text fragments into a single transcript with an explicit
//! request lifecycle, and turns a transcript into typed, renderable blocks.

pub mod blocks;
pub mod error;
pub mod events;
pub mod gate;
pub mod handle;
pub mod prompt;
pub mod transcript;
pub mod tutor;

pub use blocks::{Block, BlockKind, classify};
pub use error::{Error, Result};
pub use events::TutorEvent;
pub use gate::{QUICK_SYMBOLS, validate_input};
pub use handle::TutorHandle;
pub use transcript::{Aggregator, RequestId, RequestLifecycle};
pub use tutor::{PendingResponse, ResponseMode, Tutor, TutorConfig};
