//! tutor-tui: terminal widgets for the math tutor
//!
//! Built on ratatui and crossterm. Widgets borrow their state and a [`Theme`];
//! the event loop lives in the binary.

pub mod input;
pub mod theme;
pub mod widgets;

pub use input::{Action, event_to_action, key_to_action};
pub use theme::Theme;
