//! Widgets for the tutor screen

pub mod input_box;
pub mod solution;
pub mod spinner;
pub mod symbol_bar;

pub use input_box::InputBox;
pub use solution::{Notice, SolutionView, render_blocks, solution_height};
pub use spinner::Spinner;
pub use symbol_bar::{SymbolBar, SymbolPalette};
