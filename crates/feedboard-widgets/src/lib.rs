//! Interaction state shared by **feedboard** screens.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`key`] | Key bindings matched against crossterm key events |
//! | [`selection`] | Clamped cursor with a multi-select checked set |

pub mod key;
pub mod selection;

pub use key::{Binding, KeyCombination};
pub use selection::MultiSelection;
