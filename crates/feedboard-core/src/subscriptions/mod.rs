//! Built-in subscription sources.
//!
//! - **Terminal events** ([`terminal_events`], [`TerminalEvents`]) -- key
//!   presses and resizes read from the terminal.

mod terminal;

pub use terminal::*;
