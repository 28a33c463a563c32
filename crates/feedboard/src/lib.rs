//! **feedboard** -- live terminal dashboard for chat channels.
//!
//! Every configured channel gets a feed worker that pushes its messages into
//! the bounded intake queue of a [`feedboard_core::Program`]. The
//! [`Dashboard`] model keeps the last few messages per channel and shows the
//! ones the operator selected.
//!
//! ```text
//! feeds ──┐
//!         ├──► intake queue ──► Dashboard::update ──► render ──► terminal
//! keys ───┘
//! ```

pub mod buffer;
pub mod dashboard;
pub mod feed;
pub mod keymap;
pub mod logging;
pub mod render;
pub mod settings;
pub mod source;

pub use buffer::{BufferStore, ChannelBuffer};
pub use dashboard::{Dashboard, DashboardFlags, Msg};
pub use feed::{Connector, Feed, FeedError, FeedEvent, TwitchConnector};
pub use render::render;
pub use settings::{Settings, SettingsError};
pub use source::SourceId;
