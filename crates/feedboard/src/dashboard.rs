//! The dashboard model: channel selection plus the last messages of every
//! channel.

use crate::buffer::BufferStore;
use crate::feed::{feed_subscription, Connector, FeedEvent};
use crate::keymap::{Action, DashboardKeys};
use crate::render::render;
use crate::source::SourceId;
use crossterm::event::KeyEvent;
use feedboard_core::{terminal_events, Command, Model, Subscription, TerminalEvent};
use feedboard_widgets::MultiSelection;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Key(KeyEvent),
    Feed(FeedEvent),
    Resize,
}

pub struct DashboardFlags {
    pub sources: Vec<SourceId>,
    pub buffer_capacity: usize,
    pub connector: Arc<dyn Connector>,
    /// Subscribe to terminal input. Off in tests that feed keys by hand.
    pub terminal_input: bool,
}

pub struct Dashboard {
    sources: Vec<SourceId>,
    selection: MultiSelection,
    buffers: BufferStore,
    keys: DashboardKeys,
    footer: String,
    connector: Arc<dyn Connector>,
    terminal_input: bool,
    dropped: u64,
}

impl Dashboard {
    pub fn selection(&self) -> &MultiSelection {
        &self.selection
    }

    pub fn buffers(&self) -> &BufferStore {
        &self.buffers
    }

    /// Feed events that named a source outside the configured list.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// The current frame as text.
    pub fn frame(&self) -> String {
        render(&self.sources, &self.selection, &self.buffers, &self.footer)
    }

    fn on_key(&mut self, key: &KeyEvent) -> Command<Msg> {
        match self.keys.action(key) {
            Some(Action::Quit) => {
                tracing::debug!("quit requested");
                return Command::quit();
            }
            Some(Action::Up) => self.selection.move_up(),
            Some(Action::Down) => self.selection.move_down(),
            Some(Action::Toggle) => self.selection.toggle(),
            None => {}
        }
        Command::none()
    }

    fn on_feed(&mut self, event: FeedEvent) {
        if !self.buffers.append(&event.source, event.payload) {
            self.dropped += 1;
            tracing::debug!(source = %event.source, "event for unknown source ignored");
        }
    }
}

impl Model for Dashboard {
    type Message = Msg;
    type Flags = DashboardFlags;

    fn init(flags: DashboardFlags) -> (Self, Command<Msg>) {
        let buffers = BufferStore::new(&flags.sources, flags.buffer_capacity);
        let keys = DashboardKeys::default();
        let dashboard = Dashboard {
            selection: MultiSelection::new(flags.sources.len()),
            sources: flags.sources,
            buffers,
            footer: keys.footer(),
            keys,
            connector: flags.connector,
            terminal_input: flags.terminal_input,
            dropped: 0,
        };
        (dashboard, Command::none())
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Key(key) => self.on_key(&key),
            Msg::Feed(event) => {
                self.on_feed(event);
                Command::none()
            }
            Msg::Resize => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        frame.render_widget(Paragraph::new(self.frame()), frame.area());
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        let mut subs = Vec::with_capacity(self.sources.len() + 1);
        if self.terminal_input {
            subs.push(terminal_events(|event| match event {
                TerminalEvent::Key(key) => Some(Msg::Key(key)),
                TerminalEvent::Resize(..) => Some(Msg::Resize),
            }));
        }
        subs.extend(
            self.sources
                .iter()
                .map(|source| feed_subscription(self.connector.open(source), Msg::Feed)),
        );
        subs
    }

    /// The channel list and input mode never change after startup.
    fn subscriptions_version(&self) -> Option<u64> {
        Some(0)
    }
}
