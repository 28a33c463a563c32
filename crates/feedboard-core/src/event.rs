use crossterm::event::{Event, KeyEvent, KeyEventKind};

/// Terminal input delivered to the interaction loop.
///
/// Produced by the [`terminal_events`](crate::subscriptions::terminal_events)
/// subscription, which hands each event to a mapping function that converts
/// it into the application's `Message` type.
///
/// Only key presses and resizes are surfaced. Key releases and repeats
/// (reported on some platforms), mouse, focus and paste events are dropped at
/// the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// A key press.
    Key(KeyEvent),
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
}

impl TerminalEvent {
    /// Convert a raw crossterm event, discarding anything the dashboard does
    /// not react to.
    pub fn from_crossterm(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(TerminalEvent::Key(key)),
            Event::Resize(w, h) => Some(TerminalEvent::Resize(w, h)),
            _ => None,
        }
    }
}
