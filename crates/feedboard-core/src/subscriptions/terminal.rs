use crate::event::TerminalEvent;
use crate::subscription::{Subscription, SubscriptionId};
use crossterm::event::EventStream;
use futures::StreamExt;

/// Marker type naming the terminal input subscription.
///
/// # Input TTY behavior
///
/// crossterm's `EventStream::new()` opens `/dev/tty` when stdin is not a TTY,
/// so key presses still arrive when stdin is redirected.
pub struct TerminalEvents;

/// Create a terminal events subscription that maps each event through a
/// user-provided function.
///
/// The `map` closure receives every [`TerminalEvent`] and returns `Some(Msg)`
/// to forward it into the intake queue or `None` to discard it. The first read
/// error from the terminal ends the subscription.
///
/// # Example
///
/// ```rust,ignore
/// fn subscriptions(&self) -> Vec<Subscription<Msg>> {
///     vec![terminal_events(|event| match event {
///         TerminalEvent::Key(key) => Some(Msg::Key(key)),
///         TerminalEvent::Resize(..) => Some(Msg::Resize),
///     })]
/// }
/// ```
pub fn terminal_events<Msg: Send + 'static>(
    map: impl Fn(TerminalEvent) -> Option<Msg> + Send + Sync + 'static,
) -> Subscription<Msg> {
    // EventStream is created inside the spawned task, not here: building one
    // on every subscriptions() call would poke crossterm's global reader while
    // the live stream is polling it.
    Subscription::from_stream(SubscriptionId::of::<TerminalEvents>(), move || {
        EventStream::new()
            .take_while(|result| {
                if let Err(err) = result {
                    tracing::warn!(%err, "terminal read error, input stopped");
                }
                futures::future::ready(result.is_ok())
            })
            .filter_map(move |result| {
                let msg = result
                    .ok()
                    .and_then(TerminalEvent::from_crossterm)
                    .and_then(&map);
                futures::future::ready(msg)
            })
            .boxed()
    })
}
