//! Data feeds: one connection per source, each pumped into the intake queue
//! by its own worker task.
//!
//! A [`Feed`] is pulled, not called back: the worker asks for the next
//! message and pushes it into the bounded intake queue, waiting while the
//! queue is full. Cancelling the worker disconnects the feed.

mod twitch;

pub use twitch::{parse_line, IrcMessage, TwitchConnector, TwitchFeed, TWITCH_IRC_ADDR};

use crate::source::SourceId;
use feedboard_core::{Subscription, SubscriptionId};
use futures::future::BoxFuture;

/// Failure reported by a feed. The worker logs it and stops; there is no
/// retry.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("feed is not connected")]
    NotConnected,
}

/// One inbound message attributed to a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEvent {
    pub source: SourceId,
    pub payload: String,
}

impl FeedEvent {
    pub fn new(source: impl Into<SourceId>, payload: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            payload: payload.into(),
        }
    }
}

/// A connection delivering the messages of a single source.
pub trait Feed: Send {
    /// The source every message from this feed is attributed to.
    fn source(&self) -> &SourceId;

    fn connect(&mut self) -> BoxFuture<'_, Result<(), FeedError>>;

    /// Wait for the next message. `Ok(None)` means the feed ended.
    fn next_message(&mut self) -> BoxFuture<'_, Result<Option<String>, FeedError>>;

    /// Best-effort teardown; errors are swallowed.
    fn disconnect(&mut self) -> BoxFuture<'_, ()>;
}

/// Opens feeds for sources.
pub trait Connector: Send + Sync {
    fn open(&self, source: &SourceId) -> Box<dyn Feed>;
}

/// Marker type naming feed worker subscriptions.
pub struct FeedWorker;

/// Wrap a feed in a subscription whose worker connects it, pushes every
/// message into the intake queue, and disconnects on cancellation.
pub fn feed_subscription<Msg: Send + 'static>(
    mut feed: Box<dyn Feed>,
    map: impl Fn(FeedEvent) -> Msg + Send + 'static,
) -> Subscription<Msg> {
    let id = SubscriptionId::with_str::<FeedWorker>(feed.source().as_str());
    Subscription::from_worker(id, move |intake, cancel| {
        Box::pin(async move {
            let source = feed.source().clone();

            let connected = tokio::select! {
                _ = cancel.cancelled() => return,
                res = feed.connect() => res,
            };
            if let Err(err) = connected {
                tracing::warn!(%source, %err, "feed failed to connect");
                return;
            }
            tracing::info!(%source, "feed connected");

            loop {
                let next = tokio::select! {
                    _ = cancel.cancelled() => break,
                    next = feed.next_message() => next,
                };
                let payload = match next {
                    Ok(Some(payload)) => payload,
                    Ok(None) => {
                        tracing::info!(%source, "feed ended");
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(%source, %err, "feed failed");
                        break;
                    }
                };
                let msg = map(FeedEvent {
                    source: source.clone(),
                    payload,
                });
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    sent = intake.push(msg) => if sent.is_err() { break },
                }
            }

            feed.disconnect().await;
            tracing::debug!(%source, "feed disconnected");
        })
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory feeds for tests.

    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Yields a fixed list of messages, then ends or waits forever.
    pub struct ScriptedFeed {
        pub source: SourceId,
        pub messages: std::vec::IntoIter<String>,
        pub hold_open: bool,
        pub disconnects: Arc<AtomicUsize>,
    }

    impl Feed for ScriptedFeed {
        fn source(&self) -> &SourceId {
            &self.source
        }

        fn connect(&mut self) -> BoxFuture<'_, Result<(), FeedError>> {
            Box::pin(async { Ok(()) })
        }

        fn next_message(&mut self) -> BoxFuture<'_, Result<Option<String>, FeedError>> {
            Box::pin(async move {
                match self.messages.next() {
                    Some(msg) => {
                        tokio::task::yield_now().await;
                        Ok(Some(msg))
                    }
                    None if self.hold_open => futures::future::pending().await,
                    None => Ok(None),
                }
            })
        }

        fn disconnect(&mut self) -> BoxFuture<'_, ()> {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {})
        }
    }

    /// Hands out one scripted feed per source; unscripted sources get an
    /// empty feed that stays open.
    #[derive(Default)]
    pub struct ScriptedConnector {
        scripts: Mutex<HashMap<SourceId, Vec<String>>>,
        pub opened: Arc<AtomicUsize>,
        pub disconnects: Arc<AtomicUsize>,
    }

    impl ScriptedConnector {
        pub fn with_script(self, source: &str, messages: &[&str]) -> Self {
            self.scripts.lock().unwrap().insert(
                SourceId::from(source),
                messages.iter().map(|m| m.to_string()).collect(),
            );
            self
        }
    }

    impl Connector for ScriptedConnector {
        fn open(&self, source: &SourceId) -> Box<dyn Feed> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            let messages = self.scripts.lock().unwrap().remove(source).unwrap_or_default();
            Box::new(ScriptedFeed {
                source: source.clone(),
                messages: messages.into_iter(),
                hold_open: true,
                disconnects: self.disconnects.clone(),
            })
        }
    }
}
