//! Bounded, ordered hand-off between asynchronous producers and the single
//! consumer that drives a [`Model`](crate::Model).
//!
//! Every producer (terminal input, each data feed, external
//! [`ProgramHandle`](crate::ProgramHandle)s) owns an [`IntakeSender`] clone.
//! The runtime owns the only [`IntakeReceiver`]. When the queue is full,
//! [`IntakeSender::push`] waits for room instead of dropping the message.

use tokio::sync::mpsc;

/// Smallest queue capacity [`intake`] will create.
pub const MIN_INTAKE_CAPACITY: usize = 100;

/// Returned by [`IntakeSender::push`] once the receiving side is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("intake queue closed")]
pub struct IntakeClosed;

/// Create a bounded intake queue.
///
/// `capacity` is raised to [`MIN_INTAKE_CAPACITY`] if smaller.
pub fn intake<Msg: Send + 'static>(capacity: usize) -> (IntakeSender<Msg>, IntakeReceiver<Msg>) {
    let capacity = capacity.max(MIN_INTAKE_CAPACITY);
    let (tx, rx) = mpsc::channel(capacity);
    (
        IntakeSender { tx },
        IntakeReceiver {
            rx,
            next_seq: 0,
            capacity,
        },
    )
}

/// Producer half of the intake queue. Cheap to clone.
pub struct IntakeSender<Msg> {
    tx: mpsc::Sender<Msg>,
}

impl<Msg> Clone for IntakeSender<Msg> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<Msg: Send + 'static> IntakeSender<Msg> {
    /// Enqueue a message, waiting while the queue is full.
    pub async fn push(&self, msg: Msg) -> Result<(), IntakeClosed> {
        self.tx.send(msg).await.map_err(|_| IntakeClosed)
    }

    /// Returns `true` once the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A dequeued message stamped with its position in the arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival<Msg> {
    /// Zero-based, strictly increasing across the lifetime of the receiver.
    pub seq: u64,
    pub msg: Msg,
}

/// Consumer half of the intake queue.
pub struct IntakeReceiver<Msg> {
    rx: mpsc::Receiver<Msg>,
    next_seq: u64,
    capacity: usize,
}

impl<Msg: Send + 'static> IntakeReceiver<Msg> {
    /// Wait for the next message.
    ///
    /// Returns `None` only when every sender has been dropped and the queue
    /// is empty.
    pub async fn recv(&mut self) -> Option<Arrival<Msg>> {
        let msg = self.rx.recv().await?;
        let seq = self.next_seq;
        self.next_seq += 1;
        Some(Arrival { seq, msg })
    }

    /// Number of messages waiting in the queue.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns `true` if no messages are waiting.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// The bound this queue was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
