//! Core runtime for **feedboard**.
//!
//! `feedboard-core` connects any number of asynchronous producers to one
//! single-threaded consumer.  The consumer owns all application state, so
//! nothing the producers do needs a lock.
//!
//! # Key types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Model`] | Application trait (init / update / view / subscriptions) |
//! | [`Command`] | Synchronous follow-up returned from `update` (message, quit) |
//! | [`intake()`] | Bounded, ordered queue between producers and the consumer |
//! | [`Subscription`] | Runtime-managed producer task (terminal input, data feeds) |
//! | [`Program`] | The interaction loop: dequeue, update, draw |
//! | [`TestProgram`](testing::TestProgram) | Drives a [`Model`] synchronously in tests |
//!
//! # Flow
//!
//! 1. **init** -- [`Model::init`] builds the state; the runtime starts the
//!    producers returned by [`Model::subscriptions`].
//! 2. **produce** -- each producer pushes into the intake queue from its own
//!    task, waiting when the queue is full.
//! 3. **update** -- the loop dequeues exactly one message and hands it to
//!    [`Model::update`].
//! 4. **view** -- [`Model::view`] draws one complete frame.
//! 5. **repeat** -- until `update` returns [`Command::quit`]; the runtime
//!    then cancels every producer and drops whatever is still queued.

pub mod command;
pub mod event;
pub mod intake;
pub mod model;
pub mod runtime;
pub mod subscription;
pub mod subscriptions;
pub mod testing;

pub use command::Command;
pub use event::TerminalEvent;
pub use intake::{intake, Arrival, IntakeClosed, IntakeReceiver, IntakeSender, MIN_INTAKE_CAPACITY};
pub use model::Model;
pub use runtime::{Program, ProgramError, ProgramHandle, ProgramOptions, Surface, TerminalSurface};
pub use subscription::{Subscription, SubscriptionId};
pub use subscriptions::{terminal_events, TerminalEvents};

pub use tokio_util::sync::CancellationToken;

/// Run a model on the real terminal with default options.
pub async fn run<M: Model>(flags: M::Flags) -> Result<M, ProgramError> {
    Program::<M>::new(flags)?.run().await
}

/// Run with custom options.
pub async fn run_with<M: Model>(
    flags: M::Flags,
    options: ProgramOptions,
) -> Result<M, ProgramError> {
    Program::<M>::with_options(flags, options)?.run().await
}
