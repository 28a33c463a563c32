use crate::command::Command;
use crate::subscription::Subscription;
use ratatui::Frame;

/// The application state driven by the interaction loop.
///
/// The runtime runs a continuous **init -> update -> view** cycle:
///
/// 1. [`init`](Model::init) creates the initial state and may return a
///    [`Command`].
/// 2. [`view`](Model::view) draws the current state as one full frame.
/// 3. Producers declared by [`subscriptions`](Model::subscriptions) push
///    messages into the bounded intake queue.
/// 4. [`update`](Model::update) receives exactly one message at a time on the
///    single consumer, mutates state, and returns a [`Command`].
/// 5. Steps 2--4 repeat until a [`Command::quit`] is returned.
///
/// Only `update` mutates the model, so producers never need locks around it.
///
/// # Example
///
/// ```rust,ignore
/// use feedboard_core::{Model, Command};
/// use ratatui::Frame;
/// use ratatui::widgets::Paragraph;
///
/// struct Counter {
///     count: i32,
/// }
///
/// enum Msg {
///     Increment,
///     Quit,
/// }
///
/// impl Model for Counter {
///     type Message = Msg;
///     type Flags = ();
///
///     fn init(_flags: ()) -> (Self, Command<Msg>) {
///         (Counter { count: 0 }, Command::none())
///     }
///
///     fn update(&mut self, msg: Msg) -> Command<Msg> {
///         match msg {
///             Msg::Increment => self.count += 1,
///             Msg::Quit => return Command::quit(),
///         }
///         Command::none()
///     }
///
///     fn view(&self, frame: &mut Frame) {
///         frame.render_widget(
///             Paragraph::new(format!("Count: {}", self.count)),
///             frame.area(),
///         );
///     }
/// }
/// ```
pub trait Model: Sized + Send + 'static {
    /// Every event that can affect the application state: terminal input and
    /// data from producers alike.
    type Message: Send + 'static;

    /// Initialization data passed to [`Model::init`].
    type Flags: Send + 'static;

    /// Create the initial model state and an optional startup command.
    fn init(flags: Self::Flags) -> (Self, Command<Self::Message>);

    /// Process one message, mutate state, and return a command.
    ///
    /// After `update` returns, the runtime redraws and calls
    /// [`subscriptions`](Model::subscriptions) to reconcile producers.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render the current state to a ratatui [`Frame`].
    ///
    /// Must be a pure function of `&self`.
    fn view(&self, frame: &mut Frame);

    /// Declare active producers.  Called after every update unless
    /// [`subscriptions_version`](Model::subscriptions_version) says nothing
    /// changed.
    ///
    /// The runtime diffs the returned list against the previously active set
    /// by [`SubscriptionId`](crate::SubscriptionId): new ones are started,
    /// missing ones are cancelled, unchanged ones keep running.
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }

    /// Version of the subscription set.
    ///
    /// While this returns the same `Some` value as at the last reconcile, the
    /// runtime does not call [`subscriptions`](Model::subscriptions) again.
    /// `None` (the default) re-declares after every update.
    fn subscriptions_version(&self) -> Option<u64> {
        None
    }
}
