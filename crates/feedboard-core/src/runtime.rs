use crate::command::{Action, Command};
use crate::intake::{intake, IntakeClosed, IntakeReceiver, IntakeSender, MIN_INTAKE_CAPACITY};
use crate::model::Model;
use crate::subscription::SubscriptionManager;
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::collections::VecDeque;
use std::io::{self, stdout, Stdout, Write};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Errors that can occur while initializing or running a [`Program`].
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// An I/O error from terminal setup, rendering, or teardown.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration options for a [`Program`].
///
/// Use struct update syntax to override only the options you need:
///
/// ```rust,ignore
/// let opts = ProgramOptions {
///     title: Some("feedboard".into()),
///     ..ProgramOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ProgramOptions {
    /// Start in alternate screen (default: true).
    pub alt_screen: bool,
    /// Set terminal title.
    pub title: Option<String>,
    /// Whether to catch panics and restore terminal (default: true).
    pub catch_panics: bool,
    /// Whether SIGINT ends the loop (default: true).
    pub handle_signals: bool,
    /// Bound of the intake queue; raised to [`MIN_INTAKE_CAPACITY`] if lower.
    pub intake_capacity: usize,
    /// How long [`Program::run`] waits for cancelled subscriptions to finish
    /// their teardown before aborting them (default: 500ms).
    pub shutdown_grace: Duration,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            alt_screen: true,
            title: None,
            catch_panics: true,
            handle_signals: true,
            intake_capacity: MIN_INTAKE_CAPACITY,
            shutdown_grace: Duration::from_millis(500),
        }
    }
}

/// Where frames go.
///
/// The loop always hands over a complete frame; a surface never sees partial
/// updates.
pub trait Surface {
    /// Draw one full frame.
    fn draw(&mut self, view: &mut dyn FnMut(&mut Frame)) -> Result<(), ProgramError>;

    /// Give the output device back. Called once after the loop ends.
    fn restore(&mut self) -> Result<(), ProgramError> {
        Ok(())
    }
}

/// A [`Surface`] backed by the real terminal via crossterm.
///
/// Creating one enables raw mode, enters the alternate screen (if enabled)
/// and hides the cursor. The terminal is restored by [`Surface::restore`],
/// on drop, or from the panic hook.
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    alt_screen: bool,
    restored: bool,
}

impl TerminalSurface {
    /// Take over the terminal.
    pub fn new(options: &ProgramOptions) -> Result<Self, ProgramError> {
        let terminal = init_terminal(options)?;
        Ok(Self {
            terminal,
            alt_screen: options.alt_screen,
            restored: false,
        })
    }
}

impl Surface for TerminalSurface {
    fn draw(&mut self, view: &mut dyn FnMut(&mut Frame)) -> Result<(), ProgramError> {
        self.terminal.draw(|frame| view(frame))?;
        Ok(())
    }

    fn restore(&mut self) -> Result<(), ProgramError> {
        if !self.restored {
            self.restored = true;
            restore_terminal(self.alt_screen)?;
        }
        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        if !self.restored {
            let _ = restore_terminal(self.alt_screen);
        }
    }
}

/// A cloneable handle to a running [`Program`] for external control.
///
/// `ProgramHandle` can be sent across threads or into async tasks.  It
/// provides two capabilities:
///
/// * [`send`](ProgramHandle::send) -- push a message into the intake queue
///   like any other producer, waiting while the queue is full.
/// * [`kill`](ProgramHandle::kill) -- force the program to exit.
///
/// Obtain a handle by calling [`Program::handle`] before entering the run
/// loop.
pub struct ProgramHandle<Msg: Send + 'static> {
    sender: IntakeSender<Msg>,
    killed: CancellationToken,
}

impl<Msg: Send + 'static> Clone for ProgramHandle<Msg> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            killed: self.killed.clone(),
        }
    }
}

impl<Msg: Send + 'static> ProgramHandle<Msg> {
    /// Send a message to the program.
    ///
    /// Errors once the program has exited and its queue is gone.
    pub async fn send(&self, msg: Msg) -> Result<(), IntakeClosed> {
        self.sender.push(msg).await
    }

    /// Force-kill the program.
    ///
    /// The loop exits at its next wake-up without processing remaining
    /// messages.
    pub fn kill(&self) {
        self.killed.cancel();
    }
}

/// The interaction loop.
///
/// `Program` owns the [`Model`], the only receiver of the intake queue, and
/// the subscriptions feeding it. [`run`](Program::run) waits for one message
/// at a time, applies it with [`Model::update`], and draws a fresh frame.
/// There is no timer: when nothing arrives, the loop sleeps.
///
/// # Example
///
/// ```rust,ignore
/// use feedboard_core::{Program, ProgramError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), ProgramError> {
///     let model = Program::<MyApp>::new(())?.run().await?;
///     Ok(())
/// }
/// ```
pub struct Program<M: Model, S: Surface = TerminalSurface> {
    model: M,
    surface: S,
    intake: IntakeReceiver<M::Message>,
    sender: IntakeSender<M::Message>,
    pending: VecDeque<M::Message>,
    subscription_manager: SubscriptionManager<M::Message>,
    subscriptions_version: Option<u64>,
    options: ProgramOptions,
    should_quit: bool,
    killed: CancellationToken,
}

impl<M: Model> Program<M> {
    /// Create a new program on the real terminal with default options.
    ///
    /// Returns an error if terminal initialization fails. Must be called from
    /// within a tokio runtime.
    pub fn new(flags: M::Flags) -> Result<Self, ProgramError> {
        Self::with_options(flags, ProgramOptions::default())
    }

    /// Create a new program on the real terminal with custom options.
    pub fn with_options(flags: M::Flags, options: ProgramOptions) -> Result<Self, ProgramError> {
        let surface = TerminalSurface::new(&options)?;
        Ok(Program::with_surface(flags, surface, options))
    }
}

impl<M: Model, S: Surface> Program<M, S> {
    /// Create a program drawing to an arbitrary [`Surface`].
    ///
    /// Subscriptions declared by the initial model are started immediately
    /// and may begin filling the intake queue before [`run`](Program::run).
    pub fn with_surface(flags: M::Flags, surface: S, options: ProgramOptions) -> Self {
        let (sender, intake) = intake(options.intake_capacity);
        let (model, init_cmd) = M::init(flags);
        let subscription_manager = SubscriptionManager::new(sender.clone());

        let mut program = Self {
            model,
            surface,
            intake,
            sender,
            pending: VecDeque::new(),
            subscription_manager,
            subscriptions_version: None,
            options,
            should_quit: false,
            killed: CancellationToken::new(),
        };

        tracing::debug!(capacity = program.intake.capacity(), "program initialized");
        program.execute_command(init_cmd);

        program.reconcile_subscriptions();

        program
    }

    /// Get a handle for external control (send messages, force-kill).
    pub fn handle(&self) -> ProgramHandle<M::Message> {
        ProgramHandle {
            sender: self.sender.clone(),
            killed: self.killed.clone(),
        }
    }

    /// Shared reference to the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run the loop until quit. Returns the final model.
    ///
    /// On exit every subscription is cancelled and the surface restored.
    /// Workers then get [`ProgramOptions::shutdown_grace`] to finish their
    /// teardown. Messages still waiting in the intake queue are dropped
    /// unprocessed.
    pub async fn run(mut self) -> Result<M, ProgramError> {
        let result = self.event_loop().await;

        tracing::debug!(
            residual = self.intake.len(),
            subscriptions = self.subscription_manager.active_count(),
            "shutting down"
        );
        self.subscription_manager.shutdown();
        let restored = self.surface.restore();
        self.subscription_manager
            .wait_stopped(self.options.shutdown_grace)
            .await;

        result?;
        restored?;
        Ok(self.model)
    }

    async fn event_loop(&mut self) -> Result<(), ProgramError> {
        // Messages queued by the init command.
        self.drain_pending();
        if self.should_quit {
            return Ok(());
        }
        self.render()?;

        let handle_signals = self.options.handle_signals;

        loop {
            tokio::select! {
                biased;

                _ = self.killed.cancelled() => {
                    tracing::debug!("program killed");
                    return Ok(());
                }

                _ = tokio::signal::ctrl_c(), if handle_signals => {
                    tracing::debug!("received ctrl+c signal");
                    return Ok(());
                }

                arrival = self.intake.recv() => {
                    let Some(arrival) = arrival else {
                        return Ok(());
                    };
                    tracing::trace!(seq = arrival.seq, "dequeued");
                    self.process_message(arrival.msg);

                    if self.should_quit {
                        return Ok(());
                    }
                    self.render()?;
                }
            }
        }
    }

    fn process_message(&mut self, msg: M::Message) {
        self.pending.push_back(msg);
        self.drain_pending();

        if !self.should_quit {
            self.reconcile_subscriptions();
        }
    }

    /// Re-declare subscriptions unless the model reports the same version as
    /// last time.
    fn reconcile_subscriptions(&mut self) {
        let version = self.model.subscriptions_version();
        if version.is_some() && version == self.subscriptions_version {
            return;
        }
        let subs = self.model.subscriptions();
        self.subscription_manager.reconcile(subs);
        self.subscriptions_version = version;
    }

    /// Apply `pending` messages in order, including any queued by the
    /// commands they return. Stops at the first quit.
    fn drain_pending(&mut self) {
        while let Some(msg) = self.pending.pop_front() {
            let cmd = self.model.update(msg);
            self.execute_command(cmd);
            if self.should_quit {
                self.pending.clear();
                return;
            }
        }
    }

    fn execute_command(&mut self, cmd: Command<M::Message>) {
        for action in cmd.into_actions() {
            match action {
                Action::Message(msg) => self.pending.push_back(msg),
                Action::Quit => {
                    tracing::debug!("quit requested");
                    self.should_quit = true;
                }
            }
        }
    }

    fn render(&mut self) -> Result<(), ProgramError> {
        let Self { model, surface, .. } = self;
        surface.draw(&mut |frame| model.view(frame))
    }
}

fn init_terminal(options: &ProgramOptions) -> Result<Terminal<CrosstermBackend<Stdout>>, ProgramError> {
    // Install panic hook that restores terminal (only once to avoid stacking)
    if options.catch_panics {
        use std::sync::Once;
        static HOOK_INSTALLED: Once = Once::new();
        let alt_screen = options.alt_screen;
        HOOK_INSTALLED.call_once(|| {
            let original_hook = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                let _ = restore_terminal(alt_screen);
                original_hook(info);
            }));
        });
    }

    enable_raw_mode()?;
    let alt_screen = options.alt_screen;
    undo_on_error(
        || -> Result<_, ProgramError> {
            let mut writer = stdout();
            enter_screen(&mut writer, options)?;
            Ok(Terminal::new(CrosstermBackend::new(writer))?)
        },
        || {
            let _ = restore_terminal(alt_screen);
        },
    )
}

fn enter_screen(writer: &mut impl Write, options: &ProgramOptions) -> io::Result<()> {
    if options.alt_screen {
        execute!(writer, EnterAlternateScreen)?;
    }
    if let Some(ref title) = options.title {
        execute!(writer, SetTitle(title))?;
    }
    execute!(writer, cursor::Hide)
}

/// Run `setup`; if it fails, run `undo` before handing back the error.
fn undo_on_error<T, E>(setup: impl FnOnce() -> Result<T, E>, undo: impl FnOnce()) -> Result<T, E> {
    let result = setup();
    if result.is_err() {
        undo();
    }
    result
}

fn restore_terminal(alt_screen: bool) -> Result<(), io::Error> {
    // Best-effort: keep going after individual failures and report raw mode,
    // the one that leaves the shell unusable.
    let r1 = disable_raw_mode();
    let mut writer = stdout();
    execute!(writer, cursor::Show).ok();
    if alt_screen {
        execute!(writer, LeaveAlternateScreen).ok();
    }
    r1
}
