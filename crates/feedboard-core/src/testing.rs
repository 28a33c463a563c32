use crate::command::{Action, Command};
use crate::model::Model;
use crate::runtime::{ProgramError, Surface};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};
use std::sync::{Arc, Mutex};

/// A headless test harness that drives a [`Model`] without a terminal or an
/// intake queue.
///
/// `TestProgram` exercises the init/update/view cycle in a plain `#[test]`
/// function.  Messages produced by [`Command::message`] are collected and can
/// be flushed with [`drain_messages`](TestProgram::drain_messages); a
/// [`Command::quit`] sets [`quit_requested`](TestProgram::quit_requested).
///
/// # Example
///
/// ```rust,ignore
/// use feedboard_core::testing::TestProgram;
///
/// let mut prog = TestProgram::<Counter>::new(0);
/// prog.send(CounterMsg::Increment);
/// assert_eq!(prog.model().count, 1);
///
/// let output = prog.render_string(40, 1);
/// assert!(output.contains("Count: 1"));
/// ```
pub struct TestProgram<M: Model> {
    model: M,
    pending_messages: Vec<M::Message>,
    quit_requested: bool,
}

impl<M: Model> TestProgram<M> {
    /// Create a test program by calling [`Model::init`] with the given flags.
    ///
    /// Subscriptions are never started.
    pub fn new(flags: M::Flags) -> Self {
        let (model, init_cmd) = M::init(flags);
        let mut program = Self {
            model,
            pending_messages: Vec::new(),
            quit_requested: false,
        };
        program.collect(init_cmd);
        program
    }

    /// Send a message, triggering a single update cycle.
    pub fn send(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.collect(cmd);
    }

    /// Process all pending messages produced by [`Command::message`], until
    /// no new ones are generated.
    pub fn drain_messages(&mut self) {
        while !self.pending_messages.is_empty() {
            let messages: Vec<_> = self.pending_messages.drain(..).collect();
            for msg in messages {
                let cmd = self.model.update(msg);
                self.collect(cmd);
            }
        }
    }

    /// Whether any update so far returned [`Command::quit`].
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Get a shared reference to the model for assertions.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Render the model to a ratatui [`Buffer`] of the given dimensions.
    pub fn render(&self, width: u16, height: u16) -> Buffer {
        let mut terminal = test_terminal(width, height);
        terminal
            .draw(|frame| {
                self.model.view(frame);
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    /// Render the model and return the visible content as a plain string,
    /// one buffer row per line.
    pub fn render_string(&self, width: u16, height: u16) -> String {
        buffer_to_string(&self.render(width, height))
    }

    fn collect(&mut self, cmd: Command<M::Message>) {
        for action in cmd.into_actions() {
            match action {
                Action::Message(msg) => self.pending_messages.push(msg),
                Action::Quit => self.quit_requested = true,
            }
        }
    }
}

/// A [`Surface`] that draws into ratatui's [`TestBackend`] and records every
/// frame as text.
///
/// Use it to run a real [`Program`](crate::Program) loop in tests.
pub struct HeadlessSurface {
    terminal: Terminal<TestBackend>,
    log: FrameLog,
}

impl HeadlessSurface {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            terminal: test_terminal(width, height),
            log: FrameLog::default(),
        }
    }

    /// A handle to the recorded frames that stays valid after the surface
    /// has been moved into a program.
    pub fn log(&self) -> FrameLog {
        self.log.clone()
    }
}

impl Surface for HeadlessSurface {
    fn draw(&mut self, view: &mut dyn FnMut(&mut Frame)) -> Result<(), ProgramError> {
        self.terminal.draw(|frame| view(frame)).unwrap();
        let text = buffer_to_string(self.terminal.backend().buffer());
        self.log.push(text);
        Ok(())
    }
}

/// Frames recorded by a [`HeadlessSurface`].
#[derive(Clone, Default)]
pub struct FrameLog {
    frames: Arc<Mutex<Vec<String>>>,
}

impl FrameLog {
    fn push(&self, frame: String) {
        self.frames.lock().unwrap().push(frame);
    }

    /// Number of frames drawn so far.
    pub fn len(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most recent frame.
    pub fn last(&self) -> Option<String> {
        self.frames.lock().unwrap().last().cloned()
    }
}

fn test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(width, height)).unwrap()
}

fn buffer_to_string(buf: &Buffer) -> String {
    let area: Rect = buf.area;
    let mut output = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            output.push_str(buf[(x, y)].symbol());
        }
        if y + 1 < area.bottom() {
            output.push('\n');
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Paragraph;

    struct Counter {
        count: i64,
    }

    #[derive(Debug)]
    enum CounterMsg {
        Increment,
        Decrement,
        Twice,
        Quit,
    }

    impl Model for Counter {
        type Message = CounterMsg;
        type Flags = i64;

        fn init(initial: i64) -> (Self, Command<CounterMsg>) {
            (Counter { count: initial }, Command::none())
        }

        fn update(&mut self, msg: CounterMsg) -> Command<CounterMsg> {
            match msg {
                CounterMsg::Increment => self.count += 1,
                CounterMsg::Decrement => self.count -= 1,
                CounterMsg::Twice => {
                    return Command::batch([
                        Command::message(CounterMsg::Increment),
                        Command::message(CounterMsg::Increment),
                    ])
                }
                CounterMsg::Quit => return Command::quit(),
            }
            Command::none()
        }

        fn view(&self, frame: &mut Frame) {
            let text = format!("Count: {}", self.count);
            frame.render_widget(Paragraph::new(text), frame.area());
        }
    }

    #[test]
    fn test_program_init_with_flags() {
        let prog = TestProgram::<Counter>::new(42);
        assert_eq!(prog.model().count, 42);
    }

    #[test]
    fn test_program_send_multiple() {
        let mut prog = TestProgram::<Counter>::new(0);
        prog.send(CounterMsg::Increment);
        prog.send(CounterMsg::Increment);
        prog.send(CounterMsg::Increment);
        prog.send(CounterMsg::Decrement);
        assert_eq!(prog.model().count, 2);
    }

    #[test]
    fn test_program_render_after_update() {
        let mut prog = TestProgram::<Counter>::new(0);
        prog.send(CounterMsg::Decrement);
        let content = prog.render_string(40, 1);
        assert!(content.contains("Count: -1"));
    }

    #[test]
    fn test_command_message_chaining() {
        let mut prog = TestProgram::<Counter>::new(0);
        prog.send(CounterMsg::Twice);
        assert_eq!(prog.model().count, 0);
        prog.drain_messages();
        assert_eq!(prog.model().count, 2);
    }

    #[test]
    fn test_quit_is_recorded() {
        let mut prog = TestProgram::<Counter>::new(0);
        assert!(!prog.quit_requested());
        prog.send(CounterMsg::Quit);
        assert!(prog.quit_requested());
    }

    #[test]
    fn headless_surface_records_frames() {
        let mut surface = HeadlessSurface::new(20, 2);
        let log = surface.log();
        assert!(log.is_empty());

        let model = Counter { count: 3 };
        surface.draw(&mut |frame| model.view(frame)).unwrap();
        assert_eq!(log.len(), 1);
        let frame = log.last().unwrap();
        assert_eq!(frame.lines().count(), 2);
        assert!(frame.starts_with("Count: 3"));
    }
}
