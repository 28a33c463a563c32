/// A side effect returned from [`Model::update`](crate::Model::update) or [`Model::init`](crate::Model::init).
///
/// Commands are handled synchronously by the interaction loop: they never
/// spawn work and never touch the intake queue, so returning one cannot block
/// the single consumer.
///
/// # Examples
///
/// ```rust,ignore
/// // Do nothing:
/// let cmd = Command::none();
///
/// // Feed a follow-up message back into `update` before the next event:
/// let cmd = Command::message(Msg::Refresh);
///
/// // Quit the program:
/// let cmd = Command::quit();
/// ```
pub struct Command<Msg: Send + 'static> {
    pub(crate) inner: CommandInner<Msg>,
}

pub(crate) enum CommandInner<Msg: Send + 'static> {
    None,
    Action(Action<Msg>),
    Batch(Vec<Command<Msg>>),
}

/// Action variants handled immediately by the runtime.
pub enum Action<Msg> {
    /// Deliver a message to `update` ahead of anything still queued.
    Message(Msg),
    /// Quit the program.
    Quit,
}

impl<Msg: Send + 'static> Command<Msg> {
    /// No-op command.
    pub fn none() -> Self {
        Command {
            inner: CommandInner::None,
        }
    }

    /// Send a message immediately.
    pub fn message(msg: Msg) -> Self {
        Command {
            inner: CommandInner::Action(Action::Message(msg)),
        }
    }

    /// Quit the program.
    ///
    /// The runtime cancels every subscription and returns without draining
    /// the intake queue.
    pub fn quit() -> Self {
        Command {
            inner: CommandInner::Action(Action::Quit),
        }
    }

    /// Run multiple commands in order.
    pub fn batch(cmds: impl IntoIterator<Item = Command<Msg>>) -> Self {
        let mut cmds: Vec<_> = cmds
            .into_iter()
            .filter(|cmd| !cmd.is_none())
            .collect();
        match cmds.len() {
            0 => Command::none(),
            1 => cmds.swap_remove(0),
            _ => Command {
                inner: CommandInner::Batch(cmds),
            },
        }
    }

    /// Returns `true` if this is a no-op command.
    pub fn is_none(&self) -> bool {
        matches!(self.inner, CommandInner::None)
    }

    /// Returns `true` if executing this command would quit the program.
    pub fn is_quit(&self) -> bool {
        match &self.inner {
            CommandInner::Action(Action::Quit) => true,
            CommandInner::Batch(cmds) => cmds.iter().any(Command::is_quit),
            _ => false,
        }
    }

    /// Flatten this command into its actions, in execution order.
    pub(crate) fn into_actions(self) -> Vec<Action<Msg>> {
        let mut out = Vec::new();
        self.collect_actions(&mut out);
        out
    }

    fn collect_actions(self, out: &mut Vec<Action<Msg>>) {
        match self.inner {
            CommandInner::None => {}
            CommandInner::Action(action) => out.push(action),
            CommandInner::Batch(cmds) => {
                for cmd in cmds {
                    cmd.collect_actions(out);
                }
            }
        }
    }
}

impl<Msg: Send + 'static> Default for Command<Msg> {
    fn default() -> Self {
        Command::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(cmd: Command<u32>) -> Vec<Option<u32>> {
        cmd.into_actions()
            .into_iter()
            .map(|action| match action {
                Action::Message(m) => Some(m),
                Action::Quit => None,
            })
            .collect()
    }

    #[test]
    fn none_has_no_actions() {
        let cmd = Command::<u32>::none();
        assert!(cmd.is_none());
        assert!(!cmd.is_quit());
        assert!(cmd.into_actions().is_empty());
    }

    #[test]
    fn batch_preserves_order() {
        let cmd = Command::batch([Command::message(1), Command::message(2), Command::quit()]);
        assert!(cmd.is_quit());
        assert_eq!(messages(cmd), vec![Some(1), Some(2), None]);
    }

    #[test]
    fn batch_of_nones_collapses() {
        let cmd = Command::<u32>::batch([Command::none(), Command::none()]);
        assert!(cmd.is_none());
    }

    #[test]
    fn batch_of_one_unwraps() {
        let cmd = Command::batch([Command::none(), Command::message(7)]);
        assert!(matches!(cmd.inner, CommandInner::Action(Action::Message(7))));
    }

    #[test]
    fn nested_batch_flattens() {
        let inner = Command::batch([Command::message(1), Command::message(2)]);
        let cmd = Command::batch([inner, Command::message(3)]);
        assert_eq!(messages(cmd), vec![Some(1), Some(2), Some(3)]);
    }
}
