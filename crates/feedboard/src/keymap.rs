use crossterm::event::{KeyCode, KeyEvent};
use feedboard_widgets::{Binding, KeyCombination};

/// What a key press asks the dashboard to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    Toggle,
}

/// Key bindings of the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardKeys {
    pub quit: Binding,
    pub up: Binding,
    pub down: Binding,
    pub toggle: Binding,
}

impl Default for DashboardKeys {
    fn default() -> Self {
        Self {
            quit: Binding::new(
                vec![
                    KeyCombination::new(KeyCode::Char('q')),
                    KeyCombination::ctrl(KeyCode::Char('c')),
                ],
                "q",
                "quit",
            ),
            up: Binding::new(
                vec![
                    KeyCombination::new(KeyCode::Up),
                    KeyCombination::new(KeyCode::Char('k')),
                ],
                "↑/k",
                "up",
            ),
            down: Binding::new(
                vec![
                    KeyCombination::new(KeyCode::Down),
                    KeyCombination::new(KeyCode::Char('j')),
                ],
                "↓/j",
                "down",
            ),
            toggle: Binding::new(
                vec![
                    KeyCombination::new(KeyCode::Enter),
                    KeyCombination::new(KeyCode::Char(' ')),
                ],
                "enter/space",
                "select",
            ),
        }
    }
}

impl DashboardKeys {
    /// The hint shown under the dashboard, e.g. `Press q to quit.`
    pub fn footer(&self) -> String {
        format!("Press {} to {}.", self.quit.label, self.quit.description)
    }

    /// Resolve a key press. Quit wins over everything else.
    pub fn action(&self, key: &KeyEvent) -> Option<Action> {
        [
            (&self.quit, Action::Quit),
            (&self.up, Action::Up),
            (&self.down, Action::Down),
            (&self.toggle, Action::Toggle),
        ]
        .into_iter()
        .find(|(binding, _)| binding.matches(key))
        .map(|(_, action)| action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn resolves_every_binding() {
        let keys = DashboardKeys::default();
        assert_eq!(keys.action(&key(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(
            keys.action(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(keys.action(&key(KeyCode::Up)), Some(Action::Up));
        assert_eq!(keys.action(&key(KeyCode::Char('k'))), Some(Action::Up));
        assert_eq!(keys.action(&key(KeyCode::Down)), Some(Action::Down));
        assert_eq!(keys.action(&key(KeyCode::Char('j'))), Some(Action::Down));
        assert_eq!(keys.action(&key(KeyCode::Enter)), Some(Action::Toggle));
        assert_eq!(keys.action(&key(KeyCode::Char(' '))), Some(Action::Toggle));
    }

    #[test]
    fn footer_names_the_quit_key() {
        let mut keys = DashboardKeys::default();
        assert_eq!(keys.footer(), "Press q to quit.");

        keys.quit.label = "esc".into();
        keys.quit.description = "leave".into();
        assert_eq!(keys.footer(), "Press esc to leave.");
    }

    #[test]
    fn unbound_keys_do_nothing() {
        let keys = DashboardKeys::default();
        assert_eq!(keys.action(&key(KeyCode::Char('c'))), None);
        assert_eq!(keys.action(&key(KeyCode::Esc)), None);
    }
}
