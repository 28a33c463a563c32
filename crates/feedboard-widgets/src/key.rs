//! Key binding definitions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A key binding that maps one or more key combinations to a described action.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The set of key combinations that trigger this binding.
    pub keys: Vec<KeyCombination>,
    /// Short label shown in help text, e.g. `"q"`.
    pub label: String,
    /// A human-readable description of the action this binding performs.
    pub description: String,
}

/// A single key press with optional modifier keys (Ctrl, Alt, Shift).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombination {
    /// The base key code (e.g. a character or arrow key).
    pub code: KeyCode,
    /// Modifier keys that must be held alongside the base key.
    pub modifiers: KeyModifiers,
}

impl Binding {
    /// Create a binding for several key combinations.
    pub fn new(
        keys: Vec<KeyCombination>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            keys,
            label: label.into(),
            description: description.into(),
        }
    }

    /// Return whether the given key event matches any of this binding's key
    /// combinations. Extra modifiers on the event are tolerated.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys
            .iter()
            .any(|k| k.code == event.code && event.modifiers.contains(k.modifiers))
    }
}

impl KeyCombination {
    /// Create a key combination with no modifier keys.
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Create a key combination with the Ctrl modifier.
    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn matches_any_listed_key() {
        let b = Binding::new(
            vec![KeyCombination::new(KeyCode::Up), KeyCombination::new(KeyCode::Char('k'))],
            "↑/k",
            "up",
        );
        assert!(b.matches(&press(KeyCode::Up, KeyModifiers::NONE)));
        assert!(b.matches(&press(KeyCode::Char('k'), KeyModifiers::NONE)));
        assert!(!b.matches(&press(KeyCode::Down, KeyModifiers::NONE)));
    }

    #[test]
    fn ctrl_binding_requires_ctrl() {
        let b = Binding::new(vec![KeyCombination::ctrl(KeyCode::Char('c'))], "ctrl+c", "quit");
        assert!(b.matches(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!b.matches(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
    }
}
