use serde::{Deserialize, Serialize};

/// Whether a key went down or came back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    Down,
    Up,
}

/// A single transition from the host's keyboard stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub action: KeyAction,
    /// Key identifier, lowercased (`"w"`, `"arrowup"`, `" "`).
    pub key: String,
}

impl KeyEvent {
    pub fn down(key: &str) -> Self {
        Self {
            action: KeyAction::Down,
            key: key.to_lowercase(),
        }
    }

    pub fn up(key: &str) -> Self {
        Self {
            action: KeyAction::Up,
            key: key.to_lowercase(),
        }
    }

    pub fn is_down(&self) -> bool {
        self.action == KeyAction::Down
    }
}
