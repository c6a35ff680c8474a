//! Keyboard keys the page reacts to

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Space,
    Escape,
    ArrowLeft,
    ArrowRight,
    /// Any key the page does not handle, by its DOM `key` value
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Enter" => Key::Enter,
            " " | "Spacebar" => Key::Space,
            "Escape" | "Esc" => Key::Escape,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            other => Key::Other(other.to_string()),
        }
    }

    /// Keys that activate the focused control
    pub fn is_activation(&self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}
