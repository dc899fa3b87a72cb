//! User input delivered to page behaviours.

use super::NodeId;

/// A browser event, reduced to what the page behaviours look at.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Click whose innermost target is `target`
    Click { target: NodeId },
    /// Key press anywhere on the page, named like `KeyboardEvent.key`
    KeyDown { key: String },
    /// Text input changed to `value`
    Input { target: NodeId, value: String },
}

impl PageEvent {
    pub fn click(target: NodeId) -> Self {
        Self::Click { target }
    }

    pub fn key(key: impl Into<String>) -> Self {
        Self::KeyDown { key: key.into() }
    }

    pub fn input(target: NodeId, value: impl Into<String>) -> Self {
        Self::Input {
            target,
            value: value.into(),
        }
    }

    pub fn is_escape(&self) -> bool {
        matches!(self, Self::KeyDown { key } if key == "Escape")
    }
}
