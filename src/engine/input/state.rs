// Held-input state shared between the event handler and the frame step

use super::action::InputSource;
use std::collections::HashSet;

/// The set of input sources currently held down.
///
/// Written by the event handler as press/release events arrive and read
/// once per frame by the match step. Sources that were never pressed read
/// as "not held", so unknown keys need no special handling.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<InputSource>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a source as held
    pub fn press(&mut self, source: InputSource) {
        self.held.insert(source);
    }

    /// Mark a source as released
    pub fn release(&mut self, source: InputSource) {
        self.held.remove(&source);
    }

    /// Check if a source is currently held
    pub fn is_held(&self, source: InputSource) -> bool {
        self.held.contains(&source)
    }

    /// Number of sources currently held
    #[cfg(test)]
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Release everything (e.g. when the window loses focus)
    pub fn clear(&mut self) {
        self.held.clear();
    }
}
