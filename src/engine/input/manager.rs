// Input manager - folds window events into the shared input state

use super::action::{global_bindings, Action, InputSource};
use super::config::InputConfig;
use super::state::InputState;
use crate::core::Rect;
use crate::engine::renderer::Camera;
use glam::Vec2;
use winit::event::{ElementState, KeyEvent, MouseButton};
use winit::keyboard::PhysicalKey;

/// Main input manager that owns the held-input state
pub struct InputManager {
    /// Held keys and buttons, read by the match step each frame
    state: InputState,

    /// Bindings that are not tied to a fighter
    global_config: InputConfig,

    /// Last known cursor position in surface pixels
    cursor: Option<Vec2>,

    /// Restart key went down since the last request check
    restart_key_pressed: bool,

    /// Cursor position at the last left-button press not yet checked
    pending_click: Option<Vec2>,
}

impl InputManager {
    /// Create a new input manager
    pub fn new() -> Self {
        Self {
            state: InputState::new(),
            global_config: InputConfig::from_bindings(global_bindings()),
            cursor: None,
            restart_key_pressed: false,
            pending_click: None,
        }
    }

    /// Process a keyboard event from winit
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        self.process_key(event.physical_key, event.state, event.repeat);
    }

    /// Process a key press or release
    pub fn process_key(&mut self, key: PhysicalKey, state: ElementState, repeat: bool) {
        // Keys without a known code never enter the state
        let PhysicalKey::Code(key_code) = key else {
            return;
        };
        let source = InputSource::key(key_code);

        match state {
            ElementState::Pressed => {
                if repeat {
                    return;
                }
                self.state.press(source);
                if self.global_config.get_action(source) == Some(Action::Restart) {
                    self.restart_key_pressed = true;
                }
            }
            ElementState::Released => self.state.release(source),
        }
    }

    /// Process a mouse button press or release
    pub fn process_mouse_button(&mut self, state: ElementState, button: MouseButton) {
        let source = InputSource::mouse(button);
        match state {
            ElementState::Pressed => {
                self.state.press(source);
                if button == MouseButton::Left {
                    self.pending_click = self.cursor;
                }
            }
            ElementState::Released => self.state.release(source),
        }
    }

    /// Record the cursor position (surface pixels)
    pub fn set_cursor(&mut self, position: Vec2) {
        self.cursor = Some(position);
    }

    /// Forget the cursor position (it left the window)
    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    /// Get the held-input state
    pub fn state(&self) -> &InputState {
        &self.state
    }

    /// Consume the restart presses seen since the last call. True when the
    /// restart key went down or the left button went down over `button`
    /// (given in playfield coordinates). Holding either does not repeat.
    pub fn take_restart_request(&mut self, button: Rect, camera: &Camera) -> bool {
        let key = std::mem::take(&mut self.restart_key_pressed);
        let click = self
            .pending_click
            .take()
            .is_some_and(|cursor| button.contains(camera.screen_to_world(cursor)));
        key || click
    }

    /// Release everything, e.g. when the window loses focus
    pub fn reset_all(&mut self) {
        self.state.clear();
        self.restart_key_pressed = false;
        self.pending_click = None;
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
