// Input handling system
//
// Keyboard and mouse input for two local players sharing one keyboard.
//
// ## Architecture
//
// - `action`: Defines game actions and default key bindings
// - `state`: The set of keys/buttons currently held
// - `config`: Per-fighter binding tables and remapping
// - `manager`: Folds winit events into the state
//
// ## Usage Example
//
// ```rust
// use engine::input::{InputManager, InputConfig, Action};
//
// let mut input_manager = InputManager::new();
//
// // In your event loop, process keyboard events
// input_manager.process_keyboard_event(&key_event);
//
// // Once per frame, query through a fighter's bindings
// let controls = InputConfig::from_bindings(default_p1_bindings());
// if controls.is_held(Action::Jump, input_manager.state()) {
//     // Player 1 is holding jump
// }
// ```

pub mod action;
pub mod config;
pub mod manager;
pub mod state;

// Re-export commonly used types
pub use action::{Action, InputSource};
pub use config::InputConfig;
pub use manager::InputManager;
pub use state::InputState;
