// Engine modules: game loop timing, input, renderer

pub mod game_loop;
pub mod input;
pub mod renderer;
