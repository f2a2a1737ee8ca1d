// Game rules: fighters, match configuration and the match loop

pub mod arena;
pub mod config;
pub mod fighters;
