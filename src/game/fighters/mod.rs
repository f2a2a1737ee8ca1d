// Fighter system
//
// - Fighter entity: movement, gravity, punching, damage
// - Fighter stats shared by both players

pub mod fighter;
pub mod stats;

// Re-export commonly used types
pub use fighter::Fighter;
pub use stats::FighterStats;
