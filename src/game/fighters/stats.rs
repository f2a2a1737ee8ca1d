// Fighter stats - both players share the same numbers
// Units are pixels and pixels per 60 Hz step

/// Fixed fighter stats - same for both players
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FighterStats {
    // Movement
    /// Horizontal movement per step while a direction is held
    pub move_speed: f32,
    /// Upward velocity given by a jump
    pub jump_impulse: f32,

    // Physics
    /// Added to the vertical velocity every step
    pub gravity: f32,

    // Combat
    /// Health removed by one landed punch
    pub punch_damage: i32,
    /// Horizontal reach of a punch (exclusive)
    pub punch_range: f32,
    /// Starting and maximum health
    pub max_health: i32,

    // Dimensions
    pub width: f32,
    pub height: f32,
}

/// The one stat table used by both players
pub const BASE_STATS: FighterStats = FighterStats {
    move_speed: 5.0,
    jump_impulse: 15.0,

    gravity: 0.7,

    punch_damage: 10,
    punch_range: 60.0,
    max_health: 100,

    width: 50.0,
    height: 50.0,
};

impl Default for FighterStats {
    fn default() -> Self {
        BASE_STATS
    }
}

impl FighterStats {
    /// Get the standard fighter stats (same for all players)
    pub fn standard() -> Self {
        BASE_STATS
    }
}
