// Match configuration: playfield, fighter setups, colors

use glam::Vec2;

use crate::engine::input::action::{default_p1_bindings, default_p2_bindings};
use crate::engine::input::{Action, InputConfig, InputSource};
use crate::engine::renderer::Color;

use super::fighters::FighterStats;

/// Fixed-size area the fighters stand in, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() / 2.0
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new(800.0, 400.0)
    }
}

/// Everything that identifies one fighter across restarts
#[derive(Debug, Clone)]
pub struct FighterSetup {
    pub name: String,
    pub spawn: Vec2,
    pub color: Color,
    pub bindings: Vec<(InputSource, Action)>,
}

impl FighterSetup {
    /// Build the binding table for this fighter
    pub fn controls(&self) -> InputConfig {
        InputConfig::from_bindings(self.bindings.clone())
    }
}

/// Match configuration
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub playfield: Playfield,
    /// Shared by both fighters
    pub stats: FighterStats,
    /// Player 1 then Player 2
    pub fighters: [FighterSetup; 2],
    pub background: Color,
    pub text_color: Color,
}

impl MatchConfig {
    /// Default setup on a custom playfield: Player 1 spawns 100px from the
    /// left edge, Player 2 150px from the right edge, both on the floor
    pub fn with_playfield(playfield: Playfield) -> Self {
        let stats = FighterStats::standard();
        let floor_y = playfield.height - stats.height;

        Self {
            playfield,
            stats,
            fighters: [
                FighterSetup {
                    name: "Player 1".to_string(),
                    spawn: Vec2::new(100.0, floor_y),
                    color: Color::BLACK,
                    bindings: default_p1_bindings(),
                },
                FighterSetup {
                    name: "Player 2".to_string(),
                    spawn: Vec2::new(playfield.width - 150.0, floor_y),
                    color: Color::RED,
                    bindings: default_p2_bindings(),
                },
            ],
            background: Color::WHITE,
            text_color: Color::BLACK,
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::with_playfield(Playfield::default())
    }
}
