// Fighter entity

use glam::Vec2;

use crate::core::{clamp, Rect};
use crate::engine::input::{Action, InputConfig, InputState};
use crate::engine::renderer::{Canvas, Color};

use super::stats::FighterStats;

/// Gap between the top of the body and the health bar
const HEALTH_BAR_OFFSET: f32 = 10.0;
const HEALTH_BAR_HEIGHT: f32 = 5.0;

/// One player-controlled combatant.
///
/// `position` is the top-left corner of the body in playfield pixels,
/// with y growing downward, so the floor is at the playfield height.
#[derive(Debug, Clone)]
pub struct Fighter {
    /// Display name, used in the win message
    pub name: String,
    /// Top-left corner of the body
    pub position: Vec2,
    /// Body color
    pub color: Color,
    /// Fighter properties
    pub stats: FighterStats,
    /// Key bindings for this fighter
    pub controls: InputConfig,

    // Physics state
    /// Vertical velocity in pixels per step (negative is upward)
    pub vertical_velocity: f32,
    /// Resting on the floor, allowed to jump
    pub on_ground: bool,

    // Combat state
    /// Punch key held this step
    pub is_punching: bool,
    /// Current health, always within 0..=max_health
    pub health: i32,
}

impl Fighter {
    /// Create a new fighter at `spawn`.
    ///
    /// Fighters start airborne with no velocity and settle onto the floor
    /// during the first steps.
    pub fn new(
        name: &str,
        spawn: Vec2,
        color: Color,
        stats: FighterStats,
        controls: InputConfig,
    ) -> Self {
        Self {
            name: name.to_string(),
            position: spawn,
            color,
            controls,
            vertical_velocity: 0.0,
            on_ground: false,
            is_punching: false,
            health: stats.max_health,
            stats,
        }
    }

    /// Apply held movement keys. Left and right cancel out when both are
    /// held. Horizontal position is not bounded by the playfield.
    pub fn apply_movement(&mut self, input: &InputState) {
        if self.controls.is_held(Action::MoveLeft, input) {
            self.position.x -= self.stats.move_speed;
        }
        if self.controls.is_held(Action::MoveRight, input) {
            self.position.x += self.stats.move_speed;
        }
        if self.controls.is_held(Action::Jump, input) && self.on_ground {
            self.vertical_velocity = -self.stats.jump_impulse;
            self.on_ground = false;
        }
    }

    /// Integrate one step of gravity and rest on the floor at `floor_y`
    pub fn update_position(&mut self, floor_y: f32) {
        self.position.y += self.vertical_velocity;
        self.vertical_velocity += self.stats.gravity;

        if self.position.y + self.stats.height > floor_y {
            self.position.y = floor_y - self.stats.height;
            self.vertical_velocity = 0.0;
            self.on_ground = true;
        }
    }

    /// Punching is level-triggered: holding the key keeps the fighter punching
    pub fn update_punch(&mut self, input: &InputState) {
        self.is_punching = self.controls.is_held(Action::Punch, input);
    }

    /// Apply damage to the fighter
    pub fn take_damage(&mut self, amount: i32) {
        self.health = clamp(self.health.saturating_sub(amount), 0, self.stats.max_health);
    }

    /// Whether this fighter's punch reaches `opponent` this step
    pub fn is_in_range(&self, opponent: &Fighter) -> bool {
        self.is_punching
            && (self.position.x - opponent.position.x).abs() < self.stats.punch_range
            && (self.position.y - opponent.position.y).abs() < self.stats.height
    }

    /// Out of health
    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    /// Put the fighter back at `spawn` with full health.
    /// Controls, color and motion state are kept.
    pub fn reset(&mut self, spawn: Vec2) {
        self.position = spawn;
        self.health = self.stats.max_health;
    }

    /// Remaining health as a fraction of the maximum
    pub fn health_ratio(&self) -> f32 {
        if self.stats.max_health <= 0 {
            return 0.0;
        }
        self.health as f32 / self.stats.max_health as f32
    }

    /// Body rectangle
    pub fn bounds(&self) -> Rect {
        Rect {
            origin: self.position,
            size: Vec2::new(self.stats.width, self.stats.height),
        }
    }

    /// Draw the body and the health bar above it
    pub fn draw(&self, canvas: &mut impl Canvas) {
        canvas.fill_rect(self.bounds(), self.color);

        let bar_y = self.position.y - HEALTH_BAR_OFFSET;
        canvas.fill_rect(
            Rect::new(self.position.x, bar_y, self.stats.width, HEALTH_BAR_HEIGHT),
            Color::RED,
        );
        canvas.fill_rect(
            Rect::new(
                self.position.x,
                bar_y,
                self.stats.width * self.health_ratio(),
                HEALTH_BAR_HEIGHT,
            ),
            Color::GREEN,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::action::default_p1_bindings;
    use crate::engine::input::InputSource;
    use approx::assert_relative_eq;
    use winit::keyboard::KeyCode;

    const FLOOR: f32 = 400.0;

    fn fighter_at(x: f32) -> Fighter {
        let mut fighter = Fighter::new(
            "Player 1",
            Vec2::new(x, FLOOR - 50.0),
            Color::BLACK,
            FighterStats::standard(),
            InputConfig::from_bindings(default_p1_bindings()),
        );
        fighter.on_ground = true;
        fighter
    }

    fn holding(keys: &[KeyCode]) -> InputState {
        let mut input = InputState::new();
        for key in keys {
            input.press(InputSource::key(*key));
        }
        input
    }

    #[test]
    fn test_new_fighter() {
        let fighter = Fighter::new(
            "Player 2",
            Vec2::new(650.0, 350.0),
            Color::RED,
            FighterStats::standard(),
            InputConfig::new(),
        );
        assert_eq!(fighter.health, 100);
        assert!(!fighter.on_ground);
        assert!(!fighter.is_punching);
        assert_eq!(fighter.vertical_velocity, 0.0);
    }

    #[test]
    fn test_move_left_and_right() {
        let mut fighter = fighter_at(100.0);

        fighter.apply_movement(&holding(&[KeyCode::KeyA]));
        assert_relative_eq!(fighter.position.x, 95.0);

        fighter.apply_movement(&holding(&[KeyCode::KeyD]));
        assert_relative_eq!(fighter.position.x, 100.0);
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let mut fighter = fighter_at(100.0);
        fighter.apply_movement(&holding(&[KeyCode::KeyA, KeyCode::KeyD]));
        assert_relative_eq!(fighter.position.x, 100.0);
    }

    #[test]
    fn test_no_horizontal_bounds() {
        let mut fighter = fighter_at(2.0);
        fighter.apply_movement(&holding(&[KeyCode::KeyA]));
        assert_relative_eq!(fighter.position.x, -3.0);
    }

    #[test]
    fn test_other_players_keys_do_nothing() {
        let mut fighter = fighter_at(100.0);
        fighter.apply_movement(&holding(&[KeyCode::ArrowLeft, KeyCode::ArrowUp]));
        fighter.update_punch(&holding(&[KeyCode::Enter]));
        assert_relative_eq!(fighter.position.x, 100.0);
        assert!(fighter.on_ground);
        assert!(!fighter.is_punching);
    }

    #[test]
    fn test_jump_requires_ground() {
        let mut fighter = fighter_at(100.0);
        fighter.apply_movement(&holding(&[KeyCode::KeyW]));
        assert_relative_eq!(fighter.vertical_velocity, -15.0);
        assert!(!fighter.on_ground);

        // Holding jump in the air does not reapply the impulse
        fighter.vertical_velocity = -3.0;
        fighter.apply_movement(&holding(&[KeyCode::KeyW]));
        assert_relative_eq!(fighter.vertical_velocity, -3.0);
    }

    #[test]
    fn test_update_position_integrates_then_accelerates() {
        let mut fighter = fighter_at(100.0);
        fighter.position.y = 200.0;
        fighter.vertical_velocity = -10.0;
        fighter.on_ground = false;

        fighter.update_position(FLOOR);
        assert_relative_eq!(fighter.position.y, 190.0);
        assert_relative_eq!(fighter.vertical_velocity, -9.3, epsilon = 1e-4);
        assert!(!fighter.on_ground);
    }

    #[test]
    fn test_update_position_clamps_to_floor() {
        let mut fighter = fighter_at(100.0);
        fighter.position.y = 345.0;
        fighter.vertical_velocity = 12.0;
        fighter.on_ground = false;

        fighter.update_position(FLOOR);
        assert_relative_eq!(fighter.position.y, 350.0);
        assert_eq!(fighter.vertical_velocity, 0.0);
        assert!(fighter.on_ground);
    }

    #[test]
    fn test_full_jump_lands_on_floor() {
        let mut fighter = fighter_at(100.0);
        fighter.apply_movement(&holding(&[KeyCode::KeyW]));

        let mut steps = 0;
        loop {
            fighter.update_position(FLOOR);
            steps += 1;
            assert!(fighter.position.y + fighter.stats.height <= FLOOR);
            if fighter.on_ground {
                break;
            }
            assert!(steps < 100, "fighter never landed");
        }
        assert_relative_eq!(fighter.position.y, 350.0);
    }

    #[test]
    fn test_spawned_fighter_settles_in_two_steps() {
        let mut fighter = fighter_at(100.0);
        fighter.on_ground = false;

        fighter.update_position(FLOOR);
        assert!(!fighter.on_ground);
        fighter.update_position(FLOOR);
        assert!(fighter.on_ground);
    }

    #[test]
    fn test_punch_is_level_triggered() {
        let mut fighter = fighter_at(100.0);
        let punch = holding(&[KeyCode::KeyF]);

        fighter.update_punch(&punch);
        assert!(fighter.is_punching);
        fighter.update_punch(&punch);
        assert!(fighter.is_punching);

        fighter.update_punch(&InputState::new());
        assert!(!fighter.is_punching);
    }

    #[test]
    fn test_take_damage_clamps_at_zero() {
        let mut fighter = fighter_at(100.0);
        fighter.health = 5;
        fighter.take_damage(10);
        assert_eq!(fighter.health, 0);
        assert!(fighter.is_defeated());

        fighter.take_damage(10);
        assert_eq!(fighter.health, 0);
    }

    #[test]
    fn test_in_range_when_close() {
        let mut attacker = fighter_at(100.0);
        let defender = fighter_at(140.0);
        attacker.is_punching = true;
        assert!(attacker.is_in_range(&defender));
    }

    #[test]
    fn test_out_of_range_when_far() {
        let mut attacker = fighter_at(100.0);
        let defender = fighter_at(200.0);
        attacker.is_punching = true;
        assert!(!attacker.is_in_range(&defender));
    }

    #[test]
    fn test_range_is_exclusive() {
        let mut attacker = fighter_at(100.0);
        attacker.is_punching = true;
        assert!(!attacker.is_in_range(&fighter_at(160.0)));
        assert!(attacker.is_in_range(&fighter_at(159.0)));
        assert!(attacker.is_in_range(&fighter_at(41.0)));
    }

    #[test]
    fn test_not_in_range_without_punching() {
        let attacker = fighter_at(100.0);
        assert!(!attacker.is_in_range(&fighter_at(100.0)));
        assert!(!attacker.is_in_range(&fighter_at(140.0)));
    }

    #[test]
    fn test_vertical_distance_limits_range() {
        let mut attacker = fighter_at(100.0);
        attacker.is_punching = true;

        let mut airborne = fighter_at(120.0);
        airborne.position.y -= 50.0;
        assert!(!attacker.is_in_range(&airborne));

        airborne.position.y += 1.0;
        assert!(attacker.is_in_range(&airborne));
    }

    #[test]
    fn test_reset_keeps_controls_and_color() {
        let mut fighter = fighter_at(100.0);
        fighter.position = Vec2::new(-40.0, 120.0);
        fighter.health = 0;

        fighter.reset(Vec2::new(100.0, 350.0));
        assert_eq!(fighter.position, Vec2::new(100.0, 350.0));
        assert_eq!(fighter.health, 100);
        assert_eq!(fighter.color, Color::BLACK);
        assert!(!fighter.controls.get_sources(Action::Punch).is_empty());
    }

    #[test]
    fn test_health_ratio() {
        let mut fighter = fighter_at(100.0);
        assert_relative_eq!(fighter.health_ratio(), 1.0);
        fighter.take_damage(30);
        assert_relative_eq!(fighter.health_ratio(), 0.7);
    }
}
