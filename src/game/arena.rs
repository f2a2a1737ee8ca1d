// The match loop: two fighters, one fixed-order step per tick

use glam::Vec2;
use log::{debug, info};

use crate::core::Rect;
use crate::engine::game_loop::TickSource;
use crate::engine::input::InputState;
use crate::engine::renderer::{Canvas, Color};

use super::config::MatchConfig;
use super::fighters::Fighter;

/// Line height of the win message in playfield pixels
const MESSAGE_TEXT_SIZE: f32 = 30.0;
/// Line height of the restart button label
const BUTTON_TEXT_SIZE: f32 = 20.0;
const BUTTON_SIZE: Vec2 = Vec2::new(160.0, 40.0);
/// Distance from the playfield center down to the button center
const BUTTON_OFFSET_Y: f32 = 60.0;
const BUTTON_LABEL: &str = "Restart";

/// Which of the two fighters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

/// Whether the match is still being fought.
///
/// Never stored: always derived from the fighters' health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Running,
    Ended { winner: PlayerSlot },
}

impl MatchStatus {
    pub fn is_over(&self) -> bool {
        matches!(self, Self::Ended { .. })
    }
}

/// Complete game state for one match
#[derive(Debug, Clone)]
pub struct Match {
    config: MatchConfig,
    fighters: [Fighter; 2],
    /// Steps advanced since the program started
    frames: u64,
}

impl Match {
    /// Create a match with both fighters at their spawn points
    pub fn new(config: MatchConfig) -> Self {
        let fighters = [0, 1].map(|index| {
            let setup = &config.fighters[index];
            Fighter::new(
                &setup.name,
                setup.spawn,
                setup.color,
                config.stats,
                setup.controls(),
            )
        });

        info!(
            "Match started: {} vs {}",
            fighters[0].name, fighters[1].name
        );

        Self {
            config,
            fighters,
            frames: 0,
        }
    }

    pub fn fighter(&self, slot: PlayerSlot) -> &Fighter {
        &self.fighters[slot.index()]
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Derive the status from health. Player 1 is checked first, so when
    /// both fall in the same step Player 2 is reported as the winner.
    pub fn status(&self) -> MatchStatus {
        if self.fighters[0].is_defeated() {
            MatchStatus::Ended {
                winner: PlayerSlot::Two,
            }
        } else if self.fighters[1].is_defeated() {
            MatchStatus::Ended {
                winner: PlayerSlot::One,
            }
        } else {
            MatchStatus::Running
        }
    }

    /// "<name> Wins!" once the match is over
    pub fn win_message(&self) -> Option<String> {
        match self.status() {
            MatchStatus::Running => None,
            MatchStatus::Ended { winner } => Some(format!("{} Wins!", self.fighter(winner).name)),
        }
    }

    /// Run one step. Does nothing once the match has ended.
    pub fn advance(&mut self, input: &InputState) -> MatchStatus {
        if self.status().is_over() {
            return self.status();
        }

        let floor_y = self.config.playfield.height;
        for fighter in &mut self.fighters {
            fighter.apply_movement(input);
            fighter.update_position(floor_y);
            fighter.update_punch(input);
        }

        // Player 1's punch resolves first; Player 2's still lands afterwards
        // even if it just took Player 2 to zero
        for (attacker, defender) in [(0, 1), (1, 0)] {
            if self.fighters[attacker].is_in_range(&self.fighters[defender]) {
                let damage = self.fighters[attacker].stats.punch_damage;
                self.fighters[defender].take_damage(damage);
                debug!(
                    "{} hits {} ({} health left)",
                    self.fighters[attacker].name,
                    self.fighters[defender].name,
                    self.fighters[defender].health
                );
            }
        }

        self.frames += 1;

        let status = self.status();
        if let MatchStatus::Ended { winner } = status {
            info!(
                "{} wins after {} frames",
                self.fighter(winner).name,
                self.frames
            );
        }
        status
    }

    /// Run every step `ticks` says is due, stopping as soon as the match
    /// ends. Steps left over after the end are dropped.
    pub fn drive<T: TickSource>(&mut self, ticks: &mut T, input: &InputState) -> MatchStatus {
        for _ in 0..ticks.due_steps() {
            if self.advance(input).is_over() {
                break;
            }
        }
        self.status()
    }

    /// Put both fighters back at their spawn points with full health
    pub fn restart(&mut self) {
        for (fighter, setup) in self.fighters.iter_mut().zip(&self.config.fighters) {
            fighter.reset(setup.spawn);
        }
        info!("Match restarted");
    }

    /// Show/hide signal for the restart control
    pub fn restart_visible(&self) -> bool {
        self.status().is_over()
    }

    /// Restart control bounds in playfield coordinates
    pub fn restart_button(&self) -> Rect {
        let center = self.config.playfield.center() + Vec2::new(0.0, BUTTON_OFFSET_Y);
        Rect::centered(center, BUTTON_SIZE)
    }

    /// Draw the current frame
    pub fn render(&self, canvas: &mut impl Canvas) {
        canvas.clear(self.config.background);

        for fighter in &self.fighters {
            fighter.draw(canvas);
        }

        if let Some(message) = self.win_message() {
            canvas.fill_text(
                &message,
                self.config.playfield.center(),
                MESSAGE_TEXT_SIZE,
                self.config.text_color,
            );
        }

        if self.restart_visible() {
            let button = self.restart_button();
            canvas.fill_rect(button, Color::GRAY);
            canvas.fill_text(BUTTON_LABEL, button.center(), BUTTON_TEXT_SIZE, Color::WHITE);
        }
    }
}

/// Pure form of [`Match::advance`]: returns the state one step later and
/// leaves `state` untouched
#[allow(dead_code)]
pub fn step(state: &Match, input: &InputState) -> Match {
    let mut next = state.clone();
    next.advance(input);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::InputSource;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use winit::keyboard::KeyCode;

    /// Hands out a fixed number of steps per frame
    struct ManualTicks {
        per_frame: u32,
        frames: u32,
    }

    impl ManualTicks {
        fn new(per_frame: u32) -> Self {
            Self {
                per_frame,
                frames: 0,
            }
        }
    }

    impl TickSource for ManualTicks {
        fn due_steps(&mut self) -> u32 {
            self.frames += 1;
            self.per_frame
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Command {
        Clear(Color),
        Rect(Rect, Color),
        Text(String),
    }

    #[derive(Default)]
    struct RecordingCanvas {
        commands: Vec<Command>,
    }

    impl Canvas for RecordingCanvas {
        fn clear(&mut self, color: Color) {
            self.commands.push(Command::Clear(color));
        }

        fn fill_rect(&mut self, rect: Rect, color: Color) {
            self.commands.push(Command::Rect(rect, color));
        }

        fn fill_text(&mut self, text: &str, _center: Vec2, _size: f32, _color: Color) {
            self.commands.push(Command::Text(text.to_string()));
        }
    }

    fn holding(keys: &[KeyCode]) -> InputState {
        let mut input = InputState::new();
        for key in keys {
            input.press(InputSource::key(*key));
        }
        input
    }

    /// Both fighters standing on the floor at the given x positions
    fn standing_match(x1: f32, x2: f32) -> Match {
        let mut game = Match::new(MatchConfig::default());
        for (fighter, x) in game.fighters.iter_mut().zip([x1, x2]) {
            fighter.position = Vec2::new(x, 350.0);
            fighter.on_ground = true;
        }
        game
    }

    #[test]
    fn test_new_match_is_running() {
        let game = Match::new(MatchConfig::default());
        assert_eq!(game.status(), MatchStatus::Running);
        assert!(!game.restart_visible());
        assert_eq!(game.win_message(), None);
        assert_eq!(game.fighter(PlayerSlot::One).position, Vec2::new(100.0, 350.0));
        assert_eq!(game.fighter(PlayerSlot::Two).position, Vec2::new(650.0, 350.0));
    }

    #[test]
    fn test_idle_step_keeps_fighters_on_floor() {
        let mut game = Match::new(MatchConfig::default());
        for _ in 0..10 {
            game.advance(&InputState::new());
        }
        for fighter in &game.fighters {
            assert!(fighter.on_ground);
            assert_relative_eq!(fighter.position.y, 350.0);
        }
        assert_eq!(game.frames(), 10);
    }

    #[test]
    fn test_both_fighters_move_in_one_step() {
        let mut game = standing_match(100.0, 650.0);
        game.advance(&holding(&[KeyCode::KeyD, KeyCode::ArrowLeft]));
        assert_relative_eq!(game.fighter(PlayerSlot::One).position.x, 105.0);
        assert_relative_eq!(game.fighter(PlayerSlot::Two).position.x, 645.0);
    }

    #[test]
    fn test_punch_damages_opponent_only() {
        let mut game = standing_match(100.0, 140.0);
        game.fighters[0].health = 10;
        game.fighters[1].health = 50;

        let status = game.advance(&holding(&[KeyCode::KeyF]));

        assert_eq!(game.fighter(PlayerSlot::Two).health, 40);
        assert_eq!(game.fighter(PlayerSlot::One).health, 10);
        assert_eq!(status, MatchStatus::Running);
    }

    #[test]
    fn test_held_punch_hits_every_step() {
        let mut game = standing_match(100.0, 140.0);
        let input = holding(&[KeyCode::Enter]);
        for _ in 0..3 {
            game.advance(&input);
        }
        assert_eq!(game.fighter(PlayerSlot::One).health, 70);
        assert_eq!(game.fighter(PlayerSlot::Two).health, 100);
    }

    #[test]
    fn test_punch_out_of_range_misses() {
        let mut game = standing_match(100.0, 200.0);
        game.advance(&holding(&[KeyCode::KeyF, KeyCode::Enter]));
        assert_eq!(game.fighter(PlayerSlot::One).health, 100);
        assert_eq!(game.fighter(PlayerSlot::Two).health, 100);
    }

    #[test]
    fn test_range_uses_post_movement_positions() {
        // 65 apart before the step, 60 after P1 walks right: still out of range
        let mut game = standing_match(100.0, 165.0);
        game.advance(&holding(&[KeyCode::KeyD, KeyCode::KeyF]));
        assert_eq!(game.fighter(PlayerSlot::Two).health, 100);

        // 55 apart after the next step
        game.advance(&holding(&[KeyCode::KeyD, KeyCode::KeyF]));
        assert_eq!(game.fighter(PlayerSlot::Two).health, 90);
    }

    #[test]
    fn test_knockout_ends_match() {
        let mut game = standing_match(100.0, 140.0);
        game.fighters[1].health = 10;

        let status = game.advance(&holding(&[KeyCode::KeyF]));

        assert_eq!(
            status,
            MatchStatus::Ended {
                winner: PlayerSlot::One
            }
        );
        assert_eq!(game.win_message().as_deref(), Some("Player 1 Wins!"));
        assert!(game.restart_visible());
    }

    #[test]
    fn test_simultaneous_knockout_reports_player_two() {
        let mut game = standing_match(100.0, 140.0);
        game.fighters[0].health = 5;
        game.fighters[1].health = 10;

        let status = game.advance(&holding(&[KeyCode::KeyF, KeyCode::Enter]));

        assert_eq!(game.fighter(PlayerSlot::One).health, 0);
        assert_eq!(game.fighter(PlayerSlot::Two).health, 0);
        assert_eq!(
            status,
            MatchStatus::Ended {
                winner: PlayerSlot::Two
            }
        );
        assert_eq!(game.win_message().as_deref(), Some("Player 2 Wins!"));
    }

    #[test]
    fn test_ended_match_ignores_steps() {
        let mut game = standing_match(100.0, 140.0);
        game.fighters[1].health = 10;
        game.advance(&holding(&[KeyCode::KeyF]));
        let frames = game.frames();

        game.advance(&holding(&[KeyCode::KeyA, KeyCode::Enter]));

        assert_eq!(game.frames(), frames);
        assert_relative_eq!(game.fighter(PlayerSlot::One).position.x, 100.0);
        assert_eq!(game.fighter(PlayerSlot::One).health, 100);
    }

    #[test]
    fn test_drive_runs_due_steps() {
        let mut game = standing_match(100.0, 650.0);
        let mut ticks = ManualTicks::new(3);

        game.drive(&mut ticks, &holding(&[KeyCode::KeyD]));

        assert_eq!(ticks.frames, 1);
        assert_eq!(game.frames(), 3);
        assert_relative_eq!(game.fighter(PlayerSlot::One).position.x, 115.0);
    }

    #[test]
    fn test_drive_stops_at_knockout() {
        let mut game = standing_match(100.0, 140.0);
        game.fighters[1].health = 20;
        let mut ticks = ManualTicks::new(5);

        let status = game.drive(&mut ticks, &holding(&[KeyCode::KeyF]));

        assert!(status.is_over());
        // Two punches finish the fight; the other three steps are dropped
        assert_eq!(game.frames(), 2);
        assert_eq!(game.fighter(PlayerSlot::Two).health, 0);
    }

    #[test]
    fn test_restart_restores_spawn_and_health() {
        let mut game = standing_match(300.0, 340.0);
        game.fighters[0].health = 5;
        game.fighters[1].health = 10;
        game.advance(&holding(&[KeyCode::KeyF, KeyCode::Enter]));
        assert!(game.status().is_over());

        game.restart();

        assert_eq!(game.status(), MatchStatus::Running);
        assert!(!game.restart_visible());
        assert_eq!(game.win_message(), None);
        assert_eq!(game.fighter(PlayerSlot::One).health, 100);
        assert_eq!(game.fighter(PlayerSlot::Two).health, 100);
        assert_eq!(game.fighter(PlayerSlot::One).position, Vec2::new(100.0, 350.0));
        assert_eq!(game.fighter(PlayerSlot::Two).position, Vec2::new(650.0, 350.0));
        assert_eq!(game.fighter(PlayerSlot::Two).color, Color::RED);

        // Steps are scheduled again
        let mut ticks = ManualTicks::new(2);
        let frames = game.frames();
        game.drive(&mut ticks, &holding(&[KeyCode::ArrowRight]));
        assert_eq!(game.frames(), frames + 2);
        assert_relative_eq!(game.fighter(PlayerSlot::Two).position.x, 660.0);
    }

    #[test]
    fn test_step_is_pure() {
        let game = standing_match(100.0, 140.0);
        let next = step(&game, &holding(&[KeyCode::KeyF]));

        assert_eq!(game.fighter(PlayerSlot::Two).health, 100);
        assert_eq!(game.frames(), 0);
        assert_eq!(next.fighter(PlayerSlot::Two).health, 90);
        assert_eq!(next.frames(), 1);
    }

    #[test]
    fn test_step_is_deterministic() {
        let game = Match::new(MatchConfig::default());
        let input = holding(&[KeyCode::KeyW, KeyCode::KeyD, KeyCode::ArrowUp]);

        let mut a = game.clone();
        let mut b = game;
        for _ in 0..30 {
            a = step(&a, &input);
            b = step(&b, &input);
        }
        for slot in [PlayerSlot::One, PlayerSlot::Two] {
            assert_eq!(a.fighter(slot).position, b.fighter(slot).position);
            assert_eq!(a.fighter(slot).health, b.fighter(slot).health);
        }
    }

    #[test]
    fn test_render_order_while_running() {
        let game = standing_match(100.0, 650.0);
        let mut canvas = RecordingCanvas::default();
        game.render(&mut canvas);

        assert_eq!(canvas.commands.len(), 7);
        assert_eq!(canvas.commands[0], Command::Clear(Color::WHITE));
        assert_eq!(
            canvas.commands[1],
            Command::Rect(Rect::new(100.0, 350.0, 50.0, 50.0), Color::BLACK)
        );
        assert_eq!(
            canvas.commands[2],
            Command::Rect(Rect::new(100.0, 340.0, 50.0, 5.0), Color::RED)
        );
        assert_eq!(
            canvas.commands[3],
            Command::Rect(Rect::new(100.0, 340.0, 50.0, 5.0), Color::GREEN)
        );
        assert_eq!(
            canvas.commands[4],
            Command::Rect(Rect::new(650.0, 350.0, 50.0, 50.0), Color::RED)
        );
        assert!(!canvas
            .commands
            .iter()
            .any(|c| matches!(c, Command::Text(_))));
    }

    #[test]
    fn test_health_bar_is_proportional() {
        let mut game = standing_match(100.0, 650.0);
        game.fighters[1].health = 40;
        let mut canvas = RecordingCanvas::default();
        game.render(&mut canvas);

        assert_eq!(
            canvas.commands[6],
            Command::Rect(Rect::new(650.0, 340.0, 20.0, 5.0), Color::GREEN)
        );
    }

    #[test]
    fn test_render_shows_winner_and_restart_button() {
        let mut game = standing_match(100.0, 140.0);
        game.fighters[0].health = 10;
        game.advance(&holding(&[KeyCode::Enter]));

        let mut canvas = RecordingCanvas::default();
        game.render(&mut canvas);

        let tail = &canvas.commands[7..];
        assert_eq!(tail[0], Command::Text("Player 2 Wins!".to_string()));
        assert_eq!(tail[1], Command::Rect(game.restart_button(), Color::GRAY));
        assert_eq!(tail[2], Command::Text("Restart".to_string()));
    }

    #[test]
    fn test_restart_button_is_below_center() {
        let game = Match::new(MatchConfig::default());
        let button = game.restart_button();
        assert_eq!(button.center(), Vec2::new(400.0, 260.0));
        assert!(button.contains(Vec2::new(400.0, 260.0)));
        assert!(!button.contains(Vec2::new(400.0, 200.0)));
    }

    #[test]
    fn test_player_slot_helpers() {
        assert_eq!(PlayerSlot::One.index(), 0);
        assert_eq!(PlayerSlot::Two.index(), 1);
    }

    fn key_strategy() -> impl Strategy<Value = KeyCode> {
        prop_oneof![
            Just(KeyCode::KeyA),
            Just(KeyCode::KeyD),
            Just(KeyCode::KeyW),
            Just(KeyCode::KeyF),
            Just(KeyCode::ArrowLeft),
            Just(KeyCode::ArrowRight),
            Just(KeyCode::ArrowUp),
            Just(KeyCode::Enter),
        ]
    }

    proptest! {
        #[test]
        fn prop_health_stays_in_bounds(damages in prop::collection::vec(0i32..200, 0..40)) {
            let mut game = Match::new(MatchConfig::default());
            let fighter = &mut game.fighters[0];
            for damage in damages {
                fighter.take_damage(damage);
                prop_assert!(fighter.health >= 0);
                prop_assert!(fighter.health <= fighter.stats.max_health);
            }
        }

        #[test]
        fn prop_fighters_never_sink_below_floor(
            frames in prop::collection::vec(prop::collection::vec(key_strategy(), 0..5), 1..120)
        ) {
            let mut game = Match::new(MatchConfig::default());
            let floor_y = game.config.playfield.height;
            for keys in frames {
                game.advance(&holding(&keys));
                for fighter in &game.fighters {
                    prop_assert!(fighter.position.y + fighter.stats.height <= floor_y);
                    prop_assert!((0..=fighter.stats.max_health).contains(&fighter.health));
                    if fighter.on_ground {
                        prop_assert!(fighter.vertical_velocity <= fighter.stats.gravity);
                    }
                }
            }
        }

        #[test]
        fn prop_not_punching_never_in_range(dx in -200.0f32..200.0, dy in -200.0f32..200.0) {
            let game = standing_match(300.0, 300.0 + dx);
            let mut defender = game.fighter(PlayerSlot::Two).clone();
            defender.position.y += dy;
            prop_assert!(!game.fighter(PlayerSlot::One).is_in_range(&defender));
        }
    }
}
