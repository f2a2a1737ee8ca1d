/// Game loop timing and control system
///
/// Implements a fixed timestep game loop with variable rendering.
/// Match rules are tuned per 60 Hz step, so the step rate stays
/// constant no matter how fast the display refreshes.
use std::time::{Duration, Instant};

/// Target update rate (60 updates per second)
const FIXED_TIMESTEP_DURATION: Duration = Duration::from_micros(16_667); // ~1/60 second

/// Maximum number of steps per frame to prevent spiral of death
const MAX_STEPS_PER_FRAME: u32 = 5;

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

/// Something that decides how many fixed steps are due right now.
///
/// The match is driven through this trait so it never depends on a live
/// display; tests feed it synthetic ticks.
pub trait TickSource {
    /// Number of fixed steps to run for the current frame
    fn due_steps(&mut self) -> u32;
}

/// Game loop timing state
pub struct GameLoop {
    /// Accumulated time for fixed timestep updates
    accumulator: Duration,

    /// Time of last frame
    last_frame_time: Instant,

    /// Whether steps have stopped being scheduled
    halted: bool,

    /// Frame timing history for FPS calculation
    frame_times: Vec<Duration>,

    /// Current frame number
    frame_count: u64,

    /// Total updates executed
    update_count: u64,

    /// Current FPS (updated periodically)
    current_fps: f32,
}

impl GameLoop {
    /// Create a new game loop
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            accumulator: Duration::ZERO,
            last_frame_time: now,
            halted: false,
            frame_times: Vec::with_capacity(FPS_WINDOW_SIZE),
            frame_count: 0,
            update_count: 0,
            current_fps: 0.0,
        }
    }

    /// Begin a new frame, returns the number of fixed updates to run
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.frame_count += 1;

        self.frame_times.push(frame_time);
        if self.frame_times.len() > FPS_WINDOW_SIZE {
            self.frame_times.remove(0);
        }

        // Update FPS counter every 10 frames
        if self.frame_count % 10 == 0 {
            self.update_fps();
        }

        // A halted loop keeps presenting frames but schedules no steps
        if self.halted {
            return 0;
        }

        self.accumulator += frame_time;

        let mut updates = 0;
        while self.accumulator >= FIXED_TIMESTEP_DURATION && updates < MAX_STEPS_PER_FRAME {
            self.accumulator -= FIXED_TIMESTEP_DURATION;
            updates += 1;
        }

        // Drop time we could not catch up on
        if updates == MAX_STEPS_PER_FRAME {
            self.accumulator = Duration::ZERO;
        }

        self.update_count += updates as u64;
        updates
    }

    /// Get current FPS
    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    /// Get total number of frames rendered
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of updates executed
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Check if step scheduling has stopped
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Stop scheduling steps (the match ended)
    pub fn halt(&mut self) {
        if !self.halted {
            self.halted = true;
            log::info!(
                "Game loop halted after {} updates over {} frames ({:.1} fps)",
                self.update_count,
                self.frame_count,
                self.current_fps
            );
        }
    }

    /// Resume scheduling steps from a clean accumulator
    pub fn rearm(&mut self) {
        if self.halted {
            self.halted = false;
            // Reset accumulator to prevent update burst
            self.accumulator = Duration::ZERO;
            self.last_frame_time = Instant::now();
            log::info!("Game loop re-armed");
        }
    }

    /// Update FPS calculation
    fn update_fps(&mut self) {
        if self.frame_times.is_empty() {
            self.current_fps = 0.0;
            return;
        }

        let total: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total / self.frame_times.len() as u32;

        self.current_fps = if avg_frame_time.as_secs_f32() > 0.0 {
            1.0 / avg_frame_time.as_secs_f32()
        } else {
            0.0
        };
    }
}

impl TickSource for GameLoop {
    fn due_steps(&mut self) -> u32 {
        self.begin_frame()
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}
