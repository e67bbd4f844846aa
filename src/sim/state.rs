//! Game state and core simulation types
//!
//! Everything the simulation mutates lives here, owned by [`GameState`] and
//! touched only from the single tick function.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::formation::Formation;
use super::physics::{Arena, ArenaError};
use super::timer::RepeatTimer;
use crate::consts::*;

/// Current state of the game round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Active gameplay
    Playing,
    /// Life lost with lives remaining; waiting for the arena to go quiescent
    WaitingToRespawn,
    /// Quiescence reached; paddle and ball are being reset
    Respawning,
    /// Last life lost; waiting for the arena to go quiescent
    WaitingForGameOver,
    /// Terminal until the host calls `restart`
    GameOver,
    /// Terminal for this level until the host calls `advance_level`
    LevelCompleted,
}

impl RoundPhase {
    /// Pointer input steers the paddle only during active gameplay.
    pub fn can_control_paddle(&self) -> bool {
        *self == RoundPhase::Playing
    }

    /// Terminal phases perform no per-tick simulation work.
    pub fn requires_update(&self) -> bool {
        !matches!(self, RoundPhase::GameOver | RoundPhase::LevelCompleted)
    }
}

/// The player's paddle. Only x is controllable; input sets a target that the
/// current position eases toward each tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub pos: Vec2,
    target_x: f32,
}

impl Paddle {
    pub fn new(arena: &Arena) -> Self {
        let pos = Vec2::new(arena.mid_x(), arena.min_y() + PADDLE_Y);
        Self {
            pos,
            target_x: pos.x,
        }
    }

    #[inline]
    pub fn size() -> Vec2 {
        Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT)
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    /// Set the easing target from pointer input, clamped so the paddle edges
    /// stay inside the arena for any input, including out-of-range values.
    pub fn set_target(&mut self, x: f32, arena: &Arena) {
        let min_x = PADDLE_WIDTH / 2.0;
        let max_x = arena.width - PADDLE_WIDTH / 2.0;
        self.target_x = x.clamp(min_x, max_x);
    }

    /// Make the target match the current position (after a teleporting reset,
    /// so the paddle does not ease back to a stale target).
    pub fn sync_target(&mut self) {
        self.target_x = self.pos.x;
    }
}

/// The ball. Speed magnitude is fixed at launch and restored whenever it
/// drops below nominal, but deflection-driven spikes above nominal persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub launched: bool,
}

impl Ball {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            launched: false,
        }
    }

    /// Launch upward at nominal speed with a random spread off vertical.
    /// No-op if already launched.
    pub fn launch(&mut self, rng: &mut Pcg32) {
        if self.launched {
            return;
        }
        self.launched = true;
        let angle = rng.random_range(-BALL_LAUNCH_SPREAD..=BALL_LAUNCH_SPREAD);
        self.vel = Vec2::new(BALL_SPEED * angle.sin(), BALL_SPEED * angle.cos());
    }

    /// Stop and reposition, back to the unlaunched state.
    pub fn reset(&mut self, at: Vec2) {
        self.pos = at;
        self.vel = Vec2::ZERO;
        self.launched = false;
    }

    /// Rest position above the paddle while unlaunched.
    pub fn rest_position(paddle: &Paddle) -> Vec2 {
        Vec2::new(paddle.pos.x, paddle.pos.y + BALL_REST_OFFSET)
    }
}

/// An alien-fired projectile. Falls straight down at fixed speed; its life
/// ends on contact or when it exits the arena bottom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Bullet {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::new(0.0, -BULLET_SPEED),
        }
    }

    #[inline]
    pub fn size() -> Vec2 {
        Vec2::new(BULLET_WIDTH, BULLET_HEIGHT)
    }

    pub fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    pub fn out_of_bounds(&self, arena: &Arena) -> bool {
        self.pos.y < arena.min_y()
    }
}

/// Color tag for visual effects; the presentation layer maps these to its
/// own palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectColor {
    White,
    Green,
    Yellow,
}

/// Events emitted by the core for the presentation layer, drained once per
/// frame by the host. Fire-and-forget; the core never expects a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Spawn a visual effect at a position.
    Explosion {
        pos: Vec2,
        color: EffectColor,
        scale: f32,
    },
    /// An alien finished its kamikaze dive and removed itself, identified by
    /// its formation slot.
    AlienDestroyed { row: usize, col: usize, pos: Vec2 },
    /// The level's alien pool is exhausted and the grid is empty. Fired
    /// exactly once per level.
    LevelCompleted { level: u32, score: u64 },
    /// The last life is gone and the arena has gone quiescent.
    GameOver { level: u32, score: u64 },
}

/// Complete game state. Deterministic for a given seed and input sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed, for reproducing a run
    pub seed: u64,
    pub arena: Arena,
    pub phase: RoundPhase,
    pub lives: u8,
    /// Monotonically non-decreasing
    pub score: u64,
    pub level: u32,
    pub paddle: Paddle,
    pub ball: Ball,
    /// Live alien bullets
    pub bullets: Vec<Bullet>,
    pub formation: Formation,
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) respawn_poll: RepeatTimer,
    pub(crate) last_step_time: Option<f64>,
}

impl GameState {
    /// Initialize a session for the given arena size.
    ///
    /// The only fatal condition in the simulation: malformed arena
    /// dimensions are rejected here and nowhere else.
    pub fn new(width: f32, height: f32, seed: u64) -> Result<Self, ArenaError> {
        let arena = Arena::new(width, height)?;
        Ok(Self::fresh(arena, seed, Pcg32::seed_from_u64(seed)))
    }

    pub(crate) fn fresh(arena: Arena, seed: u64, rng: Pcg32) -> Self {
        let paddle = Paddle::new(&arena);
        let ball = Ball::new(Ball::rest_position(&paddle));
        Self {
            seed,
            arena,
            phase: RoundPhase::Playing,
            lives: STARTING_LIVES,
            score: 0,
            level: 1,
            paddle,
            ball,
            bullets: Vec::new(),
            formation: Formation::new(),
            rng,
            time_ticks: 0,
            events: Vec::new(),
            respawn_poll: RepeatTimer::new(RESPAWN_POLL_SECS),
            last_step_time: None,
        }
    }

    /// Drain the pending presentation events.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
