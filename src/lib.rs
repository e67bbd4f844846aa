//! Alien Smash - simulation core for a formation arcade shooter
//!
//! A player paddle deflects a ball into a grid of aliens that fly into
//! formation, periodically break off to dive at the player, and return.
//! This crate is the deterministic game simulation only: entity state
//! machines, formation choreography, contact resolution and the round
//! state machine. Rendering, audio and pointer-to-arena input mapping
//! live in the host, which consumes [`sim::GameEvent`]s and feeds
//! [`sim::TickInput`]s.
//!
//! Core modules:
//! - `sim`: deterministic simulation (entities, formation, contacts, round state)

pub mod sim;

/// Game configuration constants
pub mod consts {
    /// Maximum frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 1.0 / 30.0;
    /// Maximum delta applied to the formation pulse per tick (seconds)
    pub const MAX_PULSE_DT: f32 = 0.1;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 120.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    /// Paddle center height above the arena bottom
    pub const PADDLE_Y: f32 = 50.0;
    /// Per-tick easing factor toward the input target
    pub const PADDLE_LERP_FACTOR: f32 = 0.2;
    /// Snap-to-target distance
    pub const PADDLE_SNAP_TOLERANCE: f32 = 0.5;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    /// Nominal ball speed; the ball is rescaled up to this when it decays
    /// below it, but never capped when a deflection pushes it above
    pub const BALL_SPEED: f32 = 500.0;
    /// Rest height of the unlaunched ball above the paddle center
    pub const BALL_REST_OFFSET: f32 = 30.0;
    /// Maximum launch angle off vertical (radians)
    pub const BALL_LAUNCH_SPREAD: f32 = std::f32::consts::FRAC_PI_4;

    /// Alien defaults
    pub const ALIEN_SIZE: f32 = 30.0;
    /// Entry flight duration from off-screen to the formation slot
    pub const ALIEN_ENTRY_SECS: f32 = 1.5;
    /// Attack curve duration
    pub const ALIEN_ATTACK_SECS: f32 = 2.0;
    /// Return-to-formation duration
    pub const ALIEN_RETURN_SECS: f32 = 1.0;
    /// Opportunistic shot rate while bottom-of-column (shots per second)
    pub const ALIEN_SHOOTS_PER_SECOND: f64 = 0.1;
    /// Attacks allowed before the next command becomes a kamikaze dive
    pub const MAX_ATTACKS_BEFORE_KAMIKAZE: u32 = 3;
    /// Attack curve control point offset ranges
    pub const ATTACK_CONTROL_X: f32 = 100.0;
    pub const ATTACK_CONTROL_Y: f32 = 100.0;

    /// Kamikaze dive
    pub const KAMIKAZE_SPIN_SECS: f32 = 0.5;
    /// Dive duration (a 2 s base move run at 1.5x speed)
    pub const KAMIKAZE_DIVE_SECS: f32 = 2.0 / 1.5;
    pub const KAMIKAZE_SHOTS: u32 = 3;
    pub const KAMIKAZE_SHOT_GAP_SECS: f32 = 0.3;
    /// Dive end point below the arena bottom
    pub const KAMIKAZE_EXIT_Y: f32 = -100.0;

    /// Alien bullets
    pub const BULLET_WIDTH: f32 = 4.0;
    pub const BULLET_HEIGHT: f32 = 10.0;
    pub const BULLET_SPEED: f32 = 300.0;

    /// Formation grid
    pub const FORMATION_ROWS: usize = 4;
    pub const FORMATION_COLUMNS: usize = 6;
    pub const FORMATION_H_SPACING: f32 = 50.0;
    pub const FORMATION_V_SPACING: f32 = 40.0;
    /// Formation center distance below the arena top
    pub const FORMATION_TOP_OFFSET: f32 = 200.0;
    /// Pulse oscillator: spacing scales by 1 + pulse/100
    pub const PULSE_AMPLITUDE: f32 = 5.0;
    pub const PULSE_CYCLE_SECS: f32 = 4.0;
    /// Aliens spawned per level, as a multiple of grid capacity
    pub const ALIEN_POOL_FACTOR: u32 = 2;
    pub const SPAWN_INTERVAL_SECS: f32 = 1.0;
    pub const ATTACK_INTERVAL_SECS: f32 = 2.0;
    /// Horizontal entry start distance outside the arena
    pub const ENTRY_SIDE_MARGIN: f32 = 50.0;
    /// Entry start y is uniform in [mid, top - this margin]
    pub const ENTRY_TOP_MARGIN: f32 = 100.0;
    /// Attack dives target this height above the arena bottom
    pub const ATTACK_TARGET_Y: f32 = 400.0;
    /// Attack target x stays this far from the side walls
    pub const ATTACK_TARGET_X_MARGIN: f32 = 50.0;

    /// Round defaults
    pub const STARTING_LIVES: u8 = 3;
    /// Quiescence re-check interval while waiting to respawn or end the game
    pub const RESPAWN_POLL_SECS: f32 = 0.5;

    /// Scoring
    pub const SCORE_ALIEN_IN_FORMATION: u64 = 100;
    pub const SCORE_ALIEN_DIVING: u64 = 200;
    pub const SCORE_BULLET: u64 = 50;
}
