//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Tick-driven, with frame deltas clamped at the boundary
//! - Seeded RNG only
//! - Fixed intra-tick order (prune bullets, move paddle/ball, per-phase
//!   dispatch, formation update, contact resolution)
//! - No rendering or platform dependencies

pub mod alien;
pub mod contact;
pub mod formation;
pub mod physics;
pub mod script;
pub mod state;
pub mod tick;
pub mod timer;

pub use alien::{Alien, AlienState};
pub use formation::Formation;
pub use physics::{Arena, ArenaError, circle_rect_overlap, rects_overlap};
pub use script::Action;
pub use state::{Ball, Bullet, EffectColor, GameEvent, GameState, Paddle, RoundPhase};
pub use tick::{TickInput, tick};
pub use timer::RepeatTimer;
