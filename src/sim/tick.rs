//! Game round state machine and per-tick dispatch
//!
//! One tick advances the whole simulation in a fixed order: prune and
//! advance alien bullets, apply input, run the per-phase dispatch (paddle
//! and ball motion, formation update, round transition polling), then
//! resolve contacts. The host calls [`GameState::step`] once per rendered
//! frame, or [`tick`] directly with a precomputed delta.

use glam::Vec2;

use super::contact;
use super::physics;
use super::state::{Ball, GameEvent, GameState, Paddle, RoundPhase};
use crate::consts::*;

/// Input commands for a single tick.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position mapped to arena-local x; feeds the paddle target
    pub target_x: Option<f32>,
    /// Launch the ball (tap or release while unlaunched)
    pub launch: bool,
}

/// Advance the game state by one tick of `dt` seconds.
///
/// `dt` is clamped to the maximum frame delta to bound simulation error
/// during frame hitches.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if !state.phase.requires_update() {
        return;
    }
    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    state.time_ticks += 1;

    // Bullets fall in every non-terminal phase and expire at the bottom
    let arena = state.arena;
    for bullet in &mut state.bullets {
        bullet.advance(dt);
    }
    state.bullets.retain(|bullet| !bullet.out_of_bounds(&arena));

    if state.phase.can_control_paddle() {
        if let Some(x) = input.target_x {
            state.paddle.set_target(x, &arena);
        }
        if input.launch {
            state.ball.launch(&mut state.rng);
        }
    }

    match state.phase {
        RoundPhase::Playing => {
            physics::advance_paddle(&mut state.paddle);
            physics::advance_ball(&mut state.ball, &state.paddle, &arena, dt);

            // Falling past the bottom is the loss condition
            if state.ball.pos.y < arena.min_y() {
                let rest = Ball::rest_position(&state.paddle);
                state.ball.reset(rest);
                state.lose_life();
            }

            let completed = state.formation.update(
                &arena,
                dt,
                true,
                &mut state.rng,
                &mut state.bullets,
                &mut state.events,
            );
            if completed {
                state.complete_level();
            }
        }

        RoundPhase::WaitingToRespawn | RoundPhase::Respawning | RoundPhase::WaitingForGameOver => {
            // Aliens keep animating and pulsing, but never fire
            state.formation.update(
                &arena,
                dt,
                false,
                &mut state.rng,
                &mut state.bullets,
                &mut state.events,
            );
            state.poll_round_transition(dt);
        }

        // Unreachable: filtered by requires_update above
        RoundPhase::GameOver | RoundPhase::LevelCompleted => {}
    }

    contact::resolve_contacts(state);
}

impl GameState {
    /// Host entry point: advance the simulation to `now_secs` (a wall-clock
    /// timestamp in seconds). The elapsed time since the previous call is
    /// clamped to the maximum frame delta.
    pub fn step(&mut self, input: &TickInput, now_secs: f64) {
        let dt = match self.last_step_time {
            Some(last) => ((now_secs - last).max(0.0) as f32).min(MAX_FRAME_DT),
            None => 0.0,
        };
        self.last_step_time = Some(now_secs);
        tick(self, input, dt);
    }

    /// Full session reset: lives, score, level and all entity collections,
    /// equivalent to fresh initialization. The RNG stream continues so a
    /// session stays deterministic across restarts.
    pub fn restart(&mut self) {
        log::info!("restarting session");
        let arena = self.arena;
        let seed = self.seed;
        let rng = self.rng.clone();
        *self = GameState::fresh(arena, seed, rng);
    }

    /// Advance past a completed level: clear transient entities, reset the
    /// paddle and ball, and refill the formation for the next level. Silent
    /// no-op outside `LevelCompleted`.
    pub fn advance_level(&mut self) {
        if self.phase != RoundPhase::LevelCompleted {
            return;
        }
        self.level += 1;
        log::info!("starting level {}", self.level);

        self.bullets.clear();
        self.paddle = Paddle::new(&self.arena);
        self.ball.reset(Ball::rest_position(&self.paddle));
        self.formation.reset_level();
        self.phase = RoundPhase::Playing;
    }

    /// Lose a life and leave active gameplay. The formation schedulers stop
    /// and attacking aliens are recalled so the arena can settle; the
    /// quiescence poll decides what happens next.
    pub(crate) fn lose_life(&mut self) {
        if self.phase != RoundPhase::Playing {
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        self.phase = if self.lives > 0 {
            RoundPhase::WaitingToRespawn
        } else {
            RoundPhase::WaitingForGameOver
        };
        log::info!("life lost, {} remaining", self.lives);

        let pos = self.paddle.pos;
        self.push_event(GameEvent::Explosion {
            pos,
            color: super::state::EffectColor::White,
            scale: 2.0,
        });
        self.formation.stop_attacks();
        self.respawn_poll.restart();
    }

    /// Re-check the quiescence gate on the poll interval: no alien
    /// mid-attack, mid-return or mid-kamikaze, and no live bullets.
    fn poll_round_transition(&mut self, dt: f32) {
        if self.respawn_poll.advance(dt) == 0 {
            return;
        }
        if !(self.formation.all_in_formation() && self.bullets.is_empty()) {
            return;
        }

        match self.phase {
            RoundPhase::WaitingToRespawn => {
                self.phase = RoundPhase::Respawning;
                self.respawn_player();
                self.formation.reset_timers();
            }
            RoundPhase::WaitingForGameOver => {
                self.phase = RoundPhase::GameOver;
                self.ball.vel = Vec2::ZERO;
                self.bullets.clear();
                self.respawn_poll.stop();
                log::info!("game over on level {} with score {}", self.level, self.score);
                self.push_event(GameEvent::GameOver {
                    level: self.level,
                    score: self.score,
                });
            }
            _ => {}
        }
    }

    fn respawn_player(&mut self) {
        self.paddle = Paddle::new(&self.arena);
        self.ball.reset(Ball::rest_position(&self.paddle));
        self.respawn_poll.stop();
        self.phase = RoundPhase::Playing;
    }

    fn complete_level(&mut self) {
        self.phase = RoundPhase::LevelCompleted;
        log::info!("level {} completed with score {}", self.level, self.score);
        self.push_event(GameEvent::LevelCompleted {
            level: self.level,
            score: self.score,
        });
    }
}
