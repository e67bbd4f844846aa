//! Alien Smash headless demo
//!
//! Runs the simulation at a fixed tick rate with a simple autopilot on the
//! paddle and prints a session summary. Useful for watching the round state
//! machine and event stream without a renderer; the real front end drives
//! `GameState::step` from its frame loop instead.

use alien_smash::sim::{GameEvent, GameState, RoundPhase, TickInput, tick};

const TICK_DT: f32 = 1.0 / 60.0;
const DEMO_SECS: f32 = 120.0;
const ARENA_WIDTH: f32 = 800.0;
const ARENA_HEIGHT: f32 = 1000.0;

/// Chase the ball while it falls, otherwise park under its rest position.
/// Launches whenever the ball is waiting on the paddle.
fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput::default();
    if state.phase != RoundPhase::Playing {
        return input;
    }

    if !state.ball.launched {
        input.launch = true;
        return input;
    }

    let target = if state.ball.vel.y < 0.0 {
        // Lead the falling ball to where it will cross paddle height
        let time_to_paddle = (state.ball.pos.y - state.paddle.pos.y) / -state.ball.vel.y;
        state.ball.pos.x + state.ball.vel.x * time_to_paddle.max(0.0)
    } else {
        state.ball.pos.x
    };
    input.target_x = Some(target);
    input
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    log::info!("alien smash demo, seed {seed}");

    let mut state = match GameState::new(ARENA_WIDTH, ARENA_HEIGHT, seed) {
        Ok(state) => state,
        Err(err) => {
            log::error!("failed to initialize: {err}");
            std::process::exit(1);
        }
    };

    let ticks = (DEMO_SECS / TICK_DT) as u64;
    let mut explosions = 0u64;
    let mut kamikazes = 0u64;
    let mut levels_cleared = 0u32;
    let mut games_over = 0u32;

    for _ in 0..ticks {
        let input = autopilot(&state);
        tick(&mut state, &input, TICK_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::Explosion { .. } => explosions += 1,
                GameEvent::AlienDestroyed { row, col, .. } => {
                    kamikazes += 1;
                    log::debug!("kamikaze from slot ({row}, {col}) completed");
                }
                GameEvent::LevelCompleted { level, score } => {
                    levels_cleared += 1;
                    println!("level {level} cleared, score {score}");
                }
                GameEvent::GameOver { level, score } => {
                    games_over += 1;
                    println!("game over on level {level}, score {score}");
                }
            }
        }

        match state.phase {
            RoundPhase::LevelCompleted => state.advance_level(),
            RoundPhase::GameOver => state.restart(),
            _ => {}
        }
    }

    println!("--- {DEMO_SECS}s demo summary ---");
    println!("seed:            {seed}");
    println!("final score:     {}", state.score);
    println!("final level:     {}", state.level);
    println!("lives left:      {}", state.lives);
    println!("aliens active:   {}", state.formation.active_count());
    println!("pool remaining:  {}", state.formation.remaining_pool());
    println!("explosions:      {explosions}");
    println!("kamikaze exits:  {kamikazes}");
    println!("levels cleared:  {levels_cleared}");
    println!("games over:      {games_over}");
}
