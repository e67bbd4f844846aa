//! Entity motion and overlap primitives
//!
//! A minimal 2D physics shim: axis-aligned arena bounds, per-tick
//! integration, boundary reflection and speed normalization. No rotation
//! dynamics, no mass interactions beyond reflection.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{Ball, Paddle};
use crate::consts::*;

/// Fatal construction errors, reported at initialization only.
#[derive(Debug, Error, PartialEq)]
pub enum ArenaError {
    #[error("arena dimensions must be positive and finite, got {width}x{height}")]
    InvalidSize { width: f32, height: f32 },
    #[error("arena width must be at least {min}, got {width}")]
    TooNarrow { width: f32, min: f32 },
}

/// Rectangular play bounds. Origin at the bottom-left corner, y up.
///
/// All entity positions are logically confined to the arena except alien
/// bullets and kamikaze divers, which exit at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Result<Self, ArenaError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ArenaError::InvalidSize { width, height });
        }
        // The paddle must fit, and attack targets sample a nonempty band
        // between the side margins
        let min = PADDLE_WIDTH.max(2.0 * ATTACK_TARGET_X_MARGIN);
        if width < min {
            return Err(ArenaError::TooNarrow { width, min });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        0.0
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn min_y(&self) -> f32 {
        0.0
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn mid_x(&self) -> f32 {
        self.width / 2.0
    }

    #[inline]
    pub fn mid_y(&self) -> f32 {
        self.height / 2.0
    }
}

/// Overlap test between two center/size rectangles.
#[inline]
pub fn rects_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    (a_pos.x - b_pos.x).abs() * 2.0 < a_size.x + b_size.x
        && (a_pos.y - b_pos.y).abs() * 2.0 < a_size.y + b_size.y
}

/// Overlap test between a circle and a center/size rectangle.
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect_pos: Vec2, rect_size: Vec2) -> bool {
    let half = rect_size * 0.5;
    let closest = center.clamp(rect_pos - half, rect_pos + half);
    center.distance_squared(closest) < radius * radius
}

/// Advance the ball one tick.
///
/// An unlaunched ball tracks a fixed offset above the paddle. A launched
/// ball integrates its velocity, reflects at the side and top bounds with a
/// 1-unit pushback so the same boundary cannot re-trigger next tick, and is
/// rescaled back up to nominal speed if it has decayed below it. Speed above
/// nominal is left alone, so deflection spikes persist. There is no bottom
/// reflection; falling past the bottom is the loss condition, detected by
/// the round state machine.
pub fn advance_ball(ball: &mut Ball, paddle: &Paddle, arena: &Arena, dt: f32) {
    if !ball.launched {
        ball.pos = Vec2::new(paddle.pos.x, paddle.pos.y + BALL_REST_OFFSET);
        return;
    }

    ball.pos += ball.vel * dt;

    if ball.pos.x <= arena.min_x() + BALL_RADIUS {
        ball.vel.x = ball.vel.x.abs();
        ball.pos.x = arena.min_x() + BALL_RADIUS + 1.0;
    } else if ball.pos.x >= arena.max_x() - BALL_RADIUS {
        ball.vel.x = -ball.vel.x.abs();
        ball.pos.x = arena.max_x() - BALL_RADIUS - 1.0;
    }

    if ball.pos.y >= arena.max_y() - BALL_RADIUS {
        ball.vel.y = -ball.vel.y.abs();
        ball.pos.y = arena.max_y() - BALL_RADIUS - 1.0;
    }

    let speed = ball.vel.length();
    if speed > 0.0 && speed < BALL_SPEED {
        ball.vel *= BALL_SPEED / speed;
    }
}

/// Ease the paddle toward its input target, snapping once within tolerance.
///
/// The easing factor applies per tick, not per second.
pub fn advance_paddle(paddle: &mut Paddle) {
    let target = paddle.target_x();
    if (paddle.pos.x - target).abs() < PADDLE_SNAP_TOLERANCE {
        paddle.pos.x = target;
        return;
    }
    paddle.pos.x += (target - paddle.pos.x) * PADDLE_LERP_FACTOR;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arena() -> Arena {
        Arena::new(800.0, 1000.0).unwrap()
    }

    fn launched_ball(pos: Vec2, vel: Vec2) -> Ball {
        let mut ball = Ball::new(pos);
        ball.vel = vel;
        ball.launched = true;
        ball
    }

    #[test]
    fn test_arena_rejects_bad_dimensions() {
        assert!(Arena::new(-1.0, 100.0).is_err());
        assert!(Arena::new(100.0, 0.0).is_err());
        assert!(Arena::new(f32::NAN, 100.0).is_err());
        assert!(Arena::new(800.0, 1000.0).is_ok());
    }

    #[test]
    fn test_arena_rejects_unplayably_narrow_widths() {
        // Positive and finite, but the paddle cannot fit and the attack
        // target band would be empty
        assert_eq!(
            Arena::new(100.0, 1000.0),
            Err(ArenaError::TooNarrow {
                width: 100.0,
                min: PADDLE_WIDTH,
            })
        );
        assert!(Arena::new(80.0, 1000.0).is_err());
        assert!(Arena::new(PADDLE_WIDTH, 1000.0).is_ok());
    }

    #[test]
    fn test_ball_reflects_at_side_walls() {
        let arena = arena();
        let mut ball = launched_ball(Vec2::new(5.0, 500.0), Vec2::new(-300.0, 400.0));

        advance_ball(&mut ball, &Paddle::new(&arena), &arena, 1.0 / 60.0);
        assert!(ball.vel.x > 0.0);
        assert!(ball.pos.x > arena.min_x() + BALL_RADIUS);

        let mut ball = launched_ball(Vec2::new(796.0, 500.0), Vec2::new(300.0, 400.0));
        advance_ball(&mut ball, &Paddle::new(&arena), &arena, 1.0 / 60.0);
        assert!(ball.vel.x < 0.0);
        assert!(ball.pos.x < arena.max_x() - BALL_RADIUS);
    }

    #[test]
    fn test_ball_reflects_at_top_not_bottom() {
        let arena = arena();
        let mut ball = launched_ball(Vec2::new(400.0, 995.0), Vec2::new(0.0, 500.0));
        advance_ball(&mut ball, &Paddle::new(&arena), &arena, 1.0 / 60.0);
        assert!(ball.vel.y < 0.0);

        // No bottom reflection: the ball keeps falling out
        let mut ball = launched_ball(Vec2::new(400.0, 4.0), Vec2::new(0.0, -500.0));
        advance_ball(&mut ball, &Paddle::new(&arena), &arena, 1.0 / 60.0);
        assert!(ball.vel.y < 0.0);
        assert!(ball.pos.y < 0.0);
    }

    #[test]
    fn test_ball_speed_restored_when_below_nominal() {
        let arena = arena();
        let mut ball = launched_ball(Vec2::new(400.0, 500.0), Vec2::new(30.0, 40.0));
        advance_ball(&mut ball, &Paddle::new(&arena), &arena, 1.0 / 60.0);
        assert!((ball.vel.length() - BALL_SPEED).abs() < 0.01);
    }

    #[test]
    fn test_ball_speed_above_nominal_persists() {
        let arena = arena();
        let fast = BALL_SPEED * 1.5;
        let mut ball = launched_ball(Vec2::new(400.0, 500.0), Vec2::new(0.0, fast));
        for _ in 0..30 {
            advance_ball(&mut ball, &Paddle::new(&arena), &arena, 1.0 / 60.0);
        }
        assert!((ball.vel.length() - fast).abs() < 0.01);
    }

    #[test]
    fn test_unlaunched_ball_tracks_paddle() {
        let arena = arena();
        let mut paddle = Paddle::new(&arena);
        paddle.pos.x = 222.0;
        let mut ball = Ball::new(Vec2::ZERO);
        advance_ball(&mut ball, &paddle, &arena, 1.0 / 60.0);
        assert_eq!(ball.pos, Vec2::new(222.0, paddle.pos.y + BALL_REST_OFFSET));
    }

    #[test]
    fn test_overlap_primitives() {
        assert!(rects_overlap(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(9.0, 0.0),
            Vec2::new(10.0, 10.0),
        ));
        assert!(!rects_overlap(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(11.0, 0.0),
            Vec2::new(10.0, 10.0),
        ));
        assert!(circle_rect_overlap(
            Vec2::new(0.0, 0.0),
            5.0,
            Vec2::new(7.0, 0.0),
            Vec2::new(6.0, 6.0),
        ));
        assert!(!circle_rect_overlap(
            Vec2::new(0.0, 0.0),
            5.0,
            Vec2::new(20.0, 0.0),
            Vec2::new(6.0, 6.0),
        ));
    }

    proptest! {
        #[test]
        fn prop_ball_speed_never_below_nominal_once_moving(
            x in 50.0f32..750.0,
            y in 100.0f32..900.0,
            vx in -400.0f32..400.0,
            vy in -400.0f32..400.0,
        ) {
            prop_assume!(vx.abs() + vy.abs() > 1.0);
            let arena = arena();
            let paddle = Paddle::new(&arena);
            let mut ball = launched_ball(Vec2::new(x, y), Vec2::new(vx, vy));
            advance_ball(&mut ball, &paddle, &arena, 1.0 / 60.0);
            prop_assert!(ball.vel.length() >= BALL_SPEED - 0.01);
        }
    }
}
