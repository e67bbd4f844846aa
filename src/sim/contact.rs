//! Pairwise contact classification and resolution
//!
//! Overlapping pairs reported by the motion primitives are classified by
//! category pair and resolved immediately. Destroyed entities leave their
//! collections before any later pair in the same tick can reference them, so
//! a contact is never resolved twice.

use glam::Vec2;

use super::alien::AlienState;
use super::physics::{circle_rect_overlap, rects_overlap};
use super::state::{Bullet, EffectColor, GameEvent, GameState, Paddle, RoundPhase};
use crate::consts::*;

/// Resolve every overlapping pair against the contact table.
///
/// Paddle contacts only apply during active gameplay; ball contacts with
/// aliens and bullets apply in every phase.
pub fn resolve_contacts(state: &mut GameState) {
    resolve_ball_paddle(state);
    resolve_ball_aliens(state);
    resolve_ball_bullets(state);
    resolve_paddle_bullets(state);
    resolve_paddle_aliens(state);
}

/// Ball on paddle: redirect by paddle-offset-driven deflection, always
/// upward. The offset is normalized by the half paddle width and mapped to
/// +/-45 degrees; the resulting velocity has nominal magnitude.
fn resolve_ball_paddle(state: &mut GameState) {
    if state.phase != RoundPhase::Playing {
        return;
    }
    if !circle_rect_overlap(
        state.ball.pos,
        BALL_RADIUS,
        state.paddle.pos,
        Paddle::size(),
    ) {
        return;
    }

    let offset = state.ball.pos.x - state.paddle.pos.x;
    let normalized = (offset / (PADDLE_WIDTH / 2.0)).clamp(-1.0, 1.0);
    let angle = normalized * std::f32::consts::FRAC_PI_4;
    state.ball.vel = Vec2::new(BALL_SPEED * angle.sin(), (BALL_SPEED * angle.cos()).abs());
}

/// Ball on alien: score (less for an alien caught in formation), destroy the
/// alien and spawn its explosion. Applies in any alien state.
fn resolve_ball_aliens(state: &mut GameState) {
    let ball_pos = state.ball.pos;
    let hits: Vec<(usize, usize)> = state
        .formation
        .aliens()
        .filter(|alien| circle_rect_overlap(ball_pos, BALL_RADIUS, alien.pos, super::Alien::size()))
        .map(|alien| (alien.row, alien.col))
        .collect();

    for (row, col) in hits {
        if let Some(alien) = state.formation.take_alien(row, col) {
            let points = if alien.state == AlienState::InFormation {
                SCORE_ALIEN_IN_FORMATION
            } else {
                SCORE_ALIEN_DIVING
            };
            state.score += points;
            state.push_event(GameEvent::Explosion {
                pos: alien.pos,
                color: EffectColor::Green,
                scale: 1.0,
            });
        }
    }
}

/// Ball on alien bullet: the bullet is shot down for points; the ball is
/// unaffected.
fn resolve_ball_bullets(state: &mut GameState) {
    let GameState {
        ball,
        bullets,
        score,
        events,
        ..
    } = state;

    bullets.retain(|bullet| {
        if circle_rect_overlap(ball.pos, BALL_RADIUS, bullet.pos, Bullet::size()) {
            *score += SCORE_BULLET;
            events.push(GameEvent::Explosion {
                pos: bullet.pos,
                color: EffectColor::Yellow,
                scale: 0.5,
            });
            false
        } else {
            true
        }
    });
}

/// Alien bullet on paddle: destroy the bullet, lose a life. The phase check
/// re-runs per bullet because the first hit ends active gameplay.
fn resolve_paddle_bullets(state: &mut GameState) {
    let mut i = 0;
    while i < state.bullets.len() {
        if state.phase != RoundPhase::Playing {
            return;
        }
        if rects_overlap(
            state.paddle.pos,
            Paddle::size(),
            state.bullets[i].pos,
            Bullet::size(),
        ) {
            let pos = state.bullets.remove(i).pos;
            state.push_event(GameEvent::Explosion {
                pos,
                color: EffectColor::Yellow,
                scale: 1.0,
            });
            state.lose_life();
        } else {
            i += 1;
        }
    }
}

/// Alien on paddle: the player loses a life but the alien survives and is
/// forced back toward formation.
fn resolve_paddle_aliens(state: &mut GameState) {
    if state.phase != RoundPhase::Playing {
        return;
    }

    let paddle_pos = state.paddle.pos;
    let grazes: Vec<(usize, usize, Vec2)> = state
        .formation
        .aliens()
        .filter(|alien| {
            rects_overlap(paddle_pos, Paddle::size(), alien.pos, super::Alien::size())
        })
        .map(|alien| (alien.row, alien.col, alien.pos))
        .collect();

    for (row, col, pos) in grazes {
        if state.phase != RoundPhase::Playing {
            return;
        }
        state.push_event(GameEvent::Explosion {
            pos: paddle_pos,
            color: EffectColor::White,
            scale: 1.5,
        });
        state.push_event(GameEvent::Explosion {
            pos,
            color: EffectColor::Green,
            scale: 1.0,
        });
        state.lose_life();
        if let Some(alien) = state.formation.alien_mut(row, col) {
            alien.force_return();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::alien::Alien;
    use glam::Vec2;

    fn playing_state() -> GameState {
        GameState::new(800.0, 1000.0, 7).unwrap()
    }

    fn alien_at(row: usize, col: usize, pos: Vec2, state: AlienState) -> Alien {
        let mut alien = Alien::new(row, col, pos, pos);
        alien.state = state;
        alien
    }

    #[test]
    fn test_ball_kill_scores_by_alien_state() {
        let mut state = playing_state();
        state.ball.pos = Vec2::new(400.0, 700.0);

        assert!(state
            .formation
            .insert(alien_at(0, 0, state.ball.pos, AlienState::InFormation)));
        resolve_contacts(&mut state);
        assert_eq!(state.score, SCORE_ALIEN_IN_FORMATION);
        assert!(state.formation.alien(0, 0).is_none());
        assert_eq!(state.formation.active_count(), 0);

        assert!(state
            .formation
            .insert(alien_at(0, 1, state.ball.pos, AlienState::Attacking)));
        resolve_contacts(&mut state);
        assert_eq!(
            state.score,
            SCORE_ALIEN_IN_FORMATION + SCORE_ALIEN_DIVING
        );
        assert!(state.formation.alien(0, 1).is_none());
    }

    #[test]
    fn test_ball_shoots_down_bullet() {
        let mut state = playing_state();
        state.ball.pos = Vec2::new(400.0, 500.0);
        state.bullets.push(Bullet::new(state.ball.pos));
        state.bullets.push(Bullet::new(Vec2::new(100.0, 900.0)));

        resolve_contacts(&mut state);

        assert_eq!(state.score, SCORE_BULLET);
        assert_eq!(state.bullets.len(), 1);
        // The ball itself is unaffected
        assert_eq!(state.ball.vel, Vec2::ZERO);
    }

    #[test]
    fn test_paddle_deflection_maps_offset_to_angle() {
        let mut state = playing_state();
        state.ball.launched = true;
        state.ball.vel = Vec2::new(0.0, -BALL_SPEED);

        // Hit at the right edge: full +45 degree deflection
        state.ball.pos = Vec2::new(
            state.paddle.pos.x + PADDLE_WIDTH / 2.0,
            state.paddle.pos.y + PADDLE_HEIGHT / 2.0,
        );
        resolve_contacts(&mut state);

        let expected = std::f32::consts::FRAC_PI_4;
        assert!((state.ball.vel.x - BALL_SPEED * expected.sin()).abs() < 0.01);
        assert!(state.ball.vel.y > 0.0);
        assert!((state.ball.vel.length() - BALL_SPEED).abs() < 0.01);

        // Dead-center hit goes straight up
        state.ball.pos = Vec2::new(state.paddle.pos.x, state.paddle.pos.y);
        resolve_contacts(&mut state);
        assert!(state.ball.vel.x.abs() < 0.01);
        assert!(state.ball.vel.y > 0.0);
    }

    #[test]
    fn test_bullet_on_paddle_costs_a_life() {
        let mut state = playing_state();
        state.bullets.push(Bullet::new(state.paddle.pos));

        resolve_contacts(&mut state);

        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert!(state.bullets.is_empty());
        assert_eq!(state.phase, RoundPhase::WaitingToRespawn);
    }

    #[test]
    fn test_two_bullets_same_tick_cost_one_life() {
        let mut state = playing_state();
        state.bullets.push(Bullet::new(state.paddle.pos));
        state.bullets.push(Bullet::new(state.paddle.pos));

        resolve_contacts(&mut state);

        // The first hit ends active gameplay; the second bullet survives
        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_alien_graze_is_not_lethal_to_the_alien() {
        let mut state = playing_state();
        let paddle_pos = state.paddle.pos;
        assert!(state
            .formation
            .insert(alien_at(3, 2, paddle_pos, AlienState::Kamikaze)));

        resolve_contacts(&mut state);

        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert_eq!(state.phase, RoundPhase::WaitingToRespawn);
        let alien = state.formation.alien(3, 2).unwrap();
        assert_eq!(alien.state, AlienState::Returning);
    }

    #[test]
    fn test_paddle_contacts_inert_outside_active_gameplay() {
        let mut state = playing_state();
        state.phase = RoundPhase::WaitingToRespawn;
        state.bullets.push(Bullet::new(state.paddle.pos));
        assert!(state
            .formation
            .insert(alien_at(3, 2, state.paddle.pos, AlienState::Kamikaze)));

        resolve_contacts(&mut state);

        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.bullets.len(), 1);
    }
}
