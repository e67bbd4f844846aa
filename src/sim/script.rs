//! Scripted motion descriptors
//!
//! Attack curves, kamikaze dives and formation entry/return moves are
//! time-bounded interpolations resumed every tick, not blocking operations.
//! A script is a small tree of [`Action`] nodes advanced by elapsed time.
//! Dropping a script mid-run (cancellation) discards the remainder of the
//! path; there are no deferred completion callbacks that could fire late.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One node of a scripted motion.
///
/// Leaf nodes interpolate the entity's position or rotation; `Group` runs
/// children in parallel and completes when all of them complete; `Sequence`
/// runs children back to back, carrying leftover tick time into the next
/// child so node boundaries do not quantize to tick boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Action {
    /// Linear move to an absolute point. The start position is captured on
    /// the first advance, so a canceled-and-rescripted entity moves from its
    /// current live position.
    MoveTo {
        from: Option<Vec2>,
        to: Vec2,
        secs: f32,
        elapsed: f32,
    },
    /// Cubic Bezier move. Control points and end are offsets from the
    /// position at node start.
    CurveTo {
        from: Option<Vec2>,
        c1: Vec2,
        c2: Vec2,
        end: Vec2,
        secs: f32,
        elapsed: f32,
    },
    /// Rotate to an absolute angle in radians.
    RotateTo {
        from: Option<f32>,
        angle: f32,
        secs: f32,
        elapsed: f32,
    },
    /// Idle for a duration.
    Wait { secs: f32, elapsed: f32 },
    /// Request one projectile, then complete immediately.
    FireOnce { done: bool },
    /// Run children in parallel.
    Group(Vec<Action>),
    /// Run children back to back.
    Sequence { actions: Vec<Action>, index: usize },
}

impl Action {
    pub fn move_to(to: Vec2, secs: f32) -> Self {
        Action::MoveTo {
            from: None,
            to,
            secs,
            elapsed: 0.0,
        }
    }

    pub fn curve_to(c1: Vec2, c2: Vec2, end: Vec2, secs: f32) -> Self {
        Action::CurveTo {
            from: None,
            c1,
            c2,
            end,
            secs,
            elapsed: 0.0,
        }
    }

    pub fn rotate_to(angle: f32, secs: f32) -> Self {
        Action::RotateTo {
            from: None,
            angle,
            secs,
            elapsed: 0.0,
        }
    }

    pub fn wait(secs: f32) -> Self {
        Action::Wait { secs, elapsed: 0.0 }
    }

    pub fn fire_once() -> Self {
        Action::FireOnce { done: false }
    }

    pub fn group(actions: Vec<Action>) -> Self {
        Action::Group(actions)
    }

    pub fn sequence(actions: Vec<Action>) -> Self {
        Action::Sequence { actions, index: 0 }
    }

    /// Advance the script by `dt`, interpolating `pos` and `rotation` and
    /// counting fire requests into `shots`.
    ///
    /// Returns `Some(leftover)` once the node has completed, where `leftover`
    /// is the unconsumed portion of `dt`. Returns `None` while still running.
    pub fn advance(
        &mut self,
        dt: f32,
        pos: &mut Vec2,
        rotation: &mut f32,
        shots: &mut u32,
    ) -> Option<f32> {
        match self {
            Action::MoveTo {
                from,
                to,
                secs,
                elapsed,
            } => {
                let start = *from.get_or_insert(*pos);
                *elapsed += dt;
                if *elapsed >= *secs {
                    *pos = *to;
                    Some((*elapsed - *secs).max(0.0))
                } else {
                    *pos = start.lerp(*to, *elapsed / *secs);
                    None
                }
            }
            Action::CurveTo {
                from,
                c1,
                c2,
                end,
                secs,
                elapsed,
            } => {
                let start = *from.get_or_insert(*pos);
                *elapsed += dt;
                if *elapsed >= *secs {
                    *pos = start + *end;
                    Some((*elapsed - *secs).max(0.0))
                } else {
                    let t = *elapsed / *secs;
                    *pos = cubic_bezier(start, start + *c1, start + *c2, start + *end, t);
                    None
                }
            }
            Action::RotateTo {
                from,
                angle,
                secs,
                elapsed,
            } => {
                let start = *from.get_or_insert(*rotation);
                *elapsed += dt;
                if *elapsed >= *secs {
                    *rotation = *angle;
                    Some((*elapsed - *secs).max(0.0))
                } else {
                    let t = *elapsed / *secs;
                    *rotation = start + (*angle - start) * t;
                    None
                }
            }
            Action::Wait { secs, elapsed } => {
                *elapsed += dt;
                if *elapsed >= *secs {
                    Some((*elapsed - *secs).max(0.0))
                } else {
                    None
                }
            }
            Action::FireOnce { done } => {
                if !*done {
                    *done = true;
                    *shots += 1;
                }
                Some(dt)
            }
            Action::Group(actions) => {
                let mut all_done = true;
                let mut min_leftover = dt;
                for action in actions.iter_mut() {
                    match action.advance(dt, pos, rotation, shots) {
                        Some(leftover) => min_leftover = min_leftover.min(leftover),
                        None => all_done = false,
                    }
                }
                if all_done { Some(min_leftover) } else { None }
            }
            Action::Sequence { actions, index } => {
                let mut remaining = dt;
                while *index < actions.len() {
                    match actions[*index].advance(remaining, pos, rotation, shots) {
                        Some(leftover) => {
                            *index += 1;
                            remaining = leftover;
                        }
                        None => return None,
                    }
                }
                Some(remaining)
            }
        }
    }
}

/// Evaluate a cubic Bezier curve at parameter `t` in [0, 1].
fn cubic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}
