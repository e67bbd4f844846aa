//! Formation manager
//!
//! Owns the grid of alien slots, the spawn and attack schedulers, and the
//! pulse oscillator. Each slot either is empty or owns exactly one alien;
//! destruction always clears the owning slot in the same tick, so a slot can
//! never hold a dangling alien.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::alien::{Alien, AlienState};
use super::physics::Arena;
use super::state::{Bullet, GameEvent};
use super::timer::RepeatTimer;
use crate::consts::*;

const GRID_CAPACITY: u32 = (FORMATION_ROWS * FORMATION_COLUMNS) as u32;
/// Aliens spawned per level; the pool is larger than the grid, so slots
/// refill as aliens are destroyed.
const MAX_POOL: u32 = GRID_CAPACITY * ALIEN_POOL_FACTOR;

/// Completion notice posted by a kamikaze alien during the update pass and
/// drained later in the same tick, identified by formation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct KamikazeComplete {
    row: usize,
    col: usize,
}

/// The alien formation: a fixed grid of owning slots plus the schedulers
/// that feed and drain it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    /// Row-major grid; row 0 is the top row
    slots: Vec<Option<Alien>>,
    spawn_timer: RepeatTimer,
    attack_timer: RepeatTimer,
    pulse_timer: f32,
    pulse_factor: f32,
    aliens_remaining: u32,
    active_count: u32,
    level_complete_fired: bool,
    completions: Vec<KamikazeComplete>,
}

impl Default for Formation {
    fn default() -> Self {
        Self::new()
    }
}

impl Formation {
    pub fn new() -> Self {
        Self {
            slots: (0..FORMATION_ROWS * FORMATION_COLUMNS).map(|_| None).collect(),
            spawn_timer: RepeatTimer::new(SPAWN_INTERVAL_SECS),
            attack_timer: RepeatTimer::new(ATTACK_INTERVAL_SECS),
            pulse_timer: 0.0,
            pulse_factor: 0.0,
            aliens_remaining: MAX_POOL,
            active_count: 0,
            level_complete_fired: false,
            completions: Vec::new(),
        }
    }

    #[inline]
    fn index(row: usize, col: usize) -> usize {
        row * FORMATION_COLUMNS + col
    }

    pub fn alien(&self, row: usize, col: usize) -> Option<&Alien> {
        self.slots.get(Self::index(row, col))?.as_ref()
    }

    pub(crate) fn alien_mut(&mut self, row: usize, col: usize) -> Option<&mut Alien> {
        self.slots.get_mut(Self::index(row, col))?.as_mut()
    }

    pub fn aliens(&self) -> impl Iterator<Item = &Alien> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }

    /// Aliens still active on this level (equal to the occupied slot count).
    pub fn active_count(&self) -> u32 {
        self.active_count
    }

    /// Aliens left in the spawn pool for this level.
    pub fn remaining_pool(&self) -> u32 {
        self.aliens_remaining
    }

    /// Current pulse factor, for hosts that render the formation grid.
    pub fn pulse_factor(&self) -> f32 {
        self.pulse_factor
    }

    /// True iff no alien is mid-attack, mid-return or mid-kamikaze. Entry
    /// flights do not count against quiescence.
    pub fn all_in_formation(&self) -> bool {
        !self.aliens().any(|alien| {
            matches!(
                alien.state,
                AlienState::Attacking | AlienState::Returning | AlienState::Kamikaze
            )
        })
    }

    /// Take ownership of an alien into its slot, drawing it from the pool.
    /// Returns false if the slot is occupied or the pool is empty.
    pub(crate) fn insert(&mut self, alien: Alien) -> bool {
        if self.aliens_remaining == 0 {
            return false;
        }
        let idx = Self::index(alien.row, alien.col);
        match self.slots.get_mut(idx) {
            Some(slot @ None) => {
                *slot = Some(alien);
                self.aliens_remaining -= 1;
                self.active_count += 1;
                true
            }
            _ => false,
        }
    }

    /// Remove and return the alien owning a slot, if any. Used for ball
    /// kills and kamikaze completions; the counters stay consistent with the
    /// grid in the same call.
    pub(crate) fn take_alien(&mut self, row: usize, col: usize) -> Option<Alien> {
        let alien = self.slots.get_mut(Self::index(row, col))?.take()?;
        self.active_count -= 1;
        Some(alien)
    }

    /// Advance the formation one tick: run the schedulers, refresh
    /// bottom-of-column flags, advance the pulse, drive every alien's state
    /// machine, and process kamikaze completions.
    ///
    /// Returns true exactly once per level, when the last alien is gone and
    /// the pool is exhausted.
    pub fn update(
        &mut self,
        arena: &Arena,
        dt: f32,
        allow_shooting: bool,
        rng: &mut Pcg32,
        bullets: &mut Vec<Bullet>,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let dt = dt.min(MAX_PULSE_DT);

        for _ in 0..self.spawn_timer.advance(dt) {
            self.spawn_alien(arena, rng);
        }
        for _ in 0..self.attack_timer.advance(dt) {
            self.launch_attack(arena, rng);
        }

        self.update_bottom_flags();
        self.update_pulse(arena, dt);

        for slot in self.slots.iter_mut() {
            if let Some(alien) = slot.as_mut() {
                if alien.update(dt, allow_shooting, rng, bullets) {
                    self.completions.push(KamikazeComplete {
                        row: alien.row,
                        col: alien.col,
                    });
                }
            }
        }

        while let Some(done) = self.completions.pop() {
            if let Some(alien) = self.take_alien(done.row, done.col) {
                events.push(GameEvent::AlienDestroyed {
                    row: done.row,
                    col: done.col,
                    pos: alien.pos,
                });
            }
        }

        if self.active_count == 0 && self.aliens_remaining == 0 && !self.level_complete_fired {
            self.level_complete_fired = true;
            log::info!("formation cleared, pool exhausted");
            return true;
        }
        false
    }

    /// Pick a uniformly random empty slot and fly a new alien in from a
    /// random off-screen side. No-op when the pool or the grid is exhausted.
    fn spawn_alien(&mut self, arena: &Arena, rng: &mut Pcg32) {
        if self.aliens_remaining == 0 {
            return;
        }

        let empty: Vec<usize> = (0..self.slots.len())
            .filter(|&idx| self.slots[idx].is_none())
            .collect();
        if empty.is_empty() {
            return;
        }

        let idx = empty[rng.random_range(0..empty.len())];
        let row = idx / FORMATION_COLUMNS;
        let col = idx % FORMATION_COLUMNS;
        let target = self.formation_position(arena, row, col, 0.0);

        let from_left = rng.random_bool(0.5);
        let low = arena.mid_y();
        let high = (arena.max_y() - ENTRY_TOP_MARGIN).max(low);
        let start_y = if high > low {
            rng.random_range(low..=high)
        } else {
            low
        };
        let start_x = if from_left {
            arena.min_x() - ENTRY_SIDE_MARGIN
        } else {
            arena.max_x() + ENTRY_SIDE_MARGIN
        };

        let alien = Alien::new(row, col, Vec2::new(start_x, start_y), target);
        if self.insert(alien) {
            log::debug!(
                "spawned alien into slot ({row}, {col}), {} left in pool",
                self.aliens_remaining
            );
        }
    }

    /// Pick the bottom in-formation alien of a random column and command it
    /// to dive at a random point in the lower band of the arena.
    fn launch_attack(&mut self, arena: &Arena, rng: &mut Pcg32) {
        let mut candidates: Vec<(usize, usize)> = Vec::new();
        for col in 0..FORMATION_COLUMNS {
            for row in (0..FORMATION_ROWS).rev() {
                if let Some(alien) = self.alien(row, col) {
                    if alien.state == AlienState::InFormation {
                        candidates.push((row, col));
                        break;
                    }
                }
            }
        }
        if candidates.is_empty() {
            return;
        }

        let (row, col) = candidates[rng.random_range(0..candidates.len())];
        let target = Vec2::new(
            rng.random_range(
                arena.min_x() + ATTACK_TARGET_X_MARGIN..=arena.max_x() - ATTACK_TARGET_X_MARGIN,
            ),
            arena.min_y() + ATTACK_TARGET_Y,
        );

        if let Some(alien) = self.alien_mut(row, col) {
            alien.command_attack(target, rng);
            log::debug!("alien ({row}, {col}) diving toward {target}");
        }
    }

    /// Clear every bottom flag, then set it on the lowest in-formation alien
    /// of each column. Only flagged aliens may shoot opportunistically.
    fn update_bottom_flags(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Some(alien) = slot.as_mut() {
                alien.bottom_of_column = false;
            }
        }
        for col in 0..FORMATION_COLUMNS {
            for row in (0..FORMATION_ROWS).rev() {
                if let Some(alien) = self.alien_mut(row, col) {
                    if alien.state == AlienState::InFormation {
                        alien.bottom_of_column = true;
                        break;
                    }
                }
            }
        }
    }

    /// Advance the sinusoidal pulse and rewrite every in-formation alien's
    /// position and live target. Diving aliens keep their last target and
    /// re-read it when they script their return.
    fn update_pulse(&mut self, arena: &Arena, dt: f32) {
        self.pulse_timer += dt;
        if self.pulse_timer > PULSE_CYCLE_SECS {
            self.pulse_timer -= PULSE_CYCLE_SECS;
        }
        self.pulse_factor =
            PULSE_AMPLITUDE * (std::f32::consts::TAU * self.pulse_timer / PULSE_CYCLE_SECS).sin();

        let pulse = self.pulse_factor;
        for row in 0..FORMATION_ROWS {
            for col in 0..FORMATION_COLUMNS {
                let target = self.formation_position(arena, row, col, pulse);
                if let Some(alien) = self.alien_mut(row, col) {
                    if alien.state == AlienState::InFormation {
                        alien.pos = target;
                        alien.formation_target = target;
                    }
                }
            }
        }
    }

    /// Slot position for a grid cell, with spacing scaled by the pulse.
    pub fn formation_position(&self, arena: &Arena, row: usize, col: usize, pulse: f32) -> Vec2 {
        let center = Vec2::new(arena.mid_x(), arena.max_y() - FORMATION_TOP_OFFSET);
        let scale = 1.0 + pulse / 100.0;
        let h_spacing = FORMATION_H_SPACING * scale;
        let v_spacing = FORMATION_V_SPACING * scale;
        let start_x = center.x - ((FORMATION_COLUMNS - 1) as f32 * h_spacing) / 2.0;
        Vec2::new(
            start_x + col as f32 * h_spacing,
            center.y - row as f32 * v_spacing,
        )
    }

    /// Stop both schedulers and recall every attacking alien to formation.
    /// Called on life loss so the arena can settle toward quiescence.
    pub(crate) fn stop_attacks(&mut self) {
        self.spawn_timer.stop();
        self.attack_timer.stop();
        for slot in self.slots.iter_mut() {
            if let Some(alien) = slot.as_mut() {
                if alien.state == AlienState::Attacking {
                    alien.force_return();
                }
            }
        }
    }

    /// Restart both schedulers from zero.
    pub(crate) fn reset_timers(&mut self) {
        self.spawn_timer.restart();
        self.attack_timer.restart();
    }

    /// Clear the grid and refill the pool for a fresh level.
    pub(crate) fn reset_level(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.aliens_remaining = MAX_POOL;
        self.active_count = 0;
        self.level_complete_fired = false;
        self.completions.clear();
        self.reset_timers();
    }

    #[cfg(test)]
    pub(crate) fn drain_pool(&mut self) {
        self.aliens_remaining = 0;
    }
}
