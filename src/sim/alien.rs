//! Alien entity state machine
//!
//! Each alien flies in from off-screen, holds a formation slot, and is
//! periodically commanded to dive at the player. After enough dives the next
//! command becomes a one-way kamikaze run. All scripted moves are [`Action`]
//! trees resumed every tick; replacing the script cancels the current path
//! from the alien's live position.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::script::Action;
use super::state::Bullet;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlienState {
    /// Scripted entry move toward the assigned formation slot
    Flying,
    /// Holding its slot, tracking the formation pulse
    InFormation,
    /// Mid attack dive
    Attacking,
    /// Scripted move back to the formation slot
    Returning,
    /// Terminal suicide dive
    Kamikaze,
}

/// One alien, owned by its formation slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alien {
    /// Formation slot identity
    pub row: usize,
    pub col: usize,
    pub pos: Vec2,
    /// Rotation in radians; scripted dives orient the sprite
    pub rotation: f32,
    /// Live slot position; rewritten every tick by the formation pulse while
    /// the alien is in formation
    pub formation_target: Vec2,
    pub state: AlienState,
    /// Set by the formation manager on the lowest in-formation alien of each
    /// column; gates opportunistic shooting
    pub bottom_of_column: bool,
    attack_count: u32,
    script: Option<Action>,
}

impl Alien {
    /// Create an alien at its off-screen entry position and start the entry
    /// flight toward the assigned slot.
    pub fn new(row: usize, col: usize, start: Vec2, formation_target: Vec2) -> Self {
        Self {
            row,
            col,
            pos: start,
            rotation: 0.0,
            formation_target,
            state: AlienState::Flying,
            bottom_of_column: false,
            attack_count: 0,
            script: Some(Action::move_to(formation_target, ALIEN_ENTRY_SECS)),
        }
    }

    #[inline]
    pub fn size() -> Vec2 {
        Vec2::splat(ALIEN_SIZE)
    }

    pub fn attack_count(&self) -> u32 {
        self.attack_count
    }

    /// Command an attack dive toward `target`. Silent no-op unless the alien
    /// is currently in formation (benign race between the attack scheduler
    /// and entity state).
    ///
    /// Each command increments the attack counter; past the threshold the
    /// command routes to a kamikaze dive instead of a normal attack.
    pub fn command_attack(&mut self, target: Vec2, rng: &mut Pcg32) {
        if self.state != AlienState::InFormation {
            return;
        }

        self.attack_count += 1;
        if self.attack_count > MAX_ATTACKS_BEFORE_KAMIKAZE {
            self.begin_kamikaze();
            return;
        }

        self.state = AlienState::Attacking;

        let c1 = Vec2::new(
            rng.random_range(-ATTACK_CONTROL_X..=ATTACK_CONTROL_X),
            rng.random_range(-ATTACK_CONTROL_Y..=0.0),
        );
        let c2 = Vec2::new(
            rng.random_range(-ATTACK_CONTROL_X..=ATTACK_CONTROL_X),
            rng.random_range(-ATTACK_CONTROL_Y..=0.0),
        );
        let end = target - self.pos;

        // Dive along the randomized curve, firing once at the midpoint
        self.script = Some(Action::group(vec![
            Action::curve_to(c1, c2, end, ALIEN_ATTACK_SECS),
            Action::sequence(vec![Action::wait(ALIEN_ATTACK_SECS / 2.0), Action::fire_once()]),
        ]));
    }

    fn begin_kamikaze(&mut self) {
        self.state = AlienState::Kamikaze;

        let dive_target = Vec2::new(self.pos.x, KAMIKAZE_EXIT_Y);
        let mut burst = Vec::new();
        for _ in 0..KAMIKAZE_SHOTS {
            burst.push(Action::fire_once());
            burst.push(Action::wait(KAMIKAZE_SHOT_GAP_SECS));
        }

        self.script = Some(Action::sequence(vec![
            Action::rotate_to(std::f32::consts::PI, KAMIKAZE_SPIN_SECS),
            Action::group(vec![
                Action::move_to(dive_target, KAMIKAZE_DIVE_SECS),
                Action::sequence(burst),
            ]),
        ]));
    }

    /// Cancel a dive and send the alien back to formation. Silent no-op for
    /// aliens that are not mid-dive.
    pub fn force_return(&mut self) {
        if !matches!(self.state, AlienState::Attacking | AlienState::Kamikaze) {
            return;
        }
        self.begin_return();
    }

    /// Script the return move to the current formation target, normalizing
    /// rotation to the nearest right angle on the way.
    fn begin_return(&mut self) {
        self.state = AlienState::Returning;

        use std::f32::consts::FRAC_PI_2;
        let nearest_right_angle = (self.rotation / FRAC_PI_2).round() * FRAC_PI_2;

        self.script = Some(Action::group(vec![
            Action::move_to(self.formation_target, ALIEN_RETURN_SECS),
            Action::rotate_to(nearest_right_angle, ALIEN_RETURN_SECS),
        ]));
    }

    /// Fire one projectile from the alien's lower edge. Rejected while still
    /// flying in.
    pub fn shoot(&self) -> Option<Bullet> {
        if self.state == AlienState::Flying {
            return None;
        }
        Some(Bullet::new(Vec2::new(
            self.pos.x,
            self.pos.y - ALIEN_SIZE / 2.0,
        )))
    }

    /// Advance the alien one tick: run the active script, emit any scripted
    /// shots, roll the opportunistic formation shot, and apply the state
    /// transition when a script completes.
    ///
    /// Returns true when a kamikaze dive has finished; the formation manager
    /// removes the alien in response. Scripted animation always runs, but no
    /// projectile leaves the alien unless `allow_shooting` is set.
    pub fn update(
        &mut self,
        dt: f32,
        allow_shooting: bool,
        rng: &mut Pcg32,
        bullets: &mut Vec<Bullet>,
    ) -> bool {
        let mut shots = 0;
        let mut completed = false;
        if let Some(script) = self.script.as_mut() {
            if script
                .advance(dt, &mut self.pos, &mut self.rotation, &mut shots)
                .is_some()
            {
                completed = true;
            }
        }

        if allow_shooting {
            for _ in 0..shots {
                if let Some(bullet) = self.shoot() {
                    bullets.push(bullet);
                }
            }

            if self.state == AlienState::InFormation && self.bottom_of_column {
                let p = (ALIEN_SHOOTS_PER_SECOND * dt as f64).clamp(0.0, 1.0);
                if rng.random_bool(p) {
                    if let Some(bullet) = self.shoot() {
                        bullets.push(bullet);
                    }
                }
            }
        }

        if completed {
            self.script = None;
            match self.state {
                AlienState::Flying | AlienState::Returning => {
                    self.state = AlienState::InFormation;
                }
                AlienState::Attacking => self.begin_return(),
                AlienState::Kamikaze => return true,
                AlienState::InFormation => {}
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    fn formation_alien() -> Alien {
        let mut alien = Alien::new(1, 2, Vec2::new(-50.0, 700.0), Vec2::new(300.0, 750.0));
        // Fast-forward the entry flight
        let mut bullets = Vec::new();
        alien.update(ALIEN_ENTRY_SECS + 0.01, true, &mut rng(), &mut bullets);
        assert_eq!(alien.state, AlienState::InFormation);
        alien
    }

    #[test]
    fn test_entry_flight_ends_in_formation() {
        let target = Vec2::new(300.0, 750.0);
        let mut alien = Alien::new(0, 0, Vec2::new(850.0, 600.0), target);
        let mut bullets = Vec::new();

        for _ in 0..89 {
            alien.update(1.0 / 60.0, true, &mut rng(), &mut bullets);
        }
        assert_eq!(alien.state, AlienState::Flying);

        // Accumulated f32 ticks land a hair short of the full duration, so
        // the final step carries an extra tick
        alien.update(2.0 / 60.0, true, &mut rng(), &mut bullets);
        assert_eq!(alien.state, AlienState::InFormation);
        assert!((alien.pos - target).length() < 0.001);
    }

    #[test]
    fn test_attack_rejected_unless_in_formation() {
        let mut alien = Alien::new(0, 0, Vec2::new(850.0, 600.0), Vec2::new(300.0, 750.0));
        alien.command_attack(Vec2::new(400.0, 400.0), &mut rng());
        assert_eq!(alien.state, AlienState::Flying);
        assert_eq!(alien.attack_count(), 0);
    }

    #[test]
    fn test_shoot_rejected_while_flying() {
        let alien = Alien::new(0, 0, Vec2::new(850.0, 600.0), Vec2::new(300.0, 750.0));
        assert!(alien.shoot().is_none());
    }

    #[test]
    fn test_attack_fires_once_midway_then_returns() {
        let mut alien = formation_alien();
        let mut r = rng();
        alien.command_attack(Vec2::new(400.0, 400.0), &mut r);
        assert_eq!(alien.state, AlienState::Attacking);

        let mut bullets = Vec::new();
        // First half of the dive: no shot yet
        alien.update(ALIEN_ATTACK_SECS / 2.0 - 0.05, true, &mut r, &mut bullets);
        assert!(bullets.is_empty());

        // Crossing the midpoint fires exactly one projectile
        alien.update(0.1, true, &mut r, &mut bullets);
        assert_eq!(bullets.len(), 1);
        assert!(bullets[0].pos.y < alien.pos.y);

        // Finishing the curve flips into the return leg
        alien.update(ALIEN_ATTACK_SECS / 2.0, true, &mut r, &mut bullets);
        assert_eq!(alien.state, AlienState::Returning);
        assert_eq!(bullets.len(), 1);

        // And the return leg ends back in formation
        alien.update(ALIEN_RETURN_SECS + 0.01, true, &mut r, &mut bullets);
        assert_eq!(alien.state, AlienState::InFormation);
    }

    #[test]
    fn test_fourth_attack_routes_to_kamikaze() {
        let mut alien = formation_alien();
        let mut r = rng();

        for _ in 0..MAX_ATTACKS_BEFORE_KAMIKAZE {
            alien.command_attack(Vec2::new(400.0, 400.0), &mut r);
            assert_eq!(alien.state, AlienState::Attacking);
            // Put it straight back for the next command
            alien.state = AlienState::InFormation;
            alien.script = None;
        }

        alien.command_attack(Vec2::new(400.0, 400.0), &mut r);
        assert_eq!(alien.state, AlienState::Kamikaze);
        assert_eq!(alien.attack_count(), MAX_ATTACKS_BEFORE_KAMIKAZE + 1);
    }

    #[test]
    fn test_kamikaze_dive_fires_burst_and_completes() {
        let mut alien = formation_alien();
        alien.attack_count = MAX_ATTACKS_BEFORE_KAMIKAZE;
        let mut r = rng();
        alien.command_attack(Vec2::new(400.0, 400.0), &mut r);
        assert_eq!(alien.state, AlienState::Kamikaze);

        let mut bullets = Vec::new();
        let mut complete = false;
        let total = KAMIKAZE_SPIN_SECS + KAMIKAZE_DIVE_SECS + 0.1;
        let steps = (total / (1.0 / 60.0)).ceil() as u32;
        for _ in 0..steps {
            if alien.update(1.0 / 60.0, true, &mut r, &mut bullets) {
                complete = true;
                break;
            }
        }

        assert!(complete);
        assert_eq!(bullets.len(), KAMIKAZE_SHOTS as usize);
        assert!(alien.pos.y < 0.0);
        assert!((alien.rotation - std::f32::consts::PI).abs() < 0.001);
    }

    #[test]
    fn test_kamikaze_never_fires_with_shooting_disabled() {
        let mut alien = formation_alien();
        alien.attack_count = MAX_ATTACKS_BEFORE_KAMIKAZE;
        let mut r = rng();
        alien.command_attack(Vec2::new(400.0, 400.0), &mut r);

        let mut bullets = Vec::new();
        let total = KAMIKAZE_SPIN_SECS + KAMIKAZE_DIVE_SECS + 0.1;
        let steps = (total / (1.0 / 60.0)).ceil() as u32;
        for _ in 0..steps {
            alien.update(1.0 / 60.0, false, &mut r, &mut bullets);
        }
        assert!(bullets.is_empty());
    }

    #[test]
    fn test_force_return_cancels_a_dive() {
        let mut alien = formation_alien();
        let mut r = rng();
        alien.command_attack(Vec2::new(400.0, 400.0), &mut r);

        let mut bullets = Vec::new();
        alien.update(0.5, true, &mut r, &mut bullets);
        let mid_dive = alien.pos;

        alien.force_return();
        assert_eq!(alien.state, AlienState::Returning);

        // The return move starts from the live mid-dive position
        alien.update(0.01, true, &mut r, &mut bullets);
        assert!((alien.pos - mid_dive).length() < 10.0);

        alien.update(ALIEN_RETURN_SECS, true, &mut r, &mut bullets);
        assert_eq!(alien.state, AlienState::InFormation);
    }

    #[test]
    fn test_force_return_is_noop_in_formation() {
        let mut alien = formation_alien();
        alien.force_return();
        assert_eq!(alien.state, AlienState::InFormation);
    }
}
