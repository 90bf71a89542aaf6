//! Player body and fixed-step physics stepping
//!
//! Real rigid-body physics lives outside the core. The simulation only needs
//! the [`PlayerBody`] contract; [`Avatar`] is the kinematic stand-in used by
//! the game loop and tests.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SUBSTEPS, PHYSICS_DT};
use crate::normalize_angle;
use crate::tuning::PlayerTuning;

/// What combat needs from the player's physical body
pub trait PlayerBody {
    /// Ground position (x = world X, y = world Z)
    fn ground_pos(&self) -> Vec2;
    /// Heading, measured from +Z toward +X
    fn facing(&self) -> f32;
    fn set_facing(&mut self, heading: f32);
    /// Place the body and stop it (respawn, load)
    fn teleport(&mut self, pos: Vec3);
}

/// Kinematic player body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub pos: Vec3,
    pub vel: Vec3,
    pub facing: f32,
}

impl Avatar {
    pub fn new(pos: Vec3) -> Self {
        Self {
            pos,
            vel: Vec3::ZERO,
            facing: 0.0,
        }
    }

    /// Set horizontal velocity from a ground-plane move direction
    pub fn steer(&mut self, dir: Vec2, speed: f32) {
        let dir = dir.clamp_length_max(1.0);
        self.vel.x = dir.x * speed;
        self.vel.z = dir.y * speed;
    }

    /// One fixed physics step
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }
}

impl PlayerBody for Avatar {
    fn ground_pos(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.z)
    }

    fn facing(&self) -> f32 {
        self.facing
    }

    fn set_facing(&mut self, heading: f32) {
        self.facing = normalize_angle(heading);
    }

    fn teleport(&mut self, pos: Vec3) {
        self.pos = pos;
        self.vel = Vec3::ZERO;
    }
}

/// Sprint reserve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamina {
    current: f32,
    max: f32,
    drain: f32,
    regen: f32,
}

impl Stamina {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            current: tuning.max_stamina,
            max: tuning.max_stamina,
            drain: tuning.stamina_drain,
            regen: tuning.stamina_regen,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Spend or recover one frame's worth. Returns true while sprinting.
    pub fn update(&mut self, dt: f32, wants_sprint: bool, moving: bool) -> bool {
        let sprinting = wants_sprint && moving && self.current > 0.0;
        let rate = if sprinting { -self.drain } else { self.regen };
        self.current = (self.current + rate * dt).clamp(0.0, self.max);
        sprinting
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }
}

/// Fixed-timestep accumulator for physics substeps
#[derive(Debug, Clone, Default)]
pub struct Stepper {
    accumulator: f32,
}

impl Stepper {
    /// Bank a frame's delta and return how many fixed steps to run.
    /// Leftover time beyond [`MAX_SUBSTEPS`] is dropped.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= PHYSICS_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= PHYSICS_DT;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(PHYSICS_DT);
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stepper_accumulates() {
        let mut s = Stepper::default();
        assert_eq!(s.advance(PHYSICS_DT * 0.5), 0);
        assert_eq!(s.advance(PHYSICS_DT * 0.6), 1);
        assert_eq!(s.advance(PHYSICS_DT * 2.0), 2);
    }

    #[test]
    fn test_stepper_caps_substeps() {
        let mut s = Stepper::default();
        assert_eq!(s.advance(1.0), MAX_SUBSTEPS);
        // Backlog is not carried into the next frame
        assert!(s.advance(0.0) <= 1);
    }

    #[test]
    fn test_stamina_drains_and_refills() {
        let mut stamina = Stamina::new(&PlayerTuning::default());

        // Standing still never sprints
        assert!(!stamina.update(1.0, true, false));
        assert_eq!(stamina.current(), 100.0);

        for _ in 0..4 {
            assert!(stamina.update(1.0, true, true));
        }
        assert_eq!(stamina.current(), 0.0);
        assert!(!stamina.update(1.0, true, true));
        assert_eq!(stamina.current(), 15.0);

        stamina.update(10.0, false, true);
        assert_eq!(stamina.current(), stamina.max());
    }

    #[test]
    fn test_avatar_moves_on_ground_plane() {
        let mut a = Avatar::new(Vec3::new(0.0, 2.0, 0.0));
        a.steer(Vec2::new(3.0, 4.0), 5.0);
        a.integrate(1.0);
        assert!((a.pos.x - 3.0).abs() < 1e-5);
        assert!((a.pos.z - 4.0).abs() < 1e-5);
        assert_eq!(a.pos.y, 2.0);

        a.teleport(Vec3::ZERO);
        assert_eq!(a.vel, Vec3::ZERO);
        assert_eq!(a.ground_pos(), Vec2::ZERO);
    }
}
