//! Wild West - bandit AI and real-time combat for a browser adventure game
//!
//! Core modules:
//! - `sim`: Simulation (bandit state machine, combat resolution, event bus)
//! - `economy`: Wallet and shop
//! - `quests`: Quest database and progress tracking
//! - `persistence`: Flat save snapshots
//! - `platform`: Browser/native platform abstraction
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences and key bindings

pub mod economy;
pub mod persistence;
pub mod platform;
pub mod quests;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use economy::{EconomyError, Shop, Wallet};
pub use quests::QuestLog;
pub use settings::{KeyAction, KeyBindings, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
///
/// Positions on the ground plane are `Vec2` where `x` is world X and `y` is world Z.
pub mod consts {
    /// Fixed physics timestep (60 Hz)
    pub const PHYSICS_DT: f32 = 1.0 / 60.0;
    /// Maximum physics substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the browser host will feed into a tick
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Bandit sensing and movement
    pub const DETECTION_RANGE: f32 = 15.0;
    pub const ATTACK_RANGE: f32 = 2.0;
    /// Chase gives up beyond this multiple of the detection range
    pub const DISENGAGE_FACTOR: f32 = 1.5;
    pub const RETREAT_HP_THRESHOLD: u32 = 20;
    pub const BANDIT_ATTACK_COOLDOWN: f32 = 1.2;
    pub const BANDIT_ATTACK_DAMAGE: u32 = 12;
    pub const PATROL_SPEED: f32 = 2.0;
    pub const CHASE_SPEED: f32 = 4.0;
    pub const BANDIT_MAX_HP: u32 = 60;
    /// Distance at which a patrol target counts as reached
    pub const PATROL_ARRIVE_DIST: f32 = 0.5;
    /// Patrol wait window (seconds)
    pub const PATROL_WAIT_MIN: f32 = 2.0;
    pub const PATROL_WAIT_MAX: f32 = 5.0;
    /// Alert delay after spotting the player
    pub const ALERT_DELAY: f32 = 0.5;
    /// Alert delay after being hit while unaware
    pub const HIT_ALERT_DELAY: f32 = 0.2;
    /// Dead body stays visible this long
    pub const DEATH_LINGER: f32 = 3.0;
    /// Currency dropped by a dead bandit
    pub const BANDIT_BOUNTY: u32 = 15;

    /// Player
    pub const PLAYER_MAX_HP: u32 = 100;
    /// Walk and sprint speed (units/s)
    pub const PLAYER_WALK_SPEED: f32 = 24.0;
    pub const PLAYER_SPRINT_SPEED: f32 = 42.0;
    /// Stamina pool; drains per second while sprinting, refills otherwise
    pub const PLAYER_MAX_STAMINA: f32 = 100.0;
    pub const STAMINA_DRAIN_RATE: f32 = 25.0;
    pub const STAMINA_REGEN_RATE: f32 = 15.0;
    /// Respawn point (x, y, z)
    pub const PLAYER_SPAWN: [f32; 3] = [0.0, 2.0, 0.0];

    /// Melee cone: dot(forward, to_target) must exceed this
    pub const MELEE_CONE_DOT: f32 = 0.3;

    /// Projectiles
    pub const PROJECTILE_SPEED: f32 = 40.0;
    pub const PROJECTILE_LIFETIME: f32 = 2.0;
    pub const PROJECTILE_HIT_DIST: f32 = 1.0;

    /// Collectibles
    pub const PICKUP_DISTANCE: f32 = 1.5;
    pub const HERB_HEAL: u32 = 25;

    /// Seconds between automatic saves
    pub const AUTOSAVE_INTERVAL: f32 = 60.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Planar distance between two ground positions
#[inline]
pub fn planar_distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Unit direction from `from` to `to` (zero if they coincide)
#[inline]
pub fn planar_direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Heading angle of a ground direction, measured from +Z toward +X
#[inline]
pub fn heading_of(dir: Vec2) -> f32 {
    dir.x.atan2(dir.y)
}

/// Unit ground direction for a heading angle (inverse of [`heading_of`])
#[inline]
pub fn heading_vector(heading: f32) -> Vec2 {
    Vec2::new(heading.sin(), heading.cos())
}
