//! Bandit combatants and their behavior state machine
//!
//! Each tick a live bandit measures the planar distance to the player and
//! runs the handler for its current state:
//!
//! ```text
//! Patrol --spotted--> Alert --delay--> Chase --close--> Attack
//!   ^                                   |  ^              |  |
//!   +------------- lost sight ----------+  +-- too far ---+  +-- hurt --> Retreat
//! ```
//!
//! `Dead` is reachable from every state once hp hits zero and never left.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::events::{EventSink, GameEvent};
use crate::consts::PATROL_ARRIVE_DIST;
use crate::heading_of;
use crate::tuning::BanditTuning;

/// Enemy tag used by kill objectives
pub const ENEMY_TYPE: &str = "bandit";

/// Behavior state; timers live inside the variant that uses them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BanditState {
    /// Wandering around home; `wait` counts down while idling at a target
    Patrol { wait: f32 },
    /// Spotted the player (or got hit), turning to face them
    Alert { timer: f32 },
    Chase,
    Attack,
    /// Fleeing directly away from the player. No exit.
    Retreat,
    /// Terminal; `timer` is how long the body stays visible
    Dead { timer: f32 },
}

impl BanditState {
    pub fn name(&self) -> &'static str {
        match self {
            BanditState::Patrol { .. } => "patrol",
            BanditState::Alert { .. } => "alert",
            BanditState::Chase => "chase",
            BanditState::Attack => "attack",
            BanditState::Retreat => "retreat",
            BanditState::Dead { .. } => "dead",
        }
    }
}

/// Spawn record
#[derive(Debug, Clone, PartialEq)]
pub struct BanditDef {
    pub id: &'static str,
    pub x: f32,
    pub z: f32,
    pub patrol_radius: f32,
}

/// Bandit camps around the village outskirts
pub const BANDIT_SPAWNS: [BanditDef; 8] = [
    BanditDef { id: "bandit-1", x: 35.0, z: 15.0, patrol_radius: 8.0 },
    BanditDef { id: "bandit-2", x: -35.0, z: -10.0, patrol_radius: 8.0 },
    BanditDef { id: "bandit-3", x: 30.0, z: -25.0, patrol_radius: 6.0 },
    BanditDef { id: "bandit-4", x: -30.0, z: 25.0, patrol_radius: 7.0 },
    BanditDef { id: "bandit-5", x: 0.0, z: 40.0, patrol_radius: 10.0 },
    BanditDef { id: "bandit-6", x: -25.0, z: -35.0, patrol_radius: 6.0 },
    BanditDef { id: "bandit-7", x: 25.0, z: 35.0, patrol_radius: 5.0 },
    BanditDef { id: "bandit-8", x: -40.0, z: 0.0, patrol_radius: 8.0 },
];

/// A bandit entity
#[derive(Debug, Clone)]
pub struct Bandit {
    pub id: String,
    home: Vec2,
    patrol_radius: f32,
    /// Ground position (x = world X, y = world Z)
    pub pos: Vec2,
    /// Heading, measured from +Z toward +X
    pub facing: f32,
    hp: u32,
    max_hp: u32,
    state: BanditState,
    attack_cooldown: f32,
    patrol_target: Vec2,
    tuning: BanditTuning,
}

impl Bandit {
    pub fn new<R: Rng + ?Sized>(def: &BanditDef, tuning: &BanditTuning, rng: &mut R) -> Self {
        let home = Vec2::new(def.x, def.z);
        let mut bandit = Self {
            id: def.id.to_string(),
            home,
            patrol_radius: def.patrol_radius.max(0.0),
            pos: home,
            facing: 0.0,
            hp: tuning.max_hp,
            max_hp: tuning.max_hp,
            state: BanditState::Patrol { wait: 0.0 },
            attack_cooldown: 0.0,
            patrol_target: home,
            tuning: tuning.clone(),
        };
        bandit.patrol_target = bandit.pick_patrol_target(rng);
        bandit.state = BanditState::Patrol {
            wait: bandit.random_wait(rng),
        };
        bandit
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn state(&self) -> BanditState {
        self.state
    }

    pub fn home(&self) -> Vec2 {
        self.home
    }

    pub fn patrol_target(&self) -> Vec2 {
        self.patrol_target
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.state, BanditState::Dead { .. })
    }

    /// False once a dead body has lingered long enough to be hidden
    pub fn is_visible(&self) -> bool {
        match self.state {
            BanditState::Dead { timer } => timer > 0.0,
            _ => true,
        }
    }

    /// Advance behavior by one frame
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        player_pos: Vec2,
        rng: &mut R,
        events: &mut dyn EventSink,
    ) {
        if let BanditState::Dead { timer } = &mut self.state {
            *timer = (*timer - dt).max(0.0);
            return;
        }

        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);

        let to_player = player_pos - self.pos;
        let dist = to_player.length();

        match self.state {
            BanditState::Patrol { wait } => self.patrol(dt, wait, dist, rng),
            BanditState::Alert { timer } => {
                self.facing = heading_of(to_player);
                let timer = timer - dt;
                if timer <= 0.0 {
                    self.set_state(BanditState::Chase);
                } else {
                    self.state = BanditState::Alert { timer };
                }
            }
            BanditState::Chase => self.chase(dt, to_player, dist, rng),
            BanditState::Attack => self.attack(to_player, dist, events),
            BanditState::Retreat => self.retreat(dt, to_player, dist),
            BanditState::Dead { .. } => {}
        }
    }

    fn patrol<R: Rng + ?Sized>(&mut self, dt: f32, wait: f32, dist: f32, rng: &mut R) {
        if dist < self.tuning.detection_range {
            self.set_state(BanditState::Alert {
                timer: self.tuning.alert_delay,
            });
            return;
        }

        let to_target = self.patrol_target - self.pos;
        let target_dist = to_target.length();

        if target_dist < PATROL_ARRIVE_DIST {
            // Idle at the target, then wander somewhere new
            let wait = wait - dt;
            if wait <= 0.0 {
                self.patrol_target = self.pick_patrol_target(rng);
                self.state = BanditState::Patrol {
                    wait: self.random_wait(rng),
                };
            } else {
                self.state = BanditState::Patrol { wait };
            }
        } else {
            self.pos += to_target / target_dist * self.tuning.patrol_speed * dt;
            self.facing = heading_of(to_target);
        }
    }

    fn chase<R: Rng + ?Sized>(&mut self, dt: f32, to_player: Vec2, dist: f32, rng: &mut R) {
        if dist < self.tuning.attack_range {
            self.set_state(BanditState::Attack);
            return;
        }
        if dist > self.tuning.detection_range * self.tuning.disengage_factor {
            self.patrol_target = self.pick_patrol_target(rng);
            let wait = self.random_wait(rng);
            self.set_state(BanditState::Patrol { wait });
            return;
        }

        self.pos += to_player / dist * self.tuning.chase_speed * dt;
        self.facing = heading_of(to_player);
    }

    fn attack(&mut self, to_player: Vec2, dist: f32, events: &mut dyn EventSink) {
        self.facing = heading_of(to_player);

        // Low health wins over every distance rule
        if self.hp < self.tuning.retreat_hp_threshold {
            self.set_state(BanditState::Retreat);
            return;
        }
        if dist > self.tuning.attack_range * self.tuning.disengage_factor {
            self.set_state(BanditState::Chase);
            return;
        }

        if self.attack_cooldown <= 0.0 {
            self.attack_cooldown = self.tuning.attack_cooldown;
            events.emit(GameEvent::BanditAttack {
                bandit_id: self.id.clone(),
                damage: self.tuning.attack_damage,
            });
        }
    }

    fn retreat(&mut self, dt: f32, to_player: Vec2, dist: f32) {
        if dist > 0.1 {
            let away = -to_player / dist;
            self.pos += away * self.tuning.chase_speed * dt;
            self.facing = heading_of(away);
        }
    }

    /// Apply damage from the player. No-op once dead.
    pub fn take_damage(&mut self, amount: u32, events: &mut dyn EventSink) {
        if self.is_dead() {
            return;
        }
        self.hp = self.hp.saturating_sub(amount);

        // Getting hit always breaks an unaware patrol
        if matches!(self.state, BanditState::Patrol { .. }) {
            self.set_state(BanditState::Alert {
                timer: self.tuning.hit_alert_delay,
            });
        }

        if self.hp == 0 {
            self.die(events);
        }
    }

    fn die(&mut self, events: &mut dyn EventSink) {
        self.set_state(BanditState::Dead {
            timer: self.tuning.death_linger,
        });
        log::info!("{} killed", self.id);
        events.emit(GameEvent::Kill {
            bandit_id: self.id.clone(),
            enemy_type: ENEMY_TYPE,
        });
        events.emit(GameEvent::EconomyEarn {
            amount: self.tuning.bounty,
        });
    }

    fn set_state(&mut self, next: BanditState) {
        if self.state.name() != next.name() {
            log::debug!("{}: {} -> {}", self.id, self.state.name(), next.name());
        }
        self.state = next;
    }

    fn pick_patrol_target<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let r = self.patrol_radius;
        self.home + Vec2::new(rng.random_range(-r..=r), rng.random_range(-r..=r))
    }

    fn random_wait<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let (min, max) = self.tuning.patrol_wait;
        if min < max {
            rng.random_range(min..max)
        } else {
            min
        }
    }
}
