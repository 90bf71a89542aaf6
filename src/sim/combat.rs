//! Player offense and defense
//!
//! Owns weapon selection, cooldown/ammo/reload timing, projectiles, hit
//! resolution against bandits, and the player's own health.

use std::collections::BTreeSet;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::bandit::Bandit;
use super::events::{EventSink, GameEvent};
use super::physics::PlayerBody;
use super::projectile::Projectile;
use super::tick::{Aim, TickInput};
use super::weapon::{WeaponClass, WeaponDef, WeaponKind};
use crate::tuning::PlayerTuning;
use crate::{heading_of, heading_vector, planar_direction, planar_distance};

/// Persisted subset of combat state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub hp: u32,
    pub max_hp: u32,
    pub unlocked_weapons: Vec<WeaponKind>,
    pub current_weapon: WeaponKind,
}

/// HUD readout
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponStatus {
    pub weapon: WeaponKind,
    pub name: &'static str,
    pub ammo: u32,
    pub capacity: u32,
    pub reloading: bool,
}

/// Combat resolution engine
#[derive(Debug, Clone)]
pub struct CombatSystem {
    current_weapon: WeaponKind,
    unlocked: BTreeSet<WeaponKind>,
    cooldown_timer: f32,
    current_ammo: u32,
    reloading: bool,
    reload_timer: f32,
    hp: u32,
    max_hp: u32,
    dead: bool,
    projectiles: Vec<Projectile>,
    next_projectile_id: u32,
    tuning: PlayerTuning,
}

impl CombatSystem {
    pub fn new(tuning: &PlayerTuning) -> Self {
        let weapon = WeaponKind::Fists;
        Self {
            current_weapon: weapon,
            unlocked: BTreeSet::from([weapon]),
            cooldown_timer: 0.0,
            current_ammo: weapon.def().ammo,
            reloading: false,
            reload_timer: 0.0,
            hp: tuning.max_hp,
            max_hp: tuning.max_hp,
            dead: false,
            projectiles: Vec::new(),
            next_projectile_id: 1,
            tuning: tuning.clone(),
        }
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn current_weapon(&self) -> WeaponKind {
        self.current_weapon
    }

    pub fn is_unlocked(&self, weapon: WeaponKind) -> bool {
        self.unlocked.contains(&weapon)
    }

    pub fn ammo(&self) -> u32 {
        self.current_ammo
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown_timer
    }

    /// Bullets currently in flight
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// An attack may start this tick
    pub fn ready(&self) -> bool {
        !self.dead && self.cooldown_timer <= 0.0 && !self.reloading
    }

    pub fn weapon_status(&self) -> WeaponStatus {
        let def = self.current_weapon.def();
        WeaponStatus {
            weapon: self.current_weapon,
            name: def.name,
            ammo: self.current_ammo,
            capacity: def.ammo,
            reloading: self.reloading,
        }
    }

    /// Advance one frame
    pub fn update(
        &mut self,
        dt: f32,
        input: &TickInput,
        body: &mut dyn PlayerBody,
        bandits: &mut [Bandit],
        events: &mut dyn EventSink,
    ) {
        if let Some(weapon) = input.switch_to {
            self.switch_weapon(weapon, events);
        }
        if input.reload {
            self.start_reload(events);
        }
        if self.dead {
            return;
        }

        self.cooldown_timer = (self.cooldown_timer - dt).max(0.0);

        if self.reloading {
            self.reload_timer -= dt;
            if self.reload_timer <= 0.0 {
                self.reloading = false;
                self.current_ammo = self.current_weapon.def().ammo;
                events.emit(GameEvent::ReloadFinished {
                    weapon: self.current_weapon,
                    ammo: self.current_ammo,
                });
            }
        }

        if input.attack && self.ready() {
            self.attack(&input.aim, body, bandits, events);
        }

        self.update_projectiles(dt, bandits, events);
    }

    fn attack(
        &mut self,
        aim: &Aim,
        body: &mut dyn PlayerBody,
        bandits: &mut [Bandit],
        events: &mut dyn EventSink,
    ) {
        let weapon = self.current_weapon.def();
        self.cooldown_timer = weapon.cooldown;

        match weapon.class {
            WeaponClass::Melee => self.melee(weapon, aim, body, bandits, events),
            WeaponClass::Ranged => {
                if self.current_ammo == 0 {
                    self.start_reload(events);
                    return;
                }
                self.fire(weapon, aim, body, events);
                self.current_ammo -= 1;
            }
        }
    }

    /// Ground direction the player is aiming, falling back to current facing
    pub fn aim_forward(aim: &Aim, body: &dyn PlayerBody) -> Vec2 {
        let aimed = match *aim {
            Aim::Point(target) => planar_direction(body.ground_pos(), target),
            Aim::Stick(dir) => dir.normalize_or_zero(),
            Aim::None => Vec2::ZERO,
        };
        if aimed == Vec2::ZERO {
            heading_vector(body.facing())
        } else {
            aimed
        }
    }

    fn melee(
        &mut self,
        weapon: &WeaponDef,
        aim: &Aim,
        body: &mut dyn PlayerBody,
        bandits: &mut [Bandit],
        events: &mut dyn EventSink,
    ) {
        let origin = body.ground_pos();
        let forward = Self::aim_forward(aim, body);
        let heading = heading_of(forward);
        body.set_facing(heading);

        events.emit(GameEvent::MeleeSwing {
            origin,
            heading,
            range: weapon.range,
        });

        for bandit in bandits.iter_mut().filter(|b| !b.is_dead()) {
            let to_bandit = bandit.pos - origin;
            if to_bandit.length() > weapon.range {
                continue;
            }
            if forward.dot(to_bandit.normalize_or_zero()) > self.tuning.melee_cone_dot {
                bandit.take_damage(weapon.damage, events);
                events.emit(GameEvent::DamageDealt {
                    bandit_id: bandit.id.clone(),
                    amount: weapon.damage,
                    at: bandit.pos,
                });
            }
        }
    }

    fn fire(
        &mut self,
        weapon: &WeaponDef,
        aim: &Aim,
        body: &mut dyn PlayerBody,
        events: &mut dyn EventSink,
    ) {
        let origin = body.ground_pos();
        let direction = Self::aim_forward(aim, body);
        body.set_facing(heading_of(direction));

        let id = self.next_projectile_id;
        self.next_projectile_id += 1;
        self.projectiles
            .push(Projectile::new(id, origin, direction, weapon.damage));
        events.emit(GameEvent::ProjectileFired {
            id,
            origin,
            direction,
        });
    }

    fn update_projectiles(&mut self, dt: f32, bandits: &mut [Bandit], events: &mut dyn EventSink) {
        let speed = self.tuning.projectile_speed;
        let lifetime = self.tuning.projectile_lifetime;
        let hit_dist = self.tuning.projectile_hit_dist;

        for proj in self.projectiles.iter_mut().filter(|p| p.active) {
            proj.advance(dt, speed, lifetime);
            if !proj.active {
                events.emit(GameEvent::ProjectileExpired { id: proj.id });
                continue;
            }

            // First live bandit inside the hit radius takes the bullet
            if let Some(bandit) = bandits
                .iter_mut()
                .filter(|b| !b.is_dead())
                .find(|b| planar_distance(proj.pos, b.pos) < hit_dist)
            {
                bandit.take_damage(proj.damage, events);
                proj.active = false;
                events.emit(GameEvent::DamageDealt {
                    bandit_id: bandit.id.clone(),
                    amount: proj.damage,
                    at: bandit.pos,
                });
                events.emit(GameEvent::ProjectileExpired { id: proj.id });
            }
        }

        self.projectiles.retain(|p| p.active);
    }

    /// Begin refilling the magazine. Ignored for melee, full, already reloading or dead.
    pub fn start_reload(&mut self, events: &mut dyn EventSink) {
        let weapon = self.current_weapon.def();
        if self.dead || weapon.ammo == 0 || self.current_ammo >= weapon.ammo || self.reloading {
            return;
        }
        self.reloading = true;
        self.reload_timer = weapon.reload_time;
        events.emit(GameEvent::ReloadStarted {
            weapon: self.current_weapon,
        });
    }

    /// Equip an unlocked weapon with a full magazine. Returns false if locked.
    pub fn switch_weapon(&mut self, weapon: WeaponKind, events: &mut dyn EventSink) -> bool {
        if !self.unlocked.contains(&weapon) {
            return false;
        }
        self.current_weapon = weapon;
        self.current_ammo = weapon.def().ammo;
        self.reloading = false;
        self.reload_timer = 0.0;
        self.cooldown_timer = 0.0;
        events.emit(GameEvent::WeaponChanged { weapon });
        true
    }

    pub fn unlock_weapon(&mut self, weapon: WeaponKind) {
        if self.unlocked.insert(weapon) {
            log::info!("Unlocked {}", weapon.as_str());
        }
    }

    /// Apply a bandit hit. No-op once dead.
    pub fn take_damage(&mut self, amount: u32, events: &mut dyn EventSink) {
        if self.dead {
            return;
        }
        self.hp = self.hp.saturating_sub(amount);
        events.emit(GameEvent::PlayerDamaged {
            amount,
            hp: self.hp,
        });

        if self.hp == 0 {
            self.dead = true;
            self.reloading = false;
            log::info!("Player died");
            events.emit(GameEvent::PlayerDied);
            // Bullets in flight die with the shooter
            for proj in self.projectiles.drain(..) {
                events.emit(GameEvent::ProjectileExpired { id: proj.id });
            }
        }
    }

    /// Restore health up to max. No-op once dead.
    pub fn heal(&mut self, amount: u32) {
        if self.dead {
            return;
        }
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
    }

    /// Full health at the spawn point
    pub fn respawn(&mut self, body: &mut dyn PlayerBody, events: &mut dyn EventSink) {
        self.dead = false;
        self.hp = self.max_hp;
        body.teleport(Vec3::from_array(self.tuning.spawn));
        log::info!("Player respawned");
        events.emit(GameEvent::PlayerRespawned);
    }

    pub fn snapshot(&self) -> CombatSnapshot {
        CombatSnapshot {
            hp: self.hp,
            max_hp: self.max_hp,
            unlocked_weapons: self.unlocked.iter().copied().collect(),
            current_weapon: self.current_weapon,
        }
    }

    /// Load persisted state on top of the current session
    pub fn restore(&mut self, snapshot: &CombatSnapshot, events: &mut dyn EventSink) {
        self.max_hp = snapshot.max_hp.max(1);
        self.hp = snapshot.hp.min(self.max_hp);
        self.dead = self.hp == 0;
        self.unlocked.extend(snapshot.unlocked_weapons.iter().copied());
        if !self.switch_weapon(snapshot.current_weapon, events) {
            self.switch_weapon(WeaponKind::Fists, events);
        }
    }
}
