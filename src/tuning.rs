//! Data-driven game balance
//!
//! Every field defaults to the value in [`crate::consts`], so a tuning file
//! only needs to list what it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Tuning load errors
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value for {field}: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Bandit behavior parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BanditTuning {
    pub max_hp: u32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub disengage_factor: f32,
    pub retreat_hp_threshold: u32,
    pub attack_cooldown: f32,
    pub attack_damage: u32,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub alert_delay: f32,
    pub hit_alert_delay: f32,
    pub patrol_wait: (f32, f32),
    pub death_linger: f32,
    pub bounty: u32,
}

impl Default for BanditTuning {
    fn default() -> Self {
        Self {
            max_hp: BANDIT_MAX_HP,
            detection_range: DETECTION_RANGE,
            attack_range: ATTACK_RANGE,
            disengage_factor: DISENGAGE_FACTOR,
            retreat_hp_threshold: RETREAT_HP_THRESHOLD,
            attack_cooldown: BANDIT_ATTACK_COOLDOWN,
            attack_damage: BANDIT_ATTACK_DAMAGE,
            patrol_speed: PATROL_SPEED,
            chase_speed: CHASE_SPEED,
            alert_delay: ALERT_DELAY,
            hit_alert_delay: HIT_ALERT_DELAY,
            patrol_wait: (PATROL_WAIT_MIN, PATROL_WAIT_MAX),
            death_linger: DEATH_LINGER,
            bounty: BANDIT_BOUNTY,
        }
    }
}

/// Player and projectile parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_hp: u32,
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub max_stamina: f32,
    pub stamina_drain: f32,
    pub stamina_regen: f32,
    pub spawn: [f32; 3],
    pub melee_cone_dot: f32,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
    pub projectile_hit_dist: f32,
    pub pickup_distance: f32,
    pub herb_heal: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_hp: PLAYER_MAX_HP,
            walk_speed: PLAYER_WALK_SPEED,
            sprint_speed: PLAYER_SPRINT_SPEED,
            max_stamina: PLAYER_MAX_STAMINA,
            stamina_drain: STAMINA_DRAIN_RATE,
            stamina_regen: STAMINA_REGEN_RATE,
            spawn: PLAYER_SPAWN,
            melee_cone_dot: MELEE_CONE_DOT,
            projectile_speed: PROJECTILE_SPEED,
            projectile_lifetime: PROJECTILE_LIFETIME,
            projectile_hit_dist: PROJECTILE_HIT_DIST,
            pickup_distance: PICKUP_DISTANCE,
            herb_heal: HERB_HEAL,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub bandit: BanditTuning,
    pub player: PlayerTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!(
            "Loaded tuning (detection {}, attack {})",
            tuning.bandit.detection_range,
            tuning.bandit.attack_range
        );
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let b = &self.bandit;
        if b.max_hp == 0 {
            return Err(TuningError::Invalid {
                field: "bandit.max_hp",
                reason: "must be positive",
            });
        }
        if b.detection_range <= 0.0 || b.attack_range <= 0.0 {
            return Err(TuningError::Invalid {
                field: "bandit.detection_range",
                reason: "ranges must be positive",
            });
        }
        if b.patrol_wait.0 > b.patrol_wait.1 {
            return Err(TuningError::Invalid {
                field: "bandit.patrol_wait",
                reason: "min exceeds max",
            });
        }
        if self.player.max_hp == 0 {
            return Err(TuningError::Invalid {
                field: "player.max_hp",
                reason: "must be positive",
            });
        }
        if self.player.sprint_speed < self.player.walk_speed {
            return Err(TuningError::Invalid {
                field: "player.sprint_speed",
                reason: "slower than walking",
            });
        }
        if self.player.projectile_lifetime <= 0.0 {
            return Err(TuningError::Invalid {
                field: "player.projectile_lifetime",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}
