//! Simulation module
//!
//! All gameplay logic lives here. This module stays free of rendering and
//! DOM access:
//! - Seeded RNG only
//! - Stable iteration order (spawn table order)
//! - Presentation learns about the world through bus events and ids

pub mod bandit;
pub mod combat;
pub mod events;
pub mod physics;
pub mod pickup;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod weapon;

pub use bandit::{BANDIT_SPAWNS, Bandit, BanditDef, BanditState};
pub use combat::{CombatSnapshot, CombatSystem, WeaponStatus};
pub use events::{EventBus, EventSink, GameEvent, SubscriptionId, Topic};
pub use physics::{Avatar, PlayerBody, Stamina, Stepper};
pub use pickup::{COLLECTIBLE_SPAWNS, Collectible, ItemKind};
pub use projectile::Projectile;
pub use state::{GamePhase, GameState, Hud};
pub use tick::{Aim, TickInput, tick};
pub use weapon::{WeaponClass, WeaponDef, WeaponKind};
