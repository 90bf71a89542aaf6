//! Game state
//!
//! Everything the per-frame tick mutates lives here, along with the bus
//! wiring between combat, the wallet and the quest log.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bandit::{BANDIT_SPAWNS, Bandit};
use super::combat::{CombatSnapshot, CombatSystem};
use super::events::{EventBus, GameEvent, Topic};
use super::physics::{Avatar, PlayerBody, Stamina, Stepper};
use super::pickup::{Collectible, spawn_collectibles};
use super::weapon::WeaponKind;
use crate::economy::{EconomyError, ItemCategory, Shop, Wallet};
use crate::persistence::{PlayerSave, SAVE_VERSION, SaveData};
use crate::quests::{ObjectiveKind, QuestDef, QuestLog, QuestNotice};
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Pause toggle; ticks do nothing
    Paused,
    /// Player died; waiting for respawn or load
    GameOver,
}

/// What the HUD shows each frame
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub hp: u32,
    pub max_hp: u32,
    pub weapon: &'static str,
    pub ammo: u32,
    pub capacity: u32,
    pub reloading: bool,
    pub stamina: f32,
    pub max_stamina: f32,
    pub balance: u32,
}

/// Complete game state
#[derive(Debug)]
pub struct GameState {
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Seconds of unpaused play
    pub time: f32,
    pub time_ticks: u64,

    pub avatar: Avatar,
    pub stamina: Stamina,
    pub stepper: Stepper,
    pub bandits: Vec<Bandit>,
    pub combat: CombatSystem,
    pub collectibles: Vec<Collectible>,

    pub bus: EventBus,
    pub wallet: Rc<RefCell<Wallet>>,
    pub quests: Rc<RefCell<QuestLog>>,
    pub shop: Shop,

    /// A save elixir was drunk; the host should persist and clear this
    pub save_requested: bool,
}

impl GameState {
    /// Create a new game with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let bandits = BANDIT_SPAWNS
            .iter()
            .map(|def| Bandit::new(def, &tuning.bandit, &mut rng))
            .collect();

        let mut state = Self {
            seed,
            rng,
            phase: GamePhase::Playing,
            time: 0.0,
            time_ticks: 0,
            avatar: Avatar::new(Vec3::from_array(tuning.player.spawn)),
            stamina: Stamina::new(&tuning.player),
            stepper: Stepper::default(),
            bandits,
            combat: CombatSystem::new(&tuning.player),
            collectibles: spawn_collectibles(),
            bus: EventBus::new(),
            wallet: Rc::new(RefCell::new(Wallet::default())),
            quests: Rc::new(RefCell::new(QuestLog::new())),
            shop: Shop::new(),
            save_requested: false,
            tuning,
        };
        state.wire_bus();
        state
    }

    /// Wallet and quest log listen on the bus. Quest rewards are credited
    /// straight to the wallet since handlers cannot publish.
    fn wire_bus(&mut self) {
        let wallet = Rc::clone(&self.wallet);
        self.bus.subscribe(
            Topic::EconomyEarn,
            Box::new(move |event: &GameEvent| {
                if let GameEvent::EconomyEarn { amount } = event {
                    wallet.borrow_mut().earn(*amount);
                }
            }),
        );

        let wallet = Rc::clone(&self.wallet);
        let quests = Rc::clone(&self.quests);
        self.bus.subscribe(
            Topic::CombatKill,
            Box::new(move |event: &GameEvent| {
                if let GameEvent::Kill { enemy_type, .. } = event {
                    let reward = quests.borrow_mut().record(ObjectiveKind::Kill, enemy_type);
                    if let Some(reward) = reward {
                        wallet.borrow_mut().earn(reward);
                    }
                }
            }),
        );

        let wallet = Rc::clone(&self.wallet);
        let quests = Rc::clone(&self.quests);
        self.bus.subscribe(
            Topic::ItemCollected,
            Box::new(move |event: &GameEvent| {
                if let GameEvent::ItemCollected { item, .. } = event {
                    let reward = quests
                        .borrow_mut()
                        .record(ObjectiveKind::Collect, item.as_str());
                    if let Some(reward) = reward {
                        wallet.borrow_mut().earn(reward);
                    }
                }
            }),
        );
    }

    pub fn player_pos(&self) -> Vec2 {
        self.avatar.ground_pos()
    }

    pub fn balance(&self) -> u32 {
        self.wallet.borrow().balance()
    }

    pub fn hud(&self) -> Hud {
        let weapon = self.combat.weapon_status();
        Hud {
            hp: self.combat.hp(),
            max_hp: self.combat.max_hp(),
            weapon: weapon.name,
            ammo: weapon.ammo,
            capacity: weapon.capacity,
            reloading: weapon.reloading,
            stamina: self.stamina.current(),
            max_stamina: self.stamina.max(),
            balance: self.balance(),
        }
    }

    /// Buy a shop item; weapons are unlocked right away
    pub fn buy(&mut self, item_id: &str) -> Result<(), EconomyError> {
        let item = {
            let mut wallet = self.wallet.borrow_mut();
            self.shop.buy(item_id, &mut wallet)?
        };
        if let ItemCategory::Weapon(weapon) = item.category {
            self.combat.unlock_weapon(weapon);
        }
        self.bus.publish(GameEvent::ShopPurchased {
            item_id: item.id.to_string(),
        });
        Ok(())
    }

    pub fn quests_offered_by(&self, npc: &str) -> Vec<&'static QuestDef> {
        self.quests.borrow().available_for(npc)
    }

    pub fn accept_quest(&mut self, quest_id: &str) -> bool {
        let accepted = self.quests.borrow_mut().accept(quest_id);
        if accepted {
            self.bus.publish(GameEvent::QuestAccepted {
                quest_id: quest_id.to_string(),
            });
        }
        accepted
    }

    /// Hand over a delivery to `npc`. Returns the reward if a quest finished.
    pub fn deliver(&mut self, npc: &str) -> Option<u32> {
        let reward = self.quests.borrow_mut().complete_delivery(npc)?;
        self.wallet.borrow_mut().earn(reward);
        Some(reward)
    }

    pub fn drain_quest_notices(&self) -> Vec<QuestNotice> {
        self.quests.borrow_mut().drain_notices()
    }

    /// Returns and clears a pending save-elixir request
    pub fn take_save_request(&mut self) -> bool {
        std::mem::take(&mut self.save_requested)
    }

    /// Back to full health at spawn and resume play
    pub fn respawn(&mut self) {
        self.combat.respawn(&mut self.avatar, &mut self.bus);
        self.stamina.refill();
        self.stepper.reset();
        self.phase = GamePhase::Playing;
    }

    /// Flat snapshot for persistence
    pub fn snapshot(&self, timestamp: f64) -> SaveData {
        let combat = self.combat.snapshot();
        SaveData {
            version: SAVE_VERSION,
            timestamp,
            player: PlayerSave {
                x: self.avatar.pos.x,
                y: self.avatar.pos.y,
                z: self.avatar.pos.z,
                hp: combat.hp,
                max_hp: combat.max_hp,
            },
            wallet: self.balance(),
            quests: self.quests.borrow().snapshot(),
            shop: self.shop.snapshot(),
            unlocked_weapons: combat
                .unlocked_weapons
                .iter()
                .map(|w| w.as_str().to_string())
                .collect(),
            current_weapon: combat.current_weapon.as_str().to_string(),
            collected_items: self
                .collectibles
                .iter()
                .filter(|c| c.collected)
                .map(|c| c.id.clone())
                .collect(),
        }
    }

    /// Apply a snapshot on top of the running session
    pub fn restore(&mut self, data: &SaveData) {
        self.avatar
            .teleport(Vec3::new(data.player.x, data.player.y, data.player.z));
        self.stepper.reset();
        self.combat.restore(
            &CombatSnapshot {
                hp: data.player.hp,
                max_hp: data.player.max_hp,
                unlocked_weapons: data
                    .unlocked_weapons
                    .iter()
                    .filter_map(|key| WeaponKind::from_str(key))
                    .collect(),
                current_weapon: WeaponKind::from_str(&data.current_weapon)
                    .unwrap_or(WeaponKind::Fists),
            },
            &mut self.bus,
        );
        *self.wallet.borrow_mut() = Wallet::new(data.wallet);
        self.quests.borrow_mut().restore(&data.quests);
        self.shop.restore(&data.shop);
        for item in &mut self.collectibles {
            if data.collected_items.contains(&item.id) {
                item.collected = true;
            }
        }

        self.phase = if self.combat.is_dead() {
            GamePhase::GameOver
        } else {
            GamePhase::Playing
        };
        log::info!("Restored save from {}", data.timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.bandits.len(), 8);
        assert_eq!(state.collectibles.len(), 19);
        assert_eq!(state.balance(), 0);
        assert_eq!(state.player_pos(), Vec2::ZERO);
    }

    #[test]
    fn test_bounty_reaches_wallet() {
        let mut state = GameState::new(7);
        state.bandits[0].take_damage(60, &mut state.bus);
        assert_eq!(state.balance(), 15);
    }

    #[test]
    fn test_kill_quest_reward_paid_once() {
        let mut state = GameState::new(7);
        assert!(state.accept_quest("protect-town"));

        state.bandits[0].take_damage(60, &mut state.bus);
        state.bandits[1].take_damage(60, &mut state.bus);
        assert_eq!(state.balance(), 15 + 15 + 70);

        state.bandits[2].take_damage(60, &mut state.bus);
        assert_eq!(state.balance(), 15 * 3 + 70);

        let notices = state.drain_quest_notices();
        assert!(matches!(
            notices.last(),
            Some(QuestNotice::Completed { reward: 70, .. })
        ));
    }

    #[test]
    fn test_buy_unlocks_weapon() {
        let mut state = GameState::new(7);
        assert!(matches!(
            state.buy("revolver"),
            Err(EconomyError::InsufficientFunds { .. })
        ));

        state.wallet.borrow_mut().earn(160);
        state.buy("revolver").unwrap();
        assert!(state.combat.is_unlocked(WeaponKind::Revolver));
        assert_eq!(state.balance(), 10);

        // Cosmetics only get recorded
        state.wallet.borrow_mut().earn(75);
        state.buy("hat-white").unwrap();
        assert!(state.shop.is_owned("hat-white"));
    }

    #[test]
    fn test_delivery_pays() {
        let mut state = GameState::new(7);
        assert_eq!(state.deliver("blacksmith"), None);
        let offered: Vec<&str> = state.quests_offered_by("sheriff").iter().map(|q| q.id).collect();
        assert_eq!(offered, vec!["deliver-letter", "kill-bandits-1", "kill-bandits-2"]);

        state.accept_quest("deliver-letter");
        assert_eq!(state.deliver("blacksmith"), Some(50));
        assert_eq!(state.balance(), 50);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut state = GameState::new(7);
        state.wallet.borrow_mut().earn(300);
        state.buy("rifle").unwrap();
        state.combat.switch_weapon(WeaponKind::Rifle, &mut state.bus);
        state.accept_quest("kill-bandits-1");
        state.bandits[0].take_damage(60, &mut state.bus);
        state.combat.take_damage(30, &mut state.bus);
        state.avatar.teleport(Vec3::new(3.0, 1.0, -4.0));
        state.collectibles[2].collected = true;

        let save = state.snapshot(42.0);
        assert_eq!(save.wallet, 65);
        assert_eq!(save.collected_items, vec![state.collectibles[2].id.clone()]);

        let mut loaded = GameState::new(99);
        loaded.restore(&save);
        assert_eq!(loaded.balance(), 65);
        assert_eq!(loaded.combat.hp(), 70);
        assert_eq!(loaded.combat.current_weapon(), WeaponKind::Rifle);
        assert!(loaded.shop.is_owned("rifle"));
        assert_eq!(loaded.quests.borrow().active()[0].progress, vec![1]);
        assert_eq!(loaded.player_pos(), Vec2::new(3.0, -4.0));
        assert!(loaded.collectibles[2].collected);
        assert_eq!(loaded.snapshot(42.0), save);
    }

    #[test]
    fn test_restore_skips_unknown_weapons() {
        let mut state = GameState::new(7);
        state.wallet.borrow_mut().earn(500);
        let mut save = state.snapshot(1.0);
        save.unlocked_weapons = vec!["fists".into(), "shotgun".into(), "lasso".into()];
        save.current_weapon = "shotgun".into();

        let mut loaded = GameState::new(8);
        loaded.restore(&save);
        assert_eq!(loaded.balance(), 500);
        assert!(loaded.combat.is_unlocked(WeaponKind::Lasso));
        assert_eq!(loaded.combat.current_weapon(), WeaponKind::Fists);
        assert_eq!(loaded.snapshot(1.0).unlocked_weapons, vec!["fists", "lasso"]);
    }

    #[test]
    fn test_respawn_after_death() {
        let mut state = GameState::new(7);
        state.combat.take_damage(500, &mut state.bus);
        state.phase = GamePhase::GameOver;

        state.respawn();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.combat.hp(), 100);
        assert_eq!(state.avatar.pos, Vec3::new(0.0, 2.0, 0.0));
    }
}
