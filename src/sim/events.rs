//! Typed publish/subscribe bus
//!
//! Gameplay systems publish [`GameEvent`]s; the economy, quest log and UI
//! subscribe by [`Topic`]. Delivery is synchronous, in registration order,
//! on the publishing call. Nothing is queued.

use std::collections::HashMap;

use glam::Vec2;

use super::pickup::ItemKind;
use super::weapon::WeaponKind;

/// Named channel an event travels on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    CombatKill,
    BanditAttack,
    EconomyEarn,
    DamageDealt,
    MeleeSwing,
    ProjectileFired,
    ProjectileExpired,
    WeaponChanged,
    ReloadStarted,
    ReloadFinished,
    PlayerDamaged,
    PlayerDied,
    PlayerRespawned,
    ItemCollected,
    ShopPurchased,
    QuestAccepted,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::CombatKill => "combat:kill",
            Topic::BanditAttack => "combat:bandit-attack",
            Topic::EconomyEarn => "economy:earn",
            Topic::DamageDealt => "combat:damage",
            Topic::MeleeSwing => "combat:swing",
            Topic::ProjectileFired => "combat:projectile-fired",
            Topic::ProjectileExpired => "combat:projectile-expired",
            Topic::WeaponChanged => "combat:weapon-changed",
            Topic::ReloadStarted => "combat:reload-started",
            Topic::ReloadFinished => "combat:reload-finished",
            Topic::PlayerDamaged => "player:damaged",
            Topic::PlayerDied => "player:died",
            Topic::PlayerRespawned => "player:respawned",
            Topic::ItemCollected => "item:collected",
            Topic::ShopPurchased => "shop:purchased",
            Topic::QuestAccepted => "quest:accepted",
        }
    }
}

/// Event payloads, one variant per topic
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A bandit died
    Kill {
        bandit_id: String,
        enemy_type: &'static str,
    },
    /// A bandit swung at the player
    BanditAttack { bandit_id: String, damage: u32 },
    /// Currency granted to the player
    EconomyEarn { amount: u32 },
    /// Player damage landed on a bandit (floating damage numbers)
    DamageDealt {
        bandit_id: String,
        amount: u32,
        at: Vec2,
    },
    /// Melee sweep for the swing-arc effect
    MeleeSwing {
        origin: Vec2,
        heading: f32,
        range: f32,
    },
    /// Scene host should add a bullet visual
    ProjectileFired {
        id: u32,
        origin: Vec2,
        direction: Vec2,
    },
    /// Scene host should drop the bullet visual
    ProjectileExpired { id: u32 },
    WeaponChanged { weapon: WeaponKind },
    ReloadStarted { weapon: WeaponKind },
    ReloadFinished { weapon: WeaponKind, ammo: u32 },
    PlayerDamaged { amount: u32, hp: u32 },
    PlayerDied,
    PlayerRespawned,
    ItemCollected { id: String, item: ItemKind },
    ShopPurchased { item_id: String },
    QuestAccepted { quest_id: String },
}

impl GameEvent {
    /// Topic this payload is delivered on
    pub fn topic(&self) -> Topic {
        match self {
            GameEvent::Kill { .. } => Topic::CombatKill,
            GameEvent::BanditAttack { .. } => Topic::BanditAttack,
            GameEvent::EconomyEarn { .. } => Topic::EconomyEarn,
            GameEvent::DamageDealt { .. } => Topic::DamageDealt,
            GameEvent::MeleeSwing { .. } => Topic::MeleeSwing,
            GameEvent::ProjectileFired { .. } => Topic::ProjectileFired,
            GameEvent::ProjectileExpired { .. } => Topic::ProjectileExpired,
            GameEvent::WeaponChanged { .. } => Topic::WeaponChanged,
            GameEvent::ReloadStarted { .. } => Topic::ReloadStarted,
            GameEvent::ReloadFinished { .. } => Topic::ReloadFinished,
            GameEvent::PlayerDamaged { .. } => Topic::PlayerDamaged,
            GameEvent::PlayerDied => Topic::PlayerDied,
            GameEvent::PlayerRespawned => Topic::PlayerRespawned,
            GameEvent::ItemCollected { .. } => Topic::ItemCollected,
            GameEvent::ShopPurchased { .. } => Topic::ShopPurchased,
            GameEvent::QuestAccepted { .. } => Topic::QuestAccepted,
        }
    }
}

/// Anything the simulation can write events into
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

/// Collecting sink (tests, deferred routing)
impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Handler = Box<dyn FnMut(&GameEvent)>;

/// Topic-keyed registry of handlers
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<Topic, Vec<(SubscriptionId, Handler)>>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; handlers on one topic run in registration order
    pub fn subscribe(&mut self, topic: Topic, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.entry(topic).or_default().push((id, handler));
        log::trace!("Subscribed #{} to {}", id.0, topic.as_str());
        id
    }

    /// Remove a handler. Returns false if it was not registered on `topic`.
    pub fn unsubscribe(&mut self, topic: Topic, id: SubscriptionId) -> bool {
        let Some(handlers) = self.subscribers.get_mut(&topic) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    /// Deliver an event to every subscriber of its topic
    pub fn publish(&mut self, event: GameEvent) {
        let topic = event.topic();
        if let Some(handlers) = self.subscribers.get_mut(&topic) {
            for (_, handler) in handlers.iter_mut() {
                handler(&event);
            }
        }
    }

    /// Number of handlers on a topic
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers.get(&topic).map_or(0, Vec::len)
    }
}

impl EventSink for EventBus {
    fn emit(&mut self, event: GameEvent) {
        self.publish(event);
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts: Vec<_> = self
            .subscribers
            .iter()
            .map(|(topic, handlers)| (topic.as_str(), handlers.len()))
            .collect();
        counts.sort();
        f.debug_struct("EventBus").field("subscribers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_delivery_in_registration_order() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            bus.subscribe(
                Topic::EconomyEarn,
                Box::new(move |_: &GameEvent| log.borrow_mut().push(tag)),
            );
        }

        bus.publish(GameEvent::EconomyEarn { amount: 5 });
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_topics_are_isolated() {
        let mut bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        bus.subscribe(Topic::CombatKill, Box::new(move |_: &GameEvent| *h.borrow_mut() += 1));

        bus.publish(GameEvent::EconomyEarn { amount: 15 });
        assert_eq!(*hits.borrow(), 0);

        bus.publish(GameEvent::Kill {
            bandit_id: "bandit-1".into(),
            enemy_type: "bandit",
        });
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        let id = bus.subscribe(Topic::PlayerDied, Box::new(move |_: &GameEvent| *h.borrow_mut() += 1));

        bus.publish(GameEvent::PlayerDied);
        assert!(bus.unsubscribe(Topic::PlayerDied, id));
        assert!(!bus.unsubscribe(Topic::PlayerDied, id));
        bus.publish(GameEvent::PlayerDied);

        assert_eq!(*hits.borrow(), 1);
        assert_eq!(bus.subscriber_count(Topic::PlayerDied), 0);
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let mut bus = EventBus::new();
        bus.publish(GameEvent::PlayerRespawned);
        assert!(!bus.unsubscribe(Topic::PlayerRespawned, SubscriptionId(42)));
    }

    #[test]
    fn test_topic_names() {
        assert_eq!(Topic::CombatKill.as_str(), "combat:kill");
        assert_eq!(
            GameEvent::BanditAttack {
                bandit_id: "b".into(),
                damage: 12
            }
            .topic()
            .as_str(),
            "combat:bandit-attack"
        );
        assert_eq!(GameEvent::EconomyEarn { amount: 1 }.topic(), Topic::EconomyEarn);
    }
}
