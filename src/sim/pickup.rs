//! World pickups

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{EventSink, GameEvent};
use crate::planar_distance;

/// Kinds of collectible items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    GoldNugget,
    Herb,
    Wood,
    /// Drinking one requests a save
    SaveElixir,
}

impl ItemKind {
    /// Target key used by collection objectives
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::GoldNugget => "gold-nugget",
            ItemKind::Herb => "herb",
            ItemKind::Wood => "wood",
            ItemKind::SaveElixir => "save-elixir",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectibleDef {
    pub id: &'static str,
    pub item: ItemKind,
    pub x: f32,
    pub z: f32,
}

const fn spawn(id: &'static str, item: ItemKind, x: f32, z: f32) -> CollectibleDef {
    CollectibleDef { id, item, x, z }
}

/// Village item placements
pub const COLLECTIBLE_SPAWNS: [CollectibleDef; 19] = [
    spawn("nugget-1", ItemKind::GoldNugget, -20.0, 5.0),
    spawn("nugget-2", ItemKind::GoldNugget, 15.0, -18.0),
    spawn("nugget-3", ItemKind::GoldNugget, -25.0, -20.0),
    spawn("nugget-4", ItemKind::GoldNugget, 22.0, 28.0),
    spawn("nugget-5", ItemKind::GoldNugget, -8.0, -30.0),
    spawn("herb-1", ItemKind::Herb, -18.0, 15.0),
    spawn("herb-2", ItemKind::Herb, 20.0, -5.0),
    spawn("herb-3", ItemKind::Herb, -30.0, -10.0),
    spawn("herb-4", ItemKind::Herb, 12.0, 30.0),
    spawn("herb-5", ItemKind::Herb, -15.0, -28.0),
    spawn("elixir-1", ItemKind::SaveElixir, 5.0, 20.0),
    spawn("elixir-2", ItemKind::SaveElixir, -20.0, -15.0),
    spawn("elixir-3", ItemKind::SaveElixir, 25.0, -5.0),
    spawn("wood-1", ItemKind::Wood, -22.0, 0.0),
    spawn("wood-2", ItemKind::Wood, 18.0, 15.0),
    spawn("wood-3", ItemKind::Wood, -12.0, 28.0),
    spawn("wood-4", ItemKind::Wood, 25.0, -12.0),
    spawn("wood-5", ItemKind::Wood, -28.0, 25.0),
    spawn("wood-6", ItemKind::Wood, 8.0, -28.0),
];

/// A placed item, picked up once
#[derive(Debug, Clone)]
pub struct Collectible {
    pub id: String,
    pub item: ItemKind,
    pub pos: Vec2,
    pub collected: bool,
}

impl Collectible {
    pub fn new(def: &CollectibleDef) -> Self {
        Self {
            id: def.id.to_string(),
            item: def.item,
            pos: Vec2::new(def.x, def.z),
            collected: false,
        }
    }

    /// Collect when the player comes within `pickup_distance`.
    /// Returns true on the tick the item is picked up.
    pub fn update(
        &mut self,
        player_pos: Vec2,
        pickup_distance: f32,
        events: &mut dyn EventSink,
    ) -> bool {
        if self.collected || planar_distance(self.pos, player_pos) >= pickup_distance {
            return false;
        }
        self.collected = true;
        log::debug!("Collected {} ({})", self.id, self.item.as_str());
        events.emit(GameEvent::ItemCollected {
            id: self.id.clone(),
            item: self.item,
        });
        true
    }
}

/// Fresh set of all village items
pub fn spawn_collectibles() -> Vec<Collectible> {
    COLLECTIBLE_SPAWNS.iter().map(Collectible::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pickup_once() {
        let mut item = Collectible::new(&COLLECTIBLE_SPAWNS[5]);
        let mut events = Vec::new();

        assert!(!item.update(Vec2::new(-18.0, 13.4), 1.5, &mut events));
        assert!(item.update(Vec2::new(-18.0, 14.0), 1.5, &mut events));
        assert!(!item.update(Vec2::new(-18.0, 15.0), 1.5, &mut events));

        assert_eq!(
            events,
            vec![GameEvent::ItemCollected {
                id: "herb-1".into(),
                item: ItemKind::Herb
            }]
        );
    }

    #[test]
    fn test_spawn_ids_unique() {
        let items = spawn_collectibles();
        let mut ids: Vec<&str> = items.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), COLLECTIBLE_SPAWNS.len());
    }

    #[test]
    fn test_item_keys_match_serde() {
        let json = serde_json::to_string(&ItemKind::GoldNugget).unwrap();
        assert_eq!(json, format!("\"{}\"", ItemKind::GoldNugget.as_str()));
    }
}
