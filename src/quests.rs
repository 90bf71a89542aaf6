//! Quest database and the player's quest log

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveKind {
    Deliver,
    Collect,
    Kill,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveDef {
    pub kind: ObjectiveKind,
    /// NPC id, item key or enemy type
    pub target: &'static str,
    pub description: &'static str,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestDef {
    pub id: &'static str,
    pub name: &'static str,
    pub giver: &'static str,
    pub objectives: &'static [ObjectiveDef],
    pub reward: u32,
    pub repeatable: bool,
}

const fn objective(
    kind: ObjectiveKind,
    target: &'static str,
    description: &'static str,
    amount: u32,
) -> ObjectiveDef {
    ObjectiveDef {
        kind,
        target,
        description,
        amount,
    }
}

pub const QUESTS: [QuestDef; 9] = [
    QuestDef {
        id: "deliver-letter",
        name: "Urgent Letter",
        giver: "sheriff",
        objectives: &[objective(
            ObjectiveKind::Deliver,
            "blacksmith",
            "Deliver the letter to Magnus the blacksmith",
            1,
        )],
        reward: 50,
        repeatable: true,
    },
    QuestDef {
        id: "deliver-whiskey",
        name: "Whiskey Shipment",
        giver: "bartender",
        objectives: &[objective(
            ObjectiveKind::Deliver,
            "townsfolk1",
            "Bring the whiskey to farmer Bill",
            1,
        )],
        reward: 40,
        repeatable: true,
    },
    QuestDef {
        id: "deliver-horseshoe",
        name: "New Horseshoe",
        giver: "blacksmith",
        objectives: &[objective(
            ObjectiveKind::Deliver,
            "townsfolk3",
            "Bring the horseshoe to old Tom",
            1,
        )],
        reward: 35,
        repeatable: true,
    },
    QuestDef {
        id: "collect-nuggets",
        name: "Gold Fever",
        giver: "townsfolk2",
        objectives: &[objective(
            ObjectiveKind::Collect,
            "gold-nugget",
            "Find gold nuggets",
            5,
        )],
        reward: 80,
        repeatable: false,
    },
    QuestDef {
        id: "collect-herbs",
        name: "Healing Herbs",
        giver: "townsfolk3",
        objectives: &[objective(ObjectiveKind::Collect, "herb", "Find healing herbs", 3)],
        reward: 45,
        repeatable: true,
    },
    QuestDef {
        id: "collect-wood",
        name: "Lumber for Repairs",
        giver: "shopkeeper",
        objectives: &[objective(ObjectiveKind::Collect, "wood", "Gather wood", 4)],
        reward: 55,
        repeatable: true,
    },
    QuestDef {
        id: "kill-bandits-1",
        name: "Clear the Outskirts",
        giver: "sheriff",
        objectives: &[objective(ObjectiveKind::Kill, "bandit", "Kill bandits", 3)],
        reward: 100,
        repeatable: true,
    },
    QuestDef {
        id: "kill-bandits-2",
        name: "Bandit Captain",
        giver: "sheriff",
        objectives: &[objective(ObjectiveKind::Kill, "bandit", "Kill bandits", 5)],
        reward: 150,
        repeatable: true,
    },
    QuestDef {
        id: "protect-town",
        name: "Protect the Town",
        giver: "townsfolk1",
        objectives: &[objective(ObjectiveKind::Kill, "bandit", "Kill bandits", 2)],
        reward: 70,
        repeatable: true,
    },
];

pub fn find_quest(id: &str) -> Option<&'static QuestDef> {
    QUESTS.iter().find(|q| q.id == id)
}

/// An accepted quest with per-objective progress
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveQuest {
    pub def: &'static QuestDef,
    /// Parallel to `def.objectives`
    pub progress: Vec<u32>,
}

impl ActiveQuest {
    fn new(def: &'static QuestDef) -> Self {
        Self {
            def,
            progress: vec![0; def.objectives.len()],
        }
    }

    pub fn is_done(&self) -> bool {
        self.def
            .objectives
            .iter()
            .zip(&self.progress)
            .all(|(obj, &current)| current >= obj.amount)
    }
}

/// Things the UI should tell the player about
#[derive(Debug, Clone, PartialEq)]
pub enum QuestNotice {
    Accepted {
        quest_id: &'static str,
        name: &'static str,
    },
    Progress {
        quest_id: &'static str,
        objective: &'static str,
        current: u32,
        amount: u32,
    },
    Completed {
        quest_id: &'static str,
        name: &'static str,
        reward: u32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSave {
    pub current: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveQuestSave {
    pub id: String,
    pub objectives: Vec<ObjectiveSave>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestLogSave {
    pub active: Vec<ActiveQuestSave>,
    pub completed: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct QuestLog {
    active: Vec<ActiveQuest>,
    completed: BTreeSet<String>,
    notices: Vec<QuestNotice>,
}

impl QuestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[ActiveQuest] {
        &self.active
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.iter().any(|q| q.def.id == id)
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.contains(id)
    }

    /// Quests an NPC can offer right now
    pub fn available_for(&self, npc: &str) -> Vec<&'static QuestDef> {
        QUESTS
            .iter()
            .filter(|q| q.giver == npc)
            .filter(|q| !self.is_active(q.id))
            .filter(|q| q.repeatable || !self.is_completed(q.id))
            .collect()
    }

    /// Start a quest with fresh progress. False if unknown or already active.
    pub fn accept(&mut self, id: &str) -> bool {
        let Some(def) = find_quest(id) else {
            return false;
        };
        if self.is_active(id) {
            return false;
        }
        self.active.push(ActiveQuest::new(def));
        self.notices.push(QuestNotice::Accepted {
            quest_id: def.id,
            name: def.name,
        });
        log::info!("Quest accepted: {}", def.id);
        true
    }

    /// First active delivery quest with an open objective for this NPC
    pub fn delivery_ready(&self, npc: &str) -> Option<&ActiveQuest> {
        self.delivery_index(npc).map(|i| &self.active[i])
    }

    fn delivery_index(&self, npc: &str) -> Option<usize> {
        self.active.iter().position(|q| {
            q.def
                .objectives
                .iter()
                .zip(&q.progress)
                .any(|(obj, &current)| {
                    obj.kind == ObjectiveKind::Deliver && obj.target == npc && current < obj.amount
                })
        })
    }

    /// Hand over a delivery. Returns the reward if that finished the quest.
    pub fn complete_delivery(&mut self, npc: &str) -> Option<u32> {
        let index = self.delivery_index(npc)?;
        let quest = &mut self.active[index];
        for (obj, current) in quest.def.objectives.iter().zip(quest.progress.iter_mut()) {
            if obj.kind == ObjectiveKind::Deliver && obj.target == npc {
                *current = obj.amount;
            }
        }
        self.finish_done()
    }

    /// Count a kill or pickup against matching objectives.
    /// Returns the total reward of quests this completed, if any.
    pub fn record(&mut self, kind: ObjectiveKind, target: &str) -> Option<u32> {
        for quest in &mut self.active {
            for (obj, current) in quest.def.objectives.iter().zip(quest.progress.iter_mut()) {
                if obj.kind == kind && obj.target == target && *current < obj.amount {
                    *current = (*current + 1).min(obj.amount);
                    self.notices.push(QuestNotice::Progress {
                        quest_id: quest.def.id,
                        objective: obj.description,
                        current: *current,
                        amount: obj.amount,
                    });
                }
            }
        }
        self.finish_done()
    }

    fn finish_done(&mut self) -> Option<u32> {
        let (done, open): (Vec<_>, Vec<_>) = self.active.drain(..).partition(ActiveQuest::is_done);
        self.active = open;
        if done.is_empty() {
            return None;
        }

        let mut total = 0;
        for quest in done {
            let def = quest.def;
            self.completed.insert(def.id.to_string());
            self.notices.push(QuestNotice::Completed {
                quest_id: def.id,
                name: def.name,
                reward: def.reward,
            });
            log::info!("Quest completed: {} (+{})", def.id, def.reward);
            total += def.reward;
        }
        Some(total)
    }

    pub fn drain_notices(&mut self) -> Vec<QuestNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn snapshot(&self) -> QuestLogSave {
        QuestLogSave {
            active: self
                .active
                .iter()
                .map(|q| ActiveQuestSave {
                    id: q.def.id.to_string(),
                    objectives: q
                        .progress
                        .iter()
                        .map(|&current| ObjectiveSave { current })
                        .collect(),
                })
                .collect(),
            completed: self.completed.iter().cloned().collect(),
        }
    }

    /// Replace the log with saved state. Unknown quest ids are skipped.
    pub fn restore(&mut self, save: &QuestLogSave) {
        self.completed = save.completed.iter().cloned().collect();
        self.active = save
            .active
            .iter()
            .filter_map(|saved| {
                let def = find_quest(&saved.id)?;
                let progress = def
                    .objectives
                    .iter()
                    .enumerate()
                    .map(|(i, obj)| {
                        saved
                            .objectives
                            .get(i)
                            .map_or(0, |o| o.current.min(obj.amount))
                    })
                    .collect();
                Some(ActiveQuest { def, progress })
            })
            .collect();
        self.notices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kill_quest_pays_once() {
        let mut log = QuestLog::new();
        assert!(log.accept("protect-town"));
        assert!(!log.accept("protect-town"));

        assert_eq!(log.record(ObjectiveKind::Kill, "bandit"), None);
        assert_eq!(log.record(ObjectiveKind::Kill, "bandit"), Some(70));
        assert_eq!(log.record(ObjectiveKind::Kill, "bandit"), None);

        assert!(log.active().is_empty());
        assert!(log.is_completed("protect-town"));
    }

    #[test]
    fn test_kills_count_for_every_matching_quest() {
        let mut log = QuestLog::new();
        log.accept("kill-bandits-1");
        log.accept("protect-town");

        log.record(ObjectiveKind::Kill, "bandit");
        assert_eq!(log.record(ObjectiveKind::Kill, "bandit"), Some(70));
        assert_eq!(log.record(ObjectiveKind::Kill, "bandit"), Some(100));
    }

    #[test]
    fn test_collect_ignores_other_items() {
        let mut log = QuestLog::new();
        log.accept("collect-herbs");
        assert_eq!(log.record(ObjectiveKind::Collect, "wood"), None);
        assert_eq!(log.active()[0].progress, vec![0]);
        log.record(ObjectiveKind::Collect, "herb");
        assert_eq!(log.active()[0].progress, vec![1]);
    }

    #[test]
    fn test_non_repeatable_not_offered_again() {
        let mut log = QuestLog::new();
        log.accept("collect-nuggets");
        assert!(log.available_for("townsfolk2").is_empty());

        for _ in 0..5 {
            log.record(ObjectiveKind::Collect, "gold-nugget");
        }
        assert!(log.is_completed("collect-nuggets"));
        assert!(log.available_for("townsfolk2").is_empty());

        // Repeatable quests come back
        log.accept("collect-herbs");
        for _ in 0..3 {
            log.record(ObjectiveKind::Collect, "herb");
        }
        let offered: Vec<&str> = log.available_for("townsfolk3").iter().map(|q| q.id).collect();
        assert_eq!(offered, vec!["collect-herbs"]);
    }

    #[test]
    fn test_delivery() {
        let mut log = QuestLog::new();
        assert_eq!(log.complete_delivery("blacksmith"), None);

        log.accept("deliver-letter");
        assert!(log.delivery_ready("sheriff").is_none());
        assert_eq!(
            log.delivery_ready("blacksmith").map(|q| q.def.id),
            Some("deliver-letter")
        );
        assert_eq!(log.complete_delivery("blacksmith"), Some(50));
        assert!(log.delivery_ready("blacksmith").is_none());
    }

    #[test]
    fn test_notices_drain() {
        let mut log = QuestLog::new();
        log.accept("protect-town");
        log.record(ObjectiveKind::Kill, "bandit");
        let notices = log.drain_notices();
        assert_eq!(notices.len(), 2);
        assert!(matches!(
            notices[1],
            QuestNotice::Progress {
                current: 1,
                amount: 2,
                ..
            }
        ));
        assert!(log.drain_notices().is_empty());
    }

    #[test]
    fn test_snapshot_restore() {
        let mut log = QuestLog::new();
        log.accept("kill-bandits-2");
        log.record(ObjectiveKind::Kill, "bandit");
        log.accept("deliver-letter");
        log.complete_delivery("blacksmith");

        let mut save = log.snapshot();
        save.active.push(ActiveQuestSave {
            id: "lost-quest".into(),
            objectives: vec![],
        });

        let mut restored = QuestLog::new();
        restored.restore(&save);
        assert_eq!(restored.active().len(), 1);
        assert_eq!(restored.active()[0].def.id, "kill-bandits-2");
        assert_eq!(restored.active()[0].progress, vec![1]);
        assert!(restored.is_completed("deliver-letter"));
    }
}
