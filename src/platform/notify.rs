//! On-screen notification banner queue

use std::collections::VecDeque;

/// Older messages are dropped past this many
const MAX_NOTIFICATIONS: usize = 8;
/// Seconds each message stays up
const NOTIFICATION_SECS: f32 = 2.5;

/// The front message shows until its time runs out, then the next one
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    queue: VecDeque<String>,
    shown_for: f32,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: String) {
        self.queue.push_back(text);
        while self.queue.len() > MAX_NOTIFICATIONS {
            self.queue.pop_front();
            self.shown_for = 0.0;
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.queue.is_empty() {
            return;
        }
        self.shown_for += dt;
        if self.shown_for >= NOTIFICATION_SECS {
            self.queue.pop_front();
            self.shown_for = 0.0;
        }
    }

    /// Message to show now, if any
    pub fn current(&self) -> Option<&str> {
        self.queue.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_expire_in_order() {
        let mut notes = Notifications::new();
        notes.push("Bought lasso".into());
        notes.push("Game saved!".into());
        assert_eq!(notes.current(), Some("Bought lasso"));

        notes.update(1.0);
        assert_eq!(notes.current(), Some("Bought lasso"));
        notes.update(2.0);
        assert_eq!(notes.current(), Some("Game saved!"));
        notes.update(3.0);
        assert_eq!(notes.current(), None);

        // Idle time does not count against the next message
        notes.update(10.0);
        notes.push("Picked up herb".into());
        notes.update(1.0);
        assert_eq!(notes.current(), Some("Picked up herb"));
    }

    #[test]
    fn test_queue_is_capped() {
        let mut notes = Notifications::new();
        for i in 0..12 {
            notes.push(format!("note {}", i));
        }
        assert_eq!(notes.len(), 8);
        assert_eq!(notes.current(), Some("note 4"));
    }
}
