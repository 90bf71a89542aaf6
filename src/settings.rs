//! Player settings and key bindings
//!
//! Persisted separately from game saves in LocalStorage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::AUTOSAVE_INTERVAL;
use crate::platform::storage;
use crate::sim::weapon::WeaponKind;

/// What a bound key does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyAction {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    Sprint,
    SelectFists,
    SelectLasso,
    SelectRevolver,
    SelectRifle,
    Reload,
    Pause,
}

impl KeyAction {
    /// Weapon selected by this key, if any
    pub fn weapon(&self) -> Option<WeaponKind> {
        match self {
            KeyAction::SelectFists => Some(WeaponKind::Fists),
            KeyAction::SelectLasso => Some(WeaponKind::Lasso),
            KeyAction::SelectRevolver => Some(WeaponKind::Revolver),
            KeyAction::SelectRifle => Some(WeaponKind::Rifle),
            _ => None,
        }
    }

    pub fn is_movement(&self) -> bool {
        matches!(
            self,
            KeyAction::MoveForward | KeyAction::MoveBack | KeyAction::MoveLeft | KeyAction::MoveRight
        )
    }

    /// Active for as long as the key stays down
    pub fn is_held(&self) -> bool {
        self.is_movement() || *self == KeyAction::Sprint
    }
}

/// DOM `KeyboardEvent.code` to action map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindings {
    keys: BTreeMap<String, KeyAction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let keys = [
            ("KeyW", KeyAction::MoveForward),
            ("ArrowUp", KeyAction::MoveForward),
            ("KeyS", KeyAction::MoveBack),
            ("ArrowDown", KeyAction::MoveBack),
            ("KeyA", KeyAction::MoveLeft),
            ("ArrowLeft", KeyAction::MoveLeft),
            ("KeyD", KeyAction::MoveRight),
            ("ArrowRight", KeyAction::MoveRight),
            ("ShiftLeft", KeyAction::Sprint),
            ("ShiftRight", KeyAction::Sprint),
            ("Digit1", KeyAction::SelectFists),
            ("Digit2", KeyAction::SelectLasso),
            ("Digit3", KeyAction::SelectRevolver),
            ("Digit4", KeyAction::SelectRifle),
            ("KeyR", KeyAction::Reload),
            ("Escape", KeyAction::Pause),
        ]
        .into_iter()
        .map(|(code, action)| (code.to_string(), action))
        .collect();
        Self { keys }
    }
}

impl KeyBindings {
    pub fn action_for(&self, code: &str) -> Option<KeyAction> {
        self.keys.get(code).copied()
    }

    /// Bind `code` to `action`, replacing whatever it did before
    pub fn bind(&mut self, code: &str, action: KeyAction) {
        self.keys.insert(code.to_string(), action);
    }

    pub fn unbind(&mut self, code: &str) -> Option<KeyAction> {
        self.keys.remove(code)
    }

    /// Every key bound to `action`
    pub fn keys_for(&self, action: KeyAction) -> Vec<&str> {
        self.keys
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(code, _)| code.as_str())
            .collect()
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bindings: KeyBindings,

    // === Saving ===
    pub autosave: bool,
    /// Seconds between automatic saves
    pub autosave_interval_secs: f32,

    // === HUD ===
    /// Floating damage numbers over hit bandits
    pub damage_numbers: bool,

    /// Pause when the tab loses focus
    pub pause_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no floating numbers, no swing arcs)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bindings: KeyBindings::default(),
            autosave: true,
            autosave_interval_secs: AUTOSAVE_INTERVAL,
            damage_numbers: true,
            pause_on_blur: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "wild-west-settings";

    /// Effective damage numbers (respects reduced_motion)
    pub fn effective_damage_numbers(&self) -> bool {
        self.damage_numbers && !self.reduced_motion
    }

    /// Autosave period, or `None` when disabled
    pub fn autosave_period(&self) -> Option<f32> {
        (self.autosave && self.autosave_interval_secs > 0.0).then_some(self.autosave_interval_secs)
    }

    /// Load settings from LocalStorage, falling back to defaults
    pub fn load() -> Self {
        if let Some(json) = storage::get_item(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage
    pub fn save(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            if storage::set_item(Self::STORAGE_KEY, &json) {
                log::info!("Settings saved");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let keys = KeyBindings::default();
        assert_eq!(keys.action_for("KeyW"), Some(KeyAction::MoveForward));
        assert_eq!(keys.action_for("Digit3"), Some(KeyAction::SelectRevolver));
        assert_eq!(keys.action_for("KeyQ"), None);
        assert_eq!(keys.keys_for(KeyAction::MoveLeft), vec!["ArrowLeft", "KeyA"]);
    }

    #[test]
    fn test_rebind() {
        let mut keys = KeyBindings::default();
        keys.bind("KeyQ", KeyAction::Reload);
        keys.unbind("KeyR");
        assert_eq!(keys.keys_for(KeyAction::Reload), vec!["KeyQ"]);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"autosave": false}"#).unwrap();
        assert_eq!(settings.autosave_period(), None);
        assert_eq!(settings.bindings, KeyBindings::default());
    }

    #[test]
    fn test_reduced_motion_hides_damage_numbers() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(!settings.effective_damage_numbers());
    }
}
