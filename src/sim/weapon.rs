//! Weapon catalog

use serde::{Deserialize, Serialize};

/// Melee weapons hit instantly in a cone, ranged weapons fire projectiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponClass {
    Melee,
    Ranged,
}

/// Static weapon stats
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponDef {
    pub name: &'static str,
    pub class: WeaponClass,
    pub damage: u32,
    pub range: f32,
    /// Seconds between attacks
    pub cooldown: f32,
    /// Magazine size (0 = melee, unlimited)
    pub ammo: u32,
    /// Seconds to refill the magazine
    pub reload_time: f32,
}

/// Weapon catalog keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponKind {
    Fists,
    Lasso,
    Revolver,
    Rifle,
}

const FISTS: WeaponDef = WeaponDef {
    name: "Fists",
    class: WeaponClass::Melee,
    damage: 10,
    range: 1.5,
    cooldown: 0.5,
    ammo: 0,
    reload_time: 0.0,
};

const LASSO: WeaponDef = WeaponDef {
    name: "Lasso",
    class: WeaponClass::Melee,
    damage: 5,
    range: 4.0,
    cooldown: 1.5,
    ammo: 0,
    reload_time: 0.0,
};

const REVOLVER: WeaponDef = WeaponDef {
    name: "Revolver",
    class: WeaponClass::Ranged,
    damage: 25,
    range: 30.0,
    cooldown: 0.8,
    ammo: 6,
    reload_time: 2.0,
};

const RIFLE: WeaponDef = WeaponDef {
    name: "Rifle",
    class: WeaponClass::Ranged,
    damage: 40,
    range: 50.0,
    cooldown: 1.5,
    ammo: 1,
    reload_time: 3.0,
};

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Fists,
        WeaponKind::Lasso,
        WeaponKind::Revolver,
        WeaponKind::Rifle,
    ];

    /// Stats for this weapon
    pub fn def(&self) -> &'static WeaponDef {
        match self {
            WeaponKind::Fists => &FISTS,
            WeaponKind::Lasso => &LASSO,
            WeaponKind::Revolver => &REVOLVER,
            WeaponKind::Rifle => &RIFLE,
        }
    }

    /// Catalog key as used in saves and shop items
    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Fists => "fists",
            WeaponKind::Lasso => "lasso",
            WeaponKind::Revolver => "revolver",
            WeaponKind::Rifle => "rifle",
        }
    }

    /// Unknown keys resolve to `None` so callers can ignore them
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "fists" => Some(WeaponKind::Fists),
            "lasso" => Some(WeaponKind::Lasso),
            "revolver" => Some(WeaponKind::Revolver),
            "rifle" => Some(WeaponKind::Rifle),
            _ => None,
        }
    }

    pub fn is_melee(&self) -> bool {
        self.def().class == WeaponClass::Melee
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_melee_weapons_have_no_magazine() {
        for kind in WeaponKind::ALL {
            let def = kind.def();
            assert_eq!(def.ammo == 0, kind.is_melee(), "{:?}", kind);
        }
    }

    #[test]
    fn test_key_round_trip() {
        for kind in WeaponKind::ALL {
            assert_eq!(WeaponKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(WeaponKind::from_str("shotgun"), None);
    }
}
