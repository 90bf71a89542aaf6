//! Currency and the general store

use std::collections::BTreeSet;

use thiserror::Error;

use crate::sim::weapon::WeaponKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomyError {
    #[error("not enough lilky: need {needed}, have {have}")]
    InsufficientFunds { needed: u32, have: u32 },
    #[error("unknown shop item: {0}")]
    UnknownItem(String),
    #[error("already owned: {0}")]
    AlreadyOwned(String),
}

/// The player's purse. Balance never goes negative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wallet {
    balance: u32,
}

impl Wallet {
    pub fn new(balance: u32) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn earn(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
    }

    pub fn spend(&mut self, amount: u32) -> Result<(), EconomyError> {
        if !self.can_afford(amount) {
            return Err(EconomyError::InsufficientFunds {
                needed: amount,
                have: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    pub fn can_afford(&self, amount: u32) -> bool {
        self.balance >= amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemCategory {
    Weapon(WeaponKind),
    /// Stat boost; recorded as owned
    Upgrade,
    Cosmetic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub category: ItemCategory,
    pub price: u32,
}

pub const SHOP_ITEMS: [ShopItem; 9] = [
    ShopItem {
        id: "lasso",
        name: "Lasso",
        category: ItemCategory::Weapon(WeaponKind::Lasso),
        price: 80,
    },
    ShopItem {
        id: "revolver",
        name: "Revolver",
        category: ItemCategory::Weapon(WeaponKind::Revolver),
        price: 150,
    },
    ShopItem {
        id: "rifle",
        name: "Rifle",
        category: ItemCategory::Weapon(WeaponKind::Rifle),
        price: 250,
    },
    ShopItem {
        id: "hp-boost",
        name: "Toughness",
        category: ItemCategory::Upgrade,
        price: 100,
    },
    ShopItem {
        id: "speed-boost",
        name: "Quick Boots",
        category: ItemCategory::Upgrade,
        price: 120,
    },
    ShopItem {
        id: "damage-boost",
        name: "Sharp Rounds",
        category: ItemCategory::Upgrade,
        price: 180,
    },
    ShopItem {
        id: "hat-gold",
        name: "Golden Hat",
        category: ItemCategory::Cosmetic,
        price: 200,
    },
    ShopItem {
        id: "hat-white",
        name: "White Hat",
        category: ItemCategory::Cosmetic,
        price: 75,
    },
    ShopItem {
        id: "coat-red",
        name: "Red Coat",
        category: ItemCategory::Cosmetic,
        price: 90,
    },
];

/// Catalog row as the shop screen shows it
#[derive(Debug, Clone, PartialEq)]
pub struct ShopListing {
    pub item: &'static ShopItem,
    pub owned: bool,
    pub can_afford: bool,
}

/// Purchase ledger over the static catalog
#[derive(Debug, Clone, Default)]
pub struct Shop {
    purchased: BTreeSet<String>,
}

impl Shop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(id: &str) -> Option<&'static ShopItem> {
        SHOP_ITEMS.iter().find(|item| item.id == id)
    }

    pub fn listings(&self, wallet: &Wallet) -> Vec<ShopListing> {
        SHOP_ITEMS
            .iter()
            .map(|item| ShopListing {
                item,
                owned: self.is_owned(item.id),
                can_afford: wallet.can_afford(item.price),
            })
            .collect()
    }

    /// Charge the wallet and record ownership
    pub fn buy(&mut self, id: &str, wallet: &mut Wallet) -> Result<&'static ShopItem, EconomyError> {
        let item = Self::find(id).ok_or_else(|| EconomyError::UnknownItem(id.to_string()))?;
        if self.is_owned(id) {
            return Err(EconomyError::AlreadyOwned(id.to_string()));
        }
        wallet.spend(item.price)?;
        self.purchased.insert(id.to_string());
        log::info!("Bought {} for {}", item.id, item.price);
        Ok(item)
    }

    pub fn is_owned(&self, id: &str) -> bool {
        self.purchased.contains(id)
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.purchased.iter().cloned().collect()
    }

    pub fn restore(&mut self, ids: &[String]) {
        self.purchased = ids.iter().cloned().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_spend_rejects_overdraft() {
        let mut wallet = Wallet::new(50);
        assert_eq!(
            wallet.spend(80),
            Err(EconomyError::InsufficientFunds {
                needed: 80,
                have: 50
            })
        );
        assert_eq!(wallet.balance(), 50);
        assert!(wallet.spend(50).is_ok());
        assert_eq!(wallet.balance(), 0);
    }

    #[test]
    fn test_buy_weapon() {
        let mut shop = Shop::new();
        let mut wallet = Wallet::new(200);

        let item = shop.buy("revolver", &mut wallet).unwrap();
        assert_eq!(item.category, ItemCategory::Weapon(WeaponKind::Revolver));
        assert_eq!(wallet.balance(), 50);
        assert!(shop.is_owned("revolver"));

        assert_eq!(
            shop.buy("revolver", &mut wallet),
            Err(EconomyError::AlreadyOwned("revolver".into()))
        );
        assert_eq!(
            shop.buy("shotgun", &mut wallet),
            Err(EconomyError::UnknownItem("shotgun".into()))
        );
        assert!(matches!(
            shop.buy("rifle", &mut wallet),
            Err(EconomyError::InsufficientFunds { .. })
        ));
        assert!(!shop.is_owned("rifle"));
    }

    #[test]
    fn test_listings_flag_owned_and_affordable() {
        let mut shop = Shop::new();
        let mut wallet = Wallet::new(100);
        shop.buy("hat-white", &mut wallet).unwrap();

        let listings = shop.listings(&wallet);
        assert_eq!(listings.len(), SHOP_ITEMS.len());
        let hat = listings.iter().find(|l| l.item.id == "hat-white").unwrap();
        assert!(hat.owned);
        let lasso = listings.iter().find(|l| l.item.id == "lasso").unwrap();
        assert!(!lasso.can_afford);
    }

    #[test]
    fn test_restore_replaces_purchases() {
        let mut shop = Shop::new();
        shop.restore(&["coat-red".to_string()]);
        assert!(shop.is_owned("coat-red"));
        assert_eq!(shop.snapshot(), vec!["coat-red".to_string()]);
    }

    proptest! {
        #[test]
        fn prop_balance_never_negative(ops in prop::collection::vec((any::<bool>(), 0u32..500), 0..50)) {
            let mut wallet = Wallet::default();
            let mut expected: u64 = 0;
            for (earn, amount) in ops {
                if earn {
                    wallet.earn(amount);
                    expected += amount as u64;
                } else if wallet.spend(amount).is_ok() {
                    expected -= amount as u64;
                }
                prop_assert_eq!(wallet.balance() as u64, expected);
            }
        }
    }
}
