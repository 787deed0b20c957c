//! Permanent upgrades and the consumable inventory
//!
//! Both persist across runs and are paid for with score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::ItemKind;
use crate::tuning::Tuning;

/// Upgrade tracks that can be levelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeAxis {
    FireRate,
    BulletSize,
}

/// Levelled multipliers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    pub fire_rate: u32,
    pub bullet_size: u32,
}

impl Upgrades {
    pub fn level(&self, axis: UpgradeAxis) -> u32 {
        match axis {
            UpgradeAxis::FireRate => self.fire_rate,
            UpgradeAxis::BulletSize => self.bullet_size,
        }
    }

    fn level_mut(&mut self, axis: UpgradeAxis) -> &mut u32 {
        match axis {
            UpgradeAxis::FireRate => &mut self.fire_rate,
            UpgradeAxis::BulletSize => &mut self.bullet_size,
        }
    }

    /// Buy one level on `axis`.
    ///
    /// Only succeeds below the cap and when `currency` covers the cost; on
    /// failure nothing changes.
    pub fn level_up(&mut self, axis: UpgradeAxis, currency: &mut u64, tuning: &Tuning) -> bool {
        let level = self.level_mut(axis);
        if *level >= tuning.max_upgrade_level || *currency < tuning.upgrade_cost {
            return false;
        }
        *currency -= tuning.upgrade_cost;
        *level += 1;
        true
    }

    /// Auto-fire interval: base shrunk by each fire-rate level, never below the floor
    pub fn shot_interval_ms(&self, tuning: &Tuning) -> f32 {
        let factor = 1.0 - self.fire_rate as f32 * tuning.upgrade_step;
        (tuning.base_shot_interval_ms * factor).max(tuning.min_shot_interval_ms)
    }

    /// Player bullet radius grown by each bullet-size level
    pub fn bullet_radius(&self, tuning: &Tuning) -> f32 {
        tuning.base_bullet_radius * (1.0 + self.bullet_size as f32 * tuning.upgrade_step)
    }

    /// Clamp levels loaded from storage to the configured cap
    pub fn clamped(self, max_level: u32) -> Self {
        Self {
            fire_rate: self.fire_rate.min(max_level),
            bullet_size: self.bullet_size.min(max_level),
        }
    }
}

/// Consumable item counts. Counts never go negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    counts: BTreeMap<ItemKind, u32>,
}

impl Inventory {
    pub fn count(&self, kind: ItemKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn add(&mut self, kind: ItemKind, amount: u32) {
        let entry = self.counts.entry(kind).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Use one item. Returns false (and changes nothing) when none are left.
    pub fn consume(&mut self, kind: ItemKind) -> bool {
        match self.counts.get_mut(&kind) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    /// Buy one item from the shop
    pub fn purchase(&mut self, kind: ItemKind, currency: &mut u64, tuning: &Tuning) -> bool {
        let price = tuning.item_price(kind);
        if *currency < price {
            return false;
        }
        *currency -= price;
        self.add(kind, 1);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemKind, u32)> + '_ {
        ItemKind::ALL.into_iter().map(|k| (k, self.count(k)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_up_gating() {
        let tuning = Tuning::default();
        let mut upgrades = Upgrades::default();

        let mut currency = 999;
        assert!(!upgrades.level_up(UpgradeAxis::FireRate, &mut currency, &tuning));
        assert_eq!(currency, 999);
        assert_eq!(upgrades.fire_rate, 0);

        let mut currency = 1000;
        assert!(upgrades.level_up(UpgradeAxis::FireRate, &mut currency, &tuning));
        assert_eq!(currency, 0);
        assert_eq!(upgrades.fire_rate, 1);
        assert_eq!(upgrades.bullet_size, 0);
    }

    #[test]
    fn test_level_up_respects_cap() {
        let tuning = Tuning::default();
        let mut upgrades = Upgrades {
            fire_rate: 0,
            bullet_size: tuning.max_upgrade_level,
        };
        let mut currency = 50_000;
        assert!(!upgrades.level_up(UpgradeAxis::BulletSize, &mut currency, &tuning));
        assert_eq!(currency, 50_000);
        assert_eq!(upgrades.bullet_size, 20);
    }

    #[test]
    fn test_derived_values() {
        let tuning = Tuning::default();
        let base = Upgrades::default();
        assert!((base.shot_interval_ms(&tuning) - 200.0).abs() < 0.001);
        assert!((base.bullet_radius(&tuning) - 5.0).abs() < 0.001);

        let levelled = Upgrades {
            fire_rate: 10,
            bullet_size: 20,
        };
        assert!((levelled.shot_interval_ms(&tuning) - 180.0).abs() < 0.001);
        assert!((levelled.bullet_radius(&tuning) - 6.0).abs() < 0.001);
    }

    #[test]
    fn test_shot_interval_floor() {
        let mut tuning = Tuning::default();
        tuning.upgrade_step = 0.1;
        let upgrades = Upgrades {
            fire_rate: 9,
            bullet_size: 0,
        };
        // 200 * 0.1 = 20, floored at 50
        assert!((upgrades.shot_interval_ms(&tuning) - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_inventory_never_negative() {
        let mut inv = Inventory::default();
        assert!(!inv.consume(ItemKind::Spread));
        assert_eq!(inv.count(ItemKind::Spread), 0);
        inv.add(ItemKind::Spread, 1);
        assert!(inv.consume(ItemKind::Spread));
        assert!(!inv.consume(ItemKind::Spread));
        assert_eq!(inv.count(ItemKind::Spread), 0);
    }

    #[test]
    fn test_purchase() {
        let tuning = Tuning::default();
        let mut inv = Inventory::default();
        let mut currency = 3999;
        assert!(!inv.purchase(ItemKind::Wingman, &mut currency, &tuning));
        assert!(inv.purchase(ItemKind::Homing, &mut currency, &tuning));
        assert_eq!(currency, 1999);
        assert_eq!(inv.count(ItemKind::Homing), 1);
        assert!(!inv.purchase(ItemKind::Homing, &mut currency, &tuning));
    }
}
