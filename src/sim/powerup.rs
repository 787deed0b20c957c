//! Timed power-ups and instantaneous item effects
//!
//! At most one timed power-up is active. A new one replaces the old one and
//! restarts the timer; Wingman and ClearScreen never occupy the slot.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, ItemKind, SimulationState};

/// The timed power-up slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    #[default]
    Normal,
    Triple,
    Spread,
    Homing,
    Speed,
}

impl PowerUpKind {
    /// Timed power-up granted by an item, if the item is a timed one
    pub fn from_item(item: ItemKind) -> Option<Self> {
        match item {
            ItemKind::Triple => Some(PowerUpKind::Triple),
            ItemKind::Spread => Some(PowerUpKind::Spread),
            ItemKind::Homing => Some(PowerUpKind::Homing),
            ItemKind::Speed => Some(PowerUpKind::Speed),
            ItemKind::Wingman | ItemKind::ClearScreen => None,
        }
    }

    /// Whether this pattern already fires more than one bullet
    pub fn is_multi_shot(&self) -> bool {
        matches!(self, PowerUpKind::Triple | PowerUpKind::Spread)
    }
}

/// Active timed power-up and when it runs out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PowerUpState {
    pub kind: PowerUpKind,
    pub expires_at_ms: u64,
}

impl PowerUpState {
    pub fn is_active(&self) -> bool {
        self.kind != PowerUpKind::Normal
    }

    /// Overwrite the slot; last activation wins and fully resets the timer
    pub fn activate(&mut self, kind: PowerUpKind, now_ms: u64, duration_ms: u64) {
        self.kind = kind;
        self.expires_at_ms = now_ms + duration_ms;
    }

    /// Revert to Normal once `now_ms` is past the expiry. Returns true on expiry.
    pub fn expire(&mut self, now_ms: u64) -> bool {
        if self.is_active() && now_ms > self.expires_at_ms {
            *self = Self::default();
            return true;
        }
        false
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        if self.is_active() {
            self.expires_at_ms.saturating_sub(now_ms)
        } else {
            0
        }
    }
}

/// Expire a stale power-up and restore the player's baseline speed
pub fn expire_power_up(state: &mut SimulationState) {
    if state.power_up.expire(state.time_ms) {
        state.player.speed = state.player.base_speed;
        state.events.push(GameEvent::PowerUpExpired);
        log::debug!("Power-up expired at {} ms", state.time_ms);
    }
}

/// Apply an item's effect to the run
pub fn apply_pickup(state: &mut SimulationState, item: ItemKind) {
    match item {
        ItemKind::ClearScreen => {
            state.enemies.clear();
            state.enemy_bullets.clear();
            state.boss_bullets.clear();
        }
        ItemKind::Wingman => {
            state.player.has_wingman = true;
        }
        _ => {
            let Some(kind) = PowerUpKind::from_item(item) else {
                return;
            };
            let duration = state.tuning.power_up_duration_ms;
            state.power_up.activate(kind, state.time_ms, duration);
            state.player.speed = if kind == PowerUpKind::Speed {
                state.player.base_speed * state.tuning.speed_boost_mult
            } else {
                state.player.base_speed
            };
            log::debug!("Power-up {:?} active until {} ms", kind, state.power_up.expires_at_ms);
        }
    }
}

/// Activate an item from the inventory.
///
/// Silently does nothing when none are owned, or when the item is a wingman
/// that is already flying (the item is kept in that case).
pub fn activate_item(state: &mut SimulationState, item: ItemKind) -> bool {
    if state.inventory.count(item) == 0 {
        return false;
    }
    if item == ItemKind::Wingman && state.player.has_wingman {
        return false;
    }
    state.inventory.consume(item);
    apply_pickup(state, item);
    state.events.push(GameEvent::ItemActivated { kind: item });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Profile;
    use crate::sim::state::{Enemy, HostileBullet};
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn fresh() -> SimulationState {
        SimulationState::new(1, Tuning::default(), &Profile::default())
    }

    #[test]
    fn test_speed_boost_and_expiry() {
        let mut state = fresh();
        apply_pickup(&mut state, ItemKind::Speed);
        assert_eq!(state.power_up.kind, PowerUpKind::Speed);
        assert!((state.player.speed - 7.5).abs() < 0.0001);

        state.time_ms = 8000;
        expire_power_up(&mut state);
        assert_eq!(state.power_up.kind, PowerUpKind::Speed);

        state.time_ms = 8001;
        expire_power_up(&mut state);
        assert_eq!(state.power_up.kind, PowerUpKind::Normal);
        assert!((state.player.speed - 5.0).abs() < 0.0001);
    }

    #[test]
    fn test_last_pickup_wins_and_resets_timer() {
        let mut state = fresh();
        apply_pickup(&mut state, ItemKind::Speed);
        state.time_ms = 5000;
        apply_pickup(&mut state, ItemKind::Spread);
        assert_eq!(state.power_up.kind, PowerUpKind::Spread);
        assert_eq!(state.power_up.expires_at_ms, 13_000);
        // Switching away from Speed drops the boost
        assert!((state.player.speed - state.player.base_speed).abs() < 0.0001);
    }

    #[test]
    fn test_wingman_is_idempotent_and_untimed() {
        let mut state = fresh();
        apply_pickup(&mut state, ItemKind::Triple);
        apply_pickup(&mut state, ItemKind::Wingman);
        apply_pickup(&mut state, ItemKind::Wingman);
        assert!(state.player.has_wingman);
        assert_eq!(state.power_up.kind, PowerUpKind::Triple);
    }

    #[test]
    fn test_clear_screen_purges_hostiles_only() {
        let mut state = fresh();
        state.enemies.push(Enemy {
            id: 1,
            pos: Vec2::new(100.0, 100.0),
            half: Vec2::splat(20.0),
            speed: 1.0,
            rotation: 0.0,
            health: 3,
            max_health: 3,
        });
        let shot = HostileBullet {
            pos: Vec2::new(10.0, 10.0),
            radius: 5.0,
            angle: 1.0,
            speed: 4.0,
            damage: 5,
        };
        state.enemy_bullets.push(shot.clone());
        state.boss_bullets.push(shot);
        apply_pickup(&mut state, ItemKind::Homing);
        apply_pickup(&mut state, ItemKind::ClearScreen);
        assert!(state.enemies.is_empty());
        assert!(state.enemy_bullets.is_empty());
        assert!(state.boss_bullets.is_empty());
        assert_eq!(state.power_up.kind, PowerUpKind::Homing);
    }

    #[test]
    fn test_activate_item_consumes_inventory() {
        let mut state = fresh();
        assert!(!activate_item(&mut state, ItemKind::Triple));

        state.inventory.add(ItemKind::Triple, 1);
        assert!(activate_item(&mut state, ItemKind::Triple));
        assert_eq!(state.inventory.count(ItemKind::Triple), 0);
        assert_eq!(state.power_up.kind, PowerUpKind::Triple);
    }

    #[test]
    fn test_active_wingman_keeps_item() {
        let mut state = fresh();
        state.inventory.add(ItemKind::Wingman, 2);
        assert!(activate_item(&mut state, ItemKind::Wingman));
        assert!(!activate_item(&mut state, ItemKind::Wingman));
        assert_eq!(state.inventory.count(ItemKind::Wingman), 1);
    }
}
