//! Run lifecycle controller
//!
//! `Game` is the surface a host (browser shell, native demo, tests) talks to.
//! It owns the persistent profile and at most one run, feeds the simulation
//! its frame deltas and input, and writes the profile back whenever money or
//! items change hands.

use crate::consts::MAX_FRAME_MS;
use crate::persistence::{Profile, Storage};
use crate::sim::{
    GameEvent, GamePhase, ItemKind, RenderSnapshot, SimulationState, TickInput, UpgradeAxis,
    start_boss_encounter, tick,
};
use crate::tuning::Tuning;

pub struct Game {
    tuning: Tuning,
    storage: Box<dyn Storage>,
    profile: Profile,
    run: Option<SimulationState>,
}

impl Game {
    /// Create a controller, loading the saved profile (defaults on failure)
    pub fn new(tuning: Tuning, storage: Box<dyn Storage>) -> Self {
        let tuning = tuning.validated();
        let profile = Profile::load(storage.as_ref(), &tuning);
        Self {
            tuning,
            storage,
            profile,
            run: None,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// The run in progress (or just finished), if any
    pub fn run(&self) -> Option<&SimulationState> {
        self.run.as_ref()
    }

    /// Start a fresh run, discarding any previous one
    pub fn start_run(&mut self, seed: u64) {
        if let Some(previous) = self.run.take() {
            self.bank(&previous);
        }
        log::info!("Starting run with seed {}", seed);
        self.run = Some(SimulationState::new(seed, self.tuning.clone(), &self.profile));
    }

    /// Abort the run and return to "no run". The wallet is kept.
    pub fn reset_run(&mut self) {
        if let Some(run) = self.run.take() {
            log::info!("Run reset at {} ms", run.time_ms);
            self.bank(&run);
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.run.as_ref().is_some_and(|r| r.is_game_over())
    }

    /// Phase of the current run; `None` means menus
    pub fn current_state(&self) -> Option<GamePhase> {
        self.run.as_ref().map(|r| r.phase)
    }

    /// Begin the boss encounter now. Returns false when not in regular play.
    pub fn start_boss(&mut self) -> bool {
        self.run.as_mut().is_some_and(start_boss_encounter)
    }

    /// Advance the current run and return what to draw
    pub fn tick(&mut self, dt_ms: u64, input: &TickInput) -> Option<RenderSnapshot> {
        let run = self.run.as_mut()?;
        tick(run, input, dt_ms.min(MAX_FRAME_MS));

        let events = run.drain_events();
        let needs_save = events
            .iter()
            .any(|e| matches!(e, GameEvent::ItemActivated { .. } | GameEvent::RunEnded { .. }));

        let snapshot = RenderSnapshot::capture(run);
        if needs_save {
            self.sync_from_run();
            self.save();
        }
        Some(snapshot)
    }

    /// Buy one consumable from the shop. Only allowed between runs.
    pub fn purchase(&mut self, item: ItemKind) -> bool {
        if self.run_in_progress() {
            return false;
        }
        let profile = &mut self.profile;
        if !profile
            .inventory
            .purchase(item, &mut profile.currency, &self.tuning)
        {
            return false;
        }
        log::info!(
            "Bought {} ({} left)",
            item.as_str(),
            self.profile.currency
        );
        self.save();
        true
    }

    /// Buy one upgrade level. Only allowed between runs.
    pub fn level_up(&mut self, axis: UpgradeAxis) -> bool {
        if self.run_in_progress() {
            return false;
        }
        let profile = &mut self.profile;
        if !profile
            .upgrades
            .level_up(axis, &mut profile.currency, &self.tuning)
        {
            return false;
        }
        log::info!(
            "Upgraded {:?} to level {}",
            axis,
            self.profile.upgrades.level(axis)
        );
        self.save();
        true
    }

    fn run_in_progress(&self) -> bool {
        self.run.as_ref().is_some_and(|r| !r.is_game_over())
    }

    /// Copy the wallet and inventory out of the live run
    fn sync_from_run(&mut self) {
        if let Some(run) = &self.run {
            self.profile.currency = run.score;
            self.profile.inventory = run.inventory.clone();
        }
    }

    /// Bank an aborted run. An ended run was already banked when it ended and
    /// the shop may have spent from the profile since.
    fn bank(&mut self, run: &SimulationState) {
        if run.is_game_over() {
            return;
        }
        self.profile.currency = run.score;
        self.profile.inventory = run.inventory.clone();
        self.save();
    }

    fn save(&mut self) {
        if let Err(e) = self.profile.save(self.storage.as_mut()) {
            log::warn!("Failed to save profile: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStorage, PersistenceError};
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Storage that shares its contents with the test
    #[derive(Clone, Default)]
    struct SharedStorage(Rc<RefCell<MemoryStorage>>);

    impl Storage for SharedStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.0.borrow().get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
            self.0.borrow_mut().set(key, value)
        }
    }

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("read-only".to_string()))
        }
    }

    fn quiet_tuning() -> Tuning {
        Tuning {
            enemy_base_interval_ms: 1.0e9,
            boss_trigger_ms: None,
            ..Tuning::default()
        }
    }

    fn funded_game(currency: u64) -> (Game, SharedStorage) {
        let storage = SharedStorage::default();
        let profile = Profile {
            currency,
            ..Default::default()
        };
        profile.save(&mut storage.clone()).unwrap();
        (
            Game::new(quiet_tuning(), Box::new(storage.clone())),
            storage,
        )
    }

    #[test]
    fn test_no_run_means_menus() {
        let mut game = Game::new(Tuning::default(), Box::new(MemoryStorage::new()));
        assert_eq!(game.current_state(), None);
        assert!(!game.is_game_over());
        assert!(game.tick(16, &TickInput::default()).is_none());
        assert!(!game.start_boss());
    }

    #[test]
    fn test_upgrade_gating() {
        let (mut game, _) = funded_game(999);
        assert!(!game.level_up(UpgradeAxis::FireRate));
        assert_eq!(game.profile().currency, 999);

        let (mut game, storage) = funded_game(1000);
        assert!(game.level_up(UpgradeAxis::FireRate));
        assert_eq!(game.profile().currency, 0);
        assert_eq!(game.profile().upgrades.fire_rate, 1);

        // Persisted
        let saved = Profile::load(&storage, &Tuning::default());
        assert_eq!(saved.upgrades.fire_rate, 1);
    }

    #[test]
    fn test_shop_only_between_runs() {
        let (mut game, _) = funded_game(10_000);
        game.start_run(1);
        assert!(!game.purchase(ItemKind::Triple));
        assert!(!game.level_up(UpgradeAxis::BulletSize));

        game.reset_run();
        assert!(game.purchase(ItemKind::Wingman));
        assert_eq!(game.profile().currency, 6000);
        assert_eq!(game.profile().inventory.count(ItemKind::Wingman), 1);
        assert!(game.purchase(ItemKind::Triple));
        assert!(game.purchase(ItemKind::Triple));
        assert!(game.purchase(ItemKind::Triple));
        assert!(!game.purchase(ItemKind::Triple));
        assert_eq!(game.profile().currency, 0);
    }

    #[test]
    fn test_activation_persists_inventory() {
        let (mut game, storage) = funded_game(4000);
        assert!(game.purchase(ItemKind::Wingman));
        game.start_run(5);

        let input = TickInput {
            activate: Some(ItemKind::Wingman),
            ..Default::default()
        };
        let snap = game.tick(16, &input).unwrap();
        assert!(snap.player.has_wingman);
        assert_eq!(Profile::load(&storage, &Tuning::default()).inventory.count(ItemKind::Wingman), 0);
    }

    #[test]
    fn test_wingman_not_consumed_when_active() {
        let (mut game, _) = funded_game(8000);
        assert!(game.purchase(ItemKind::Wingman));
        assert!(game.purchase(ItemKind::Wingman));
        game.start_run(5);
        let input = TickInput {
            activate: Some(ItemKind::Wingman),
            ..Default::default()
        };
        game.tick(16, &input);
        game.tick(16, &input);
        assert_eq!(game.run().unwrap().inventory.count(ItemKind::Wingman), 1);
    }

    #[test]
    fn test_run_end_banks_score() {
        let (mut game, storage) = funded_game(0);
        game.start_run(9);
        for _ in 0..700 {
            game.tick(100, &TickInput::default());
            if game.is_game_over() {
                break;
            }
        }
        assert!(game.is_game_over());
        assert_eq!(game.current_state(), Some(GamePhase::GameOver));
        let score = game.run().unwrap().score;
        assert_eq!(game.profile().currency, score);
        assert_eq!(Profile::load(&storage, &Tuning::default()).currency, score);
    }

    fn finish_run(game: &mut Game, seed: u64) {
        game.start_run(seed);
        for _ in 0..700 {
            game.tick(100, &TickInput::default());
            if game.is_game_over() {
                break;
            }
        }
        assert!(game.is_game_over());
    }

    #[test]
    fn test_upgrade_after_game_over_is_paid_for() {
        let (mut game, storage) = funded_game(3000);
        finish_run(&mut game, 9);
        assert_eq!(game.profile().currency, 3000);

        assert!(game.level_up(UpgradeAxis::FireRate));
        assert_eq!(game.profile().currency, 2000);

        game.start_run(10);
        assert_eq!(game.profile().currency, 2000);
        assert_eq!(game.profile().upgrades.fire_rate, 1);
        assert_eq!(game.run().unwrap().score, 2000);
        let saved = Profile::load(&storage, &Tuning::default());
        assert_eq!(saved.currency, 2000);
        assert_eq!(saved.upgrades.fire_rate, 1);
    }

    #[test]
    fn test_purchase_after_game_over_is_kept() {
        let (mut game, storage) = funded_game(3000);
        finish_run(&mut game, 9);

        assert!(game.purchase(ItemKind::Triple));
        assert_eq!(game.profile().currency, 1000);
        assert_eq!(game.profile().inventory.count(ItemKind::Triple), 1);

        game.reset_run();
        assert_eq!(game.profile().currency, 1000);
        assert_eq!(game.profile().inventory.count(ItemKind::Triple), 1);
        let saved = Profile::load(&storage, &Tuning::default());
        assert_eq!(saved.inventory.count(ItemKind::Triple), 1);

        game.start_run(11);
        assert_eq!(game.run().unwrap().inventory.count(ItemKind::Triple), 1);
    }

    #[test]
    fn test_dt_is_clamped() {
        let (mut game, _) = funded_game(0);
        game.start_run(2);
        let snap = game.tick(5_000, &TickInput::default()).unwrap();
        assert_eq!(snap.run_elapsed_ms, MAX_FRAME_MS);
    }

    #[test]
    fn test_start_boss() {
        let (mut game, _) = funded_game(0);
        game.start_run(3);
        game.tick(16, &TickInput::default());
        assert!(game.start_boss());
        assert_eq!(game.current_state(), Some(GamePhase::BossIntro));
        // Only once per run
        assert!(!game.start_boss());
    }

    #[test]
    fn test_reset_returns_to_menus() {
        let (mut game, _) = funded_game(0);
        game.start_run(3);
        let input = TickInput {
            pointer: Some(Vec2::new(100.0, 600.0)),
            ..Default::default()
        };
        game.tick(16, &input);
        game.reset_run();
        assert_eq!(game.current_state(), None);
        assert!(game.run().is_none());
    }

    #[test]
    fn test_failed_save_is_not_fatal() {
        let mut game = Game::new(quiet_tuning(), Box::new(BrokenStorage));
        game.start_run(1);
        for _ in 0..700 {
            game.tick(100, &TickInput::default());
        }
        assert!(game.is_game_over());
    }
}
