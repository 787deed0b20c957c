//! Data-driven game balance
//!
//! Every constant the simulation reads lives here so a run can be re-tuned
//! from a JSON document without touching code.

use serde::{Deserialize, Serialize};

use crate::consts::{GAME_HEIGHT, GAME_WIDTH};

/// Per-phase boss behaviour, relative to the phase 1 baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossPhaseTuning {
    /// Fire interval multiplier (smaller fires faster)
    pub interval_mult: f32,
    /// Projectile speed multiplier
    pub speed_mult: f32,
    /// Projectiles per tracking volley (ignored for the terminal phase)
    pub volley: u32,
}

/// Game balance constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Playfield ===
    pub width: f32,
    pub height: f32,

    // === Run timing (ms) ===
    /// Total run budget
    pub run_duration_ms: u64,
    /// Run time at which the boss encounter starts on its own
    pub boss_trigger_ms: Option<u64>,
    /// Timed power-up lifetime
    pub power_up_duration_ms: u64,

    // === Player ===
    pub player_spawn: (f32, f32),
    pub player_half_extents: (f32, f32),
    pub player_max_health: i32,
    pub player_base_speed: f32,
    /// Player hitbox is deflated by this factor before any hostile check
    pub player_hitbox_scale: f32,
    pub speed_boost_mult: f32,
    /// Wingman mount offsets relative to the player
    pub wingman_offset: (f32, f32),

    // === Player weapon ===
    pub base_shot_interval_ms: f32,
    pub min_shot_interval_ms: f32,
    pub base_bullet_radius: f32,
    pub bullet_speed: f32,
    /// Horizontal spacing of the triple shot
    pub triple_spacing: f32,
    /// Vertical stagger of the triple shot's outer bullets
    pub triple_stagger: f32,
    /// Fan angles (radians from vertical) of the spread shot
    pub spread_angles: Vec<f32>,

    // === Upgrades & shop ===
    pub max_upgrade_level: u32,
    pub upgrade_cost: u64,
    /// Percentage each upgrade level contributes
    pub upgrade_step: f32,
    pub item_cost: u64,
    pub wingman_cost: u64,

    // === Spawner ===
    pub enemy_base_interval_ms: f32,
    pub enemy_base_speed: f32,
    pub difficulty_window_ms: f32,
    pub difficulty_strength: f32,
    pub spawn_margin: f32,
    pub spawn_y: f32,
    pub enemy_half_extents: (f32, f32),
    pub enemy_health: i32,
    pub pickup_chance: f64,
    pub pickup_radius: f32,
    pub pickup_speed: f32,

    // === Enemy fire ===
    pub enemy_fire_interval_ms: u64,
    pub enemy_bullet_speed: f32,
    pub enemy_bullet_radius: f32,
    pub enemy_bullet_damage: i32,

    // === Damage & score ===
    pub contact_damage: i32,
    pub enemy_kill_score: u64,
    pub enemy_kill_bonus: u64,
    pub boss_hit_score: u64,
    pub boss_defeat_bonus: u64,
    pub time_up_bonus_per_hp: u64,

    // === Boss ===
    pub boss_spawn: (f32, f32),
    pub boss_half_extents: (f32, f32),
    pub boss_max_health: i32,
    pub boss_intro_speed: f32,
    pub boss_intro_stop_y: f32,
    pub boss_sway_amplitude: f32,
    pub boss_sway_period_ms: f32,
    pub boss_phase_duration_ms: u64,
    pub boss_base_interval_ms: f32,
    pub boss_base_bullet_speed: f32,
    pub boss_bullet_radius: f32,
    pub boss_ring_bullet_radius: f32,
    pub boss_bullet_damage: i32,
    pub boss_volley_arc: f32,
    pub boss_muzzle_offset: f32,
    pub boss_ring_count: u32,
    pub boss_ring_speed_mult: f32,
    /// Phases in order; the last one fires the ring
    pub boss_phases: Vec<BossPhaseTuning>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            width: GAME_WIDTH,
            height: GAME_HEIGHT,

            run_duration_ms: 60_000,
            boss_trigger_ms: Some(30_000),
            power_up_duration_ms: 8_000,

            player_spawn: (GAME_WIDTH / 2.0, GAME_HEIGHT - 100.0),
            player_half_extents: (30.0, 35.0),
            player_max_health: 100,
            player_base_speed: 5.0,
            player_hitbox_scale: 0.8,
            speed_boost_mult: 1.5,
            wingman_offset: (60.0, 10.0),

            base_shot_interval_ms: 200.0,
            min_shot_interval_ms: 50.0,
            base_bullet_radius: 5.0,
            bullet_speed: 10.0,
            triple_spacing: 15.0,
            triple_stagger: 10.0,
            spread_angles: vec![-0.4, -0.2, 0.0, 0.2, 0.4],

            max_upgrade_level: 20,
            upgrade_cost: 1000,
            upgrade_step: 0.01,
            item_cost: 2000,
            wingman_cost: 4000,

            enemy_base_interval_ms: 1000.0,
            enemy_base_speed: 1.5,
            difficulty_window_ms: 60_000.0,
            difficulty_strength: 2.0,
            spawn_margin: 40.0,
            spawn_y: -50.0,
            enemy_half_extents: (20.0, 20.0),
            enemy_health: 3,
            pickup_chance: 0.05,
            pickup_radius: 15.0,
            pickup_speed: 2.0,

            enemy_fire_interval_ms: 1500,
            enemy_bullet_speed: 4.0,
            enemy_bullet_radius: 5.0,
            enemy_bullet_damage: 5,

            contact_damage: 20,
            enemy_kill_score: 50,
            enemy_kill_bonus: 100,
            boss_hit_score: 1,
            boss_defeat_bonus: 5000,
            time_up_bonus_per_hp: 10,

            boss_spawn: (GAME_WIDTH / 2.0, -100.0),
            boss_half_extents: (75.0, 75.0),
            boss_max_health: 200,
            boss_intro_speed: 3.0,
            boss_intro_stop_y: 150.0,
            boss_sway_amplitude: 165.0,
            boss_sway_period_ms: 1500.0,
            boss_phase_duration_ms: 10_000,
            boss_base_interval_ms: 800.0,
            boss_base_bullet_speed: 3.0,
            boss_bullet_radius: 8.0,
            boss_ring_bullet_radius: 10.0,
            boss_bullet_damage: 20,
            boss_volley_arc: 0.6,
            boss_muzzle_offset: 50.0,
            boss_ring_count: 20,
            boss_ring_speed_mult: 1.5,
            boss_phases: vec![
                BossPhaseTuning { interval_mult: 1.0, speed_mult: 1.0, volley: 3 },
                BossPhaseTuning { interval_mult: 0.7, speed_mult: 1.3, volley: 3 },
                BossPhaseTuning { interval_mult: 0.5, speed_mult: 1.5, volley: 0 },
            ],
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) override document.
    ///
    /// Missing fields keep their defaults; a malformed document yields the
    /// defaults outright.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Tuning>(json) {
            Ok(tuning) => tuning.validated(),
            Err(e) => {
                log::warn!("Rejected tuning override ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Clamp values that would break the simulation's invariants
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.player_hitbox_scale > 0.0 && self.player_hitbox_scale <= 1.0) {
            log::warn!("player_hitbox_scale {} out of range", self.player_hitbox_scale);
            self.player_hitbox_scale = defaults.player_hitbox_scale;
        }
        if self.boss_phases.is_empty() {
            log::warn!("Empty boss phase table, restoring defaults");
            self.boss_phases = defaults.boss_phases.clone();
        }
        if self.run_duration_ms == 0 {
            self.run_duration_ms = defaults.run_duration_ms;
        }
        if self.power_up_duration_ms == 0 {
            self.power_up_duration_ms = defaults.power_up_duration_ms;
        }
        if self.boss_phase_duration_ms == 0 {
            self.boss_phase_duration_ms = defaults.boss_phase_duration_ms;
        }
        if self.difficulty_window_ms <= 0.0 {
            self.difficulty_window_ms = defaults.difficulty_window_ms;
        }
        if self.boss_sway_period_ms <= 0.0 {
            self.boss_sway_period_ms = defaults.boss_sway_period_ms;
        }
        // Keep the swaying boss box on the playfield
        let max_sway = (self.width / 2.0 - self.boss_half_extents.0).max(0.0);
        if self.boss_sway_amplitude > max_sway {
            log::warn!("boss_sway_amplitude {} exceeds {}", self.boss_sway_amplitude, max_sway);
            self.boss_sway_amplitude = max_sway;
        }
        self.difficulty_strength = self.difficulty_strength.max(0.0);
        self.pickup_chance = self.pickup_chance.clamp(0.0, 1.0);
        self.min_shot_interval_ms = self.min_shot_interval_ms.max(1.0);
        self.player_max_health = self.player_max_health.max(1);
        self.boss_max_health = self.boss_max_health.max(1);
        self
    }

    /// Number of phases in the boss fight
    pub fn boss_phase_count(&self) -> u32 {
        self.boss_phases.len() as u32
    }

    /// Cost of a shop item
    pub fn item_price(&self, item: crate::sim::ItemKind) -> u64 {
        match item {
            crate::sim::ItemKind::Wingman => self.wingman_cost,
            _ => self.item_cost,
        }
    }
}
