//! Game state and core simulation types
//!
//! Everything a run mutates lives in [`SimulationState`]; nothing in the
//! simulation reaches for global state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::powerup::PowerUpState;
use super::shape::Shape;
use super::spawner::Spawner;
use super::upgrades::{Inventory, Upgrades};
use crate::persistence::Profile;
use crate::tuning::Tuning;

/// Top-level phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Regular waves; the spawner is driven
    Playing,
    /// Boss is descending and cannot be hurt
    BossIntro,
    /// Boss is vulnerable and attacking
    BossFight,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    TimeUp,
    PlayerDestroyed,
    BossDefeated,
}

/// Items that can fall as pickups or be bought and activated from inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Triple,
    Spread,
    Homing,
    Speed,
    Wingman,
    ClearScreen,
}

impl ItemKind {
    pub const ALL: [ItemKind; 6] = [
        ItemKind::Triple,
        ItemKind::Spread,
        ItemKind::Homing,
        ItemKind::Speed,
        ItemKind::Wingman,
        ItemKind::ClearScreen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Triple => "Triple",
            ItemKind::Spread => "Spread",
            ItemKind::Homing => "Homing",
            ItemKind::Speed => "Speed",
            ItemKind::Wingman => "Wingman",
            ItemKind::ClearScreen => "ClearScreen",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        ItemKind::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

/// Something that happened during a tick, for the controller and renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    EnemyKilled { id: u32, pos: Vec2, score: u64 },
    BossHit { health: i32 },
    PlayerHit { damage: i32, health: i32 },
    PickupCollected { kind: ItemKind },
    ItemActivated { kind: ItemKind },
    PowerUpExpired,
    BossEncounterStarted,
    BossVulnerable,
    BossPhaseChanged { phase: u32 },
    RunEnded { outcome: RunOutcome, bonus: u64 },
}

/// The player's craft
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub pos: Vec2,
    pub half: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub base_speed: f32,
    /// Effective speed, boosted by the Speed power-up
    pub speed: f32,
    /// Escort that mirrors single-bullet shots until the player dies
    pub has_wingman: bool,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.player_spawn.0, tuning.player_spawn.1),
            half: Vec2::new(tuning.player_half_extents.0, tuning.player_half_extents.1),
            health: tuning.player_max_health,
            max_health: tuning.player_max_health,
            base_speed: tuning.player_base_speed,
            speed: tuning.player_base_speed,
            has_wingman: false,
        }
    }

    /// Forgiving hitbox used against everything hostile
    pub fn hitbox(&self, scale: f32) -> Shape {
        Shape::rect(self.pos, self.half).scaled(scale)
    }

    /// Apply damage, clamped at zero. Returns true when this hit is the one
    /// that took health from positive to zero.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        let was_alive = self.health > 0;
        self.health = (self.health - damage.max(0)).clamp(0, self.max_health);
        was_alive && self.health == 0
    }
}

/// What a homing bullet is chasing. Only a handle: the target may vanish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetRef {
    Enemy(u32),
    Boss,
}

/// A player bullet. Its radius comes from the bullet-size upgrade, not from
/// the bullet itself.
#[derive(Debug, Clone, Serialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub speed: f32,
    /// Heading, clockwise from straight up; `None` flies straight up
    pub angle: Option<f32>,
    pub homing: Option<TargetRef>,
    /// Fired from a wingman mount (cosmetic)
    pub from_wingman: bool,
}

/// A descending enemy craft
#[derive(Debug, Clone, Serialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub half: Vec2,
    pub speed: f32,
    /// Visual only
    pub rotation: f32,
    pub health: i32,
    pub max_health: i32,
}

impl Enemy {
    pub fn shape(&self) -> Shape {
        Shape::rect(self.pos, self.half)
    }
}

/// A projectile fired by an enemy or the boss
#[derive(Debug, Clone, Serialize)]
pub struct HostileBullet {
    pub pos: Vec2,
    pub radius: f32,
    /// Polar angle (radians from +x, y pointing down)
    pub angle: f32,
    pub speed: f32,
    pub damage: i32,
}

impl HostileBullet {
    pub fn shape(&self) -> Shape {
        Shape::circle(self.pos, self.radius)
    }
}

/// A falling collectible
#[derive(Debug, Clone, Serialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: ItemKind,
    pub pos: Vec2,
    pub radius: f32,
    /// Visual only
    pub rotation: f32,
    pub speed: f32,
}

impl Pickup {
    pub fn shape(&self) -> Shape {
        Shape::circle(self.pos, self.radius)
    }
}

/// Monotonic entity id allocator
#[derive(Debug, Clone)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Balance constants for this run
    pub tuning: Tuning,
    /// Logical run clock (ms since run start, frozen while paused)
    pub time_ms: u64,
    /// Current phase
    pub phase: GamePhase,
    /// Phase to return to when unpausing
    pub resume_phase: Option<GamePhase>,
    /// Set exactly once, when the run ends
    pub outcome: Option<RunOutcome>,
    /// Score, doubling as currency
    pub score: u64,
    pub player: Player,
    /// Latest desired player position from the input collaborator
    pub pointer: Vec2,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub enemy_bullets: Vec<HostileBullet>,
    pub boss_bullets: Vec<HostileBullet>,
    pub pickups: Vec<Pickup>,
    pub boss: Option<Boss>,
    pub power_up: PowerUpState,
    pub upgrades: Upgrades,
    pub inventory: Inventory,
    pub spawner: Spawner,
    pub last_shot_ms: u64,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    pub ids: EntityIds,
}

impl SimulationState {
    /// Create a fresh run funded by the given profile
    pub fn new(seed: u64, tuning: Tuning, profile: &Profile) -> Self {
        let player = Player::new(&tuning);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ms: 0,
            phase: GamePhase::Playing,
            resume_phase: None,
            outcome: None,
            score: profile.currency,
            pointer: player.pos,
            player,
            bullets: Vec::new(),
            enemies: Vec::new(),
            enemy_bullets: Vec::new(),
            boss_bullets: Vec::new(),
            pickups: Vec::new(),
            boss: None,
            power_up: PowerUpState::default(),
            upgrades: profile.upgrades,
            inventory: profile.inventory.clone(),
            spawner: Spawner::default(),
            last_shot_ms: 0,
            events: Vec::new(),
            ids: EntityIds::default(),
            tuning,
        }
    }

    /// Abort the current run in place: clear every pool, drop the boss and
    /// rewind all timestamps. Wallet, upgrades and inventory are kept.
    pub fn reset(&mut self) {
        self.time_ms = 0;
        self.phase = GamePhase::Playing;
        self.resume_phase = None;
        self.outcome = None;
        self.player = Player::new(&self.tuning);
        self.pointer = self.player.pos;
        self.bullets.clear();
        self.enemies.clear();
        self.enemy_bullets.clear();
        self.boss_bullets.clear();
        self.pickups.clear();
        self.boss = None;
        self.power_up = PowerUpState::default();
        self.spawner = Spawner::default();
        self.last_shot_ms = 0;
        self.events.clear();
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Take the events accumulated since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current derived player bullet radius
    pub fn bullet_radius(&self) -> f32 {
        self.upgrades.bullet_radius(&self.tuning)
    }

    /// Current derived auto-fire interval
    pub fn shot_interval_ms(&self) -> f32 {
        self.upgrades.shot_interval_ms(&self.tuning)
    }

    /// Award score, saturating instead of overflowing
    pub fn add_score(&mut self, amount: u64) {
        self.score = self.score.saturating_add(amount);
    }

    /// End the run. Only the first call has any effect; the bonus is
    /// credited exactly once.
    pub fn end_run(&mut self, outcome: RunOutcome, bonus: u64) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        self.add_score(bonus);
        self.phase = GamePhase::GameOver;
        self.resume_phase = None;
        self.events.push(GameEvent::RunEnded { outcome, bonus });
        log::info!(
            "Run ended: {:?} at {} ms, bonus {}, score {}",
            outcome,
            self.time_ms,
            bonus,
            self.score
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> SimulationState {
        SimulationState::new(7, Tuning::default(), &Profile::default())
    }

    #[test]
    fn test_take_damage_clamps_and_reports_once() {
        let mut player = Player::new(&Tuning::default());
        assert!(!player.take_damage(60));
        assert_eq!(player.health, 40);
        assert!(player.take_damage(60));
        assert_eq!(player.health, 0);
        // Already dead: never reported again
        assert!(!player.take_damage(20));
        assert_eq!(player.health, 0);
    }

    #[test]
    fn test_end_run_is_idempotent() {
        let mut state = fresh();
        assert!(state.end_run(RunOutcome::TimeUp, 500));
        assert_eq!(state.score, 500);
        assert!(!state.end_run(RunOutcome::BossDefeated, 5000));
        assert_eq!(state.score, 500);
        assert_eq!(state.outcome, Some(RunOutcome::TimeUp));
        let ended = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::RunEnded { .. }))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_reset_clears_pools_and_keeps_wallet() {
        let mut state = fresh();
        state.score = 1234;
        state.enemies.push(Enemy {
            id: 1,
            pos: Vec2::ZERO,
            half: Vec2::splat(20.0),
            speed: 1.0,
            rotation: 0.0,
            health: 1,
            max_health: 1,
        });
        state.time_ms = 5000;
        state.phase = GamePhase::GameOver;
        state.reset();
        assert!(state.enemies.is_empty());
        assert!(state.boss.is_none());
        assert_eq!(state.time_ms, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 1234);
    }

    #[test]
    fn test_item_kind_names() {
        for kind in ItemKind::ALL {
            assert_eq!(ItemKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(ItemKind::from_str("Laser"), None);
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut ids = EntityIds::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
    }
}
