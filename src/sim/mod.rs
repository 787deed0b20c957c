//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Logical clock only, advanced by the caller
//! - Seeded RNG only
//! - Stable iteration order (pool insertion order)
//! - No rendering or platform dependencies

pub mod boss;
pub mod pools;
pub mod powerup;
pub mod shape;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod upgrades;

pub use boss::{Boss, BossStage};
pub use powerup::{PowerUpKind, PowerUpState};
pub use shape::{Shape, overlaps};
pub use snapshot::RenderSnapshot;
pub use spawner::{Spawned, Spawner};
pub use state::{
    Bullet, Enemy, GameEvent, GamePhase, HostileBullet, ItemKind, Pickup, Player, RunOutcome,
    SimulationState, TargetRef,
};
pub use tick::{TickInput, start_boss_encounter, tick};
pub use upgrades::{Inventory, UpgradeAxis, Upgrades};
