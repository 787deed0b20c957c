//! Time-driven procedural spawning with difficulty scaling

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Enemy, EntityIds, HostileBullet, ItemKind, Pickup};
use crate::bearing;
use crate::tuning::Tuning;

/// What the spawner emitted this tick
#[derive(Debug, Clone)]
pub enum Spawned {
    Enemy(Enemy),
    Pickup(Pickup),
}

/// Spawn and enemy-fire timers for regular play
#[derive(Debug, Clone, Default)]
pub struct Spawner {
    pub last_spawn_ms: u64,
    pub last_enemy_fire_ms: u64,
    /// Highest difficulty seen this run; difficulty never drops
    pub difficulty: f32,
}

impl Spawner {
    /// Difficulty factor at `elapsed_ms` into the run (1.0 at start)
    pub fn difficulty_at(&mut self, elapsed_ms: u64, tuning: &Tuning) -> f32 {
        let factor = 1.0
            + (elapsed_ms as f32 / tuning.difficulty_window_ms) * tuning.difficulty_strength;
        self.difficulty = self.difficulty.max(factor).max(1.0);
        self.difficulty
    }

    /// Emit at most one entity once the scaled interval has elapsed
    pub fn tick(
        &mut self,
        now_ms: u64,
        rng: &mut Pcg32,
        ids: &mut EntityIds,
        tuning: &Tuning,
    ) -> Option<Spawned> {
        let difficulty = self.difficulty_at(now_ms, tuning);
        let interval = tuning.enemy_base_interval_ms / difficulty;
        if now_ms.saturating_sub(self.last_spawn_ms) as f32 <= interval {
            return None;
        }
        self.last_spawn_ms = now_ms;

        let lo = tuning.spawn_margin;
        let hi = (tuning.width - tuning.spawn_margin).max(lo + 1.0);
        let x = rng.random_range(lo..hi);

        if rng.random_bool(tuning.pickup_chance) {
            let kind = ItemKind::ALL[rng.random_range(0..ItemKind::ALL.len())];
            return Some(Spawned::Pickup(Pickup {
                id: ids.next_id(),
                kind,
                pos: Vec2::new(x, tuning.spawn_y),
                radius: tuning.pickup_radius,
                rotation: 0.0,
                speed: tuning.pickup_speed,
            }));
        }

        Some(Spawned::Enemy(Enemy {
            id: ids.next_id(),
            pos: Vec2::new(x, tuning.spawn_y),
            half: Vec2::new(tuning.enemy_half_extents.0, tuning.enemy_half_extents.1),
            speed: tuning.enemy_base_speed * difficulty,
            rotation: rng.random_range(-0.05..0.05),
            health: tuning.enemy_health,
            max_health: tuning.enemy_health,
        }))
    }

    /// Every enemy fires one aimed shot per fire interval
    pub fn enemy_fire(
        &mut self,
        now_ms: u64,
        enemies: &[Enemy],
        target: Vec2,
        tuning: &Tuning,
    ) -> Vec<HostileBullet> {
        if now_ms.saturating_sub(self.last_enemy_fire_ms) <= tuning.enemy_fire_interval_ms {
            return Vec::new();
        }
        self.last_enemy_fire_ms = now_ms;
        enemies
            .iter()
            .map(|enemy| {
                let muzzle = enemy.pos + Vec2::new(0.0, enemy.half.y);
                HostileBullet {
                    pos: muzzle,
                    radius: tuning.enemy_bullet_radius,
                    angle: bearing(muzzle, target),
                    speed: tuning.enemy_bullet_speed,
                    damage: tuning.enemy_bullet_damage,
                }
            })
            .collect()
    }
}
