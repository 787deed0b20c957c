//! Read-only view of a run for the renderer

use glam::Vec2;
use serde::Serialize;

use super::boss::BossStage;
use super::powerup::PowerUpKind;
use super::state::{GamePhase, ItemKind, RunOutcome, SimulationState};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub has_wingman: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletView {
    pub pos: Vec2,
    pub radius: f32,
    pub from_wingman: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub pos: Vec2,
    pub half: Vec2,
    pub rotation: f32,
    pub health: i32,
    pub max_health: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PickupView {
    pub pos: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct BossView {
    pub pos: Vec2,
    pub half: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub phase: u32,
    pub is_vulnerable: bool,
    pub stage: BossStage,
    /// Time spent in the vulnerable stage
    pub fight_elapsed_ms: u64,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub outcome: Option<RunOutcome>,
    pub player: PlayerView,
    pub bullets: Vec<BulletView>,
    pub enemies: Vec<EnemyView>,
    pub enemy_bullets: Vec<ProjectileView>,
    pub boss_bullets: Vec<ProjectileView>,
    pub pickups: Vec<PickupView>,
    pub boss: Option<BossView>,
    pub power_up: PowerUpKind,
    pub power_up_remaining_ms: u64,
    pub score: u64,
    pub run_elapsed_ms: u64,
    pub run_remaining_ms: u64,
}

impl RenderSnapshot {
    pub fn capture(state: &SimulationState) -> Self {
        let now = state.time_ms;
        let bullet_radius = state.bullet_radius();
        let projectile = |b: &super::state::HostileBullet| ProjectileView {
            pos: b.pos,
            radius: b.radius,
        };

        Self {
            phase: state.phase,
            outcome: state.outcome,
            player: PlayerView {
                pos: state.player.pos,
                health: state.player.health,
                max_health: state.player.max_health,
                has_wingman: state.player.has_wingman,
            },
            bullets: state
                .bullets
                .iter()
                .map(|b| BulletView {
                    pos: b.pos,
                    radius: bullet_radius,
                    from_wingman: b.from_wingman,
                })
                .collect(),
            enemies: state
                .enemies
                .iter()
                .map(|e| EnemyView {
                    pos: e.pos,
                    half: e.half,
                    rotation: e.rotation,
                    health: e.health,
                    max_health: e.max_health,
                })
                .collect(),
            enemy_bullets: state.enemy_bullets.iter().map(projectile).collect(),
            boss_bullets: state.boss_bullets.iter().map(projectile).collect(),
            pickups: state
                .pickups
                .iter()
                .map(|p| PickupView {
                    pos: p.pos,
                    radius: p.radius,
                    rotation: p.rotation,
                    kind: p.kind,
                })
                .collect(),
            boss: state.boss.as_ref().map(|b| BossView {
                pos: b.pos,
                half: b.half,
                health: b.health,
                max_health: b.max_health,
                phase: b.phase,
                is_vulnerable: b.is_vulnerable,
                stage: b.stage,
                fight_elapsed_ms: b.vulnerable_elapsed_ms(now),
            }),
            power_up: state.power_up.kind,
            power_up_remaining_ms: state.power_up.remaining_ms(now),
            score: state.score,
            run_elapsed_ms: now,
            run_remaining_ms: state.tuning.run_duration_ms.saturating_sub(now),
        }
    }

    /// JSON form for renderers living across an FFI or network boundary
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Profile;
    use crate::sim::upgrades::Upgrades;
    use crate::sim::Bullet;
    use crate::tuning::Tuning;

    #[test]
    fn test_bullet_radius_is_derived_from_upgrades() {
        let profile = Profile {
            upgrades: Upgrades {
                fire_rate: 0,
                bullet_size: 20,
            },
            ..Default::default()
        };
        let mut state = SimulationState::new(3, Tuning::default(), &profile);
        state.bullets.push(Bullet {
            id: 1,
            pos: Vec2::new(10.0, 10.0),
            speed: 10.0,
            angle: None,
            homing: None,
            from_wingman: true,
        });
        let snap = RenderSnapshot::capture(&state);
        assert!((snap.bullets[0].radius - 6.0).abs() < 0.0001);
        assert!(snap.bullets[0].from_wingman);
        assert_eq!(snap.run_remaining_ms, 60_000);
        assert!(snap.boss.is_none());
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = SimulationState::new(3, Tuning::default(), &Profile::default());
        let json = RenderSnapshot::capture(&state).to_json();
        assert!(json.contains("\"phase\":\"Playing\""));
        assert!(json.contains("\"power_up\":\"Normal\""));
    }
}
