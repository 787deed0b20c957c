//! Per-pool motion and culling
//!
//! Each `advance_*` moves every member by its motion law and drops the ones
//! that left the playfield, in a single pass. Collisions are resolved later,
//! in their own step.

use glam::Vec2;

use super::boss::Boss;
use super::state::{Bullet, Enemy, HostileBullet, Pickup, TargetRef};
use crate::tuning::Tuning;
use crate::{heading_from_vertical, polar_direction, vertical_angle_between};

/// Visual spin rates, per nominal frame
const ENEMY_SPIN: f32 = 0.01;
const PICKUP_SPIN: f32 = 0.05;

/// Resolve a homing handle to a live target position
fn target_position(target: TargetRef, enemies: &[Enemy], boss: Option<&Boss>) -> Option<Vec2> {
    match target {
        TargetRef::Enemy(id) => enemies.iter().find(|e| e.id == id).map(|e| e.pos),
        TargetRef::Boss => boss.filter(|b| b.is_vulnerable).map(|b| b.pos),
    }
}

/// Move player bullets and cull those that left the top or either side.
///
/// Homing bullets steer toward their target; when it is gone the handle is
/// dropped and the bullet keeps its last heading.
pub fn advance_bullets(
    bullets: &mut Vec<Bullet>,
    enemies: &[Enemy],
    boss: Option<&Boss>,
    frames: f32,
    radius: f32,
    tuning: &Tuning,
) {
    bullets.retain_mut(|bullet| {
        if let Some(target) = bullet.homing {
            match target_position(target, enemies, boss) {
                Some(pos) => bullet.angle = Some(vertical_angle_between(bullet.pos, pos)),
                None => bullet.homing = None,
            }
        }

        let heading = heading_from_vertical(bullet.angle.unwrap_or(0.0));
        bullet.pos += heading * bullet.speed * frames;

        bullet.pos.y > -radius && bullet.pos.x > -radius && bullet.pos.x < tuning.width + radius
    });
}

/// Move enemies down and cull those past the bottom edge
pub fn advance_enemies(enemies: &mut Vec<Enemy>, frames: f32, tuning: &Tuning) {
    enemies.retain_mut(|enemy| {
        enemy.pos.y += enemy.speed * frames;
        enemy.rotation += ENEMY_SPIN * frames;
        enemy.pos.y < tuning.height + enemy.half.y * 2.0
    });
}

/// Move enemy or boss projectiles along their polar heading and cull any
/// that left the playfield on any side
pub fn advance_hostile(bullets: &mut Vec<HostileBullet>, frames: f32, tuning: &Tuning) {
    bullets.retain_mut(|bullet| {
        bullet.pos += polar_direction(bullet.angle) * bullet.speed * frames;
        let r = bullet.radius;
        bullet.pos.y < tuning.height + r
            && bullet.pos.y > -r
            && bullet.pos.x > -r
            && bullet.pos.x < tuning.width + r
    });
}

/// Let pickups fall and cull those past the bottom edge
pub fn advance_pickups(pickups: &mut Vec<Pickup>, frames: f32, tuning: &Tuning) {
    pickups.retain_mut(|pickup| {
        pickup.pos.y += pickup.speed * frames;
        pickup.rotation += PICKUP_SPIN * frames;
        pickup.pos.y < tuning.height + pickup.radius
    });
}
