//! Per-tick simulation step
//!
//! Advances a run by one frame. The steps run in a fixed order and that order
//! is part of the rules: expiry before effects, motion before collisions,
//! hostile hits before player hits, pickups last.

use glam::Vec2;

use super::boss::Boss;
use super::pools::{advance_bullets, advance_enemies, advance_hostile, advance_pickups};
use super::powerup::{PowerUpKind, activate_item, apply_pickup, expire_power_up};
use super::shape::{Shape, overlaps};
use super::spawner::Spawned;
use super::state::{
    Bullet, GameEvent, GamePhase, HostileBullet, ItemKind, RunOutcome, SimulationState, TargetRef,
};
use crate::consts::NOMINAL_FRAME_MS;

/// Input polled once per tick (latest values win, nothing is queued)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired player position (pointer/touch)
    pub pointer: Option<Vec2>,
    /// Inventory item the player asked to use
    pub activate: Option<ItemKind>,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the run by `dt_ms` of logical time
pub fn tick(state: &mut SimulationState, input: &TickInput, dt_ms: u64) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Paused => {
                state.phase = state.resume_phase.take().unwrap_or(GamePhase::Playing);
            }
            GamePhase::GameOver => {}
            phase => {
                state.resume_phase = Some(phase);
                state.phase = GamePhase::Paused;
            }
        }
    }

    if let Some(pointer) = input.pointer {
        state.pointer = pointer;
    }

    // Don't tick if paused or game over
    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return,
        _ => {}
    }

    state.time_ms += dt_ms;
    let now = state.time_ms;
    let frames = dt_ms as f32 / NOMINAL_FRAME_MS;

    // 1. Run budget
    if now >= state.tuning.run_duration_ms {
        time_up(state);
        return;
    }

    // 2. Power-up expiry, then any requested item
    expire_power_up(state);
    if let Some(item) = input.activate {
        activate_item(state, item);
    }

    // 3. Exactly one driver per tick
    match state.phase {
        GamePhase::Playing => drive_spawner(state),
        GamePhase::BossIntro => drive_boss_intro(state, frames),
        GamePhase::BossFight => drive_boss_fight(state),
        _ => {}
    }

    // 4. Auto-fire
    if state.phase != GamePhase::BossIntro
        && now.saturating_sub(state.last_shot_ms) as f32 > state.shot_interval_ms()
    {
        let volley = player_volley(state);
        state.bullets.extend(volley);
        state.last_shot_ms = now;
    }

    // 5. The player has no inertia
    state.player.pos = state.pointer;

    // 6. Motion and culling
    let radius = state.bullet_radius();
    advance_bullets(
        &mut state.bullets,
        &state.enemies,
        state.boss.as_ref(),
        frames,
        radius,
        &state.tuning,
    );
    advance_enemies(&mut state.enemies, frames, &state.tuning);
    advance_hostile(&mut state.enemy_bullets, frames, &state.tuning);
    advance_hostile(&mut state.boss_bullets, frames, &state.tuning);
    advance_pickups(&mut state.pickups, frames, &state.tuning);

    // 7. Hostile fire and contact
    resolve_hostile_hits(state);
    if state.is_game_over() {
        return;
    }

    // 8. Player bullets
    resolve_player_bullets(state);
    if state.is_game_over() {
        return;
    }

    // 9. Pickups
    collect_pickups(state);
}

/// Begin the boss encounter.
///
/// Clears regular enemies and their fire and spawns the boss in its intro.
/// Does nothing outside regular play or if a boss already exists this run.
pub fn start_boss_encounter(state: &mut SimulationState) -> bool {
    if state.phase != GamePhase::Playing || state.boss.is_some() {
        return false;
    }
    state.enemies.clear();
    state.enemy_bullets.clear();
    state.boss = Some(Boss::spawn(state.time_ms, &state.tuning));
    state.phase = GamePhase::BossIntro;
    state.events.push(GameEvent::BossEncounterStarted);
    log::info!("Boss encounter started at {} ms", state.time_ms);
    true
}

fn time_up(state: &mut SimulationState) {
    let per_hp = state.tuning.time_up_bonus_per_hp;
    let bonus = match state.boss.as_mut() {
        Some(boss) if !boss.is_finished() => {
            boss.expire();
            boss.health.max(0) as u64 * per_hp
        }
        _ => 0,
    };
    state.end_run(RunOutcome::TimeUp, bonus);
}

fn drive_spawner(state: &mut SimulationState) {
    let now = state.time_ms;
    let due = state.tuning.boss_trigger_ms.is_some_and(|t| now >= t);
    if due && start_boss_encounter(state) {
        return;
    }

    match state
        .spawner
        .tick(now, &mut state.rng, &mut state.ids, &state.tuning)
    {
        Some(Spawned::Enemy(enemy)) => state.enemies.push(enemy),
        Some(Spawned::Pickup(pickup)) => state.pickups.push(pickup),
        None => {}
    }

    let shots = state
        .spawner
        .enemy_fire(now, &state.enemies, state.player.pos, &state.tuning);
    state.enemy_bullets.extend(shots);
}

fn drive_boss_intro(state: &mut SimulationState, frames: f32) {
    let now = state.time_ms;
    let became_vulnerable = match state.boss.as_mut() {
        Some(boss) => boss.update_intro(frames, now, &state.tuning),
        None => false,
    };
    if became_vulnerable {
        state.phase = GamePhase::BossFight;
        state.events.push(GameEvent::BossVulnerable);
        log::info!("Boss vulnerable at {} ms", now);
    }
}

fn drive_boss_fight(state: &mut SimulationState) {
    let now = state.time_ms;
    let target = state.player.pos;
    let Some(boss) = state.boss.as_mut() else {
        return;
    };
    let update = boss.update(now, target, &state.tuning);
    state.boss_bullets.extend(update.fired);
    if let Some(phase) = update.new_phase {
        state.events.push(GameEvent::BossPhaseChanged { phase });
        log::info!("Boss phase {} at {} ms", phase, now);
    }
}

/// Nearest live target for a homing shot fired from `from`
fn nearest_target(state: &SimulationState, from: Vec2) -> Option<TargetRef> {
    let enemy = state
        .enemies
        .iter()
        .map(|e| (TargetRef::Enemy(e.id), e.pos.distance_squared(from)));
    let boss = state
        .boss
        .as_ref()
        .filter(|b| b.is_vulnerable)
        .map(|b| (TargetRef::Boss, b.pos.distance_squared(from)));
    enemy
        .chain(boss)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(target, _)| target)
}

/// Bullets for one auto-fire shot in the current power-up pattern
fn player_volley(state: &mut SimulationState) -> Vec<Bullet> {
    let tuning = &state.tuning;
    let kind = state.power_up.kind;
    let muzzle = state.player.pos - Vec2::new(0.0, state.player.half.y);

    // (offset from muzzle, heading, homing)
    let mut pattern: Vec<(Vec2, Option<f32>, Option<TargetRef>)> = match kind {
        PowerUpKind::Triple => vec![
            (Vec2::new(-tuning.triple_spacing, tuning.triple_stagger), None, None),
            (Vec2::ZERO, None, None),
            (Vec2::new(tuning.triple_spacing, tuning.triple_stagger), None, None),
        ],
        PowerUpKind::Spread => tuning
            .spread_angles
            .iter()
            .map(|&a| (Vec2::ZERO, Some(a), None))
            .collect(),
        PowerUpKind::Homing => vec![(Vec2::ZERO, None, nearest_target(state, muzzle))],
        PowerUpKind::Normal | PowerUpKind::Speed => vec![(Vec2::ZERO, None, None)],
    };
    let primary = pattern.len();

    if state.player.has_wingman && !kind.is_multi_shot() {
        let (dx, dy) = tuning.wingman_offset;
        for side in [-1.0, 1.0] {
            let mount = Vec2::new(side * dx, dy);
            let homing = pattern[0].2.and_then(|_| nearest_target(state, muzzle + mount));
            pattern.push((mount, None, homing));
        }
    }

    let speed = tuning.bullet_speed;
    pattern
        .into_iter()
        .enumerate()
        .map(|(i, (offset, angle, homing))| Bullet {
            id: state.ids.next_id(),
            pos: muzzle + offset,
            speed,
            angle,
            homing,
            from_wingman: i >= primary,
        })
        .collect()
}

/// Damage the player; the hit that empties health ends the run
fn damage_player(state: &mut SimulationState, damage: i32) {
    let destroyed = state.player.take_damage(damage);
    state.events.push(GameEvent::PlayerHit {
        damage,
        health: state.player.health,
    });
    if destroyed {
        state.player.has_wingman = false;
        state.end_run(RunOutcome::PlayerDestroyed, 0);
    }
}

fn resolve_hostile_hits(state: &mut SimulationState) {
    let hitbox = state.player.hitbox(state.tuning.player_hitbox_scale);

    let mut enemy_shots = std::mem::take(&mut state.enemy_bullets);
    enemy_shots.retain(|shot| !hostile_hit(state, shot, &hitbox));
    state.enemy_bullets = enemy_shots;

    let mut boss_shots = std::mem::take(&mut state.boss_bullets);
    boss_shots.retain(|shot| !hostile_hit(state, shot, &hitbox));
    state.boss_bullets = boss_shots;

    let contact = state.tuning.contact_damage;
    let mut enemies = std::mem::take(&mut state.enemies);
    enemies.retain(|enemy| {
        if state.outcome.is_none() && overlaps(&hitbox, &enemy.shape()) {
            damage_player(state, contact);
            return false;
        }
        true
    });
    state.enemies = enemies;
}

/// Once the player is destroyed nothing else lands this tick
fn hostile_hit(state: &mut SimulationState, shot: &HostileBullet, hitbox: &Shape) -> bool {
    if state.outcome.is_none() && overlaps(&shot.shape(), hitbox) {
        damage_player(state, shot.damage);
        return true;
    }
    false
}

fn resolve_player_bullets(state: &mut SimulationState) {
    let radius = state.bullet_radius();
    let bullets = std::mem::take(&mut state.bullets);
    let mut survivors = Vec::with_capacity(bullets.len());

    for bullet in bullets {
        if state.outcome.is_some() {
            survivors.push(bullet);
            continue;
        }
        let shape = Shape::circle(bullet.pos, radius);

        // Boss first
        let boss_hit = state
            .boss
            .as_ref()
            .is_some_and(|b| b.is_vulnerable && overlaps(&shape, &b.shape()));
        if boss_hit {
            let (defeated, health) = match state.boss.as_mut() {
                Some(boss) => (boss.take_hit(1), boss.health),
                None => (false, 0),
            };
            state.add_score(state.tuning.boss_hit_score);
            state.events.push(GameEvent::BossHit { health });
            if defeated {
                let bonus = state.tuning.boss_defeat_bonus;
                state.end_run(RunOutcome::BossDefeated, bonus);
            }
            continue;
        }

        // Then the first enemy in pool order
        if let Some(idx) = state.enemies.iter().position(|e| overlaps(&shape, &e.shape())) {
            let enemy = &mut state.enemies[idx];
            enemy.health = (enemy.health - 1).max(0);
            if enemy.health == 0 {
                let enemy = state.enemies.remove(idx);
                let score = state.tuning.enemy_kill_score + state.tuning.enemy_kill_bonus;
                state.add_score(score);
                state.events.push(GameEvent::EnemyKilled {
                    id: enemy.id,
                    pos: enemy.pos,
                    score,
                });
            }
            continue;
        }

        survivors.push(bullet);
    }

    state.bullets = survivors;
}

fn collect_pickups(state: &mut SimulationState) {
    let hitbox = state.player.hitbox(1.0);
    let pickups = std::mem::take(&mut state.pickups);
    let mut remaining = Vec::with_capacity(pickups.len());
    for pickup in pickups {
        if overlaps(&pickup.shape(), &hitbox) {
            apply_pickup(state, pickup.kind);
            state.events.push(GameEvent::PickupCollected { kind: pickup.kind });
        } else {
            remaining.push(pickup);
        }
    }
    state.pickups = remaining;
}
