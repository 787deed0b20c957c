//! Boss state machine
//!
//! `Intro -> Vulnerable(phase 1..N) -> Defeated | TimeExpired`. The boss
//! never touches the projectile pools itself: `update` and `fire` hand back
//! the projectiles they create and the caller stores them.

use glam::Vec2;
use serde::Serialize;

use super::shape::Shape;
use super::state::HostileBullet;
use crate::tuning::{BossPhaseTuning, Tuning};
use crate::{bearing, polar_direction};

/// Where the boss is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BossStage {
    /// Descending into view, invulnerable
    Intro,
    /// Fighting
    Vulnerable,
    /// Health reached zero
    Defeated,
    /// The run clock ran out first
    TimeExpired,
}

/// What a vulnerable-stage update produced
#[derive(Debug, Default)]
pub struct BossUpdate {
    pub fired: Vec<HostileBullet>,
    /// Set when the phase index advanced this update
    pub new_phase: Option<u32>,
}

/// The single boss of a run
#[derive(Debug, Clone, Serialize)]
pub struct Boss {
    pub pos: Vec2,
    pub half: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub stage: BossStage,
    pub is_vulnerable: bool,
    /// Run time at which the encounter began
    pub entry_started_ms: u64,
    /// Run time at which the phase clock started
    pub vulnerable_since_ms: Option<u64>,
    pub last_fire_ms: Option<u64>,
    /// 1-based, never decreases
    pub phase: u32,
}

impl Boss {
    /// Spawn above the visible area, invulnerable, at full health
    pub fn spawn(now_ms: u64, tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.boss_spawn.0, tuning.boss_spawn.1),
            half: Vec2::new(tuning.boss_half_extents.0, tuning.boss_half_extents.1),
            health: tuning.boss_max_health,
            max_health: tuning.boss_max_health,
            stage: BossStage::Intro,
            is_vulnerable: false,
            entry_started_ms: now_ms,
            vulnerable_since_ms: None,
            last_fire_ms: None,
            phase: 1,
        }
    }

    pub fn shape(&self) -> Shape {
        Shape::rect(self.pos, self.half)
    }

    /// Defeated or timed out; nothing about the boss changes any more
    pub fn is_finished(&self) -> bool {
        matches!(self.stage, BossStage::Defeated | BossStage::TimeExpired)
    }

    /// Time spent in the vulnerable stage
    pub fn vulnerable_elapsed_ms(&self, now_ms: u64) -> u64 {
        self.vulnerable_since_ms
            .map(|since| now_ms.saturating_sub(since))
            .unwrap_or(0)
    }

    /// Descend toward the fighting line. Returns true on the update that
    /// makes the boss vulnerable.
    pub fn update_intro(&mut self, frames: f32, now_ms: u64, tuning: &Tuning) -> bool {
        if self.stage != BossStage::Intro {
            return false;
        }
        self.pos.y += tuning.boss_intro_speed * frames;
        if self.pos.y >= tuning.boss_intro_stop_y {
            self.pos.y = tuning.boss_intro_stop_y;
            self.stage = BossStage::Vulnerable;
            self.is_vulnerable = true;
            self.vulnerable_since_ms = Some(now_ms);
            self.phase = 1;
            return true;
        }
        false
    }

    /// Phase index for a given vulnerable-stage elapsed time
    pub fn phase_for(elapsed_ms: u64, tuning: &Tuning) -> u32 {
        let phase = (elapsed_ms / tuning.boss_phase_duration_ms) as u32 + 1;
        phase.min(tuning.boss_phase_count().max(1))
    }

    fn phase_params<'a>(&self, tuning: &'a Tuning) -> &'a BossPhaseTuning {
        let idx = (self.phase.max(1) - 1) as usize;
        &tuning.boss_phases[idx.min(tuning.boss_phases.len() - 1)]
    }

    pub fn is_terminal_phase(&self, tuning: &Tuning) -> bool {
        self.phase >= tuning.boss_phase_count()
    }

    /// Current gap between attacks
    pub fn fire_interval_ms(&self, tuning: &Tuning) -> f32 {
        tuning.boss_base_interval_ms * self.phase_params(tuning).interval_mult
    }

    /// Current projectile speed
    pub fn bullet_speed(&self, tuning: &Tuning) -> f32 {
        tuning.boss_base_bullet_speed * self.phase_params(tuning).speed_mult
    }

    /// Sway, advance the phase and attack when the interval has elapsed
    pub fn update(&mut self, now_ms: u64, player_pos: Vec2, tuning: &Tuning) -> BossUpdate {
        let mut out = BossUpdate::default();
        if self.stage != BossStage::Vulnerable {
            return out;
        }

        let elapsed = self.vulnerable_elapsed_ms(now_ms);
        self.pos.x = tuning.boss_spawn.0
            + tuning.boss_sway_amplitude * (elapsed as f32 / tuning.boss_sway_period_ms).sin();

        let phase = Self::phase_for(elapsed, tuning);
        if phase > self.phase {
            self.phase = phase;
            out.new_phase = Some(phase);
        }

        let interval = self.fire_interval_ms(tuning);
        let ready = match self.last_fire_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) as f32 > interval,
        };
        if ready {
            out.fired = self.fire(player_pos, tuning);
            self.last_fire_ms = Some(now_ms);
        }
        out
    }

    /// One attack for the current phase: an aimed volley, or the full ring
    /// in the terminal phase
    pub fn fire(&self, player_pos: Vec2, tuning: &Tuning) -> Vec<HostileBullet> {
        let speed = self.bullet_speed(tuning);

        if self.is_terminal_phase(tuning) {
            let count = tuning.boss_ring_count.max(1);
            return (0..count)
                .map(|i| HostileBullet {
                    pos: self.pos,
                    radius: tuning.boss_ring_bullet_radius,
                    angle: i as f32 * std::f32::consts::TAU / count as f32,
                    speed: speed * tuning.boss_ring_speed_mult,
                    damage: tuning.boss_bullet_damage,
                })
                .collect();
        }

        let count = self.phase_params(tuning).volley.max(1);
        let aim = bearing(self.pos, player_pos);
        (0..count)
            .map(|i| {
                let offset = if count == 1 {
                    0.0
                } else {
                    -tuning.boss_volley_arc / 2.0
                        + tuning.boss_volley_arc * i as f32 / (count - 1) as f32
                };
                let angle = aim + offset;
                HostileBullet {
                    pos: self.pos + polar_direction(angle) * tuning.boss_muzzle_offset,
                    radius: tuning.boss_bullet_radius,
                    angle,
                    speed,
                    damage: tuning.boss_bullet_damage,
                }
            })
            .collect()
    }

    /// Apply bullet damage while vulnerable. Returns true on the hit that
    /// defeats the boss.
    pub fn take_hit(&mut self, damage: i32) -> bool {
        if self.stage != BossStage::Vulnerable {
            return false;
        }
        self.health = (self.health - damage.max(0)).clamp(0, self.max_health);
        if self.health == 0 {
            self.stage = BossStage::Defeated;
            self.is_vulnerable = false;
            return true;
        }
        false
    }

    /// Freeze the boss because the run clock ran out
    pub fn expire(&mut self) {
        if !self.is_finished() {
            self.stage = BossStage::TimeExpired;
            self.is_vulnerable = false;
        }
    }
}
