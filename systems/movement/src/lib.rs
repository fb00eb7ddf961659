#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that ticks statuses and walks enemies
//! along their paths.
//!
//! Ability timers (teleport, shield regeneration, summons and heal auras)
//! advance here as well since they are driven by the same per-tick clock.

use std::collections::BTreeMap;

use bastion_core::{Enemy, EnemyId, EnemyKind, Event, Path, SummonsMinions};
use glam::Vec2;
use tracing::trace;

/// Minions an enemy asked to summon during the tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SummonRequest {
    /// Summoning enemy.
    pub parent: EnemyId,
    /// Archetype of the minions.
    pub kind: EnemyKind,
    /// Number of minions to spawn.
    pub count: u32,
}

/// Outcomes of a movement tick the world must act on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovementReport {
    /// Enemies that reached the end of their path, in id order.
    pub leaked: Vec<EnemyId>,
    /// Summons due this tick, in id order.
    pub summons: Vec<SummonRequest>,
}

impl MovementReport {
    /// Empties the report so it can be reused for the next tick.
    pub fn clear(&mut self) {
        self.leaked.clear();
        self.summons.clear();
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct HealPulse {
    healer: EnemyId,
    origin: Vec2,
    radius: f32,
    amount: f32,
}

/// Pure system that advances every living enemy by one tick.
#[derive(Debug, Default)]
pub struct Movement {
    pulses: Vec<HealPulse>,
}

impl Movement {
    /// Creates a movement system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks statuses, abilities and path progress for every enemy.
    ///
    /// Damage-over-time pulses are routed through [`Enemy::receive_hit`] so
    /// the applying tower is credited. Enemies killed by a pulse stop here
    /// and are left for the world to collect.
    pub fn handle(
        &mut self,
        enemies: &mut BTreeMap<EnemyId, Enemy>,
        paths: &[Path],
        out: &mut Vec<Event>,
        report: &mut MovementReport,
    ) {
        self.pulses.clear();

        for (id, enemy) in enemies.iter_mut() {
            if !enemy.is_alive() {
                continue;
            }

            let tick = enemy.status.tick();
            for pulse in tick.pulses {
                match pulse.source {
                    Some(source) => {
                        let _ = enemy.receive_hit(
                            *id,
                            pulse.damage,
                            pulse.kind.damage_type(),
                            source,
                            out,
                        );
                    }
                    None => {
                        let _ = enemy.take_damage(pulse.damage, pulse.kind.damage_type());
                    }
                }
            }
            for status in tick.expired {
                out.push(Event::StatusExpired { enemy: *id, status });
            }
            if !enemy.is_alive() {
                continue;
            }

            enemy.regenerate_shield();

            let Some(path) = usize::try_from(enemy.path.get())
                .ok()
                .and_then(|index| paths.get(index))
            else {
                continue;
            };

            let jump = enemy
                .abilities
                .teleport
                .as_mut()
                .and_then(|teleport| teleport.cooldown.tick().then_some(teleport.distance));
            if let Some(distance) = jump {
                let from_index = enemy.path_index;
                let finished = enemy.advance_along(path, distance);
                trace!(
                    enemy = id.get(),
                    from_index,
                    to_index = enemy.path_index,
                    "enemy teleported"
                );
                out.push(Event::EnemyTeleported {
                    enemy: *id,
                    from_index,
                    to_index: enemy.path_index,
                });
                if finished {
                    report.leaked.push(*id);
                    continue;
                }
            }

            let speed = enemy.effective_speed();
            if enemy.advance_along(path, speed) {
                report.leaked.push(*id);
                continue;
            }

            if let Some((kind, count)) = enemy.tick_summon() {
                report.summons.push(SummonRequest {
                    parent: *id,
                    kind,
                    count,
                });
            }

            let origin = enemy.position;
            if let Some(aura) = enemy.abilities.heal_aura.as_mut() {
                if aura.cooldown.tick() {
                    self.pulses.push(HealPulse {
                        healer: *id,
                        origin,
                        radius: aura.radius,
                        amount: aura.amount,
                    });
                }
            }
        }

        for pulse in &self.pulses {
            let reach_sq = pulse.radius * pulse.radius;
            for (id, enemy) in enemies.iter_mut() {
                if *id == pulse.healer || report.leaked.contains(id) {
                    continue;
                }
                if enemy.position.distance_squared(pulse.origin) <= reach_sq {
                    let _ = enemy.heal(pulse.amount);
                }
            }
        }
    }
}
