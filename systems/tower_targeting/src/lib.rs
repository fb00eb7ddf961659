#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects tower targets from the live enemy registry.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use bastion_core::{Enemy, EnemyId, TargetingStrategy, Tower, TowerId, TowerRole};
use glam::Vec2;

/// Assignment of one enemy to one tower shot.
///
/// Multi-shot towers receive several assignments, best candidate first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower that will fire.
    pub tower: TowerId,
    /// Enemy the shot is aimed at.
    pub enemy: EnemyId,
}

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidates: Vec<Candidate>,
    ranked: Vec<EnemyId>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes targets for every attacking tower and records the primary
    /// target on the tower itself.
    ///
    /// The output buffer is cleared before populating it. Towers without a
    /// candidate have their target cleared.
    pub fn handle(
        &mut self,
        towers: &mut BTreeMap<TowerId, Tower>,
        enemies: &BTreeMap<EnemyId, Enemy>,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        for (id, tower) in towers.iter_mut() {
            if matches!(tower.archetype().role, TowerRole::Detector) {
                tower.target = None;
                continue;
            }

            let mut ranked = std::mem::take(&mut self.ranked);
            self.acquire_targets(tower, enemies, &mut ranked);
            tower.target = ranked.first().copied();
            out.extend(ranked.iter().map(|enemy| TowerTarget {
                tower: *id,
                enemy: *enemy,
            }));
            self.ranked = ranked;
        }
    }

    /// Selects the single best target for the tower.
    pub fn acquire_target(
        &mut self,
        tower: &Tower,
        enemies: &BTreeMap<EnemyId, Enemy>,
    ) -> Option<EnemyId> {
        self.rank(tower, enemies);
        self.candidates.first().map(|candidate| candidate.id)
    }

    /// Selects up to `multishot` distinct targets for the tower, best first.
    pub fn acquire_targets(
        &mut self,
        tower: &Tower,
        enemies: &BTreeMap<EnemyId, Enemy>,
        out: &mut Vec<EnemyId>,
    ) {
        out.clear();
        self.rank(tower, enemies);
        let count = usize::try_from(tower.stats.multishot.max(1)).unwrap_or(1);
        out.extend(self.candidates.iter().take(count).map(|candidate| candidate.id));
    }

    fn rank(&mut self, tower: &Tower, enemies: &BTreeMap<EnemyId, Enemy>) {
        self.candidates.clear();
        let archetype = tower.archetype();
        let range_sq = tower.stats.range * tower.stats.range;

        for (id, enemy) in enemies {
            if !archetype.can_engage(enemy) || archetype.excludes(enemy) {
                continue;
            }
            if enemy.position.distance_squared(tower.position) > range_sq {
                continue;
            }

            let (primary, secondary) = match archetype.targeting {
                TargetingStrategy::First => (enemy.progress, 0.0),
                TargetingStrategy::Strongest => (enemy.health, enemy.progress),
                TargetingStrategy::AirFirst => {
                    (if enemy.flying { 1.0 } else { 0.0 }, enemy.progress)
                }
                TargetingStrategy::Cluster => {
                    let radius = archetype.cluster_radius(&tower.stats);
                    let neighbours =
                        count_neighbours(*id, enemy.position, radius, enemies, |other| {
                            archetype.can_engage(other)
                        });
                    (neighbours as f32, enemy.progress)
                }
            };

            self.candidates.push(Candidate {
                id: *id,
                primary,
                secondary,
            });
        }

        self.candidates.sort_by(Candidate::precedence);
    }
}

fn count_neighbours<F>(
    centre_id: EnemyId,
    centre: Vec2,
    radius: f32,
    enemies: &BTreeMap<EnemyId, Enemy>,
    eligible: F,
) -> u32
where
    F: Fn(&Enemy) -> bool,
{
    let radius_sq = radius * radius;
    let mut count = 0;
    for (id, other) in enemies {
        if *id == centre_id || !eligible(other) {
            continue;
        }
        if other.position.distance_squared(centre) <= radius_sq {
            count += 1;
        }
    }
    count
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: EnemyId,
    primary: f32,
    secondary: f32,
}

impl Candidate {
    /// Higher scores first, then the smaller enemy identifier.
    fn precedence(a: &Self, b: &Self) -> Ordering {
        b.primary
            .total_cmp(&a.primary)
            .then_with(|| b.secondary.total_cmp(&a.secondary))
            .then_with(|| a.id.cmp(&b.id))
    }
}
