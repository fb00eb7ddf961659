#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave composition, cadence and stat scaling.
//!
//! Every random decision is a pure function of `(seed, wave, slot)`: each
//! spawn slot seeds its own ChaCha8 stream from a SHA-256 digest, so
//! replaying a wave never depends on how earlier waves were drawn.

use std::collections::BTreeMap;

use bastion_core::{DamageType, EnemyKind, StatScale};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

const RNG_STREAM_COMPOSITION: &str = "composition";
const RNG_STREAM_IMMUNITY: &str = "immunity";

/// Health multiplier cap reached by late waves.
pub const MAX_HEALTH_SCALE: f32 = 5.0;
/// Speed multiplier cap reached by late waves.
pub const MAX_SPEED_SCALE: f32 = 3.0;
/// Reward multiplier cap reached by late waves.
pub const MAX_REWARD_SCALE: f32 = 2.0;

/// Inclusive range of wave numbers; `last == None` is open-ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveRange {
    /// First wave covered.
    pub first: u32,
    /// Last wave covered, if bounded.
    pub last: Option<u32>,
}

impl WaveRange {
    /// Range covering `first..=last`.
    #[must_use]
    pub const fn between(first: u32, last: u32) -> Self {
        Self {
            first,
            last: Some(last),
        }
    }

    /// Range covering `first` and every later wave.
    #[must_use]
    pub const fn starting_at(first: u32) -> Self {
        Self { first, last: None }
    }

    /// Reports whether `wave` falls inside the range.
    #[must_use]
    pub fn contains(&self, wave: u32) -> bool {
        wave >= self.first && self.last.map_or(true, |last| wave <= last)
    }

    /// Number of waves of `1..=upto` covered by the range.
    fn overlap(&self, upto: u32) -> u32 {
        let last = self.last.map_or(upto, |last| last.min(upto));
        if last < self.first {
            0
        } else {
            last - self.first + 1
        }
    }
}

/// Candidate archetype and its relative draw weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightedEntry {
    /// Archetype drawn.
    pub kind: EnemyKind,
    /// Relative weight; must be positive.
    pub weight: u32,
}

const fn weighted(kind: EnemyKind, weight: u32) -> WeightedEntry {
    WeightedEntry { kind, weight }
}

/// Weighted composition table for a range of waves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositionRule {
    /// Waves the rule applies to.
    pub waves: WaveRange,
    /// Candidate archetypes.
    pub entries: Vec<WeightedEntry>,
}

/// Per-round growth applied to every later wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundAdjustment {
    /// Completed rounds the adjustment applies to.
    pub waves: WaveRange,
    /// Enemies added for every completed round in range.
    pub count_increase: u32,
    /// Ticks removed from the spawn delay for every completed round in range.
    pub delay_reduction: u32,
}

/// Fixed boss wave replacing the weighted composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BossOverride {
    /// Boss archetype spawned.
    pub kind: EnemyKind,
    /// Number of bosses spawned.
    pub count: u32,
}

/// Multipliers of a special round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpecialRound {
    /// Multiplier applied to the enemy count.
    pub count_multiplier: f32,
    /// Multiplier applied to the spawn delay.
    pub delay_multiplier: f32,
}

/// Data tables driving the wave director.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveConfig {
    /// Enemies spawned by the first wave.
    pub base_enemy_count: u32,
    /// Ticks between spawns in the first wave.
    pub base_spawn_delay: u32,
    /// Floor for the spawn delay.
    pub min_spawn_delay: u32,
    /// Ticks between boss spawns.
    pub boss_spawn_delay: u32,
    /// Weighted compositions, contiguous from wave 1 and open-ended.
    pub compositions: Vec<CompositionRule>,
    /// Count and delay adjustments, contiguous from wave 1 and open-ended.
    pub adjustments: Vec<RoundAdjustment>,
    /// Boss waves keyed by wave number.
    pub boss_overrides: BTreeMap<u32, BossOverride>,
    /// Special rounds keyed by wave number.
    pub special_rounds: BTreeMap<u32, SpecialRound>,
    /// Money granted when an ordinary wave completes.
    pub completion_bonus: u32,
    /// Money granted when a boss wave completes.
    pub boss_bonus: u32,
}

/// Reasons a [`WaveConfig`] is rejected at construction.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum WaveConfigError {
    /// A range table has no rows.
    #[error("{table} table is empty")]
    EmptyTable {
        /// Name of the table.
        table: &'static str,
    },
    /// A range table does not start at wave 1.
    #[error("{table} table must start at wave 1, starts at {first}")]
    MissingFirstWave {
        /// Name of the table.
        table: &'static str,
        /// First wave covered.
        first: u32,
    },
    /// Consecutive rows leave a gap or overlap.
    #[error("{table} table is not contiguous at wave {wave}")]
    Discontinuous {
        /// Name of the table.
        table: &'static str,
        /// First wave of the offending row.
        wave: u32,
    },
    /// A row ends before it starts.
    #[error("{table} row starting at wave {first} is inverted")]
    InvertedRange {
        /// Name of the table.
        table: &'static str,
        /// First wave of the offending row.
        first: u32,
    },
    /// The final row of a range table is bounded.
    #[error("{table} table must end with an open-ended row")]
    NotOpenEnded {
        /// Name of the table.
        table: &'static str,
    },
    /// A composition row has no candidates.
    #[error("composition starting at wave {first} has no entries")]
    EmptyComposition {
        /// First wave of the offending row.
        first: u32,
    },
    /// A composition entry carries zero weight.
    #[error("{kind:?} has zero weight in composition starting at wave {first}")]
    ZeroWeight {
        /// First wave of the offending row.
        first: u32,
        /// Archetype with zero weight.
        kind: EnemyKind,
    },
    /// A boss override spawns nobody.
    #[error("boss override for wave {wave} spawns nobody")]
    ZeroBossCount {
        /// Wave of the override.
        wave: u32,
    },
    /// Waves are numbered from one.
    #[error("wave 0 cannot carry an override")]
    WaveZero,
    /// A special round multiplier is non-positive or not finite.
    #[error("special round {wave} has an invalid multiplier")]
    InvalidMultiplier {
        /// Wave of the special round.
        wave: u32,
    },
    /// Spawn delays must be at least one tick.
    #[error("spawn delays must be at least one tick")]
    ZeroSpawnDelay,
}

impl WaveConfig {
    /// Checks that every wave resolves to exactly one rule.
    pub fn validate(&self) -> Result<(), WaveConfigError> {
        if self.min_spawn_delay == 0 || self.base_spawn_delay == 0 || self.boss_spawn_delay == 0 {
            return Err(WaveConfigError::ZeroSpawnDelay);
        }

        validate_ranges(
            "composition",
            self.compositions.iter().map(|rule| rule.waves),
        )?;
        for rule in &self.compositions {
            if rule.entries.is_empty() {
                return Err(WaveConfigError::EmptyComposition {
                    first: rule.waves.first,
                });
            }
            if let Some(entry) = rule.entries.iter().find(|entry| entry.weight == 0) {
                return Err(WaveConfigError::ZeroWeight {
                    first: rule.waves.first,
                    kind: entry.kind,
                });
            }
        }

        validate_ranges(
            "adjustment",
            self.adjustments.iter().map(|adjustment| adjustment.waves),
        )?;

        for (wave, boss) in &self.boss_overrides {
            if *wave == 0 {
                return Err(WaveConfigError::WaveZero);
            }
            if boss.count == 0 {
                return Err(WaveConfigError::ZeroBossCount { wave: *wave });
            }
        }

        for (wave, special) in &self.special_rounds {
            if *wave == 0 {
                return Err(WaveConfigError::WaveZero);
            }
            let valid = |value: f32| value.is_finite() && value > 0.0;
            if !valid(special.count_multiplier) || !valid(special.delay_multiplier) {
                return Err(WaveConfigError::InvalidMultiplier { wave: *wave });
            }
        }

        Ok(())
    }

    /// Composition rule covering `wave`.
    #[must_use]
    pub fn composition(&self, wave: u32) -> Option<&CompositionRule> {
        self.compositions.iter().find(|rule| rule.waves.contains(wave))
    }

    /// Enemies spawned by the non-boss wave `wave`.
    #[must_use]
    pub fn enemy_count(&self, wave: u32) -> u32 {
        let completed = wave.saturating_sub(1);
        let growth: u64 = self
            .adjustments
            .iter()
            .map(|adjustment| {
                u64::from(adjustment.waves.overlap(completed))
                    * u64::from(adjustment.count_increase)
            })
            .sum();
        let count = (u64::from(self.base_enemy_count) + growth) as f64
            * f64::from(self.special_multipliers(wave).count_multiplier);
        count.round().clamp(1.0, f64::from(u32::MAX)) as u32
    }

    /// Ticks between spawns during the non-boss wave `wave`.
    #[must_use]
    pub fn spawn_delay(&self, wave: u32) -> u32 {
        let completed = wave.saturating_sub(1);
        let reduction: u64 = self
            .adjustments
            .iter()
            .map(|adjustment| {
                u64::from(adjustment.waves.overlap(completed))
                    * u64::from(adjustment.delay_reduction)
            })
            .sum();
        let delay = u64::from(self.base_spawn_delay).saturating_sub(reduction) as f64
            * f64::from(self.special_multipliers(wave).delay_multiplier);
        (delay.round() as u32).max(self.min_spawn_delay)
    }

    /// Money granted when `wave` completes.
    #[must_use]
    pub fn bonus(&self, wave: u32) -> u32 {
        if self.boss_overrides.contains_key(&wave) {
            self.boss_bonus
        } else {
            self.completion_bonus
        }
    }

    fn special_multipliers(&self, wave: u32) -> SpecialRound {
        self.special_rounds
            .get(&wave)
            .copied()
            .unwrap_or(SpecialRound {
                count_multiplier: 1.0,
                delay_multiplier: 1.0,
            })
    }
}

fn validate_ranges(
    table: &'static str,
    ranges: impl Iterator<Item = WaveRange>,
) -> Result<(), WaveConfigError> {
    let mut expected = Some(1u32);
    let mut seen = false;
    for range in ranges {
        let Some(next) = expected else {
            return Err(WaveConfigError::Discontinuous {
                table,
                wave: range.first,
            });
        };
        if !seen && range.first != 1 {
            return Err(WaveConfigError::MissingFirstWave {
                table,
                first: range.first,
            });
        }
        if range.first != next {
            return Err(WaveConfigError::Discontinuous {
                table,
                wave: range.first,
            });
        }
        if range.last.is_some_and(|last| last < range.first) {
            return Err(WaveConfigError::InvertedRange {
                table,
                first: range.first,
            });
        }
        seen = true;
        expected = range.last.map(|last| last.saturating_add(1));
    }

    if !seen {
        return Err(WaveConfigError::EmptyTable { table });
    }
    if expected.is_some() {
        return Err(WaveConfigError::NotOpenEnded { table });
    }
    Ok(())
}

impl Default for WaveConfig {
    fn default() -> Self {
        use EnemyKind::*;

        let compositions = vec![
            CompositionRule {
                waves: WaveRange::between(1, 2),
                entries: vec![weighted(Grunt, 10), weighted(Runner, 3)],
            },
            CompositionRule {
                waves: WaveRange::between(3, 5),
                entries: vec![
                    weighted(Grunt, 8),
                    weighted(Runner, 5),
                    weighted(Swarmling, 4),
                    weighted(Bat, 3),
                    weighted(Brute, 2),
                ],
            },
            CompositionRule {
                waves: WaveRange::between(6, 9),
                entries: vec![
                    weighted(Grunt, 6),
                    weighted(Runner, 5),
                    weighted(Brute, 4),
                    weighted(Bat, 4),
                    weighted(Wraith, 2),
                    weighted(Knight, 3),
                    weighted(Slime, 3),
                    weighted(Blinker, 2),
                ],
            },
            CompositionRule {
                waves: WaveRange::between(10, 14),
                entries: vec![
                    weighted(Grunt, 4),
                    weighted(Runner, 4),
                    weighted(Brute, 4),
                    weighted(Bat, 3),
                    weighted(Wraith, 3),
                    weighted(Knight, 4),
                    weighted(Slime, 3),
                    weighted(Blinker, 3),
                    weighted(FireImp, 3),
                    weighted(FrostGiant, 2),
                    weighted(Shieldbearer, 3),
                    weighted(Healer, 2),
                    weighted(ToxicCrawler, 3),
                    weighted(Gargoyle, 2),
                ],
            },
            CompositionRule {
                waves: WaveRange::between(15, 24),
                entries: vec![
                    weighted(Brute, 4),
                    weighted(Knight, 4),
                    weighted(Wraith, 3),
                    weighted(FireImp, 3),
                    weighted(FrostGiant, 3),
                    weighted(Shieldbearer, 3),
                    weighted(Healer, 2),
                    weighted(ToxicCrawler, 3),
                    weighted(StormElemental, 2),
                    weighted(WaterElemental, 2),
                    weighted(Chameleon, 2),
                    weighted(Gargoyle, 3),
                    weighted(Phantom, 2),
                    weighted(Juggernaut, 1),
                    weighted(Berserker, 2),
                    weighted(Broodmother, 1),
                    weighted(Golem, 1),
                    weighted(Necromancer, 1),
                ],
            },
            CompositionRule {
                waves: WaveRange::starting_at(25),
                entries: EnemyKind::ALL
                    .iter()
                    .copied()
                    .filter(|kind| {
                        !kind.archetype().boss
                            && !matches!(kind, Slimelet | Spiderling | Skeleton)
                    })
                    .map(|kind| weighted(kind, 1))
                    .collect(),
            },
        ];

        let adjustments = vec![
            RoundAdjustment {
                waves: WaveRange::between(1, 9),
                count_increase: 2,
                delay_reduction: 2,
            },
            RoundAdjustment {
                waves: WaveRange::between(10, 19),
                count_increase: 3,
                delay_reduction: 2,
            },
            RoundAdjustment {
                waves: WaveRange::starting_at(20),
                count_increase: 4,
                delay_reduction: 1,
            },
        ];

        let boss_overrides = [
            (10, Warlord, 1),
            (20, Dragon, 1),
            (30, LichKing, 1),
            (40, Warlord, 2),
            (50, Dragon, 2),
            (60, LichKing, 2),
        ]
        .into_iter()
        .map(|(wave, kind, count)| (wave, BossOverride { kind, count }))
        .collect();

        let special_rounds = (1..=6)
            .map(|round| {
                (
                    round * 7,
                    SpecialRound {
                        count_multiplier: 1.5,
                        delay_multiplier: 0.7,
                    },
                )
            })
            .collect();

        Self {
            base_enemy_count: 8,
            base_spawn_delay: 60,
            min_spawn_delay: 12,
            boss_spawn_delay: 180,
            compositions,
            adjustments,
            boss_overrides,
            special_rounds,
            completion_bonus: 25,
            boss_bonus: 150,
        }
    }
}

/// Single spawn decided by the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnOrder {
    /// Archetype to spawn.
    pub kind: EnemyKind,
    /// Immunity rolled for archetypes with an immunity pool.
    pub rolled_immunity: Option<DamageType>,
}

/// Everything the world needs to run a wave.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnPlan {
    /// Wave number.
    pub wave: u32,
    /// Spawns in order.
    pub spawns: Vec<SpawnOrder>,
    /// Ticks between consecutive spawns.
    pub spawn_delay: u32,
    /// Indicates a boss override wave.
    pub boss: bool,
    /// Stat multipliers applied to every spawn.
    pub scale: StatScale,
    /// Money granted on completion.
    pub bonus: u32,
}

/// Stat multipliers for enemies spawned during `wave`.
#[must_use]
pub fn scaling_for_wave(wave: u32) -> StatScale {
    let elapsed = wave.saturating_sub(1) as f32;
    StatScale {
        health: (1.0 + 0.12 * elapsed).min(MAX_HEALTH_SCALE),
        speed: (1.0 + 0.04 * elapsed).min(MAX_SPEED_SCALE),
        reward: (1.0 + 0.03 * elapsed).min(MAX_REWARD_SCALE),
    }
}

/// Seeded planner that turns wave numbers into spawn plans.
#[derive(Clone, Debug)]
pub struct WaveDirector {
    config: WaveConfig,
    seed: u64,
}

impl WaveDirector {
    /// Validates the configuration and binds it to a seed.
    pub fn new(config: WaveConfig, seed: u64) -> Result<Self, WaveConfigError> {
        config.validate()?;
        Ok(Self { config, seed })
    }

    /// Tables driving the director.
    #[must_use]
    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Seed every draw derives from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Plans wave `wave`; wave numbers start at one.
    #[must_use]
    pub fn advance(&self, wave: u32) -> SpawnPlan {
        let wave = wave.max(1);
        let scale = scaling_for_wave(wave);
        let bonus = self.config.bonus(wave);

        if let Some(boss) = self.config.boss_overrides.get(&wave) {
            let spawns = (0..boss.count)
                .map(|slot| SpawnOrder {
                    kind: boss.kind,
                    rolled_immunity: self.roll_immunity(boss.kind, wave, slot),
                })
                .collect();
            debug!(wave, kind = ?boss.kind, count = boss.count, "planned boss wave");
            return SpawnPlan {
                wave,
                spawns,
                spawn_delay: self.config.boss_spawn_delay,
                boss: true,
                scale,
                bonus,
            };
        }

        let count = self.config.enemy_count(wave);
        let entries = self
            .config
            .composition(wave)
            .map_or(&[][..], |rule| rule.entries.as_slice());
        let table = WeightedIndex::new(entries.iter().map(|entry| entry.weight)).ok();

        let spawns = (0..count)
            .map(|slot| {
                let kind = match &table {
                    Some(table) => {
                        let mut rng = slot_rng(self.seed, wave, slot, RNG_STREAM_COMPOSITION);
                        entries
                            .get(table.sample(&mut rng))
                            .map_or(EnemyKind::Grunt, |entry| entry.kind)
                    }
                    None => EnemyKind::Grunt,
                };
                SpawnOrder {
                    kind,
                    rolled_immunity: self.roll_immunity(kind, wave, slot),
                }
            })
            .collect();

        let spawn_delay = self.config.spawn_delay(wave);
        debug!(wave, count, spawn_delay, "planned wave");
        SpawnPlan {
            wave,
            spawns,
            spawn_delay,
            boss: false,
            scale,
            bonus,
        }
    }

    fn roll_immunity(&self, kind: EnemyKind, wave: u32, slot: u32) -> Option<DamageType> {
        let pool = kind.archetype().immunity_pool();
        if pool.is_empty() {
            return None;
        }
        let mut rng = slot_rng(self.seed, wave, slot, RNG_STREAM_IMMUNITY);
        pool.choose(&mut rng).copied()
    }
}

fn slot_rng(seed: u64, wave: u32, slot: u32, label: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_slot_seed(seed, wave, slot, label))
}

fn derive_slot_seed(seed: u64, wave: u32, slot: u32, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(wave.to_le_bytes());
    hasher.update(slot.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
