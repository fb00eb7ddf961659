//! Enemy archetype rows, resolved ability sets and the enemy entity.
//!
//! Archetypes are plain data. Optional behaviour is declared as a list of
//! [`Ability`] variants which [`EnemyAbilities::resolve`] turns into typed
//! capability slots once at spawn, so systems never probe an enemy for a
//! behaviour it may or may not have.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::immunity::{DamageType, Immune, ImmuneResponse, ImmunityModel, StatusImmune};
use crate::path::{Path, PathId};
use crate::status::{StatusApplication, StatusEffects, StatusKind};
use crate::{DamageReport, EnemyId, Event, HitSource, TowerId};

/// Types of enemies that can walk the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline foot soldier.
    Grunt,
    /// Fast and fragile.
    Runner,
    /// Slow and sturdy.
    Brute,
    /// Tiny enemy spawned in large numbers.
    Swarmling,
    /// Basic flyer.
    Bat,
    /// Invisible until detected.
    Wraith,
    /// Armoured against physical damage.
    Knight,
    /// Fire heals it.
    FireImp,
    /// Immune to ice and freezing.
    FrostGiant,
    /// Splits into slimelets on death.
    Slime,
    /// Child of a slime.
    Slimelet,
    /// Periodically teleports forward.
    Blinker,
    /// Carries a regenerating shield.
    Shieldbearer,
    /// Heals nearby enemies.
    Healer,
    /// Immune to poison.
    ToxicCrawler,
    /// Immune to lightning.
    StormElemental,
    /// Immune to water and never gets wet.
    WaterElemental,
    /// Adapts to the damage type hurting it most.
    Chameleon,
    /// Armoured flyer.
    Gargoyle,
    /// Invisible flyer.
    Phantom,
    /// Huge, slow and unfreezable.
    Juggernaut,
    /// Speeds up when wounded.
    Berserker,
    /// Summons spiderlings and bursts into more on death.
    Broodmother,
    /// Child of a broodmother.
    Spiderling,
    /// Rock creature with a rolled immunity.
    Golem,
    /// Raises skeletons.
    Necromancer,
    /// Minion raised by necromancers.
    Skeleton,
    /// Boss: summons grunts and shields up as it weakens.
    Warlord,
    /// Boss: fire-proof flyer that speeds up when wounded.
    Dragon,
    /// Boss: teleports, raises skeletons and becomes immune to physical harm.
    LichKing,
}

impl EnemyKind {
    /// Number of enemy kinds.
    pub const COUNT: usize = 30;

    /// Every enemy kind in declaration order.
    pub const ALL: [EnemyKind; Self::COUNT] = [
        EnemyKind::Grunt,
        EnemyKind::Runner,
        EnemyKind::Brute,
        EnemyKind::Swarmling,
        EnemyKind::Bat,
        EnemyKind::Wraith,
        EnemyKind::Knight,
        EnemyKind::FireImp,
        EnemyKind::FrostGiant,
        EnemyKind::Slime,
        EnemyKind::Slimelet,
        EnemyKind::Blinker,
        EnemyKind::Shieldbearer,
        EnemyKind::Healer,
        EnemyKind::ToxicCrawler,
        EnemyKind::StormElemental,
        EnemyKind::WaterElemental,
        EnemyKind::Chameleon,
        EnemyKind::Gargoyle,
        EnemyKind::Phantom,
        EnemyKind::Juggernaut,
        EnemyKind::Berserker,
        EnemyKind::Broodmother,
        EnemyKind::Spiderling,
        EnemyKind::Golem,
        EnemyKind::Necromancer,
        EnemyKind::Skeleton,
        EnemyKind::Warlord,
        EnemyKind::Dragon,
        EnemyKind::LichKing,
    ];

    /// Static stat row describing the archetype.
    #[must_use]
    pub const fn archetype(self) -> &'static EnemyArchetype {
        match self {
            Self::Grunt => &GRUNT,
            Self::Runner => &RUNNER,
            Self::Brute => &BRUTE,
            Self::Swarmling => &SWARMLING,
            Self::Bat => &BAT,
            Self::Wraith => &WRAITH,
            Self::Knight => &KNIGHT,
            Self::FireImp => &FIRE_IMP,
            Self::FrostGiant => &FROST_GIANT,
            Self::Slime => &SLIME,
            Self::Slimelet => &SLIMELET,
            Self::Blinker => &BLINKER,
            Self::Shieldbearer => &SHIELDBEARER,
            Self::Healer => &HEALER,
            Self::ToxicCrawler => &TOXIC_CRAWLER,
            Self::StormElemental => &STORM_ELEMENTAL,
            Self::WaterElemental => &WATER_ELEMENTAL,
            Self::Chameleon => &CHAMELEON,
            Self::Gargoyle => &GARGOYLE,
            Self::Phantom => &PHANTOM,
            Self::Juggernaut => &JUGGERNAUT,
            Self::Berserker => &BERSERKER,
            Self::Broodmother => &BROODMOTHER,
            Self::Spiderling => &SPIDERLING,
            Self::Golem => &GOLEM,
            Self::Necromancer => &NECROMANCER,
            Self::Skeleton => &SKELETON,
            Self::Warlord => &WARLORD,
            Self::Dragon => &DRAGON,
            Self::LichKing => &LICH_KING,
        }
    }
}

/// A health-gated boss phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Phase {
    /// Health fraction at or below which the phase is entered.
    pub threshold: f32,
    /// Speed multiplier that replaces the previous one.
    pub speed_multiplier: f32,
    /// Shield granted on entry.
    pub shield: f32,
    /// Minions summoned once on entry.
    pub summon: Option<(EnemyKind, u32)>,
    /// Damage type the enemy becomes permanently immune to.
    pub grant_immunity: Option<DamageType>,
}

impl Phase {
    const fn speed(threshold: f32, speed_multiplier: f32) -> Self {
        Phase {
            threshold,
            speed_multiplier,
            shield: 0.0,
            summon: None,
            grant_immunity: None,
        }
    }
}

/// Optional behaviour declared by an archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ability {
    /// Spawns children where the enemy died.
    SplitOnDeath {
        /// Archetype of the children.
        child: EnemyKind,
        /// Number of children.
        count: u32,
    },
    /// Jumps forward along the path periodically.
    Teleport {
        /// Ticks between jumps.
        interval: u32,
        /// Path distance covered by each jump.
        distance: f32,
    },
    /// Absorbs damage before health and regenerates it.
    Shield {
        /// Shield strength at spawn and regeneration cap.
        capacity: f32,
        /// Shield regenerated per tick.
        regen: f32,
    },
    /// Heals other enemies in a radius periodically.
    HealAura {
        /// Reach of the aura.
        radius: f32,
        /// Health restored per pulse.
        amount: f32,
        /// Ticks between pulses.
        interval: u32,
    },
    /// Spawns minions periodically.
    Summon {
        /// Archetype of the minions.
        minion: EnemyKind,
        /// Minions per summon.
        count: u32,
        /// Ticks between summons.
        interval: u32,
    },
    /// Health-gated phases, ordered by descending threshold.
    Phases(&'static [Phase]),
    /// Becomes immune to a damage type once it dealt enough damage.
    AdaptiveImmunity {
        /// Fraction of maximum health a single type must deal.
        threshold: f32,
    },
    /// Receives one immunity from the pool at spawn.
    ImmunityRoll {
        /// Damage types the roll may pick.
        pool: &'static [DamageType],
    },
}

/// Static row describing an enemy archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyArchetype {
    /// Display name.
    pub name: &'static str,
    /// Health at wave one.
    pub health: f32,
    /// Distance walked per tick at wave one.
    pub speed: f32,
    /// Money paid on death at wave one.
    pub reward: u32,
    /// Collision radius.
    pub size: f32,
    /// Lives deducted when the enemy leaks.
    pub lives_cost: u32,
    /// Whether the enemy flies.
    pub flying: bool,
    /// Whether the enemy starts invisible.
    pub invisible: bool,
    /// Whether the archetype is a boss.
    pub boss: bool,
    /// Innate damage immunities with their response.
    pub immunities: &'static [(DamageType, ImmuneResponse)],
    /// Status effects that never become active.
    pub status_immunities: &'static [StatusKind],
    /// Damage multipliers for specific types.
    pub resistances: &'static [(DamageType, f32)],
    /// Optional behaviour.
    pub abilities: &'static [Ability],
}

impl EnemyArchetype {
    /// Damage types an immunity roll may choose from, empty when the
    /// archetype does not roll.
    #[must_use]
    pub fn immunity_pool(&self) -> &'static [DamageType] {
        self.abilities
            .iter()
            .find_map(|ability| match ability {
                Ability::ImmunityRoll { pool } => Some(*pool),
                _ => None,
            })
            .unwrap_or(&[])
    }
}

const fn row(
    name: &'static str,
    health: f32,
    speed: f32,
    reward: u32,
    size: f32,
) -> EnemyArchetype {
    EnemyArchetype {
        name,
        health,
        speed,
        reward,
        size,
        lives_cost: 1,
        flying: false,
        invisible: false,
        boss: false,
        immunities: &[],
        status_immunities: &[],
        resistances: &[],
        abilities: &[],
    }
}

const BERSERKER_PHASES: &[Phase] = &[Phase::speed(0.5, 1.8)];

const WARLORD_PHASES: &[Phase] = &[
    Phase {
        summon: Some((EnemyKind::Grunt, 3)),
        ..Phase::speed(0.6, 1.3)
    },
    Phase {
        shield: 300.0,
        ..Phase::speed(0.3, 1.6)
    },
];

const DRAGON_PHASES: &[Phase] = &[Phase::speed(0.5, 1.5)];

const LICH_KING_PHASES: &[Phase] = &[Phase {
    summon: Some((EnemyKind::Skeleton, 4)),
    grant_immunity: Some(DamageType::Physical),
    ..Phase::speed(0.4, 1.0)
}];

static GRUNT: EnemyArchetype = row("Grunt", 40.0, 1.0, 5, 10.0);
static RUNNER: EnemyArchetype = row("Runner", 25.0, 2.0, 6, 8.0);
static BRUTE: EnemyArchetype = row("Brute", 120.0, 0.6, 12, 14.0);
static SWARMLING: EnemyArchetype = row("Swarmling", 12.0, 1.6, 2, 6.0);

static BAT: EnemyArchetype = EnemyArchetype {
    flying: true,
    ..row("Bat", 30.0, 1.5, 7, 8.0)
};

static WRAITH: EnemyArchetype = EnemyArchetype {
    invisible: true,
    ..row("Wraith", 45.0, 1.2, 10, 10.0)
};

static KNIGHT: EnemyArchetype = EnemyArchetype {
    resistances: &[(DamageType::Physical, 0.5)],
    ..row("Knight", 100.0, 0.8, 14, 12.0)
};

static FIRE_IMP: EnemyArchetype = EnemyArchetype {
    immunities: &[(DamageType::Fire, ImmuneResponse::Heal)],
    status_immunities: &[StatusKind::Burn],
    ..row("Fire Imp", 50.0, 1.3, 9, 9.0)
};

static FROST_GIANT: EnemyArchetype = EnemyArchetype {
    immunities: &[(DamageType::Ice, ImmuneResponse::Block)],
    status_immunities: &[StatusKind::Freeze],
    ..row("Frost Giant", 220.0, 0.5, 20, 16.0)
};

static SLIME: EnemyArchetype = EnemyArchetype {
    abilities: &[Ability::SplitOnDeath {
        child: EnemyKind::Slimelet,
        count: 2,
    }],
    ..row("Slime", 70.0, 0.8, 8, 12.0)
};

static SLIMELET: EnemyArchetype = row("Slimelet", 25.0, 1.1, 3, 7.0);

static BLINKER: EnemyArchetype = EnemyArchetype {
    abilities: &[Ability::Teleport {
        interval: 180,
        distance: 60.0,
    }],
    ..row("Blinker", 50.0, 1.0, 10, 9.0)
};

static SHIELDBEARER: EnemyArchetype = EnemyArchetype {
    abilities: &[Ability::Shield {
        capacity: 60.0,
        regen: 0.5,
    }],
    ..row("Shieldbearer", 80.0, 0.8, 14, 12.0)
};

static HEALER: EnemyArchetype = EnemyArchetype {
    abilities: &[Ability::HealAura {
        radius: 80.0,
        amount: 8.0,
        interval: 90,
    }],
    ..row("Healer", 60.0, 0.9, 12, 10.0)
};

static TOXIC_CRAWLER: EnemyArchetype = EnemyArchetype {
    immunities: &[(DamageType::Poison, ImmuneResponse::Block)],
    status_immunities: &[StatusKind::Poison],
    ..row("Toxic Crawler", 70.0, 0.9, 10, 10.0)
};

static STORM_ELEMENTAL: EnemyArchetype = EnemyArchetype {
    immunities: &[(DamageType::Lightning, ImmuneResponse::Block)],
    ..row("Storm Elemental", 90.0, 1.0, 14, 12.0)
};

static WATER_ELEMENTAL: EnemyArchetype = EnemyArchetype {
    immunities: &[(DamageType::Water, ImmuneResponse::Block)],
    status_immunities: &[StatusKind::Wet],
    ..row("Water Elemental", 90.0, 1.0, 14, 12.0)
};

static CHAMELEON: EnemyArchetype = EnemyArchetype {
    abilities: &[
        Ability::AdaptiveImmunity { threshold: 0.3 },
        Ability::ImmunityRoll {
            pool: &DamageType::ALL,
        },
    ],
    ..row("Chameleon", 90.0, 1.0, 15, 11.0)
};

static GARGOYLE: EnemyArchetype = EnemyArchetype {
    flying: true,
    resistances: &[(DamageType::Physical, 0.5)],
    ..row("Gargoyle", 110.0, 1.0, 16, 12.0)
};

static PHANTOM: EnemyArchetype = EnemyArchetype {
    flying: true,
    invisible: true,
    ..row("Phantom", 40.0, 1.4, 14, 9.0)
};

static JUGGERNAUT: EnemyArchetype = EnemyArchetype {
    lives_cost: 2,
    status_immunities: &[StatusKind::Freeze],
    ..row("Juggernaut", 400.0, 0.4, 35, 18.0)
};

static BERSERKER: EnemyArchetype = EnemyArchetype {
    abilities: &[Ability::Phases(BERSERKER_PHASES)],
    ..row("Berserker", 90.0, 0.9, 13, 11.0)
};

static BROODMOTHER: EnemyArchetype = EnemyArchetype {
    abilities: &[
        Ability::Summon {
            minion: EnemyKind::Spiderling,
            count: 2,
            interval: 240,
        },
        Ability::SplitOnDeath {
            child: EnemyKind::Spiderling,
            count: 3,
        },
    ],
    ..row("Broodmother", 200.0, 0.6, 25, 16.0)
};

static SPIDERLING: EnemyArchetype = row("Spiderling", 15.0, 1.8, 2, 6.0);

static GOLEM: EnemyArchetype = EnemyArchetype {
    status_immunities: &[StatusKind::Poison, StatusKind::Burn],
    abilities: &[Ability::ImmunityRoll {
        pool: &[DamageType::Physical, DamageType::Explosive],
    }],
    ..row("Golem", 260.0, 0.5, 28, 16.0)
};

static NECROMANCER: EnemyArchetype = EnemyArchetype {
    abilities: &[Ability::Summon {
        minion: EnemyKind::Skeleton,
        count: 2,
        interval: 300,
    }],
    ..row("Necromancer", 120.0, 0.7, 22, 12.0)
};

static SKELETON: EnemyArchetype = EnemyArchetype {
    immunities: &[(DamageType::Poison, ImmuneResponse::Block)],
    status_immunities: &[StatusKind::Poison],
    ..row("Skeleton", 35.0, 1.0, 4, 9.0)
};

static WARLORD: EnemyArchetype = EnemyArchetype {
    boss: true,
    lives_cost: 10,
    abilities: &[Ability::Phases(WARLORD_PHASES)],
    ..row("Warlord", 1500.0, 0.45, 150, 22.0)
};

static DRAGON: EnemyArchetype = EnemyArchetype {
    boss: true,
    flying: true,
    lives_cost: 10,
    immunities: &[(DamageType::Fire, ImmuneResponse::Block)],
    status_immunities: &[StatusKind::Burn],
    abilities: &[Ability::Phases(DRAGON_PHASES)],
    ..row("Dragon", 2200.0, 0.6, 220, 24.0)
};

static LICH_KING: EnemyArchetype = EnemyArchetype {
    boss: true,
    lives_cost: 10,
    immunities: &[(DamageType::Poison, ImmuneResponse::Block)],
    status_immunities: &[StatusKind::Freeze, StatusKind::Poison],
    abilities: &[
        Ability::Summon {
            minion: EnemyKind::Skeleton,
            count: 3,
            interval: 360,
        },
        Ability::Teleport {
            interval: 400,
            distance: 40.0,
        },
        Ability::Phases(LICH_KING_PHASES),
        Ability::ImmunityRoll {
            pool: &[
                DamageType::Explosive,
                DamageType::Lightning,
                DamageType::Energy,
            ],
        },
    ],
    ..row("Lich King", 3000.0, 0.4, 300, 24.0)
};

/// Repeating countdown that fires every `interval` ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cooldown {
    interval: u32,
    remaining: u32,
}

impl Cooldown {
    /// Creates a countdown that first fires after `interval` ticks.
    #[must_use]
    pub const fn new(interval: u32) -> Self {
        let interval = if interval == 0 { 1 } else { interval };
        Self {
            interval,
            remaining: interval,
        }
    }

    /// Advances by one tick, reporting whether the countdown fired.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.remaining = self.interval;
            true
        } else {
            false
        }
    }
}

/// Periodic forward jump along the path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Teleporter {
    /// Path distance covered by each jump.
    pub distance: f32,
    /// Countdown to the next jump.
    pub cooldown: Cooldown,
}

/// Regenerating damage absorber.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShieldRegen {
    /// Regeneration cap.
    pub capacity: f32,
    /// Shield regenerated per tick.
    pub regen: f32,
}

/// Periodic heal pulse affecting other enemies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealAura {
    /// Reach of the pulse.
    pub radius: f32,
    /// Health restored per pulse.
    pub amount: f32,
    /// Countdown to the next pulse.
    pub cooldown: Cooldown,
}

/// Periodic minion summon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summoner {
    /// Archetype of the minions.
    pub minion: EnemyKind,
    /// Minions per summon.
    pub count: u32,
    /// Countdown to the next summon.
    pub cooldown: Cooldown,
}

/// Optional capabilities resolved from an archetype's ability list.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnemyAbilities {
    /// Children spawned on death.
    pub split: Option<(EnemyKind, u32)>,
    /// Periodic forward jump.
    pub teleport: Option<Teleporter>,
    /// Regenerating shield.
    pub shield: Option<ShieldRegen>,
    /// Heal pulse for nearby enemies.
    pub heal_aura: Option<HealAura>,
    /// Periodic minion summon.
    pub summon: Option<Summoner>,
    /// Health-gated phases in entry order.
    pub phases: &'static [Phase],
    /// Fraction of maximum health that triggers adaptation.
    pub adaptive_threshold: Option<f32>,
}

impl EnemyAbilities {
    /// Resolves the ability list into capability slots.
    #[must_use]
    pub fn resolve(abilities: &[Ability]) -> Self {
        let mut resolved = Self::default();
        for ability in abilities {
            match *ability {
                Ability::SplitOnDeath { child, count } => resolved.split = Some((child, count)),
                Ability::Teleport { interval, distance } => {
                    resolved.teleport = Some(Teleporter {
                        distance,
                        cooldown: Cooldown::new(interval),
                    });
                }
                Ability::Shield { capacity, regen } => {
                    resolved.shield = Some(ShieldRegen { capacity, regen });
                }
                Ability::HealAura {
                    radius,
                    amount,
                    interval,
                } => {
                    resolved.heal_aura = Some(HealAura {
                        radius,
                        amount,
                        cooldown: Cooldown::new(interval),
                    });
                }
                Ability::Summon {
                    minion,
                    count,
                    interval,
                } => {
                    resolved.summon = Some(Summoner {
                        minion,
                        count,
                        cooldown: Cooldown::new(interval),
                    });
                }
                Ability::Phases(phases) => resolved.phases = phases,
                Ability::AdaptiveImmunity { threshold } => {
                    resolved.adaptive_threshold = Some(threshold);
                }
                Ability::ImmunityRoll { .. } => {}
            }
        }
        resolved
    }
}

/// Per-wave multipliers applied to an enemy's base stats.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatScale {
    /// Health multiplier.
    pub health: f32,
    /// Speed multiplier.
    pub speed: f32,
    /// Reward multiplier.
    pub reward: f32,
}

impl StatScale {
    /// Scale that leaves stats unchanged.
    pub const IDENTITY: StatScale = StatScale {
        health: 1.0,
        speed: 1.0,
        reward: 1.0,
    };
}

impl Default for StatScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Result of a single damage application.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageOutcome {
    /// Health removed, never above the health held before the hit.
    pub dealt: f32,
    /// Indicates that the enemy was immune to the damage type.
    pub immune: bool,
    /// Damage soaked by the shield.
    pub shield_absorbed: f32,
    /// Health restored by a heal-on-hit immunity.
    pub healed: f32,
    /// Damage type the enemy adapted to because of this hit.
    pub adapted: Option<DamageType>,
}

/// Phase transition reported by [`PhasesByHealth::advance_phases`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseEntered {
    /// One-based index of the phase entered.
    pub phase: u8,
    /// Minions to spawn because of the transition.
    pub summon: Option<(EnemyKind, u32)>,
}

/// Capability of enemies that spawn children when they die.
pub trait SplitsOnDeath {
    /// Children to spawn, if the enemy splits.
    fn split(&self) -> Option<(EnemyKind, u32)>;
}

/// Capability of enemies whose behaviour changes as health drops.
pub trait PhasesByHealth {
    /// Enters every phase whose threshold the current health reached.
    fn advance_phases(&mut self, out: &mut Vec<PhaseEntered>);
}

/// Capability of enemies that periodically spawn minions.
pub trait SummonsMinions {
    /// Advances the summon timer, returning the minions due this tick.
    fn tick_summon(&mut self) -> Option<(EnemyKind, u32)>;
}

/// A live enemy walking a path.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Path the enemy follows.
    pub path: PathId,
    /// Index of the waypoint segment the enemy is on; never decreases.
    pub path_index: usize,
    /// Distance walked along the path.
    pub progress: f32,
    /// Current position.
    pub position: Vec2,
    /// Current health, never negative.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Distance walked per tick before modifiers.
    pub base_speed: f32,
    /// Money paid on death.
    pub reward: u32,
    /// Collision radius.
    pub size: f32,
    /// Lives deducted when the enemy leaks.
    pub lives_cost: u32,
    /// Whether the enemy flies.
    pub flying: bool,
    /// Whether the enemy is invisible.
    pub invisible: bool,
    /// Whether a detector revealed the enemy.
    pub detected: bool,
    /// Wave that spawned the enemy.
    pub wave: u32,
    /// Multipliers applied at spawn, inherited by children and minions.
    pub scale: StatScale,
    /// Damage immunities and resistances.
    pub immunity: ImmunityModel,
    /// Active status effects.
    pub status: StatusEffects,
    /// Damage absorbed before health.
    pub shield: f32,
    /// Resolved optional capabilities.
    pub abilities: EnemyAbilities,
    /// Number of phases entered.
    pub phase: u8,
    /// Phase speed multiplier.
    pub speed_multiplier: f32,
    /// Tower that most recently damaged the enemy.
    pub last_hit_by: Option<TowerId>,
    damage_by_type: [f32; DamageType::COUNT],
}

impl Enemy {
    /// Creates an enemy at `progress` along `path` with wave scaling applied.
    #[must_use]
    pub fn spawn(
        kind: EnemyKind,
        path_id: PathId,
        path: &Path,
        progress: f32,
        wave: u32,
        scale: StatScale,
        rolled_immunity: Option<DamageType>,
    ) -> Self {
        let archetype = kind.archetype();
        let mut immunity = ImmunityModel::new();
        for (damage_type, response) in archetype.immunities {
            immunity.set_immunity(*damage_type, *response);
        }
        for status in archetype.status_immunities {
            immunity.set_status_immunity(*status);
        }
        for (damage_type, factor) in archetype.resistances {
            immunity.set_resistance(*damage_type, *factor);
        }
        if let Some(damage_type) = rolled_immunity {
            immunity.grant(damage_type);
        }

        let abilities = EnemyAbilities::resolve(archetype.abilities);
        let shield = abilities.shield.map_or(0.0, |shield| shield.capacity);
        let progress = progress.clamp(0.0, path.length());
        let (path_index, position) = path.locate(progress);
        let health = archetype.health * scale.health;
        let reward = (archetype.reward as f32 * scale.reward).round() as u32;

        Self {
            kind,
            path: path_id,
            path_index,
            progress,
            position,
            health,
            max_health: health,
            base_speed: archetype.speed * scale.speed,
            reward,
            size: archetype.size,
            lives_cost: archetype.lives_cost,
            flying: archetype.flying,
            invisible: archetype.invisible,
            detected: false,
            wave,
            scale,
            immunity,
            status: StatusEffects::new(),
            shield,
            abilities,
            phase: 0,
            speed_multiplier: 1.0,
            last_hit_by: None,
            damage_by_type: [0.0; DamageType::COUNT],
        }
    }

    /// Reports whether the enemy still has health.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Current health as a fraction of maximum health.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    /// Reports whether towers without detection may see the enemy.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.invisible || self.detected
    }

    /// Distance walked this tick after phase and freeze modifiers.
    #[must_use]
    pub fn effective_speed(&self) -> f32 {
        self.base_speed * self.speed_multiplier * self.status.speed_factor()
    }

    /// Applies a hit of `amount` damage of the provided type.
    ///
    /// Immune hits leave health untouched (or heal, for heal responders).
    /// Otherwise resistance, the wet multiplier for lightning and the shield
    /// are applied in that order and the remainder is clamped to the current
    /// health, so both the reported and the stored change never overshoot.
    pub fn take_damage(&mut self, amount: f32, damage_type: DamageType) -> DamageOutcome {
        let mut outcome = DamageOutcome::default();
        if !self.is_alive() || !amount.is_finite() || amount <= 0.0 {
            return outcome;
        }

        if let Some(response) = self.immunity.response(damage_type) {
            outcome.immune = true;
            if response == ImmuneResponse::Heal {
                let before = self.health;
                self.health = (self.health + amount).min(self.max_health);
                outcome.healed = self.health - before;
            }
            return outcome;
        }

        let mut amount = amount * self.immunity.resistance(damage_type);
        if damage_type == DamageType::Lightning {
            amount *= self.status.lightning_multiplier();
        }

        let absorbed = self.shield.min(amount);
        self.shield -= absorbed;
        amount -= absorbed;
        outcome.shield_absorbed = absorbed;

        let dealt = amount.min(self.health);
        self.health = (self.health - dealt).max(0.0);
        outcome.dealt = dealt;

        if let Some(threshold) = self.abilities.adaptive_threshold {
            let tracked = &mut self.damage_by_type[damage_type.index()];
            *tracked += dealt + absorbed;
            if *tracked >= threshold * self.max_health {
                self.damage_by_type = [0.0; DamageType::COUNT];
                if self.immunity.adapt(damage_type) {
                    outcome.adapted = Some(damage_type);
                }
            }
        }

        outcome
    }

    /// Applies a tower hit and reports it.
    ///
    /// Every resolved hit is broadcast as [`Event::DamageDealt`], immune hits
    /// included, followed by [`Event::ImmunityAdapted`] when the hit triggered
    /// an adaptation.
    pub fn receive_hit(
        &mut self,
        id: EnemyId,
        amount: f32,
        damage_type: DamageType,
        source: HitSource,
        out: &mut Vec<Event>,
    ) -> DamageOutcome {
        let outcome = self.take_damage(amount, damage_type);
        if !outcome.immune {
            self.credit_hit(source.tower);
        }
        out.push(Event::DamageDealt(DamageReport {
            hit: true,
            damage: outcome.dealt,
            tower: source.tower,
            tower_kind: source.kind,
            enemy: id,
            immune: outcome.immune,
        }));
        if let Some(damage_type) = outcome.adapted {
            out.push(Event::ImmunityAdapted {
                enemy: id,
                damage_type,
            });
        }
        outcome
    }

    /// Restores health up to the maximum, returning the amount restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// Applies a status effect unless the enemy is immune to it.
    pub fn apply_status(&mut self, application: StatusApplication) -> bool {
        if self.immunity.is_status_immune(application.kind()) {
            return false;
        }
        self.status.apply(application);
        true
    }

    /// Moves the enemy `distance` forward along `path`.
    ///
    /// Returns `true` once the enemy reached the final waypoint.
    pub fn advance_along(&mut self, path: &Path, distance: f32) -> bool {
        self.progress = (self.progress + distance.max(0.0)).min(path.length());
        let (index, position) = path.locate(self.progress);
        self.path_index = self.path_index.max(index);
        self.position = position;
        self.progress >= path.length()
    }

    /// Regenerates the shield toward its capacity.
    pub fn regenerate_shield(&mut self) {
        if let Some(shield) = self.abilities.shield {
            if self.shield < shield.capacity {
                self.shield = (self.shield + shield.regen).min(shield.capacity);
            }
        }
    }

    /// Records damage credited to a tower.
    pub fn credit_hit(&mut self, tower: TowerId) {
        self.last_hit_by = Some(tower);
    }
}

impl Immune for Enemy {
    fn is_immune(&self, damage_type: DamageType) -> bool {
        self.immunity.is_immune(damage_type)
    }
}

impl StatusImmune for Enemy {
    fn is_status_immune(&self, status: StatusKind) -> bool {
        self.immunity.is_status_immune(status)
    }
}

impl SplitsOnDeath for Enemy {
    fn split(&self) -> Option<(EnemyKind, u32)> {
        self.abilities.split
    }
}

impl PhasesByHealth for Enemy {
    fn advance_phases(&mut self, out: &mut Vec<PhaseEntered>) {
        if !self.is_alive() {
            return;
        }
        let fraction = self.health_fraction();
        while let Some(phase) = self.abilities.phases.get(usize::from(self.phase)) {
            if fraction > phase.threshold {
                break;
            }
            self.phase += 1;
            self.speed_multiplier = phase.speed_multiplier;
            self.shield += phase.shield;
            if let Some(damage_type) = phase.grant_immunity {
                self.immunity.grant(damage_type);
            }
            out.push(PhaseEntered {
                phase: self.phase,
                summon: phase.summon,
            });
        }
    }
}

impl SummonsMinions for Enemy {
    fn tick_summon(&mut self) -> Option<(EnemyKind, u32)> {
        let summoner = self.abilities.summon.as_mut()?;
        summoner
            .cooldown
            .tick()
            .then_some((summoner.minion, summoner.count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::DotKind;

    fn straight_path() -> Path {
        Path::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
        ])
        .expect("valid path")
    }

    fn spawn(kind: EnemyKind) -> Enemy {
        Enemy::spawn(
            kind,
            PathId::new(0),
            &straight_path(),
            0.0,
            1,
            StatScale::IDENTITY,
            None,
        )
    }

    #[test]
    fn every_archetype_has_positive_stats() {
        for kind in EnemyKind::ALL {
            let archetype = kind.archetype();
            assert!(archetype.health > 0.0, "{kind:?}");
            assert!(archetype.speed > 0.0, "{kind:?}");
            assert!(archetype.size > 0.0, "{kind:?}");
            assert!(archetype.lives_cost >= 1, "{kind:?}");
        }
    }

    #[test]
    fn phase_thresholds_descend() {
        for kind in EnemyKind::ALL {
            let phases = EnemyAbilities::resolve(kind.archetype().abilities).phases;
            assert!(
                phases.windows(2).all(|pair| pair[0].threshold > pair[1].threshold),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn immune_hit_reports_zero_and_keeps_health() {
        let mut giant = spawn(EnemyKind::FrostGiant);
        let outcome = giant.take_damage(50.0, DamageType::Ice);
        assert!(outcome.immune);
        assert_eq!(outcome.dealt, 0.0);
        assert_eq!(giant.health, giant.max_health);
    }

    #[test]
    fn heal_responder_regains_health_up_to_maximum() {
        let mut imp = spawn(EnemyKind::FireImp);
        let _ = imp.take_damage(30.0, DamageType::Physical);
        let outcome = imp.take_damage(100.0, DamageType::Fire);
        assert!(outcome.immune);
        assert!((outcome.healed - 30.0).abs() < 1e-4);
        assert_eq!(imp.health, imp.max_health);
    }

    #[test]
    fn damage_is_clamped_to_remaining_health() {
        let mut grunt = spawn(EnemyKind::Grunt);
        let outcome = grunt.take_damage(1_000.0, DamageType::Physical);
        assert_eq!(outcome.dealt, 40.0);
        assert_eq!(grunt.health, 0.0);
        assert!(!grunt.is_alive());

        let again = grunt.take_damage(10.0, DamageType::Physical);
        assert_eq!(again.dealt, 0.0);
    }

    #[test]
    fn every_hit_reports_damage_within_remaining_health() {
        for kind in EnemyKind::ALL {
            for damage_type in DamageType::ALL {
                for factor in [0.25, 1.0, 40.0] {
                    let mut enemy = spawn(kind);
                    enemy.health = enemy.max_health * 0.5;
                    let before = enemy.health;
                    let immune = enemy.is_immune(damage_type);

                    let outcome = enemy.take_damage(before * factor, damage_type);

                    assert_eq!(outcome.immune, immune, "{kind:?} {damage_type:?}");
                    if immune {
                        assert_eq!(outcome.dealt, 0.0, "{kind:?} {damage_type:?}");
                        assert!(enemy.health >= before, "{kind:?} {damage_type:?}");
                    }
                    assert!(
                        (0.0..=before).contains(&outcome.dealt),
                        "{kind:?} {damage_type:?} x{factor}: dealt {}",
                        outcome.dealt
                    );
                    assert!(enemy.health >= 0.0, "{kind:?} {damage_type:?}");
                    assert!(enemy.health <= enemy.max_health, "{kind:?} {damage_type:?}");
                }
            }
        }
    }

    #[test]
    fn resistance_scales_damage() {
        let mut knight = spawn(EnemyKind::Knight);
        let outcome = knight.take_damage(20.0, DamageType::Physical);
        assert!((outcome.dealt - 10.0).abs() < 1e-4);
    }

    #[test]
    fn wet_enemies_take_amplified_lightning() {
        let mut grunt = spawn(EnemyKind::Brute);
        assert!(grunt.apply_status(StatusApplication::Wet {
            duration: 60,
            multiplier: 2.0,
        }));
        let outcome = grunt.take_damage(10.0, DamageType::Lightning);
        assert!((outcome.dealt - 20.0).abs() < 1e-4);
        let outcome = grunt.take_damage(10.0, DamageType::Physical);
        assert!((outcome.dealt - 10.0).abs() < 1e-4);
    }

    #[test]
    fn shield_absorbs_before_health() {
        let mut bearer = spawn(EnemyKind::Shieldbearer);
        let outcome = bearer.take_damage(70.0, DamageType::Physical);
        assert_eq!(outcome.shield_absorbed, 60.0);
        assert_eq!(outcome.dealt, 10.0);
        assert_eq!(bearer.shield, 0.0);

        bearer.regenerate_shield();
        assert!((bearer.shield - 0.5).abs() < 1e-4);
    }

    #[test]
    fn freeze_immune_enemy_keeps_speed() {
        let mut juggernaut = spawn(EnemyKind::Juggernaut);
        let speed = juggernaut.effective_speed();
        assert!(!juggernaut.apply_status(StatusApplication::Freeze {
            duration: 120,
            slow_factor: 0.5,
        }));
        assert!(!juggernaut.status.is_active(StatusKind::Freeze));
        assert_eq!(juggernaut.effective_speed(), speed);
    }

    #[test]
    fn poison_immune_enemy_rejects_dot() {
        let mut skeleton = spawn(EnemyKind::Skeleton);
        assert!(!skeleton.apply_status(StatusApplication::Dot {
            kind: DotKind::Poison,
            tick_damage: 5.0,
            interval: 10,
            duration: 60,
            source: None,
        }));
    }

    #[test]
    fn chameleon_adapts_to_dominant_damage_type() {
        let mut chameleon = spawn(EnemyKind::Chameleon);
        // 30% of 90 health is 27.
        let first = chameleon.take_damage(20.0, DamageType::Energy);
        assert_eq!(first.adapted, None);
        let second = chameleon.take_damage(10.0, DamageType::Energy);
        assert_eq!(second.adapted, Some(DamageType::Energy));
        assert!(chameleon.is_immune(DamageType::Energy));

        let _ = chameleon.take_damage(30.0, DamageType::Physical);
        assert!(chameleon.is_immune(DamageType::Physical));
        assert!(!chameleon.is_immune(DamageType::Energy));
    }

    #[test]
    fn rolled_immunity_blocks_damage() {
        let golem = Enemy::spawn(
            EnemyKind::Golem,
            PathId::new(0),
            &straight_path(),
            0.0,
            3,
            StatScale::IDENTITY,
            Some(DamageType::Explosive),
        );
        assert!(golem.is_immune(DamageType::Explosive));
        assert!(!golem.is_immune(DamageType::Physical));
    }

    #[test]
    fn warlord_enters_phases_in_order_exactly_once() {
        let mut warlord = spawn(EnemyKind::Warlord);
        let mut entered = Vec::new();

        let _ = warlord.take_damage(700.0, DamageType::Physical);
        warlord.advance_phases(&mut entered);
        assert_eq!(entered.len(), 1);
        assert_eq!(entered[0].phase, 1);
        assert_eq!(entered[0].summon, Some((EnemyKind::Grunt, 3)));
        assert!((warlord.speed_multiplier - 1.3).abs() < 1e-6);

        entered.clear();
        warlord.advance_phases(&mut entered);
        assert!(entered.is_empty());

        let _ = warlord.take_damage(500.0, DamageType::Physical);
        warlord.advance_phases(&mut entered);
        assert_eq!(entered.len(), 1);
        assert_eq!(entered[0].phase, 2);
        assert_eq!(warlord.shield, 300.0);
    }

    #[test]
    fn heavy_hit_enters_every_crossed_phase() {
        let mut lich = spawn(EnemyKind::LichKing);
        let mut entered = Vec::new();
        let _ = lich.take_damage(2_000.0, DamageType::Explosive);
        lich.advance_phases(&mut entered);
        assert_eq!(entered.len(), 1);
        assert!(lich.is_immune(DamageType::Physical));
    }

    #[test]
    fn summoner_fires_on_interval() {
        let mut necromancer = spawn(EnemyKind::Necromancer);
        let summons: Vec<_> = (0..600).filter_map(|_| necromancer.tick_summon()).collect();
        assert_eq!(summons, vec![(EnemyKind::Skeleton, 2); 2]);

        let mut grunt = spawn(EnemyKind::Grunt);
        assert_eq!(grunt.tick_summon(), None);
    }

    #[test]
    fn receive_hit_reports_immune_hits_with_zero_damage() {
        let mut giant = spawn(EnemyKind::FrostGiant);
        let source = HitSource {
            tower: TowerId::new(4),
            kind: crate::TowerKind::Freeze,
        };
        let mut events = Vec::new();
        let _ = giant.receive_hit(EnemyId::new(1), 10.0, DamageType::Ice, source, &mut events);
        let _ = giant.receive_hit(EnemyId::new(1), 10.0, DamageType::Physical, source, &mut events);

        assert_eq!(events.len(), 2);
        let Event::DamageDealt(immune) = events[0] else {
            panic!("expected a damage report");
        };
        assert!(immune.hit && immune.immune);
        assert_eq!(immune.damage, 0.0);
        let Event::DamageDealt(landed) = events[1] else {
            panic!("expected a damage report");
        };
        assert_eq!(landed.damage, 10.0);
        assert_eq!(giant.last_hit_by, Some(TowerId::new(4)));
    }

    #[test]
    fn slime_splits_into_slimelets() {
        assert_eq!(spawn(EnemyKind::Slime).split(), Some((EnemyKind::Slimelet, 2)));
        assert_eq!(spawn(EnemyKind::Grunt).split(), None);
    }

    #[test]
    fn advance_along_never_moves_backwards() {
        let path = straight_path();
        let mut grunt = spawn(EnemyKind::Grunt);
        assert!(!grunt.advance_along(&path, 120.0));
        assert_eq!(grunt.path_index, 1);
        assert!(grunt.position.distance(Vec2::new(100.0, 20.0)) < 1e-4);
        assert!(!grunt.advance_along(&path, -50.0));
        assert_eq!(grunt.path_index, 1);
        assert!(grunt.advance_along(&path, 500.0));
    }

    #[test]
    fn scaling_multiplies_stats() {
        let scale = StatScale {
            health: 2.0,
            speed: 1.5,
            reward: 1.5,
        };
        let grunt = Enemy::spawn(
            EnemyKind::Grunt,
            PathId::new(0),
            &straight_path(),
            0.0,
            5,
            scale,
            None,
        );
        assert_eq!(grunt.max_health, 80.0);
        assert_eq!(grunt.base_speed, 1.5);
        assert_eq!(grunt.reward, 8);
    }
}
