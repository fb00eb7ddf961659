//! Tower archetypes, stat blocks and the tower entity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enemies::Enemy;
use crate::immunity::DamageType;
use crate::status::{DotKind, StatusKind};
use crate::EnemyId;

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Cheap all-rounder firing arrows.
    Basic,
    /// Long range, slow, hard-hitting; prefers the healthiest enemy.
    Sniper,
    /// Short-range explosive shells.
    Cannon,
    /// Long-range explosive lobs; cannot hit flying enemies.
    Mortar,
    /// Instant arcs that chain between enemies.
    Lightning,
    /// Frost pulse that slows every enemy in an area.
    Freeze,
    /// Darts that burst into poison clouds.
    Poison,
    /// Short-range fire bursts that set enemies alight.
    Flame,
    /// Homing missiles with a small blast.
    Missile,
    /// Piercing beam bolts.
    Laser,
    /// Rapid flak that strictly prefers flying enemies.
    AntiAir,
    /// Water pulse that soaks enemies, amplifying lightning.
    Tidal,
    /// Rapid-fire gun shooting several targets at once.
    Gatling,
    /// Support tower that reveals invisible enemies.
    Detector,
}

impl TowerKind {
    /// Number of tower kinds.
    pub const COUNT: usize = 14;

    /// Every tower kind in declaration order.
    pub const ALL: [TowerKind; Self::COUNT] = [
        TowerKind::Basic,
        TowerKind::Sniper,
        TowerKind::Cannon,
        TowerKind::Mortar,
        TowerKind::Lightning,
        TowerKind::Freeze,
        TowerKind::Poison,
        TowerKind::Flame,
        TowerKind::Missile,
        TowerKind::Laser,
        TowerKind::AntiAir,
        TowerKind::Tidal,
        TowerKind::Gatling,
        TowerKind::Detector,
    ];

    /// Static stat row describing the archetype.
    #[must_use]
    pub const fn archetype(self) -> &'static TowerArchetype {
        match self {
            Self::Basic => &BASIC,
            Self::Sniper => &SNIPER,
            Self::Cannon => &CANNON,
            Self::Mortar => &MORTAR,
            Self::Lightning => &LIGHTNING,
            Self::Freeze => &FREEZE,
            Self::Poison => &POISON,
            Self::Flame => &FLAME,
            Self::Missile => &MISSILE,
            Self::Laser => &LASER,
            Self::AntiAir => &ANTI_AIR,
            Self::Tidal => &TIDAL,
            Self::Gatling => &GATLING,
            Self::Detector => &DETECTOR,
        }
    }

    /// Purchase price of the tower.
    #[must_use]
    pub const fn cost(self) -> u32 {
        self.archetype().cost
    }
}

/// How a projectile affects enemies once it resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileBehavior {
    /// Single target.
    Direct,
    /// Passes through up to `pierce` enemies.
    Pierce,
    /// Area damage with linear falloff to 50% at the edge.
    Splash,
    /// Jumps between nearby enemies.
    Chain,
    /// Steers toward the nearest enemy with a bounded turn rate.
    Homing,
    /// Slows every enemy in an area.
    AreaFreeze,
    /// Soaks every enemy in an area.
    AreaWet,
    /// Applies damage over time to every enemy in an area.
    Dot(DotKind),
}

/// Whether shots travel or resolve where the target stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delivery {
    /// The projectile flies toward the target.
    Travelling,
    /// The shot resolves at the target's position in the same tick.
    Instant,
}

/// Selection rule applied among in-range candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetingStrategy {
    /// Greatest progress along the path.
    First,
    /// Greatest current health.
    Strongest,
    /// Most eligible neighbours within the tower's area radius.
    Cluster,
    /// Flying enemies strictly before ground enemies, then path progress.
    AirFirst,
}

/// Archetype-specific filter removing otherwise valid candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exclusion {
    /// Every eligible enemy is a candidate.
    None,
    /// Enemies that are already frozen are skipped.
    Frozen,
    /// Enemies that are already wet are skipped.
    Wet,
}

/// What a tower does when its fire timer elapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TowerRole {
    /// Fires projectiles at a target.
    Attack {
        /// Damage type carried by the tower's projectiles.
        damage_type: DamageType,
        /// Behaviour of the tower's projectiles.
        behavior: ProjectileBehavior,
        /// Whether the projectiles travel or resolve instantly.
        delivery: Delivery,
    },
    /// Reveals invisible enemies in range.
    Detector,
}

/// Tunable combat statistics of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Damage per hit.
    pub damage: f32,
    /// Targeting radius.
    pub range: f32,
    /// Ticks between shots.
    pub fire_period: u32,
    /// Distance covered by projectiles per tick.
    pub projectile_speed: f32,
    /// Radius of splash and area effects.
    pub splash_radius: f32,
    /// Number of additional enemies a chain jumps to.
    pub chain_count: u32,
    /// Maximum distance of a single chain jump.
    pub chain_range: f32,
    /// Number of enemies a piercing projectile may hit.
    pub pierce: u32,
    /// Projectiles fired per shot, each at a distinct target.
    pub multishot: u32,
    /// Maximum heading change of homing projectiles per tick, in radians.
    pub turn_rate: f32,
    /// Ticks a status effect lasts.
    pub effect_duration: u32,
    /// Slow factor for freeze, damage multiplier for wet.
    pub effect_strength: f32,
    /// Damage per pulse for damage over time.
    pub tick_damage: f32,
    /// Ticks between damage-over-time pulses.
    pub tick_interval: u32,
}

impl TowerStats {
    /// Stat block shared by every archetype before specialisation.
    pub const BASE: TowerStats = TowerStats {
        damage: 0.0,
        range: 0.0,
        fire_period: 60,
        projectile_speed: 0.0,
        splash_radius: 0.0,
        chain_count: 0,
        chain_range: 0.0,
        pierce: 1,
        multishot: 1,
        turn_rate: 0.0,
        effect_duration: 0,
        effect_strength: 0.0,
        tick_damage: 0.0,
        tick_interval: 60,
    };

    /// Builds a plain attack stat block.
    #[must_use]
    pub const fn attack(damage: f32, range: f32, fire_period: u32, projectile_speed: f32) -> Self {
        TowerStats {
            damage,
            range,
            fire_period,
            projectile_speed,
            ..Self::BASE
        }
    }

    /// Adds a single upgrade delta, clamping every stat to its valid domain.
    pub fn apply(&mut self, delta: &StatDelta) {
        self.damage = (self.damage + delta.damage).max(0.0);
        self.range = (self.range + delta.range).max(0.0);
        self.fire_period = self.fire_period.saturating_add_signed(delta.fire_period).max(1);
        self.splash_radius = (self.splash_radius + delta.splash_radius).max(0.0);
        self.chain_count = self.chain_count.saturating_add_signed(delta.chain_count);
        self.chain_range = (self.chain_range + delta.chain_range).max(0.0);
        self.pierce = self.pierce.saturating_add_signed(delta.pierce).max(1);
        self.multishot = self.multishot.saturating_add_signed(delta.multishot).max(1);
        self.effect_duration = self
            .effect_duration
            .saturating_add_signed(delta.effect_duration);
        self.effect_strength = (self.effect_strength + delta.effect_strength).max(0.0);
        self.tick_damage = (self.tick_damage + delta.tick_damage).max(0.0);
    }
}

/// Incremental stat change granted by one upgrade level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatDelta {
    /// Added damage per hit.
    pub damage: f32,
    /// Added range.
    pub range: f32,
    /// Added ticks between shots; negative values fire faster.
    pub fire_period: i32,
    /// Added splash or area radius.
    pub splash_radius: f32,
    /// Added chain jumps.
    pub chain_count: i32,
    /// Added chain jump distance.
    pub chain_range: f32,
    /// Added pierce hits.
    pub pierce: i32,
    /// Added projectiles per shot.
    pub multishot: i32,
    /// Added status duration.
    pub effect_duration: i32,
    /// Added effect strength.
    pub effect_strength: f32,
    /// Added damage-over-time damage per pulse.
    pub tick_damage: f32,
}

impl StatDelta {
    /// Delta that changes nothing.
    pub const ZERO: StatDelta = StatDelta {
        damage: 0.0,
        range: 0.0,
        fire_period: 0,
        splash_radius: 0.0,
        chain_count: 0,
        chain_range: 0.0,
        pierce: 0,
        multishot: 0,
        effect_duration: 0,
        effect_strength: 0.0,
        tick_damage: 0.0,
    };

    /// Delta adding damage.
    #[must_use]
    pub const fn damage(amount: f32) -> Self {
        StatDelta {
            damage: amount,
            ..Self::ZERO
        }
    }

    /// Delta adding range.
    #[must_use]
    pub const fn range(amount: f32) -> Self {
        StatDelta {
            range: amount,
            ..Self::ZERO
        }
    }

    /// Delta changing the fire period.
    #[must_use]
    pub const fn fire_period(ticks: i32) -> Self {
        StatDelta {
            fire_period: ticks,
            ..Self::ZERO
        }
    }
}

/// Upgrade tracks every tower offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeTrack {
    /// Raises damage.
    Damage,
    /// Raises range.
    Range,
    /// Improves the archetype's speciality.
    Utility,
}

impl UpgradeTrack {
    /// Every track in declaration order.
    pub const ALL: [UpgradeTrack; 3] = [
        UpgradeTrack::Damage,
        UpgradeTrack::Range,
        UpgradeTrack::Utility,
    ];

    /// Dense index used by per-track tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Purchased level on each upgrade track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeLevels([u8; 3]);

impl UpgradeLevels {
    /// Level purchased on the track.
    #[must_use]
    pub const fn get(&self, track: UpgradeTrack) -> u8 {
        self.0[track.index()]
    }

    /// Overwrites the level of a track.
    pub fn set(&mut self, track: UpgradeTrack, level: u8) {
        self.0[track.index()] = level;
    }

    /// Sum of levels across every track.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.iter().map(|level| u32::from(*level)).sum()
    }
}

/// Static row describing a tower archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerArchetype {
    /// Display name.
    pub name: &'static str,
    /// Purchase price.
    pub cost: u32,
    /// Attack or support role.
    pub role: TowerRole,
    /// Candidate selection rule.
    pub targeting: TargetingStrategy,
    /// Whether ground enemies can be targeted.
    pub hits_ground: bool,
    /// Whether flying enemies can be targeted.
    pub hits_flying: bool,
    /// Archetype-specific candidate filter.
    pub exclusion: Exclusion,
    /// Stats before upgrades.
    pub base: TowerStats,
    /// Delta applied by each level of the utility track.
    pub utility: StatDelta,
}

impl TowerArchetype {
    /// Damage type of the archetype's projectiles, if it attacks.
    #[must_use]
    pub const fn damage_type(&self) -> Option<DamageType> {
        match self.role {
            TowerRole::Attack { damage_type, .. } => Some(damage_type),
            TowerRole::Detector => None,
        }
    }

    /// Reports whether the archetype's shots can physically reach the
    /// enemy's layer (ground or air).
    #[must_use]
    pub fn reaches(&self, enemy: &Enemy) -> bool {
        enemy.is_alive()
            && if enemy.flying {
                self.hits_flying
            } else {
                self.hits_ground
            }
    }

    /// Reports whether the archetype may select the enemy as a target.
    #[must_use]
    pub fn can_engage(&self, enemy: &Enemy) -> bool {
        self.reaches(enemy) && enemy.is_visible()
    }

    /// Reports whether the archetype's exclusion rule skips the enemy.
    #[must_use]
    pub fn excludes(&self, enemy: &Enemy) -> bool {
        match self.exclusion {
            Exclusion::None => false,
            Exclusion::Frozen => enemy.status.is_active(StatusKind::Freeze),
            Exclusion::Wet => enemy.status.is_active(StatusKind::Wet),
        }
    }

    /// Radius used to count neighbours for cluster targeting.
    #[must_use]
    pub fn cluster_radius(&self, stats: &TowerStats) -> f32 {
        match self.role {
            TowerRole::Attack {
                behavior: ProjectileBehavior::Chain,
                ..
            } => stats.chain_range,
            _ => stats.splash_radius,
        }
    }
}

const fn attack(
    damage_type: DamageType,
    behavior: ProjectileBehavior,
    delivery: Delivery,
) -> TowerRole {
    TowerRole::Attack {
        damage_type,
        behavior,
        delivery,
    }
}

static BASIC: TowerArchetype = TowerArchetype {
    name: "Arrow Tower",
    cost: 50,
    role: attack(
        DamageType::Physical,
        ProjectileBehavior::Direct,
        Delivery::Travelling,
    ),
    targeting: TargetingStrategy::First,
    hits_ground: true,
    hits_flying: true,
    exclusion: Exclusion::None,
    base: TowerStats::attack(10.0, 120.0, 40, 8.0),
    utility: StatDelta::fire_period(-4),
};

static SNIPER: TowerArchetype = TowerArchetype {
    name: "Sniper Tower",
    cost: 120,
    role: attack(
        DamageType::Physical,
        ProjectileBehavior::Direct,
        Delivery::Travelling,
    ),
    targeting: TargetingStrategy::Strongest,
    hits_ground: true,
    hits_flying: true,
    exclusion: Exclusion::None,
    base: TowerStats::attack(60.0, 260.0, 110, 18.0),
    utility: StatDelta::fire_period(-10),
};

static CANNON: TowerArchetype = TowerArchetype {
    name: "Cannon",
    cost: 100,
    role: attack(
        DamageType::Explosive,
        ProjectileBehavior::Splash,
        Delivery::Travelling,
    ),
    targeting: TargetingStrategy::Cluster,
    hits_ground: true,
    hits_flying: false,
    exclusion: Exclusion::None,
    base: TowerStats {
        splash_radius: 40.0,
        ..TowerStats::attack(25.0, 110.0, 75, 6.0)
    },
    utility: StatDelta {
        splash_radius: 8.0,
        ..StatDelta::ZERO
    },
};

static MORTAR: TowerArchetype = TowerArchetype {
    name: "Mortar",
    cost: 150,
    role: attack(
        DamageType::Explosive,
        ProjectileBehavior::Splash,
        Delivery::Travelling,
    ),
    targeting: TargetingStrategy::Cluster,
    hits_ground: true,
    hits_flying: false,
    exclusion: Exclusion::None,
    base: TowerStats {
        splash_radius: 60.0,
        ..TowerStats::attack(45.0, 200.0, 140, 5.0)
    },
    utility: StatDelta {
        splash_radius: 10.0,
        fire_period: -8,
        ..StatDelta::ZERO
    },
};

static LIGHTNING: TowerArchetype = TowerArchetype {
    name: "Lightning Spire",
    cost: 140,
    role: attack(
        DamageType::Lightning,
        ProjectileBehavior::Chain,
        Delivery::Instant,
    ),
    targeting: TargetingStrategy::Cluster,
    hits_ground: true,
    hits_flying: true,
    exclusion: Exclusion::None,
    base: TowerStats {
        chain_count: 3,
        chain_range: 70.0,
        ..TowerStats::attack(18.0, 130.0, 60, 0.0)
    },
    utility: StatDelta {
        chain_count: 1,
        chain_range: 5.0,
        ..StatDelta::ZERO
    },
};

static FREEZE: TowerArchetype = TowerArchetype {
    name: "Frost Tower",
    cost: 90,
    role: attack(
        DamageType::Ice,
        ProjectileBehavior::AreaFreeze,
        Delivery::Instant,
    ),
    targeting: TargetingStrategy::First,
    hits_ground: true,
    hits_flying: true,
    exclusion: Exclusion::Frozen,
    base: TowerStats {
        splash_radius: 45.0,
        effect_duration: 120,
        effect_strength: 0.5,
        ..TowerStats::attack(2.0, 100.0, 70, 0.0)
    },
    utility: StatDelta {
        effect_duration: 30,
        effect_strength: -0.08,
        ..StatDelta::ZERO
    },
};

static POISON: TowerArchetype = TowerArchetype {
    name: "Venom Tower",
    cost: 110,
    role: attack(
        DamageType::Poison,
        ProjectileBehavior::Dot(DotKind::Poison),
        Delivery::Travelling,
    ),
    targeting: TargetingStrategy::First,
    hits_ground: true,
    hits_flying: true,
    exclusion: Exclusion::None,
    base: TowerStats {
        splash_radius: 30.0,
        effect_duration: 300,
        tick_damage: 6.0,
        tick_interval: 60,
        ..TowerStats::attack(4.0, 120.0, 80, 7.0)
    },
    utility: StatDelta {
        tick_damage: 3.0,
        ..StatDelta::ZERO
    },
};

static FLAME: TowerArchetype = TowerArchetype {
    name: "Flamethrower",
    cost: 130,
    role: attack(
        DamageType::Fire,
        ProjectileBehavior::Dot(DotKind::Burn),
        Delivery::Instant,
    ),
    targeting: TargetingStrategy::First,
    hits_ground: true,
    hits_flying: false,
    exclusion: Exclusion::None,
    base: TowerStats {
        splash_radius: 25.0,
        effect_duration: 120,
        tick_damage: 5.0,
        tick_interval: 30,
        ..TowerStats::attack(6.0, 80.0, 20, 0.0)
    },
    utility: StatDelta {
        effect_duration: 30,
        tick_damage: 1.5,
        ..StatDelta::ZERO
    },
};

static MISSILE: TowerArchetype = TowerArchetype {
    name: "Missile Battery",
    cost: 200,
    role: attack(
        DamageType::Explosive,
        ProjectileBehavior::Homing,
        Delivery::Travelling,
    ),
    targeting: TargetingStrategy::Strongest,
    hits_ground: true,
    hits_flying: true,
    exclusion: Exclusion::None,
    base: TowerStats {
        splash_radius: 30.0,
        turn_rate: 0.12,
        ..TowerStats::attack(40.0, 220.0, 90, 6.0)
    },
    utility: StatDelta {
        splash_radius: 6.0,
        fire_period: -6,
        ..StatDelta::ZERO
    },
};

static LASER: TowerArchetype = TowerArchetype {
    name: "Laser Tower",
    cost: 175,
    role: attack(
        DamageType::Energy,
        ProjectileBehavior::Pierce,
        Delivery::Travelling,
    ),
    targeting: TargetingStrategy::First,
    hits_ground: true,
    hits_flying: true,
    exclusion: Exclusion::None,
    base: TowerStats {
        pierce: 4,
        ..TowerStats::attack(20.0, 170.0, 50, 14.0)
    },
    utility: StatDelta {
        pierce: 1,
        ..StatDelta::ZERO
    },
};

static ANTI_AIR: TowerArchetype = TowerArchetype {
    name: "Flak Tower",
    cost: 110,
    role: attack(
        DamageType::Physical,
        ProjectileBehavior::Direct,
        Delivery::Travelling,
    ),
    targeting: TargetingStrategy::AirFirst,
    hits_ground: true,
    hits_flying: true,
    exclusion: Exclusion::None,
    base: TowerStats::attack(22.0, 180.0, 35, 14.0),
    utility: StatDelta::fire_period(-4),
};

static TIDAL: TowerArchetype = TowerArchetype {
    name: "Tidal Tower",
    cost: 100,
    role: attack(
        DamageType::Water,
        ProjectileBehavior::AreaWet,
        Delivery::Instant,
    ),
    targeting: TargetingStrategy::Cluster,
    hits_ground: true,
    hits_flying: true,
    exclusion: Exclusion::Wet,
    base: TowerStats {
        splash_radius: 50.0,
        effect_duration: 240,
        effect_strength: 2.0,
        ..TowerStats::attack(3.0, 110.0, 90, 0.0)
    },
    utility: StatDelta {
        effect_strength: 0.25,
        effect_duration: 30,
        ..StatDelta::ZERO
    },
};

static GATLING: TowerArchetype = TowerArchetype {
    name: "Gatling Tower",
    cost: 160,
    role: attack(
        DamageType::Physical,
        ProjectileBehavior::Direct,
        Delivery::Travelling,
    ),
    targeting: TargetingStrategy::First,
    hits_ground: true,
    hits_flying: true,
    exclusion: Exclusion::None,
    base: TowerStats {
        multishot: 2,
        ..TowerStats::attack(6.0, 110.0, 12, 12.0)
    },
    utility: StatDelta {
        multishot: 1,
        ..StatDelta::ZERO
    },
};

static DETECTOR: TowerArchetype = TowerArchetype {
    name: "Watchtower",
    cost: 80,
    role: TowerRole::Detector,
    targeting: TargetingStrategy::First,
    hits_ground: true,
    hits_flying: true,
    exclusion: Exclusion::None,
    base: TowerStats::attack(0.0, 150.0, 30, 0.0),
    utility: StatDelta::fire_period(-5),
};

/// A placed tower.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    /// Archetype of the tower.
    pub kind: TowerKind,
    /// Centre of the tower.
    pub position: Vec2,
    /// Stats before upgrades.
    pub base: TowerStats,
    /// Stats after applying purchased upgrade levels.
    pub stats: TowerStats,
    /// Purchased levels per track.
    pub levels: UpgradeLevels,
    /// Ticks until the tower may fire again.
    pub fire_timer: u32,
    /// Enemy currently targeted, resolved through the world each tick.
    pub target: Option<EnemyId>,
    /// Total damage credited to the tower.
    pub damage_dealt: f64,
    /// Enemies finished off by the tower.
    pub kills: u32,
}

impl Tower {
    /// Creates a tower with base stats, ready to fire.
    #[must_use]
    pub fn new(kind: TowerKind, position: Vec2) -> Self {
        let base = kind.archetype().base;
        Self {
            kind,
            position,
            base,
            stats: base,
            levels: UpgradeLevels::default(),
            fire_timer: 0,
            target: None,
            damage_dealt: 0.0,
            kills: 0,
        }
    }

    /// Static row describing the tower's archetype.
    #[must_use]
    pub fn archetype(&self) -> &'static TowerArchetype {
        self.kind.archetype()
    }

    /// Counts the fire timer down by one tick.
    pub fn cool_down(&mut self) {
        self.fire_timer = self.fire_timer.saturating_sub(1);
    }

    /// Reports whether the fire timer elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.fire_timer == 0
    }

    /// Restarts the fire timer after a shot was fired.
    pub fn mark_fired(&mut self) {
        self.fire_timer = self.stats.fire_period.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_archetype_has_positive_cost_and_range() {
        for kind in TowerKind::ALL {
            let archetype = kind.archetype();
            assert!(archetype.cost > 0, "{kind:?} should cost money");
            assert!(archetype.base.range > 0.0, "{kind:?} should have range");
            assert!(archetype.base.fire_period > 0);
            assert!(archetype.hits_ground || archetype.hits_flying);
        }
    }

    #[test]
    fn travelling_attackers_have_projectile_speed() {
        for kind in TowerKind::ALL {
            if let TowerRole::Attack {
                delivery: Delivery::Travelling,
                ..
            } = kind.archetype().role
            {
                assert!(kind.archetype().base.projectile_speed > 0.0, "{kind:?}");
            }
        }
    }

    #[test]
    fn stat_delta_clamps_fire_period_and_strength() {
        let mut stats = TowerStats::attack(10.0, 100.0, 5, 4.0);
        stats.apply(&StatDelta::fire_period(-20));
        assert_eq!(stats.fire_period, 1);

        stats.apply(&StatDelta {
            effect_strength: -3.0,
            ..StatDelta::ZERO
        });
        assert_eq!(stats.effect_strength, 0.0);
    }

    #[test]
    fn new_tower_starts_ready_with_base_stats() {
        let tower = Tower::new(TowerKind::Cannon, Vec2::new(5.0, 5.0));
        assert!(tower.is_ready());
        assert_eq!(tower.stats, tower.base);
        assert_eq!(tower.levels.total(), 0);
    }

    #[test]
    fn fire_timer_counts_down_after_shot() {
        let mut tower = Tower::new(TowerKind::Basic, Vec2::ZERO);
        tower.mark_fired();
        assert_eq!(tower.fire_timer, 40);
        for _ in 0..39 {
            tower.cool_down();
        }
        assert!(!tower.is_ready());
        tower.cool_down();
        assert!(tower.is_ready());
    }

    #[test]
    fn chain_towers_cluster_on_chain_range() {
        let lightning = TowerKind::Lightning.archetype();
        assert_eq!(lightning.cluster_radius(&lightning.base), 70.0);
        let cannon = TowerKind::Cannon.archetype();
        assert_eq!(cannon.cluster_radius(&cannon.base), 40.0);
    }
}
