#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bastion Defence simulation.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative world, and the pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes them and
//! broadcasts [`Event`] values. Systems operate on the entity structs defined
//! here ([`Tower`], [`Enemy`], [`Projectile`]) which refer to one another only
//! through the identifiers below.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod enemies;
pub mod immunity;
pub mod path;
pub mod projectiles;
pub mod status;
pub mod towers;
pub mod view;

pub use enemies::{
    Ability, Cooldown, DamageOutcome, Enemy, EnemyAbilities, EnemyArchetype, EnemyKind, Phase,
    PhaseEntered, PhasesByHealth, SplitsOnDeath, StatScale, SummonsMinions,
};
pub use immunity::{DamageType, Immune, ImmuneResponse, ImmunityModel, StatusImmune};
pub use path::{Bounds, Path, PathError, PathId};
pub use projectiles::Projectile;
pub use status::{DotKind, DotPulse, StatusApplication, StatusEffects, StatusKind, StatusTick};
pub use towers::{
    Delivery, Exclusion, ProjectileBehavior, StatDelta, TargetingStrategy, Tower, TowerArchetype,
    TowerKind, TowerRole, TowerStats, UpgradeLevels, UpgradeTrack,
};
pub use view::{
    EnemySnapshot, ProjectileSnapshot, SimulationView, TowerSnapshot, WaveInfo, WaveStage,
};

/// Number of simulation ticks that make up one second of game time.
pub const TICKS_PER_SECOND: u32 = 60;

/// Maximum number of ticks a projectile may live before it is discarded.
pub const MAX_PROJECTILE_AGE: u32 = 5 * TICKS_PER_SECOND;

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Tower credited with a hit, carried by projectiles and damage over time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitSource {
    /// Credited tower.
    pub tower: TowerId,
    /// Kind of the credited tower.
    pub kind: TowerKind,
}

/// Outcome of a single damage event, reported for bookkeeping and effects.
///
/// Immune hits are still reported with `hit == true` and `damage == 0.0` so
/// presentation layers can react, but they never earn currency.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageReport {
    /// Always true for reports produced by a resolved hit.
    pub hit: bool,
    /// Health actually removed from the enemy, never above its prior health.
    pub damage: f32,
    /// Tower credited with the damage.
    pub tower: TowerId,
    /// Kind of the credited tower, used to key the currency ledger.
    pub tower_kind: TowerKind,
    /// Enemy that received the hit.
    pub enemy: EnemyId,
    /// Indicates that the enemy was immune to the damage type.
    pub immune: bool,
}

/// Commands that express all permissible simulation mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one frame (`speed_multiplier` full ticks).
    Tick,
    /// Requests placement of a tower at the provided position.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Centre of the tower in world units.
        position: Vec2,
    },
    /// Requests removal of an existing tower.
    RemoveTower {
        /// Identifier of the tower targeted for removal.
        tower: TowerId,
    },
    /// Requests an upgrade purchase on one of the tower's tracks.
    PurchaseUpgrade {
        /// Identifier of the tower being upgraded.
        tower: TowerId,
        /// Track that should gain a level.
        track: UpgradeTrack,
    },
    /// Requests that the next wave starts immediately.
    StartWave,
    /// Changes how many full ticks run per frame.
    SetSpeed {
        /// Number of ticks executed per [`Command::Tick`].
        multiplier: u32,
    },
}

/// Events broadcast by the world while processing commands and ticks.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced by one tick.
    TimeAdvanced {
        /// Index of the tick that just completed.
        tick: u64,
    },
    /// Announces that a wave began spawning.
    WaveStarted {
        /// Wave number, starting at one.
        wave: u32,
        /// Number of enemies the wave will spawn.
        quota: u32,
        /// Indicates a boss override wave.
        boss: bool,
    },
    /// Announces that every enemy of a wave was spawned and defeated or leaked.
    WaveCompleted {
        /// Wave number that completed.
        wave: u32,
        /// Money granted for completing the wave.
        bonus: u32,
    },
    /// Confirms that an enemy entered the playfield.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
    },
    /// Reports that an enemy reached the end of its path.
    EnemyLeaked {
        /// Identifier of the enemy that escaped.
        enemy: EnemyId,
        /// Lives deducted from the player.
        lives_lost: u32,
    },
    /// Reports that an enemy was defeated.
    EnemyKilled {
        /// Identifier of the defeated enemy.
        enemy: EnemyId,
        /// Archetype of the defeated enemy.
        kind: EnemyKind,
        /// Money paid for the kill.
        reward: u32,
        /// Tower that dealt the most recent damage, if any.
        tower: Option<TowerId>,
    },
    /// Reports that a dying enemy split into children.
    EnemySplit {
        /// Enemy that split.
        enemy: EnemyId,
        /// Archetype of the spawned children.
        child: EnemyKind,
        /// Number of children spawned.
        count: u32,
    },
    /// Reports that an enemy summoned minions.
    MinionsSummoned {
        /// Summoning enemy.
        enemy: EnemyId,
        /// Archetype of the summoned minions.
        minion: EnemyKind,
        /// Number of minions summoned.
        count: u32,
    },
    /// Reports that an enemy jumped forward along its path.
    EnemyTeleported {
        /// Enemy that teleported.
        enemy: EnemyId,
        /// Path index before the jump.
        from_index: usize,
        /// Path index after the jump.
        to_index: usize,
    },
    /// Reports that an enemy entered a new health phase.
    PhaseChanged {
        /// Enemy that changed phase.
        enemy: EnemyId,
        /// One-based index of the phase entered.
        phase: u8,
    },
    /// Reports that an enemy adapted to a damage type.
    ImmunityAdapted {
        /// Enemy that adapted.
        enemy: EnemyId,
        /// Damage type the enemy is now immune to.
        damage_type: DamageType,
    },
    /// Reports that a status effect became active on an enemy.
    StatusApplied {
        /// Affected enemy.
        enemy: EnemyId,
        /// Status that became active or was refreshed.
        status: StatusKind,
    },
    /// Reports that a status effect expired.
    StatusExpired {
        /// Affected enemy.
        enemy: EnemyId,
        /// Status that expired.
        status: StatusKind,
    },
    /// Reports that an invisible enemy was revealed by a detector.
    EnemyDetected {
        /// Revealed enemy.
        enemy: EnemyId,
        /// Detector tower responsible.
        tower: TowerId,
    },
    /// Confirms that a tower fired a projectile.
    ProjectileFired {
        /// Firing tower.
        tower: TowerId,
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Target the projectile was aimed at.
        target: EnemyId,
    },
    /// Reports a resolved hit, including immune hits with zero damage.
    DamageDealt(DamageReport),
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Type of tower placed.
        kind: TowerKind,
        /// Money spent on the tower.
        cost: u32,
    },
    /// Confirms that a tower was removed.
    TowerRemoved {
        /// Identifier of the removed tower.
        tower: TowerId,
        /// Money refunded to the player.
        refund: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Position provided in the request.
        position: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementRejected,
    },
    /// Reports that a tower removal request was rejected.
    TowerRemovalRejected {
        /// Identifier provided in the request.
        tower: TowerId,
        /// Specific reason the removal failed.
        reason: RemovalRejected,
    },
    /// Confirms that an upgrade level was purchased.
    UpgradePurchased {
        /// Upgraded tower.
        tower: TowerId,
        /// Track that gained a level.
        track: UpgradeTrack,
        /// Level reached on the track.
        level: u8,
    },
    /// Reports that an upgrade purchase was rejected.
    UpgradeRejected {
        /// Tower provided in the request.
        tower: TowerId,
        /// Track provided in the request.
        track: UpgradeTrack,
        /// Specific reason the purchase failed.
        reason: UpgradeRejected,
    },
    /// Announces that the player ran out of lives.
    GameOver {
        /// Wave that was active when the game ended.
        wave: u32,
    },
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementRejected {
    /// The requested position lies outside the playfield.
    #[error("position lies outside the playfield")]
    OutOfBounds,
    /// The requested position blocks an enemy path.
    #[error("position is too close to an enemy path")]
    TooCloseToPath,
    /// The requested position overlaps another tower.
    #[error("position overlaps an existing tower")]
    Overlapping,
    /// The player cannot afford the tower.
    #[error("not enough money: need {cost}, have {available}")]
    InsufficientMoney {
        /// Price of the requested tower.
        cost: u32,
        /// Money held by the player.
        available: u32,
    },
}

/// Reasons a tower removal request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum RemovalRejected {
    /// No tower with the provided identifier exists.
    #[error("no tower with the provided identifier exists")]
    MissingTower,
}

/// Reasons an upgrade purchase may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Error)]
pub enum UpgradeRejected {
    /// No tower with the provided identifier exists.
    #[error("no tower with the provided identifier exists")]
    UnknownTower,
    /// The track already reached its maximum level.
    #[error("track already at maximum level {max_level}")]
    MaxLevel {
        /// Highest level the track supports.
        max_level: u8,
    },
    /// The tower has not earned enough currency.
    #[error("not enough tower currency: need {cost:.1}, have {available:.1}")]
    InsufficientCurrency {
        /// Price of the next level.
        cost: f64,
        /// Currency held by the tower.
        available: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::{EnemyId, PlacementRejected, RemovalRejected, TowerId, TowerKind, UpgradeTrack};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&TowerId::new(42));
        assert_round_trip(&EnemyId::new(7));
    }

    #[test]
    fn tower_kind_round_trips_through_bincode() {
        for kind in TowerKind::ALL {
            assert_round_trip(&kind);
        }
    }

    #[test]
    fn rejection_reasons_round_trip_through_bincode() {
        assert_round_trip(&PlacementRejected::InsufficientMoney {
            cost: 50,
            available: 10,
        });
        assert_round_trip(&RemovalRejected::MissingTower);
        assert_round_trip(&UpgradeTrack::Utility);
    }

    #[test]
    fn placement_rejection_message_names_amounts() {
        let reason = PlacementRejected::InsufficientMoney {
            cost: 120,
            available: 40,
        };
        assert_eq!(reason.to_string(), "not enough money: need 120, have 40");
    }
}
