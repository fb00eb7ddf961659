//! Read-only snapshot handed to presentation layers once per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enemies::EnemyKind;
use crate::immunity::DamageType;
use crate::status::StatusKind;
use crate::towers::{ProjectileBehavior, TowerKind, TowerStats, UpgradeLevels};
use crate::{EnemyId, ProjectileId, TowerId};

/// Lifecycle stage of the current wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveStage {
    /// Waiting for the player or the auto-start timer.
    Idle,
    /// Enemies are still being spawned.
    Spawning,
    /// Every enemy spawned; waiting for the field to clear.
    Clearing,
}

/// Progress of the current wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveInfo {
    /// Number of the current or most recently completed wave.
    pub number: u32,
    /// Lifecycle stage.
    pub stage: WaveStage,
    /// Enemies spawned so far by the wave plan.
    pub spawned: u32,
    /// Enemies the wave plan spawns in total.
    pub quota: u32,
    /// Indicates a boss override wave.
    pub boss: bool,
}

/// Tower as seen by presentation layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerSnapshot {
    /// Tower identifier.
    pub id: TowerId,
    /// Archetype of the tower.
    pub kind: TowerKind,
    /// Centre of the tower.
    pub position: Vec2,
    /// Stats after upgrades.
    pub stats: TowerStats,
    /// Purchased upgrade levels.
    pub levels: UpgradeLevels,
    /// Enemy currently targeted.
    pub target: Option<EnemyId>,
    /// Upgrade currency held by the tower.
    pub currency: f64,
    /// Total damage credited to the tower.
    pub damage_dealt: f64,
    /// Enemies finished off by the tower.
    pub kills: u32,
}

/// Enemy as seen by presentation layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    /// Enemy identifier.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Current position.
    pub position: Vec2,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Current shield.
    pub shield: f32,
    /// Collision radius.
    pub size: f32,
    /// Whether the enemy flies.
    pub flying: bool,
    /// Whether the enemy can currently be targeted by ordinary towers.
    pub visible: bool,
    /// Active status effects.
    pub statuses: Vec<StatusKind>,
    /// Damage types the enemy is immune to.
    pub immunities: Vec<DamageType>,
}

/// Projectile as seen by presentation layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    /// Projectile identifier.
    pub id: ProjectileId,
    /// Firing tower.
    pub origin: TowerId,
    /// Current position.
    pub position: Vec2,
    /// Behaviour of the projectile.
    pub behavior: ProjectileBehavior,
}

/// Complete read-only view of the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationView {
    /// Ticks simulated so far.
    pub tick: u64,
    /// Player money.
    pub money: u32,
    /// Player lives.
    pub lives: u32,
    /// Progress of the current wave.
    pub wave: WaveInfo,
    /// Every tower ordered by identifier.
    pub towers: Vec<TowerSnapshot>,
    /// Every enemy ordered by identifier.
    pub enemies: Vec<EnemySnapshot>,
    /// Every projectile ordered by identifier.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Ticks executed per frame.
    pub speed: u32,
    /// Whether the player ran out of lives.
    pub game_over: bool,
}
