//! Projectile entity shared by the combat system and the world.

use glam::Vec2;

use crate::immunity::DamageType;
use crate::towers::{ProjectileBehavior, TowerKind, TowerStats};
use crate::{EnemyId, TowerId, MAX_PROJECTILE_AGE};

/// A shot in flight or awaiting same-tick resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    /// Tower that fired the projectile.
    pub origin: TowerId,
    /// Kind of the firing tower.
    pub tower_kind: TowerKind,
    /// Current position.
    pub position: Vec2,
    /// Displacement per tick; zero for instant shots.
    pub velocity: Vec2,
    /// Enemy the shot was aimed at.
    pub target: Option<EnemyId>,
    /// Damage per hit.
    pub damage: f32,
    /// Damage type of every hit.
    pub damage_type: DamageType,
    /// How the projectile resolves.
    pub behavior: ProjectileBehavior,
    /// Tower stats captured when the shot was fired.
    pub stats: TowerStats,
    /// Distance covered so far.
    pub travelled: f32,
    /// Distance after which the projectile is discarded.
    pub max_distance: f32,
    /// Ticks since the projectile was fired.
    pub age: u32,
    /// Enemies already struck, in hit order.
    pub hits: Vec<EnemyId>,
    /// Hits left before a piercing projectile is spent.
    pub pierce_remaining: u32,
    remove: bool,
}

impl Projectile {
    /// Creates a projectile that travels from `position` along `velocity`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn travelling(
        origin: TowerId,
        tower_kind: TowerKind,
        position: Vec2,
        velocity: Vec2,
        target: EnemyId,
        damage_type: DamageType,
        behavior: ProjectileBehavior,
        stats: TowerStats,
    ) -> Self {
        Self {
            origin,
            tower_kind,
            position,
            velocity,
            target: Some(target),
            damage: stats.damage,
            damage_type,
            behavior,
            stats,
            travelled: 0.0,
            max_distance: stats.range * 2.0,
            age: 0,
            hits: Vec::new(),
            pierce_remaining: stats.pierce.max(1),
            remove: false,
        }
    }

    /// Creates a zero-velocity shot resolved where the target stands.
    #[must_use]
    pub fn instant(
        origin: TowerId,
        tower_kind: TowerKind,
        target_position: Vec2,
        target: EnemyId,
        damage_type: DamageType,
        behavior: ProjectileBehavior,
        stats: TowerStats,
    ) -> Self {
        Self::travelling(
            origin,
            tower_kind,
            target_position,
            Vec2::ZERO,
            target,
            damage_type,
            behavior,
            stats,
        )
    }

    /// Reports whether the shot resolves without travelling.
    #[must_use]
    pub fn is_instant(&self) -> bool {
        self.velocity == Vec2::ZERO
    }

    /// Reports whether the projectile already struck `enemy`.
    #[must_use]
    pub fn has_hit(&self, enemy: EnemyId) -> bool {
        self.hits.contains(&enemy)
    }

    /// Reports whether the projectile exceeded its lifetime or travel cap.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.age >= MAX_PROJECTILE_AGE || self.travelled >= self.max_distance
    }

    /// Reports whether the projectile is waiting to be discarded.
    #[must_use]
    pub fn should_remove(&self) -> bool {
        self.remove
    }

    /// Flags the projectile for removal.
    ///
    /// Returns `true` only for the call that actually set the flag.
    pub fn mark_removed(&mut self) -> bool {
        !std::mem::replace(&mut self.remove, true)
    }
}
