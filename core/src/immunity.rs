//! Per-enemy immunity and resistance tables keyed by damage type.

use serde::{Deserialize, Serialize};

use crate::status::StatusKind;

/// Damage categories carried by every attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DamageType {
    /// Arrows, bullets and bolts.
    Physical,
    /// Shells, mortars and missiles.
    Explosive,
    /// Electrical arcs; amplified against wet enemies.
    Lightning,
    /// Frost pulses.
    Ice,
    /// Toxic clouds and darts.
    Poison,
    /// Flames.
    Fire,
    /// Focused beams.
    Energy,
    /// Water blasts.
    Water,
}

impl DamageType {
    /// Number of damage types.
    pub const COUNT: usize = 8;

    /// Every damage type in declaration order.
    pub const ALL: [DamageType; Self::COUNT] = [
        DamageType::Physical,
        DamageType::Explosive,
        DamageType::Lightning,
        DamageType::Ice,
        DamageType::Poison,
        DamageType::Fire,
        DamageType::Energy,
        DamageType::Water,
    ];

    /// Dense index used by per-type tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// How an enemy reacts to damage it is immune to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImmuneResponse {
    /// The hit has no effect.
    Block,
    /// The hit restores health instead of removing it.
    Heal,
}

/// Capability queried by combat before applying damage.
pub trait Immune {
    /// Reports whether damage of the provided type has no effect.
    fn is_immune(&self, damage_type: DamageType) -> bool;
}

/// Capability queried before a status effect is applied.
pub trait StatusImmune {
    /// Reports whether the status can never become active.
    fn is_status_immune(&self, status: StatusKind) -> bool;
}

/// Table of immunities, immune responses, status immunities and resistances.
#[derive(Clone, Debug, PartialEq)]
pub struct ImmunityModel {
    innate: [Option<ImmuneResponse>; DamageType::COUNT],
    granted: [bool; DamageType::COUNT],
    adaptive: Option<DamageType>,
    status: [bool; StatusKind::COUNT],
    resistance: [f32; DamageType::COUNT],
}

impl Default for ImmunityModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ImmunityModel {
    /// Creates a model without immunities and with neutral resistances.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            innate: [None; DamageType::COUNT],
            granted: [false; DamageType::COUNT],
            adaptive: None,
            status: [false; StatusKind::COUNT],
            resistance: [1.0; DamageType::COUNT],
        }
    }

    /// Adds an innate immunity with the provided response.
    pub fn set_immunity(&mut self, damage_type: DamageType, response: ImmuneResponse) {
        self.innate[damage_type.index()] = Some(response);
    }

    /// Adds an immunity to a status effect.
    pub fn set_status_immunity(&mut self, status: StatusKind) {
        self.status[status.index()] = true;
    }

    /// Scales incoming damage of the provided type by `factor`.
    pub fn set_resistance(&mut self, damage_type: DamageType, factor: f32) {
        self.resistance[damage_type.index()] = factor.max(0.0);
    }

    /// Grants a permanent blocking immunity, used by rolled immunities and
    /// boss phases.
    pub fn grant(&mut self, damage_type: DamageType) {
        self.granted[damage_type.index()] = true;
    }

    /// Replaces the current adaptive immunity with `damage_type`.
    ///
    /// Returns `false` when the enemy already resists the type completely.
    pub fn adapt(&mut self, damage_type: DamageType) -> bool {
        if self.is_immune(damage_type) {
            return false;
        }
        self.adaptive = Some(damage_type);
        true
    }

    /// Damage type currently covered by the adaptive immunity, if any.
    #[must_use]
    pub const fn adaptive(&self) -> Option<DamageType> {
        self.adaptive
    }

    /// Response applied to a hit of the provided type, or `None` when the
    /// hit lands normally.
    #[must_use]
    pub fn response(&self, damage_type: DamageType) -> Option<ImmuneResponse> {
        let index = damage_type.index();
        if let Some(response) = self.innate[index] {
            return Some(response);
        }
        if self.granted[index] || self.adaptive == Some(damage_type) {
            return Some(ImmuneResponse::Block);
        }
        None
    }

    /// Multiplier applied to non-immune damage of the provided type.
    #[must_use]
    pub fn resistance(&self, damage_type: DamageType) -> f32 {
        self.resistance[damage_type.index()]
    }

    /// Iterator over every damage type the model currently blocks or absorbs.
    pub fn immunities(&self) -> impl Iterator<Item = DamageType> + '_ {
        DamageType::ALL
            .into_iter()
            .filter(|damage_type| self.is_immune(*damage_type))
    }
}

impl Immune for ImmunityModel {
    fn is_immune(&self, damage_type: DamageType) -> bool {
        self.response(damage_type).is_some()
    }
}

impl StatusImmune for ImmunityModel {
    fn is_status_immune(&self, status: StatusKind) -> bool {
        self.status[status.index()]
    }
}
