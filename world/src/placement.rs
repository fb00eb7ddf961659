//! Placement rules deciding where towers may be built.

use std::collections::BTreeMap;
use std::fmt::Debug;

use bastion_core::{Bounds, Path, PlacementRejected, Tower, TowerId, TowerKind};
use glam::Vec2;

/// Decides whether a tower may stand at a position.
///
/// Money is checked by the world; validators only judge the location.
pub trait PlacementValidator: Debug {
    /// Accepts or rejects a tower of `kind` centred on `position`.
    fn check(
        &self,
        kind: TowerKind,
        position: Vec2,
        towers: &BTreeMap<TowerId, Tower>,
    ) -> Result<(), PlacementRejected>;
}

/// Validator enforcing playfield bounds, path clearance and tower spacing.
#[derive(Clone, Debug, PartialEq)]
pub struct ClearanceValidator {
    bounds: Bounds,
    paths: Vec<Path>,
    path_clearance: f32,
    tower_spacing: f32,
}

impl ClearanceValidator {
    /// Creates a validator for the provided playfield.
    #[must_use]
    pub fn new(bounds: Bounds, paths: Vec<Path>, path_clearance: f32, tower_spacing: f32) -> Self {
        Self {
            bounds,
            paths,
            path_clearance,
            tower_spacing,
        }
    }
}

impl PlacementValidator for ClearanceValidator {
    fn check(
        &self,
        _kind: TowerKind,
        position: Vec2,
        towers: &BTreeMap<TowerId, Tower>,
    ) -> Result<(), PlacementRejected> {
        if !position.is_finite() || !self.bounds.contains(position) {
            return Err(PlacementRejected::OutOfBounds);
        }
        if self
            .paths
            .iter()
            .any(|path| path.distance_to(position) < self.path_clearance)
        {
            return Err(PlacementRejected::TooCloseToPath);
        }
        if towers
            .values()
            .any(|tower| tower.position.distance(position) < self.tower_spacing)
        {
            return Err(PlacementRejected::Overlapping);
        }
        Ok(())
    }
}
