//! Startup configuration of the simulation.

use bastion_core::{Bounds, Path, PathError};
use bastion_system_upgrades::UpgradeTable;
use bastion_system_wave_generation::{WaveConfig, WaveConfigError};
use glam::Vec2;
use thiserror::Error;

/// Highest accepted speed multiplier.
pub const MAX_SPEED_MULTIPLIER: u32 = 8;

const DEFAULT_FIELD_WIDTH: f32 = 1_280.0;
const DEFAULT_FIELD_HEIGHT: f32 = 720.0;

const DEFAULT_ROUTE: [Vec2; 8] = [
    Vec2::new(0.0, 360.0),
    Vec2::new(320.0, 360.0),
    Vec2::new(320.0, 120.0),
    Vec2::new(640.0, 120.0),
    Vec2::new(640.0, 600.0),
    Vec2::new(960.0, 600.0),
    Vec2::new(960.0, 360.0),
    Vec2::new(DEFAULT_FIELD_WIDTH, 360.0),
];

/// Tunables of a simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Money the player starts with.
    pub starting_money: u32,
    /// Lives the player starts with.
    pub starting_lives: u32,
    /// Seed of every random decision.
    pub seed: u64,
    /// Playfield rectangle.
    pub bounds: Bounds,
    /// Enemy paths; spawns rotate through them.
    pub paths: Vec<Path>,
    /// Ticks executed per frame.
    pub speed_multiplier: u32,
    /// Idle ticks before the next wave starts on its own.
    pub auto_start_delay: Option<u32>,
    /// Minimum distance between a tower and any path.
    pub path_clearance: f32,
    /// Minimum distance between two towers.
    pub tower_spacing: f32,
    /// Tower currency earned per point of damage dealt.
    pub currency_per_damage: f64,
    /// Tower currency a detector earns per revealed enemy.
    pub detector_currency: f64,
    /// Wave composition tables.
    pub waves: WaveConfig,
    /// Upgrade tracks per tower archetype.
    pub upgrades: UpgradeTable,
}

/// Reasons a [`SimulationConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// No path was supplied.
    #[error("at least one enemy path is required")]
    NoPaths,
    /// A path leaves the playfield.
    #[error("path {index} leaves the playfield")]
    PathOutOfBounds {
        /// Index of the offending path.
        index: usize,
    },
    /// The player would start without lives.
    #[error("starting lives must be positive")]
    NoLives,
    /// The speed multiplier is outside `1..=MAX_SPEED_MULTIPLIER`.
    #[error("speed multiplier {value} is outside the accepted range")]
    InvalidSpeed {
        /// Rejected multiplier.
        value: u32,
    },
    /// A distance or currency rate is negative or not finite.
    #[error("{field} must be finite and non-negative")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The wave tables are malformed.
    #[error(transparent)]
    Waves(#[from] WaveConfigError),
}

impl SimulationConfig {
    /// Checks every field, including the wave tables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.is_empty() {
            return Err(ConfigError::NoPaths);
        }
        if let Some(index) = self.paths.iter().position(|path| {
            !path
                .waypoints()
                .iter()
                .all(|point| self.bounds.contains(*point))
        }) {
            return Err(ConfigError::PathOutOfBounds { index });
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::NoLives);
        }
        if !(1..=MAX_SPEED_MULTIPLIER).contains(&self.speed_multiplier) {
            return Err(ConfigError::InvalidSpeed {
                value: self.speed_multiplier,
            });
        }

        let distances = [
            ("path_clearance", self.path_clearance),
            ("tower_spacing", self.tower_spacing),
        ];
        for (field, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue { field });
            }
        }
        let rates = [
            ("currency_per_damage", self.currency_per_damage),
            ("detector_currency", self.detector_currency),
        ];
        for (field, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue { field });
            }
        }

        self.waves.validate()?;
        Ok(())
    }

    /// Playfield used by [`SimulationConfig::default`].
    #[must_use]
    pub fn default_bounds() -> Bounds {
        Bounds::new(
            Vec2::ZERO,
            Vec2::new(DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT),
        )
    }

    /// Serpentine path used by [`SimulationConfig::default`].
    pub fn default_route() -> Result<Path, PathError> {
        Path::new(DEFAULT_ROUTE.to_vec())
    }

    /// Paths used by [`SimulationConfig::default`].
    ///
    /// Empty only if the built-in route is malformed, which
    /// [`SimulationConfig::validate`] then reports as [`ConfigError::NoPaths`].
    #[must_use]
    pub fn default_paths() -> Vec<Path> {
        Self::default_route().into_iter().collect()
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            starting_money: 650,
            starting_lives: 20,
            seed: 0,
            bounds: Self::default_bounds(),
            paths: Self::default_paths(),
            speed_multiplier: 1,
            auto_start_delay: None,
            path_clearance: 28.0,
            tower_spacing: 32.0,
            currency_per_damage: 0.1,
            detector_currency: 2.0,
            waves: WaveConfig::default(),
            upgrades: UpgradeTable::standard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.paths.len(), 1);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn default_route_is_well_formed() {
        let route = SimulationConfig::default_route().expect("valid default route");
        let bounds = SimulationConfig::default_bounds();
        assert!(route.waypoints().iter().all(|point| bounds.contains(*point)));
        assert_eq!(SimulationConfig::default_paths(), vec![route]);
    }

    #[test]
    fn rejects_missing_paths_and_lives() {
        let config = SimulationConfig {
            paths: Vec::new(),
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoPaths));

        let config = SimulationConfig {
            starting_lives: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoLives));
    }

    #[test]
    fn rejects_paths_outside_the_playfield() {
        let stray = Path::new(vec![Vec2::new(10.0, 10.0), Vec2::new(5_000.0, 10.0)])
            .expect("valid path");
        let config = SimulationConfig {
            paths: vec![SimulationConfig::default_paths().remove(0), stray],
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::PathOutOfBounds { index: 1 })
        );
    }

    #[test]
    fn rejects_bad_speeds_and_rates() {
        let config = SimulationConfig {
            speed_multiplier: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidSpeed { value: 0 })
        );

        let config = SimulationConfig {
            currency_per_damage: f64::NAN,
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "currency_per_damage",
            })
        );
    }

    #[test]
    fn surfaces_wave_table_errors() {
        let mut config = SimulationConfig::default();
        config.waves.compositions.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Waves(_))));
    }
}
