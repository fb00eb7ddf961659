//! Tower placement orders accepted on the command line.

use std::str::FromStr;

use bastion_core::TowerKind;
use glam::Vec2;
use thiserror::Error;

/// Separates the tower kind from its coordinates.
const KIND_DELIMITER: char = '@';
/// Separates the two coordinates.
const COORDINATE_DELIMITER: char = ',';

/// Tower to build before the first wave, written as `kind@x,y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TowerOrder {
    pub(crate) kind: TowerKind,
    pub(crate) position: Vec2,
}

/// Errors raised while parsing a [`TowerOrder`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ScriptError {
    /// The order lacks the `@x,y` part.
    #[error("expected `kind@x,y`, got `{0}`")]
    MissingPosition(String),
    /// The kind names no tower archetype.
    #[error("unknown tower kind `{0}`")]
    UnknownKind(String),
    /// A coordinate is not a finite number.
    #[error("invalid coordinate `{0}`")]
    InvalidCoordinate(String),
}

impl FromStr for TowerOrder {
    type Err = ScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (kind, position) = trimmed
            .split_once(KIND_DELIMITER)
            .ok_or_else(|| ScriptError::MissingPosition(trimmed.to_owned()))?;
        let (x, y) = position
            .split_once(COORDINATE_DELIMITER)
            .ok_or_else(|| ScriptError::MissingPosition(trimmed.to_owned()))?;

        Ok(Self {
            kind: parse_kind(kind)?,
            position: Vec2::new(parse_coordinate(x)?, parse_coordinate(y)?),
        })
    }
}

fn parse_kind(value: &str) -> Result<TowerKind, ScriptError> {
    let wanted = value.trim().replace(['-', '_'], "");
    TowerKind::ALL
        .into_iter()
        .find(|kind| format!("{kind:?}").eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| ScriptError::UnknownKind(value.trim().to_owned()))
}

fn parse_coordinate(value: &str) -> Result<f32, ScriptError> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|coordinate| coordinate.is_finite())
        .ok_or_else(|| ScriptError::InvalidCoordinate(value.trim().to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_and_position() {
        let order: TowerOrder = "sniper@120.5, 80".parse().expect("valid order");
        assert_eq!(
            order,
            TowerOrder {
                kind: TowerKind::Sniper,
                position: Vec2::new(120.5, 80.0),
            }
        );
    }

    #[test]
    fn kind_names_ignore_case_and_separators() {
        let order: TowerOrder = "anti-air@1,2".parse().expect("valid order");
        assert_eq!(order.kind, TowerKind::AntiAir);
        let order: TowerOrder = "ANTI_AIR@1,2".parse().expect("valid order");
        assert_eq!(order.kind, TowerKind::AntiAir);
    }

    #[test]
    fn reports_malformed_orders() {
        assert_eq!(
            "basic".parse::<TowerOrder>(),
            Err(ScriptError::MissingPosition("basic".to_owned()))
        );
        assert_eq!(
            "catapult@1,2".parse::<TowerOrder>(),
            Err(ScriptError::UnknownKind("catapult".to_owned()))
        );
        assert_eq!(
            "basic@1,inf".parse::<TowerOrder>(),
            Err(ScriptError::InvalidCoordinate("inf".to_owned()))
        );
    }
}
