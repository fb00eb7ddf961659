//! Waypoint paths consumed read-only by enemies, and playfield bounds.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a path inside the simulation's path list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathId(u32);

impl PathId {
    /// Creates a new path identifier.
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

/// Reasons a waypoint list cannot form a path.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum PathError {
    /// Fewer than two waypoints were supplied.
    #[error("a path needs at least two waypoints, got {count}")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },
    /// Two consecutive waypoints coincide.
    #[error("waypoint {index} coincides with its successor")]
    DegenerateSegment {
        /// Index of the first waypoint of the zero-length segment.
        index: usize,
    },
    /// A waypoint has a NaN or infinite coordinate.
    #[error("waypoint {index} is not finite")]
    NonFinite {
        /// Index of the offending waypoint.
        index: usize,
    },
}

/// Ordered polyline from spawn to goal.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    waypoints: Vec<Vec2>,
    cumulative: Vec<f32>,
}

impl Path {
    /// Validates the waypoint list and precomputes cumulative distances.
    pub fn new(waypoints: Vec<Vec2>) -> Result<Self, PathError> {
        if waypoints.len() < 2 {
            return Err(PathError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }

        if let Some(index) = waypoints.iter().position(|point| !point.is_finite()) {
            return Err(PathError::NonFinite { index });
        }

        let mut cumulative = Vec::with_capacity(waypoints.len());
        cumulative.push(0.0);
        let mut total = 0.0;
        for (index, pair) in waypoints.windows(2).enumerate() {
            let length = pair[0].distance(pair[1]);
            if length <= f32::EPSILON {
                return Err(PathError::DegenerateSegment { index });
            }
            total += length;
            cumulative.push(total);
        }

        Ok(Self {
            waypoints,
            cumulative,
        })
    }

    /// Waypoints in travel order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Spawn point.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.waypoints[0]
    }

    /// Index of the final waypoint.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.waypoints.len() - 1
    }

    /// Total length of the path.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.cumulative[self.last_index()]
    }

    /// Distance along the path at which waypoint `index` lies.
    #[must_use]
    pub fn distance_at(&self, index: usize) -> f32 {
        self.cumulative[index.min(self.last_index())]
    }

    /// Waypoint at `index`, clamped to the final waypoint.
    #[must_use]
    pub fn waypoint(&self, index: usize) -> Vec2 {
        self.waypoints[index.min(self.last_index())]
    }

    /// Resolves a distance along the path into a segment index and position.
    ///
    /// Distances beyond either end are clamped.
    #[must_use]
    pub fn locate(&self, distance: f32) -> (usize, Vec2) {
        if distance <= 0.0 {
            return (0, self.start());
        }
        if distance >= self.length() {
            let last = self.last_index();
            return (last, self.waypoints[last]);
        }

        let index = match self
            .cumulative
            .binary_search_by(|probe| probe.total_cmp(&distance))
        {
            Ok(exact) => exact,
            Err(insertion) => insertion - 1,
        };
        let from = self.waypoints[index];
        let to = self.waypoints[index + 1];
        let segment = self.cumulative[index + 1] - self.cumulative[index];
        let t = (distance - self.cumulative[index]) / segment;
        (index, from.lerp(to, t))
    }

    /// Shortest distance from `point` to any segment of the path.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| distance_to_segment(point, pair[0], pair[1]))
            .fold(f32::INFINITY, f32::min)
    }
}

fn distance_to_segment(point: Vec2, from: Vec2, to: Vec2) -> f32 {
    let segment = to - from;
    let length_sq = segment.length_squared();
    if length_sq <= f32::EPSILON {
        return point.distance(from);
    }
    let t = ((point - from).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(from + segment * t)
}

/// Axis-aligned rectangle enclosing the playfield.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    min: Vec2,
    max: Vec2,
}

impl Bounds {
    /// Creates bounds from two opposite corners.
    #[must_use]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Lower corner.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Upper corner.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Reports whether the point lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Grows the bounds by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_path() -> Path {
        Path::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 50.0),
        ])
        .expect("valid path")
    }

    #[test]
    fn rejects_short_and_degenerate_paths() {
        assert_eq!(
            Path::new(vec![Vec2::ZERO]),
            Err(PathError::TooFewWaypoints { count: 1 })
        );
        assert_eq!(
            Path::new(vec![Vec2::ZERO, Vec2::ONE, Vec2::ONE]),
            Err(PathError::DegenerateSegment { index: 1 })
        );
        assert_eq!(
            Path::new(vec![Vec2::ZERO, Vec2::new(f32::NAN, 0.0)]),
            Err(PathError::NonFinite { index: 1 })
        );
    }

    #[test]
    fn length_accumulates_segments() {
        let path = l_path();
        assert!((path.length() - 150.0).abs() < 1e-4);
        assert!((path.distance_at(1) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn locate_interpolates_within_segment() {
        let path = l_path();
        let (index, position) = path.locate(125.0);
        assert_eq!(index, 1);
        assert!(position.distance(Vec2::new(100.0, 25.0)) < 1e-4);

        let (index, position) = path.locate(500.0);
        assert_eq!(index, 2);
        assert_eq!(position, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn distance_to_measures_nearest_segment() {
        let path = l_path();
        assert!((path.distance_to(Vec2::new(50.0, 20.0)) - 20.0).abs() < 1e-4);
        assert!((path.distance_to(Vec2::new(130.0, 25.0)) - 30.0).abs() < 1e-4);
    }

    #[test]
    fn bounds_contain_edges() {
        let bounds = Bounds::new(Vec2::new(10.0, 10.0), Vec2::ZERO);
        assert!(bounds.contains(Vec2::new(10.0, 0.0)));
        assert!(!bounds.contains(Vec2::new(10.1, 0.0)));
        assert!(bounds.expanded(1.0).contains(Vec2::new(10.5, -0.5)));
    }
}
