use std::ops::Deref;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;

use crate::{BoundingBox, Coordinate, PointId, TrajectoryId};

/// A single GPS fix.
/// Points without time are usually points that were inserted by snapping a trajectory to the
/// network, their time is reconstructed by the interpolator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub id: PointId,
    pub trajectory_id: TrajectoryId,
    pub coordinate: Coordinate,
    pub time: Option<DateTime<Utc>>,
}

impl TrajectoryPoint {
    pub const fn has_time(&self) -> bool {
        self.time.is_some()
    }
}

/// Ordered sequence of points that belong to the same trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub id: TrajectoryId,
    pub points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_coordinates(self.points.iter().map(|p| p.coordinate))
    }
}

/// In-memory collection of trajectories.
/// Trajectories are kept in the order of first appearance of their ID and each trajectory keeps
/// the order of its points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectories(Vec<Trajectory>);

impl Trajectories {
    /// Groups a flat sequence of points by their trajectory ID.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = TrajectoryPoint>,
    {
        let mut positions: FxHashMap<TrajectoryId, usize> = FxHashMap::default();
        let mut trajectories: Vec<Trajectory> = vec![];

        for point in points {
            let position = *positions.entry(point.trajectory_id).or_insert_with(|| {
                trajectories.push(Trajectory {
                    id: point.trajectory_id,
                    points: vec![],
                });
                trajectories.len() - 1
            });

            trajectories[position].points.push(point);
        }

        Self(trajectories)
    }

    pub fn get(&self, id: TrajectoryId) -> Option<&Trajectory> {
        self.0.iter().find(|trajectory| trajectory.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = TrajectoryId> {
        self.0.iter().map(|trajectory| trajectory.id)
    }

    pub fn point_count(&self) -> usize {
        self.0.iter().map(|trajectory| trajectory.points.len()).sum()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let coordinates = self.0.iter().flat_map(|t| &t.points).map(|p| p.coordinate);
        BoundingBox::from_coordinates(coordinates)
    }

    pub fn into_points(self) -> impl Iterator<Item = TrajectoryPoint> {
        self.0.into_iter().flat_map(|trajectory| trajectory.points)
    }
}

impl From<Vec<Trajectory>> for Trajectories {
    fn from(trajectories: Vec<Trajectory>) -> Self {
        Self(trajectories)
    }
}

impl Deref for Trajectories {
    type Target = Vec<Trajectory>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for Trajectories {
    type Item = Trajectory;
    type IntoIter = std::vec::IntoIter<Trajectory>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
