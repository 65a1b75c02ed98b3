use tracing::{debug, trace};

use crate::{
    Length, MatchError, PointId, RoadNetwork, SnappedPoint, SnappedTrajectory, TrajectoryId,
    TrajectoryPoint,
};

/// Trajectory point enriched with its along-route distance and its derived time features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfiledPoint {
    pub point: TrajectoryPoint,
    /// Length of the network edge entered when reaching this point (0 for the first point).
    pub edge_distance: Length,
    /// Distance along the network from the first point of the trajectory to this point.
    pub cum_distance: Length,
    /// Seconds until the next point, only available for points whose time was interpolated.
    pub delta_time: Option<f64>,
    /// Speed over the edge entered when reaching this point, only available for points whose
    /// time was interpolated.
    pub speed: Option<f64>,
}

impl ProfiledPoint {
    pub const fn id(&self) -> PointId {
        self.point.id
    }

    pub const fn has_time(&self) -> bool {
        self.point.has_time()
    }
}

/// Along-route distance profile of a single trajectory.
/// The cumulative distance is non-decreasing in point order.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceProfile {
    pub trajectory_id: TrajectoryId,
    pub points: Vec<ProfiledPoint>,
}

impl DistanceProfile {
    pub fn edge_distances(&self) -> impl Iterator<Item = Length> {
        self.points.iter().map(|p| p.edge_distance)
    }

    pub fn cum_distances(&self) -> impl Iterator<Item = Length> {
        self.points.iter().map(|p| p.cum_distance)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Computes the length of each step of a node matched trajectory and the cumulative distance
/// from its first point.
///
/// A step between two consecutive matched nodes has the length of the directed edge connecting
/// them. If the nodes are not adjacent (or are the same node) the step has length 0, no path
/// between them is reconstructed.
pub fn generate_distances<G: RoadNetwork>(
    graph: &G,
    trajectory: &SnappedTrajectory<G::VertexId>,
) -> Result<DistanceProfile, MatchError> {
    debug!(
        "Generating distances of {:?} with {} points",
        trajectory.id,
        trajectory.points.len()
    );

    let mut points = Vec::with_capacity(trajectory.points.len());
    let mut previous_vertex: Option<G::VertexId> = None;
    let mut cum_distance = Length::ZERO;

    for snapped in &trajectory.points {
        let vertex = node_of(snapped)?;

        let edge_distance = previous_vertex
            .and_then(|previous| graph.get_edge_length(previous, vertex))
            .unwrap_or(Length::ZERO);
        trace!("Step {previous_vertex:?} -> {vertex:?} = {edge_distance:?}");

        cum_distance += edge_distance;
        previous_vertex = Some(vertex);

        points.push(ProfiledPoint {
            point: snapped.point,
            edge_distance,
            cum_distance,
            delta_time: None,
            speed: None,
        });
    }

    debug_assert!(points.is_sorted_by_key(|p| p.cum_distance));

    Ok(DistanceProfile {
        trajectory_id: trajectory.id,
        points,
    })
}

/// Computes the distance profile of every trajectory, distances never accumulate across
/// trajectories.
pub fn generate_all_distances<G: RoadNetwork>(
    graph: &G,
    trajectories: &[SnappedTrajectory<G::VertexId>],
) -> Result<Vec<DistanceProfile>, MatchError> {
    trajectories
        .iter()
        .map(|trajectory| generate_distances(graph, trajectory))
        .collect()
}

fn node_of<VertexId: Copy>(snapped: &SnappedPoint<VertexId>) -> Result<VertexId, MatchError> {
    snapped
        .vertex()
        .ok_or(MatchError::NotNodeMatched(snapped.id()))
}
