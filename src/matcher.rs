//! Snaps raw GPS fixes to the road network.
//!
//! Two mutually exclusive strategies are available:
//! - node matching: every point is moved onto its nearest network vertex;
//! - edge matching: every point is paired with its nearest directed edge and its geometry.
//!
//! Both strategies keep the input order and never drop points.

use geo::LineString;
use tracing::{debug, info, trace};

use crate::{
    MatchError, PointId, RoadNetwork, Trajectories, Trajectory, TrajectoryId, TrajectoryPoint,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Snap<VertexId> {
    /// The point was moved onto the vertex, geometry is the vertex location.
    Node {
        vertex: VertexId,
        geometry: geo::Point,
    },
    /// The point was paired with the directed edge (start vertex, end vertex).
    /// The geometry is None if the edge cannot be found in the graph.
    Edge {
        edge: (VertexId, VertexId),
        geometry: Option<LineString>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnappedPoint<VertexId> {
    pub point: TrajectoryPoint,
    pub snap: Snap<VertexId>,
}

impl<VertexId: Copy> SnappedPoint<VertexId> {
    pub const fn id(&self) -> PointId {
        self.point.id
    }

    pub fn vertex(&self) -> Option<VertexId> {
        match self.snap {
            Snap::Node { vertex, .. } => Some(vertex),
            Snap::Edge { .. } => None,
        }
    }

    pub fn edge(&self) -> Option<(VertexId, VertexId)> {
        match self.snap {
            Snap::Edge { edge, .. } => Some(edge),
            Snap::Node { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnappedTrajectory<VertexId> {
    pub id: TrajectoryId,
    pub points: Vec<SnappedPoint<VertexId>>,
}

/// Matches each point to the nearest vertex of the graph.
/// The coordinate of every returned point is replaced by the coordinate of its vertex, the input
/// points are left untouched.
pub fn match_nodes<G: RoadNetwork>(
    graph: &G,
    points: &[TrajectoryPoint],
) -> Result<Vec<SnappedPoint<G::VertexId>>, MatchError> {
    debug!("Matching {} points to nodes", points.len());

    let vertices = graph.nearest_vertices(points.iter().map(|p| p.coordinate));
    debug_assert_eq!(vertices.len(), points.len());

    points
        .iter()
        .zip(vertices)
        .map(|(&point, vertex)| {
            let vertex = vertex.ok_or(MatchError::CandidateNotFound(point.id))?;
            let coordinate = graph
                .get_vertex_coordinate(vertex)
                .ok_or(MatchError::CandidateNotFound(point.id))?;
            trace!("Matched {:?} to {vertex:?}", point.id);

            Ok(SnappedPoint {
                point: TrajectoryPoint {
                    coordinate,
                    ..point
                },
                snap: Snap::Node {
                    vertex,
                    geometry: coordinate.into(),
                },
            })
        })
        .collect()
}

/// Matches each point to the nearest directed edge of the graph.
/// The coordinates of the points are not modified.
pub fn match_edges<G: RoadNetwork>(
    graph: &G,
    points: &[TrajectoryPoint],
) -> Result<Vec<SnappedPoint<G::VertexId>>, MatchError> {
    debug!("Matching {} points to edges", points.len());

    let edges = graph.nearest_edges(points.iter().map(|p| p.coordinate));
    debug_assert_eq!(edges.len(), points.len());

    points
        .iter()
        .zip(edges)
        .map(|(&point, edge)| {
            let (start, end) = edge.ok_or(MatchError::CandidateNotFound(point.id))?;

            let geometry = graph.get_edge_geometry(start, end);
            if geometry.is_none() {
                debug!("Edge {:?} has no geometry", (start, end));
            }
            trace!("Matched {:?} to {:?}", point.id, (start, end));

            Ok(SnappedPoint {
                point,
                snap: Snap::Edge {
                    edge: (start, end),
                    geometry,
                },
            })
        })
        .collect()
}

/// Matches every trajectory to the nearest vertices of the graph.
pub fn match_trajectories_nodes<G: RoadNetwork>(
    graph: &G,
    trajectories: &Trajectories,
) -> Result<Vec<SnappedTrajectory<G::VertexId>>, MatchError> {
    info!("Matching {} trajectories to nodes", trajectories.len());
    match_trajectories(trajectories, |points| match_nodes(graph, points))
}

/// Matches every trajectory to the nearest edges of the graph.
pub fn match_trajectories_edges<G: RoadNetwork>(
    graph: &G,
    trajectories: &Trajectories,
) -> Result<Vec<SnappedTrajectory<G::VertexId>>, MatchError> {
    info!("Matching {} trajectories to edges", trajectories.len());
    match_trajectories(trajectories, |points| match_edges(graph, points))
}

fn match_trajectories<VertexId, F>(
    trajectories: &Trajectories,
    matcher: F,
) -> Result<Vec<SnappedTrajectory<VertexId>>, MatchError>
where
    F: Fn(&[TrajectoryPoint]) -> Result<Vec<SnappedPoint<VertexId>>, MatchError>,
{
    trajectories
        .iter()
        .map(|Trajectory { id, points }| {
            Ok(SnappedTrajectory {
                id: *id,
                points: matcher(points)?,
            })
        })
        .collect()
}
