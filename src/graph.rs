use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Deref;

use geo::LineString;
use tracing::debug;

use crate::{BoundingBox, ConfigError, Coordinate, Length, ResolveError, Trajectories};

/// Directed road network.
/// Exposes the behavior of a Geospatial Index and of a Road Network Graph.
/// Should be implemented by the graph that represents the map the trajectories run on.
pub trait RoadNetwork {
    /// Uniquely identify a vertex (node) that belongs to the graph.
    type VertexId: Debug + Copy + Ord + Hash;

    /// Gets the vertex coordinate.
    fn get_vertex_coordinate(&self, vertex: Self::VertexId) -> Option<Coordinate>;

    /// Gets the vertex that is closest to the coordinate.
    /// Returns None only if the graph has no vertices.
    fn nearest_vertex(&self, coordinate: Coordinate) -> Option<Self::VertexId>;

    /// Gets the directed edge, as its start and end vertices, whose geometry is closest to the
    /// coordinate. Returns None only if the graph has no edges.
    fn nearest_edge(&self, coordinate: Coordinate) -> Option<(Self::VertexId, Self::VertexId)>;

    /// Gets the total length of the directed edge that goes from start to end.
    /// Returns None if the two vertices are not adjacent.
    fn get_edge_length(&self, start: Self::VertexId, end: Self::VertexId) -> Option<Length>;

    /// Gets the line geometry of the directed edge that goes from start to end.
    /// Returns None if the two vertices are not adjacent.
    fn get_edge_geometry(&self, start: Self::VertexId, end: Self::VertexId) -> Option<LineString>;

    /// Gets the nearest vertex of each coordinate, in the same order.
    fn nearest_vertices<I>(&self, coordinates: I) -> Vec<Option<Self::VertexId>>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        coordinates
            .into_iter()
            .map(|coordinate| self.nearest_vertex(coordinate))
            .collect()
    }

    /// Gets the nearest edge of each coordinate, in the same order.
    fn nearest_edges<I>(&self, coordinates: I) -> Vec<Option<(Self::VertexId, Self::VertexId)>>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        coordinates
            .into_iter()
            .map(|coordinate| self.nearest_edge(coordinate))
            .collect()
    }
}

/// Builds road networks on demand, for instance by downloading or loading a map extract.
pub trait GraphProvider {
    type Graph: RoadNetwork;
    type Error: std::error::Error;

    /// Gets the network covering the bounding box.
    fn graph_from_bbox(&self, bbox: BoundingBox) -> Result<Self::Graph, Self::Error>;

    /// Gets the network covering the boundary of a named place (geocoded by the provider).
    fn graph_from_place(&self, place: &str) -> Result<Self::Graph, Self::Error>;
}

/// Where the network used to match the trajectories comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphSource<'a, G> {
    /// Network covering an explicit bounding box.
    BoundingBox(BoundingBox),
    /// Network covering the bounding box of the trajectories that will be matched.
    TrajectoryBounds,
    /// Network covering a named place.
    Place(&'a str),
    /// Network already built by the caller.
    Graph(&'a G),
}

impl<'a, G> GraphSource<'a, G> {
    /// Selects the graph source out of the optional ones.
    /// When none is given the bounding box is derived from the trajectories.
    pub fn from_options(
        bbox: Option<BoundingBox>,
        place: Option<&'a str>,
        graph: Option<&'a G>,
    ) -> Result<Self, ConfigError> {
        match (bbox, place, graph) {
            (None, None, None) => Ok(Self::TrajectoryBounds),
            (Some(bbox), None, None) => Ok(Self::BoundingBox(bbox)),
            (None, Some(place), None) => Ok(Self::Place(place)),
            (None, None, Some(graph)) => Ok(Self::Graph(graph)),
            _ => Err(ConfigError::AmbiguousGraphSource),
        }
    }
}

/// Network that was either built by a provider or borrowed from the caller.
#[derive(Debug)]
pub enum ResolvedGraph<'a, G> {
    Owned(G),
    Borrowed(&'a G),
}

impl<G> Deref for ResolvedGraph<'_, G> {
    type Target = G;
    fn deref(&self) -> &Self::Target {
        match self {
            Self::Owned(graph) => graph,
            Self::Borrowed(graph) => *graph,
        }
    }
}

/// Resolves the network the trajectories will be matched against.
/// Fails before any matching is attempted if the network cannot be resolved.
pub fn resolve_graph<'a, P: GraphProvider>(
    provider: &P,
    source: GraphSource<'a, P::Graph>,
    trajectories: &Trajectories,
) -> Result<ResolvedGraph<'a, P::Graph>, ResolveError<P::Error>> {
    let graph = match source {
        GraphSource::Graph(graph) => return Ok(ResolvedGraph::Borrowed(graph)),
        GraphSource::BoundingBox(bbox) => provider.graph_from_bbox(bbox),
        GraphSource::TrajectoryBounds => {
            let bbox = trajectories
                .bounding_box()
                .ok_or(ConfigError::GraphNotResolved)?;
            debug!("Resolving graph from trajectories {bbox:?}");
            provider.graph_from_bbox(bbox)
        }
        GraphSource::Place(place) => {
            debug!("Resolving graph from place {place}");
            provider.graph_from_place(place)
        }
    };

    graph.map(ResolvedGraph::Owned).map_err(ResolveError::Provider)
}
