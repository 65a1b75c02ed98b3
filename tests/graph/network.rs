use std::collections::HashMap;
use std::sync::LazyLock;

use geo::{BoundingRect, Distance, HaversineClosestPoint};
use trajmatch::{Coordinate, Length, RoadNetwork};

/// One way main road heading north with a parallel side road on the west and a branch on the east.
pub static LCSS_NETWORK: LazyLock<NetworkGraph> = LazyLock::new(|| {
    let mut builder = NetworkBuilder::default();
    builder.add_road(MAIN_ROAD, 0.0, 11);
    builder.add_road(SIDE_ROAD, -0.01, 3);
    builder.add_road(BRANCH_ROAD, 0.01, 5);
    builder.build()
});

/// Vertices along the first points of a trajectory recorded in Fortaleza.
pub static FORTALEZA_NETWORK: LazyLock<NetworkGraph> = LazyLock::new(|| {
    let mut builder = NetworkBuilder::default();
    builder
        .add_vertex(VertexId(1), -38.678747, -3.779240)
        .add_vertex(VertexId(2), -38.678440, -3.778692)
        .add_vertex(VertexId(3), -38.678071, -3.778191)
        .add_vertex(VertexId(4), -38.675917, -3.779200)
        .add_edge_with_length(VertexId(1), VertexId(2), 70.121)
        .add_edge_with_length(VertexId(2), VertexId(3), 69.14)
        .add_edge_with_length(VertexId(3), VertexId(4), 254.009);
    builder.build()
});

pub const MAIN_ROAD: i64 = 0;
pub const SIDE_ROAD: i64 = 100;
pub const BRANCH_ROAD: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub i64);

/// Directed edge `k` of a road built by [`NetworkBuilder::add_road`].
pub const fn road_edge(road: i64, k: i64) -> (VertexId, VertexId) {
    (VertexId(road + k), VertexId(road + k + 1))
}

/// Coordinate about 11 meters east of the middle of the edge `k` of a road.
pub fn next_to_road_edge(road: i64, k: i64) -> Coordinate {
    let lon = match road {
        SIDE_ROAD => -0.01,
        BRANCH_ROAD => 0.01,
        _ => 0.0,
    };

    Coordinate {
        lon: lon + 0.0001,
        lat: k as f64 * 0.001 + 0.0005,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct EdgeProperties {
    length: Length,
    geometry: geo::LineString,
}

#[derive(Debug, Default)]
pub struct NetworkBuilder {
    vertices: HashMap<VertexId, Coordinate>,
    edges: Vec<(VertexId, VertexId, Option<Length>)>,
}

impl NetworkBuilder {
    pub fn add_vertex(&mut self, vertex: VertexId, lon: f64, lat: f64) -> &mut Self {
        self.vertices.insert(vertex, Coordinate { lon, lat });
        self
    }

    /// Adds an edge whose length is the Haversine length of its geometry.
    pub fn add_edge(&mut self, start: VertexId, end: VertexId) -> &mut Self {
        self.edges.push((start, end, None));
        self
    }

    pub fn add_edge_with_length(&mut self, start: VertexId, end: VertexId, meters: f64) -> &mut Self {
        self.edges
            .push((start, end, Some(Length::from_meters(meters))));
        self
    }

    /// Adds a one way road heading north along the longitude, with vertices spaced 0.001 degrees
    /// apart from the equator.
    pub fn add_road(&mut self, road: i64, lon: f64, vertex_count: i64) -> &mut Self {
        for k in 0..vertex_count {
            self.add_vertex(VertexId(road + k), lon, k as f64 * 0.001);
        }
        for k in 0..vertex_count - 1 {
            let (start, end) = road_edge(road, k);
            self.add_edge(start, end);
        }
        self
    }

    pub fn build(&self) -> NetworkGraph {
        let edge_properties: HashMap<(VertexId, VertexId), EdgeProperties> = self
            .edges
            .iter()
            .map(|&(start, end, length)| {
                let geometry = geo::LineString::from(vec![
                    geo::Point::from(self.vertices[&start]),
                    geo::Point::from(self.vertices[&end]),
                ]);

                let length = length.unwrap_or_else(|| haversine_length(&geometry));
                ((start, end), EdgeProperties { length, geometry })
            })
            .collect();

        let geospatial_nodes = self
            .vertices
            .iter()
            .map(|(&vertex, &location)| GeospatialNode { vertex, location })
            .collect();

        let geospatial_edges = edge_properties
            .iter()
            .map(|(&edge, properties)| GeospatialEdge {
                edge,
                geometry: properties.geometry.clone(),
            })
            .collect();

        NetworkGraph {
            vertices: self.vertices.clone(),
            edge_properties,
            geospatial_nodes: rstar::RTree::bulk_load(geospatial_nodes),
            geospatial_edges: rstar::RTree::bulk_load(geospatial_edges),
        }
    }
}

fn haversine_length(geometry: &geo::LineString) -> Length {
    geometry
        .lines()
        .map(|line| {
            let meters = geo::Haversine.distance(line.start_point(), line.end_point());
            Length::from_meters(meters)
        })
        .sum()
}

pub struct NetworkGraph {
    vertices: HashMap<VertexId, Coordinate>,
    edge_properties: HashMap<(VertexId, VertexId), EdgeProperties>,
    geospatial_nodes: rstar::RTree<GeospatialNode>,
    geospatial_edges: rstar::RTree<GeospatialEdge>,
}

#[derive(Debug)]
struct GeospatialNode {
    vertex: VertexId,
    location: Coordinate,
}

impl rstar::RTreeObject for GeospatialNode {
    type Envelope = rstar::AABB<geo::Point>;
    fn envelope(&self) -> Self::Envelope {
        rstar::AABB::from_point(geo::Point::from(self.location))
    }
}

impl rstar::PointDistance for GeospatialNode {
    fn distance_2(&self, point: &geo::Point) -> f64 {
        let location = geo::Point::from(self.location);
        geo::Haversine.distance(location, *point).powf(2.0)
    }
}

#[derive(Debug)]
struct GeospatialEdge {
    edge: (VertexId, VertexId),
    geometry: geo::LineString,
}

impl rstar::RTreeObject for GeospatialEdge {
    type Envelope = rstar::AABB<geo::Point>;

    fn envelope(&self) -> Self::Envelope {
        let bbox = self.geometry.bounding_rect().unwrap();
        rstar::AABB::from_corners(
            geo::Point::new(bbox.min().x, bbox.min().y),
            geo::Point::new(bbox.max().x, bbox.max().y),
        )
    }
}

impl rstar::PointDistance for GeospatialEdge {
    fn distance_2(&self, point: &geo::Point) -> f64 {
        match self.geometry.haversine_closest_point(point) {
            geo::Closest::SinglePoint(p) | geo::Closest::Intersection(p) => {
                geo::Haversine.distance(p, *point).powf(2.0)
            }
            geo::Closest::Indeterminate => f64::INFINITY,
        }
    }
}

impl RoadNetwork for NetworkGraph {
    type VertexId = VertexId;

    fn get_vertex_coordinate(&self, vertex: Self::VertexId) -> Option<Coordinate> {
        self.vertices.get(&vertex).copied()
    }

    fn nearest_vertex(&self, coordinate: Coordinate) -> Option<Self::VertexId> {
        self.geospatial_nodes
            .nearest_neighbor(&geo::Point::from(coordinate))
            .map(|node| node.vertex)
    }

    fn nearest_edge(&self, coordinate: Coordinate) -> Option<(Self::VertexId, Self::VertexId)> {
        self.geospatial_edges
            .nearest_neighbor(&geo::Point::from(coordinate))
            .map(|edge| edge.edge)
    }

    fn get_edge_length(&self, start: Self::VertexId, end: Self::VertexId) -> Option<Length> {
        self.edge_properties
            .get(&(start, end))
            .map(|EdgeProperties { length, .. }| *length)
    }

    fn get_edge_geometry(&self, start: Self::VertexId, end: Self::VertexId) -> Option<geo::LineString> {
        self.edge_properties
            .get(&(start, end))
            .map(|EdgeProperties { geometry, .. }| geometry.clone())
    }
}

#[test]
fn network_graph_nearest_features() {
    let graph = &LCSS_NETWORK;

    let coordinate = next_to_road_edge(MAIN_ROAD, 4);
    assert_eq!(graph.nearest_edge(coordinate), Some(road_edge(MAIN_ROAD, 4)));

    let coordinate = Coordinate { lon: 0.0001, lat: 0.0041 };
    assert_eq!(graph.nearest_vertex(coordinate), Some(VertexId(MAIN_ROAD + 4)));

    let coordinate = next_to_road_edge(SIDE_ROAD, 1);
    assert_eq!(graph.nearest_edge(coordinate), Some(road_edge(SIDE_ROAD, 1)));

    let coordinate = next_to_road_edge(BRANCH_ROAD, 3);
    assert_eq!(graph.nearest_edge(coordinate), Some(road_edge(BRANCH_ROAD, 3)));

    // 0.001 degrees of latitude at the equator
    let length = graph.get_edge_length(VertexId(0), VertexId(1)).unwrap();
    assert!((length.meters() - 111.19).abs() < 0.1, "{length:?}");

    assert_eq!(graph.get_edge_length(VertexId(1), VertexId(0)), None);
    assert_eq!(graph.get_edge_geometry(VertexId(0), VertexId(2)), None);
    assert_eq!(
        FORTALEZA_NETWORK.get_edge_length(VertexId(3), VertexId(4)),
        Some(Length::from_meters(254.009))
    );
}
