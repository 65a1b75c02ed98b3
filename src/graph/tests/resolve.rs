use std::fmt;

use test_log::test;

use super::TestNetwork;
use crate::graph::{GraphProvider, GraphSource, ResolvedGraph, resolve_graph};
use crate::{
    BoundingBox, ConfigError, Coordinate, PointId, ResolveError, Trajectories, TrajectoryId,
    TrajectoryPoint,
};

#[derive(Debug, PartialEq)]
struct UnknownPlace;

impl fmt::Display for UnknownPlace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown place")
    }
}

impl std::error::Error for UnknownPlace {}

struct Provider;

impl GraphProvider for Provider {
    type Graph = TestNetwork;
    type Error = UnknownPlace;

    fn graph_from_bbox(&self, _bbox: BoundingBox) -> Result<Self::Graph, Self::Error> {
        Ok(TestNetwork::straight_road(3))
    }

    fn graph_from_place(&self, place: &str) -> Result<Self::Graph, Self::Error> {
        if place == "Fortaleza" {
            Ok(TestNetwork::straight_road(5))
        } else {
            Err(UnknownPlace)
        }
    }
}

fn trajectories() -> Trajectories {
    Trajectories::from_points([TrajectoryPoint {
        id: PointId(1),
        trajectory_id: TrajectoryId(1),
        coordinate: Coordinate { lon: 0.0, lat: 0.0 },
        time: None,
    }])
}

#[test]
fn graph_source_from_options() {
    let graph = TestNetwork::straight_road(2);
    let bbox = BoundingBox::default();

    assert_eq!(
        GraphSource::<TestNetwork>::from_options(None, None, None),
        Ok(GraphSource::TrajectoryBounds)
    );
    assert_eq!(
        GraphSource::<TestNetwork>::from_options(Some(bbox), None, None),
        Ok(GraphSource::BoundingBox(bbox))
    );
    assert_eq!(
        GraphSource::from_options(None, None, Some(&graph)),
        Ok(GraphSource::Graph(&graph))
    );
    assert_eq!(
        GraphSource::from_options(Some(bbox), Some("Fortaleza"), Some(&graph)),
        Err(ConfigError::AmbiguousGraphSource)
    );
}

#[test]
fn resolve_graph_from_sources() {
    let provider = Provider;
    let graph = TestNetwork::straight_road(2);

    let resolved = resolve_graph(&provider, GraphSource::Graph(&graph), &trajectories());
    assert!(matches!(resolved, Ok(ResolvedGraph::Borrowed(_))));

    let resolved = resolve_graph(&provider, GraphSource::TrajectoryBounds, &trajectories());
    assert_eq!(resolved.unwrap().vertex_count(), 3);

    let resolved = resolve_graph(&provider, GraphSource::Place("Fortaleza"), &trajectories());
    assert_eq!(resolved.unwrap().vertex_count(), 5);

    let resolved = resolve_graph(&provider, GraphSource::Place("Atlantis"), &trajectories());
    assert_eq!(resolved.unwrap_err(), ResolveError::Provider(UnknownPlace));
}

#[test]
fn resolve_graph_without_bounds() {
    let resolved = resolve_graph(
        &Provider,
        GraphSource::TrajectoryBounds,
        &Trajectories::default(),
    );

    assert_eq!(
        resolved.unwrap_err(),
        ResolveError::Config(ConfigError::GraphNotResolved)
    );
}
