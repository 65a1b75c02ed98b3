//! Similarity of two trajectories as the longest common run of network edges (LCSS).
//!
//! Both trajectories are matched to the edges of the network. Common runs of edges are candidate
//! alignments, from the longest to the shortest. A run is accepted only if the times of the two
//! trajectories along the run never differ by more than the tolerance.

mod blocks;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, trace};

pub use blocks::{MatchingBlock, matching_blocks};

use crate::{ConfigError, MatchError, PointId, RoadNetwork, TrajectoryPoint, match_edges};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentConfig {
    /// Maximum time difference between the aligned points of the two trajectories.
    pub tolerance: TimeDelta,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            tolerance: TimeDelta::seconds(60),
        }
    }
}

impl AlignmentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance < TimeDelta::zero() {
            Err(ConfigError::InvalidTolerance(self.tolerance))
        } else {
            Ok(())
        }
    }
}

/// Two points, one for each trajectory, matched to the same edge at the same offset of a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedPair<VertexId> {
    pub id_a: PointId,
    pub id_b: PointId,
    pub time_a: DateTime<Utc>,
    pub time_b: DateTime<Utc>,
    /// Absolute time difference of the two points.
    pub difference: TimeDelta,
    pub within_tolerance: bool,
    pub edge: (VertexId, VertexId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alignment<VertexId> {
    pub block: MatchingBlock,
    /// One pair for each offset of the block.
    pub pairs: Vec<AlignedPair<VertexId>>,
}

impl<VertexId> Alignment<VertexId> {
    pub fn max_difference(&self) -> TimeDelta {
        self.pairs
            .iter()
            .map(|pair| pair.difference)
            .max()
            .unwrap_or_default()
    }
}

/// Finds the longest run of edges shared by the two trajectories whose times are within the
/// tolerance. Runs of the same length are tried in order of their start in `a`.
///
/// Returns None if no run is accepted. Every point must have a time.
pub fn align<G: RoadNetwork>(
    config: &AlignmentConfig,
    graph: &G,
    a: &[TrajectoryPoint],
    b: &[TrajectoryPoint],
) -> Result<Option<Alignment<G::VertexId>>, MatchError> {
    config.validate()?;
    info!(
        "Aligning trajectories of {} and {} points with {config:?}",
        a.len(),
        b.len()
    );

    let times_a = point_times(a)?;
    let times_b = point_times(b)?;

    let edges_a = matched_edges(graph, a)?;
    let edges_b = matched_edges(graph, b)?;

    let mut blocks = matching_blocks(&edges_a, &edges_b);
    debug!("Found {} common blocks", blocks.len());
    blocks.sort_by(|x, y| y.length.cmp(&x.length));

    for block in blocks {
        let pairs: Vec<_> = (0..block.length)
            .map(|k| {
                let (i, j) = (block.start_a + k, block.start_b + k);
                let difference = (times_a[i] - times_b[j]).abs();

                AlignedPair {
                    id_a: a[i].id,
                    id_b: b[j].id,
                    time_a: times_a[i],
                    time_b: times_b[j],
                    difference,
                    within_tolerance: difference <= config.tolerance,
                    edge: edges_a[i],
                }
            })
            .collect();

        if pairs.iter().all(|pair| pair.within_tolerance) {
            debug!("Accepted {block:?}");
            return Ok(Some(Alignment { block, pairs }));
        }
        trace!("Rejected {block:?}");
    }

    debug!("No block within tolerance");
    Ok(None)
}

fn point_times(points: &[TrajectoryPoint]) -> Result<Vec<DateTime<Utc>>, MatchError> {
    points
        .iter()
        .map(|p| p.time.ok_or(MatchError::MissingTime(p.id)))
        .collect()
}

fn matched_edges<G: RoadNetwork>(
    graph: &G,
    points: &[TrajectoryPoint],
) -> Result<Vec<(G::VertexId, G::VertexId)>, MatchError> {
    match_edges(graph, points)?
        .iter()
        .map(|snapped| snapped.edge().ok_or(MatchError::CandidateNotFound(snapped.id())))
        .collect()
}
