#![doc = include_str!("../README.md")]

mod error;
mod graph;
mod interpolate;
mod matcher;
mod model;
mod profile;
mod progress;
mod repair;
mod similarity;
mod trajectory;
mod validation;

pub use error::{
    CheckError, ConfigError, InterpolationError, MatchError, ResolveError, TrajectoryError,
    ValidationError,
};
pub use graph::{GraphProvider, GraphSource, ResolvedGraph, RoadNetwork, resolve_graph};
pub use interpolate::{
    InterpolationReport, LinearInterpolant, interpolate, interpolate_trajectory,
};
pub use matcher::{
    Snap, SnappedPoint, SnappedTrajectory, match_edges, match_nodes, match_trajectories_edges,
    match_trajectories_nodes,
};
pub use model::{BoundingBox, Coordinate, Length, PointId, TrajectoryId};
pub use profile::{DistanceProfile, ProfiledPoint, generate_all_distances, generate_distances};
pub use progress::{NoopObserver, ProgressObserver, ProgressTracker, Stage};
pub use repair::{
    RepairConfig, RepairMask, RepairReport, RepairedTrajectory, fix_all, fix_trajectory,
};
pub use similarity::{
    AlignedPair, Alignment, AlignmentConfig, MatchingBlock, align, matching_blocks,
};
pub use trajectory::{Trajectories, Trajectory, TrajectoryPoint};
pub use validation::{ValidationBounds, check_time_dist, check_trajectory_time_dist};
