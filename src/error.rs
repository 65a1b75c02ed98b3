use chrono::TimeDelta;
use thiserror::Error;

use crate::{Length, PointId, TrajectoryId};

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum ConfigError {
    #[error("Graph cannot be resolved: no bounding box, place or graph available")]
    GraphNotResolved,
    #[error("Graph source is ambiguous: supply exactly one of bounding box, place or graph")]
    AmbiguousGraphSource,
    #[error("Time tolerance must be >= 0: {0:?}")]
    InvalidTolerance(TimeDelta),
    #[error("Bound {0} must be finite and > 0: {1}")]
    InvalidBound(&'static str, f64),
}

#[derive(Error, Debug, PartialEq, Clone)]
pub enum ResolveError<ProviderError> {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Graph provider failed: {0}")]
    Provider(ProviderError),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum MatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Cannot find a network element near point {0:?}")]
    CandidateNotFound(PointId),
    #[error("Point {0:?} is not matched to a network node")]
    NotNodeMatched(PointId),
    #[error("Point {0:?} has no time")]
    MissingTime(PointId),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum ValidationError {
    #[error("Distance feature is not in ascending order at point {0:?}")]
    DistanceNotAscending(PointId),
    #[error("Time feature is not in ascending order at point {0:?}")]
    TimeNotAscending(PointId),
    #[error("Distance between adjacent points must be <= {max:?}: {found:?}")]
    MaxDistanceExceeded { max: Length, found: Length },
    #[error("Time between adjacent points must be <= {max:?}: {found:?}")]
    MaxTimeExceeded { max: TimeDelta, found: TimeDelta },
    #[error("Time between adjacent points must be > 0 at point {0:?}")]
    NonPositiveDeltaTime(PointId),
    #[error("Speed between adjacent points must be <= {max}: {found}")]
    MaxSpeedExceeded { max: f64, found: f64 },
    #[error("Distances of points without time are not in ascending order at point {0:?}")]
    InterpolationDistanceNotAscending(PointId),
    #[error("Interpolated times are not in ascending order at point {0:?}")]
    InterpolatedTimeNotAscending(PointId),
    #[error("Interpolation results in a non finite time at point {0:?}")]
    InterpolatedTimeNotFinite(PointId),
    #[error("Repair mask has {found} flags but the trajectory has {expected} points")]
    MaskLengthMismatch { expected: usize, found: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum InterpolationError {
    #[error("Trajectory has {0} points with time, at least 2 are required")]
    NotEnoughPoints(usize),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Validation error raised for a specific trajectory.
#[derive(Error, Debug, PartialEq, Clone, Copy)]
#[error("Trajectory {trajectory_id:?} is not valid: {error}")]
pub struct TrajectoryError {
    pub trajectory_id: TrajectoryId,
    #[source]
    pub error: ValidationError,
}

impl TrajectoryError {
    pub const fn new(trajectory_id: TrajectoryId, error: ValidationError) -> Self {
        Self {
            trajectory_id,
            error,
        }
    }
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
}
