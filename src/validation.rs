use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use crate::{
    CheckError, ConfigError, Length, ProfiledPoint, RepairMask, RepairedTrajectory,
    TrajectoryError, ValidationError,
};

/// Physical bounds that consecutive points of a trajectory must respect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationBounds {
    /// Maximum along-route distance between two adjacent points.
    pub max_dist_between_adj_points: Length,
    /// Maximum time interval between two adjacent points.
    pub max_time_between_adj_points: TimeDelta,
    /// Maximum speed between two adjacent points, in distance units per second.
    pub max_speed: f64,
}

impl Default for ValidationBounds {
    fn default() -> Self {
        Self {
            max_dist_between_adj_points: Length::from_meters(5000.0),
            max_time_between_adj_points: TimeDelta::seconds(900),
            max_speed: 30.0,
        }
    }
}

impl ValidationBounds {
    /// Returns an error if any of the bounds is not a finite positive value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [
            (
                "max_dist_between_adj_points",
                self.max_dist_between_adj_points.meters(),
            ),
            (
                "max_time_between_adj_points",
                seconds(self.max_time_between_adj_points),
            ),
            ("max_speed", self.max_speed),
        ];

        for (name, value) in bounds {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidBound(name, value));
            }
        }

        Ok(())
    }
}

pub(crate) fn seconds(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

/// Verifies that the points of every trajectory are in the correct order after map matching,
/// considering time and distance.
///
/// For every trajectory, among the points that are not marked as deleted and have time:
/// - times must be strictly ascending;
/// - distances must be ascending (steps of length 0 are allowed, the profile builder emits them
///   for repeated or non adjacent nodes);
/// - each pair of adjacent points must respect the [`ValidationBounds`].
///
/// The bounds are validated before any trajectory is checked.
pub fn check_time_dist(
    trajectories: &[RepairedTrajectory],
    bounds: &ValidationBounds,
) -> Result<(), CheckError> {
    bounds.validate()?;

    info!(
        "Checking ascending distance and time of {} trajectories",
        trajectories.len()
    );

    for RepairedTrajectory { profile, mask } in trajectories {
        check_trajectory_time_dist(&profile.points, mask.as_ref(), bounds)
            .map_err(|error| TrajectoryError::new(profile.trajectory_id, error))?;
    }

    Ok(())
}

/// Verifies a single trajectory, see [`check_time_dist`].
/// The bounds are expected to be valid.
pub fn check_trajectory_time_dist(
    points: &[ProfiledPoint],
    mask: Option<&RepairMask>,
    bounds: &ValidationBounds,
) -> Result<(), ValidationError> {
    if let Some(mask) = mask {
        mask.ensure_len(points.len())?;
    }

    let timed: Vec<(&ProfiledPoint, DateTime<Utc>)> = points
        .iter()
        .enumerate()
        .filter(|&(i, _)| !mask.is_some_and(|mask| mask.is_deleted(i)))
        .filter_map(|(_, p)| Some((p, p.point.time?)))
        .collect();

    for window in timed.windows(2) {
        let [(p1, t1), (p2, t2)] = [window[0], window[1]];

        if p2.cum_distance < p1.cum_distance {
            debug!("Distance of {:?} is lower than {:?}", p2.id(), p1.id());
            return Err(ValidationError::DistanceNotAscending(p2.id()));
        }

        if t2 <= t1 {
            debug!("Time of {:?} is not greater than {:?}", p2.id(), p1.id());
            return Err(ValidationError::TimeNotAscending(p2.id()));
        }
    }

    validate_adjacent_points(timed, bounds)
}

/// Verifies that each pair of adjacent points respects the physical bounds.
/// The points are expected to be sorted by distance.
pub(crate) fn validate_adjacent_points<'a, I>(
    points: I,
    bounds: &ValidationBounds,
) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = (&'a ProfiledPoint, DateTime<Utc>)>,
{
    let points: Vec<_> = points.into_iter().collect();

    for window in points.windows(2) {
        let [(p1, t1), (p2, t2)] = [window[0], window[1]];

        let delta_time = t2 - t1;
        if delta_time > bounds.max_time_between_adj_points {
            return Err(ValidationError::MaxTimeExceeded {
                max: bounds.max_time_between_adj_points,
                found: delta_time,
            });
        }

        let delta_dist = p2.cum_distance - p1.cum_distance;
        if delta_dist > bounds.max_dist_between_adj_points {
            return Err(ValidationError::MaxDistanceExceeded {
                max: bounds.max_dist_between_adj_points,
                found: delta_dist,
            });
        }

        if delta_time <= TimeDelta::zero() {
            return Err(ValidationError::NonPositiveDeltaTime(p2.id()));
        }

        let speed = delta_dist.meters() / seconds(delta_time);
        if speed > bounds.max_speed {
            return Err(ValidationError::MaxSpeedExceeded {
                max: bounds.max_speed,
                found: speed,
            });
        }
    }

    Ok(())
}
