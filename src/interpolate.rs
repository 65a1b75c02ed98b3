//! Reconstructs the time of the points snapped to the network.
//!
//! The points with a GPS time define a curve mapping the along-route distance to time. The curve
//! is evaluated at the distance of every point without time. Points beyond the first or last
//! timed point are extrapolated along the nearest segment of the curve.

mod curve;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

pub use curve::LinearInterpolant;

use crate::progress::{ProgressObserver, Stage};
use crate::validation::{seconds, validate_adjacent_points};
use crate::{
    ConfigError, DistanceProfile, InterpolationError, ProfiledPoint, RepairedTrajectory,
    TrajectoryError, TrajectoryId, ValidationBounds, ValidationError,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterpolationReport {
    /// Interpolated trajectories, in the same order of the input.
    pub trajectories: Vec<RepairedTrajectory>,
    /// Trajectories excluded because they have less than 2 points with time.
    pub dropped: Vec<TrajectoryId>,
    /// Trajectories excluded because they are not valid.
    pub failed: Vec<TrajectoryError>,
    /// Number of points of all the excluded trajectories.
    pub dropped_points: usize,
}

/// Fills the time of the points without time of a single trajectory.
///
/// The points marked as deleted by the repair take no part in the interpolation and are returned
/// unchanged, together with the mask.
///
/// The points are expected to be sorted by distance, as the repair leaves them. The points with
/// time must be in ascending order of both distance and time and each pair of them must respect
/// the [`ValidationBounds`]. Points with time sharing the same distance only contribute their
/// first occurrence to the curve.
///
/// The interpolated points get the seconds to the next interpolated point (`delta_time`) and the
/// speed over their edge, the last interpolated point has neither.
pub fn interpolate_trajectory(
    trajectory: RepairedTrajectory,
    bounds: &ValidationBounds,
) -> Result<RepairedTrajectory, InterpolationError> {
    let RepairedTrajectory {
        profile: DistanceProfile {
            trajectory_id,
            mut points,
        },
        mask,
    } = trajectory;

    if let Some(mask) = &mask {
        mask.ensure_len(points.len())?;
    }
    let kept = |i: usize| !mask.as_ref().is_some_and(|mask| mask.is_deleted(i));

    let mut known: Vec<(ProfiledPoint, DateTime<Utc>)> = points
        .iter()
        .enumerate()
        .filter(|&(i, _)| kept(i))
        .filter_map(|(_, p)| Some((*p, p.point.time?)))
        .collect();

    if known.len() < 2 {
        return Err(InterpolationError::NotEnoughPoints(known.len()));
    }

    for window in known.windows(2) {
        let [(p1, t1), (p2, t2)] = [window[0], window[1]];
        if t2 < t1 {
            return Err(ValidationError::TimeNotAscending(p2.id()).into());
        }
        if p2.cum_distance < p1.cum_distance {
            return Err(ValidationError::DistanceNotAscending(p2.id()).into());
        }
    }

    known.dedup_by_key(|(p, _)| p.cum_distance);
    if known.len() < 2 {
        return Err(InterpolationError::NotEnoughPoints(known.len()));
    }

    validate_adjacent_points(known.iter().map(|(p, t)| (p, *t)), bounds)?;

    let curve = LinearInterpolant::new(
        known
            .iter()
            .map(|(p, t)| (p.cum_distance.meters(), t.timestamp_millis() as f64)),
    )
    .ok_or(ValidationError::InterpolatedTimeNotFinite(known[0].0.id()))?;

    let unknown: Vec<usize> = (0..points.len())
        .filter(|&i| kept(i) && !points[i].has_time())
        .collect();
    debug!(
        "{trajectory_id:?}: interpolating {} points from {} points with time",
        unknown.len(),
        known.len()
    );

    let (first, last) = curve.domain();
    let extrapolated = unknown
        .iter()
        .map(|&i| points[i].cum_distance.meters())
        .filter(|&distance| distance < first || distance > last)
        .count();
    if extrapolated > 0 {
        debug!("{trajectory_id:?}: extrapolating {extrapolated} points outside [{first}, {last}] m");
    }

    if let Some(window) = unknown
        .windows(2)
        .find(|w| points[w[1]].cum_distance < points[w[0]].cum_distance)
    {
        let id = points[window[1]].id();
        return Err(ValidationError::InterpolationDistanceNotAscending(id).into());
    }

    let mut times = Vec::with_capacity(unknown.len());
    let mut previous: Option<f64> = None;

    for &i in &unknown {
        let id = points[i].id();
        let millis = curve.evaluate(points[i].cum_distance.meters());

        if !millis.is_finite() {
            return Err(ValidationError::InterpolatedTimeNotFinite(id).into());
        }
        if previous.is_some_and(|previous| millis < previous) {
            return Err(ValidationError::InterpolatedTimeNotAscending(id).into());
        }
        previous = Some(millis);

        // times are kept with millisecond precision, the fractional part is truncated
        let time = DateTime::from_timestamp_millis(millis as i64)
            .ok_or(ValidationError::InterpolatedTimeNotFinite(id))?;
        trace!("{id:?}: {time}");
        times.push(time);
    }

    for (k, &i) in unknown.iter().enumerate() {
        let delta_time = times.get(k + 1).map(|&next| seconds(next - times[k]));

        let point = &mut points[i];
        let speed = delta_time
            .filter(|&delta_time| delta_time > 0.0)
            .map(|delta_time| point.edge_distance.meters() / delta_time);

        point.point.time = Some(times[k]);
        point.delta_time = delta_time;
        point.speed = speed;
    }

    Ok(RepairedTrajectory {
        profile: DistanceProfile {
            trajectory_id,
            points,
        },
        mask,
    })
}

/// Interpolates all the trajectories in parallel.
///
/// Trajectories without enough points with time are dropped, invalid trajectories are reported
/// as failed: neither stops the batch. Returns an error only if the bounds are not valid.
pub fn interpolate(
    trajectories: Vec<RepairedTrajectory>,
    bounds: &ValidationBounds,
    observer: &dyn ProgressObserver,
) -> Result<InterpolationReport, ConfigError> {
    bounds.validate()?;

    info!("Interpolating {} trajectories", trajectories.len());
    observer.on_stage(Stage::Interpolating, trajectories.len());

    let results: Vec<_> = trajectories
        .into_par_iter()
        .map(|trajectory| {
            let trajectory_id = trajectory.profile.trajectory_id;
            let len = trajectory.profile.len();
            let result = interpolate_trajectory(trajectory, bounds);
            observer.on_progress();
            (trajectory_id, len, result)
        })
        .collect();

    let mut report = InterpolationReport::default();

    for (trajectory_id, len, result) in results {
        match result {
            Ok(trajectory) => report.trajectories.push(trajectory),
            Err(InterpolationError::NotEnoughPoints(count)) => {
                debug!("Dropping {trajectory_id:?}: only {count} points with time");
                report.dropped.push(trajectory_id);
                report.dropped_points += len;
            }
            Err(InterpolationError::Invalid(error)) => {
                let error = TrajectoryError::new(trajectory_id, error);
                warn!("Excluding trajectory: {error}");
                observer.on_warning(&error.to_string());
                report.failed.push(error);
                report.dropped_points += len;
            }
        }
    }

    info!(
        "Dropped {} points in {} trajectories",
        report.dropped_points,
        report.dropped.len() + report.failed.len()
    );

    Ok(report)
}
