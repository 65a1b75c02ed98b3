//! Restores the temporal ordering of map matched trajectories.
//!
//! Once a trajectory is matched to the network and its points are sorted by their along-route
//! distance, the time of its points must also be ascending. Points that break the ordering are
//! not removed immediately: they are marked in a [`RepairMask`] that can be dropped at the end.

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, info, trace, warn};

use crate::progress::{ProgressObserver, Stage};
use crate::{DistanceProfile, ProfiledPoint, TrajectoryError, ValidationError};

/// Per point flag that marks the points excluded by the repair.
/// Flags can only be set, a mask is never reset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepairMask(Vec<bool>);

impl RepairMask {
    pub fn new(len: usize) -> Self {
        Self(vec![false; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_deleted(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    /// Marks the point as deleted, returns true only if it wasn't already marked.
    pub fn mark_deleted(&mut self, index: usize) -> bool {
        match self.0.get_mut(index) {
            Some(deleted) if !*deleted => {
                *deleted = true;
                true
            }
            _ => false,
        }
    }

    pub fn deleted_count(&self) -> usize {
        self.0.iter().filter(|&&deleted| deleted).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> {
        self.0.iter().copied()
    }

    /// Returns an error if the mask doesn't have exactly one flag for each of the `len` points.
    pub(crate) fn ensure_len(&self, len: usize) -> Result<(), ValidationError> {
        if self.len() == len {
            Ok(())
        } else {
            Err(ValidationError::MaskLengthMismatch {
                expected: len,
                found: self.len(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RepairConfig {
    /// Drop the points marked as deleted (and their mask) once the repair is done.
    pub drop_marked_to_delete: bool,
}

/// Distance profile together with the points marked by the repair.
/// The mask is None if the marked points have been dropped or the profile was never repaired.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairedTrajectory {
    pub profile: DistanceProfile,
    pub mask: Option<RepairMask>,
}

impl From<DistanceProfile> for RepairedTrajectory {
    fn from(profile: DistanceProfile) -> Self {
        Self {
            profile,
            mask: None,
        }
    }
}

impl RepairedTrajectory {
    /// Iterates over the points that are not marked as deleted.
    pub fn kept_points(&self) -> impl Iterator<Item = &ProfiledPoint> {
        self.profile
            .points
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.mask.as_ref().is_some_and(|mask| mask.is_deleted(*i)))
            .map(|(_, point)| point)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepairReport {
    /// Repaired trajectories, in the same order of the input.
    pub trajectories: Vec<RepairedTrajectory>,
    /// Number of points with a duplicated distance dropped before the repair.
    pub duplicates_dropped: usize,
    /// Number of points marked as deleted by the repair.
    pub total_deleted: usize,
    /// Trajectories that could not be repaired, they are not part of the result.
    pub failed: Vec<TrajectoryError>,
}

/// Marks the points of the trajectory whose time is not in ascending order.
///
/// Only the points with time that are not yet marked take part in the repair (active points).
/// Every pass compares the consecutive active points and marks the later point of each pair whose
/// time does not advance, the earlier point is never marked. Passes are repeated until no new
/// point is marked. A single remaining active point cannot satisfy any ordering and is marked too.
///
/// Returns the number of points marked by this repair. The mask must have one flag per point.
pub fn fix_trajectory(
    profile: &DistanceProfile,
    mask: &mut RepairMask,
) -> Result<usize, ValidationError> {
    mask.ensure_len(profile.len())?;
    let points = &profile.points;

    let active_points = |mask: &RepairMask| -> Vec<usize> {
        (0..points.len())
            .filter(|&i| points[i].has_time() && !mask.is_deleted(i))
            .collect()
    };

    let active = active_points(mask);
    if let Some(window) = active
        .windows(2)
        .find(|w| points[w[1]].cum_distance < points[w[0]].cum_distance)
    {
        return Err(ValidationError::DistanceNotAscending(points[window[1]].id()));
    }

    let mut deleted = 0;

    // every pass that doesn't converge marks at least one point
    for pass in 0..=points.len() {
        let active = active_points(mask);

        if let [index] = active[..] {
            trace!("Marking single active point {:?}", points[index].id());
            deleted += usize::from(mask.mark_deleted(index));
        }
        if active.len() <= 1 {
            break;
        }

        let not_ascending: Vec<usize> = active
            .windows(2)
            .filter(|w| points[w[1]].point.time <= points[w[0]].point.time)
            .map(|w| w[1])
            .collect();

        if not_ascending.is_empty() {
            break;
        }

        trace!("Pass {pass}: {} points not in ascending order", not_ascending.len());
        for index in not_ascending {
            deleted += usize::from(mask.mark_deleted(index));
        }
    }

    debug!("{:?}: {deleted} points marked", profile.trajectory_id);
    Ok(deleted)
}

/// Repairs the time order of all the trajectories.
///
/// 1. Drops the points of each trajectory that share the same distance and the same
///    availability of time (the first one is kept).
/// 2. Sorts the points of each trajectory by distance.
/// 3. Marks the points not in ascending time order with [`fix_trajectory`].
/// 4. Optionally drops the marked points.
///
/// Trajectories are repaired in parallel. A trajectory that cannot be repaired doesn't stop the
/// batch, it is reported in the result.
pub fn fix_all(
    profiles: Vec<DistanceProfile>,
    config: &RepairConfig,
    observer: &dyn ProgressObserver,
) -> RepairReport {
    info!("Repairing {} trajectories with {config:?}", profiles.len());

    observer.on_stage(Stage::Deduplicating, profiles.len());
    let mut duplicates_dropped = 0;
    let profiles: Vec<DistanceProfile> = profiles
        .into_iter()
        .map(|profile| {
            let (profile, dropped) = drop_duplicate_distances(profile);
            duplicates_dropped += dropped;
            observer.on_progress();
            profile
        })
        .collect();
    debug!("Dropped {duplicates_dropped} points with duplicated distance");

    observer.on_stage(Stage::Repairing, profiles.len());
    let results: Vec<_> = profiles
        .into_par_iter()
        .map(|profile| {
            let trajectory_id = profile.trajectory_id;
            let mut mask = RepairMask::new(profile.len());

            let result = match fix_trajectory(&profile, &mut mask) {
                Ok(deleted) => Ok((
                    RepairedTrajectory {
                        profile,
                        mask: Some(mask),
                    },
                    deleted,
                )),
                Err(error) => Err(TrajectoryError::new(trajectory_id, error)),
            };

            observer.on_progress();
            result
        })
        .collect();

    let mut report = RepairReport {
        duplicates_dropped,
        ..Default::default()
    };

    for result in results {
        match result {
            Ok((trajectory, deleted)) => {
                report.total_deleted += deleted;
                report.trajectories.push(trajectory);
            }
            Err(error) => {
                warn!("Excluding trajectory: {error}");
                observer.on_warning(&error.to_string());
                report.failed.push(error);
            }
        }
    }

    info!("{} points marked for deletion", report.total_deleted);

    if config.drop_marked_to_delete {
        report.trajectories = report
            .trajectories
            .into_iter()
            .map(drop_marked_points)
            .collect();
    }

    report
}

fn drop_duplicate_distances(mut profile: DistanceProfile) -> (DistanceProfile, usize) {
    let len = profile.len();

    let mut seen = FxHashSet::default();
    profile
        .points
        .retain(|p| seen.insert((p.has_time(), p.cum_distance)));
    profile.points.sort_by_key(|p| p.cum_distance);

    let dropped = len - profile.len();
    (profile, dropped)
}

fn drop_marked_points(trajectory: RepairedTrajectory) -> RepairedTrajectory {
    let RepairedTrajectory { mut profile, mask } = trajectory;

    if let Some(mask) = mask {
        let mut deleted = mask.iter();
        profile
            .points
            .retain(|_| !deleted.next().unwrap_or(false));
    }

    RepairedTrajectory {
        profile,
        mask: None,
    }
}
