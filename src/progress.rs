//! Progress reporting for the batch drivers.
//!
//! Batch operations run trajectories in parallel, so observers are called from rayon threads and
//! must be `Send + Sync`.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use strum::{Display, IntoStaticStr};

/// Batch stages, ordered by their position in the cleanup pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// Dropping points with duplicated distances before the repair.
    Deduplicating,
    /// Marking points whose time is not in ascending order.
    Repairing,
    /// Interpolating the time of the points without time.
    Interpolating,
}

pub trait ProgressObserver: Send + Sync {
    /// Called when a stage starts, `total` is the number of items (trajectories) it will process.
    fn on_stage(&self, stage: Stage, total: usize);
    /// Called after one item of the current stage is completed.
    fn on_progress(&self);
    /// Called when an item cannot be processed and is excluded from the result.
    fn on_warning(&self, message: &str);
}

pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_stage(&self, _stage: Stage, _total: usize) {}
    fn on_progress(&self) {}
    fn on_warning(&self, _message: &str) {}
}

/// Records the progress so it can be polled from another thread.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    stages: Mutex<Vec<(Stage, usize)>>,
    completed: AtomicUsize,
    warnings: Mutex<Vec<String>>,
}

impl ProgressTracker {
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn stages(&self) -> Vec<(Stage, usize)> {
        self.stages.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl ProgressObserver for ProgressTracker {
    fn on_stage(&self, stage: Stage, total: usize) {
        if let Ok(mut stages) = self.stages.lock() {
            stages.push((stage, total));
        }
        self.completed.store(0, Ordering::SeqCst);
    }

    fn on_progress(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_warning(&self, message: &str) {
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.push(message.to_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Repairing.to_string(), "repairing");
        let name: &'static str = Stage::Interpolating.into();
        assert_eq!(name, "interpolating");
    }

    #[test]
    fn progress_tracker_records_events() {
        let tracker = ProgressTracker::default();

        tracker.on_stage(Stage::Repairing, 2);
        tracker.on_progress();
        tracker.on_progress();
        tracker.on_warning("trajectory 3 excluded");

        assert_eq!(tracker.stages(), vec![(Stage::Repairing, 2)]);
        assert_eq!(tracker.completed(), 2);
        assert_eq!(tracker.warnings(), vec!["trajectory 3 excluded".to_owned()]);

        tracker.on_stage(Stage::Interpolating, 5);
        assert_eq!(tracker.completed(), 0);
    }
}
