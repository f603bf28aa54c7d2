//! Boundary between the engine and whoever renders its output.
//!
//! One configuration goes in, one snapshot per tick comes out. Emission never
//! blocks: snapshots are queued on an unbounded channel and the host drains
//! it at its own pace. Cancellation is an explicit [`StopSignal`] checked
//! between ticks; snapshots already queued when it fires may go unread.

use crate::config::{SparkConfig, SparkConfigError};
use crate::engine::{GrowthError, RunSummary, SparkEngine};
use crate::snapshot::SnapshotWindow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::{error::Error, fmt};

/// Consumer of per-tick snapshots.
pub trait SnapshotSink {
    /// Returns `false` once the host no longer accepts snapshots.
    fn emit(&mut self, window: SnapshotWindow) -> bool;
}

impl SnapshotSink for Vec<SnapshotWindow> {
    fn emit(&mut self, window: SnapshotWindow) -> bool {
        self.push(window);
        true
    }
}

impl SnapshotSink for Sender<SnapshotWindow> {
    fn emit(&mut self, window: SnapshotWindow) -> bool {
        self.send(window).is_ok()
    }
}

/// Adapts a closure into a [`SnapshotSink`].
pub struct FnSink<F>(pub F);

impl<F: FnMut(SnapshotWindow) -> bool> SnapshotSink for FnSink<F> {
    fn emit(&mut self, window: SnapshotWindow) -> bool {
        (self.0)(window)
    }
}

#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    Growth(GrowthError),
    /// The engine thread panicked.
    Aborted,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Growth(e) => write!(f, "{e}"),
            RunError::Aborted => write!(f, "engine thread aborted"),
        }
    }
}

impl From<GrowthError> for RunError {
    fn from(err: GrowthError) -> Self {
        RunError::Growth(err)
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RunError::Growth(e) => Some(e),
            RunError::Aborted => None,
        }
    }
}

/// A run executing on its own thread.
pub struct SparkRun {
    snapshots: Receiver<SnapshotWindow>,
    stop: StopSignal,
    handle: JoinHandle<Result<RunSummary, GrowthError>>,
    intervals: usize,
}

/// Validate `config` and start the engine on a dedicated thread.
pub fn spawn_run(config: SparkConfig) -> Result<SparkRun, SparkConfigError> {
    let intervals = config.number_of_intervals;
    let mut engine = SparkEngine::try_new(config)?;
    let (mut tx, rx) = mpsc::channel::<SnapshotWindow>();
    let stop = StopSignal::new();
    let engine_stop = stop.clone();
    let handle = thread::spawn(move || engine.try_run(&mut tx, &engine_stop));
    Ok(SparkRun {
        snapshots: rx,
        stop,
        handle,
        intervals,
    })
}

impl SparkRun {
    /// Number of snapshots a complete run emits.
    pub fn intervals(&self) -> usize {
        self.intervals
    }

    pub fn snapshots(&self) -> &Receiver<SnapshotWindow> {
        &self.snapshots
    }

    pub fn cancel(&self) {
        self.stop.stop();
    }

    /// Wait for the engine thread. Unread snapshots are discarded.
    pub fn join(self) -> Result<RunSummary, RunError> {
        let SparkRun {
            snapshots, handle, ..
        } = self;
        drop(snapshots);
        match handle.join() {
            Ok(result) => result.map_err(RunError::from),
            Err(_) => Err(RunError::Aborted),
        }
    }
}
