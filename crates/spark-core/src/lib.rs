//! Dielectric-breakdown style spark growth on a bounded 2-D grid.
//!
//! - [`field`]: sparse potential field, active set and the relaxation sweep.
//! - [`engine`]: tick loop alternating relaxation with rejection-sampled growth.
//! - [`snapshot`]: the 5x5 window emitted after every tick.
//! - [`config`]: run parameters and their validation.
//! - [`host`]: sinks, stop signal and the threaded run handle.

pub mod config;
pub mod engine;
pub mod field;
pub mod host;
pub mod snapshot;

pub use config::{ConfigParseError, SaturationPolicy, SparkConfig, SparkConfigError};
pub use engine::{GrowthError, RunSummary, SparkEngine, TickTimings};
pub use field::{PotentialField, Position};
pub use host::{spawn_run, FnSink, RunError, SnapshotSink, SparkRun, StopSignal};
pub use snapshot::{SnapshotWindow, SparkWeight};
