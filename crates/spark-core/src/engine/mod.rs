pub mod growth;
pub mod metrics;
#[cfg(test)]
mod tests;

pub use metrics::*;

use crate::config::{SparkConfig, SparkConfigError};
use crate::field::{PotentialField, Position};
use crate::host::{SnapshotSink, StopSignal};
use crate::snapshot::SnapshotWindow;
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrowthError {
    /// No frontier cell can be activated any more.
    GridSaturated { tick: usize },
    /// All configured intervals have already run.
    RunComplete { intervals: usize },
}

impl fmt::Display for GrowthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthError::GridSaturated { tick } => {
                write!(f, "grid saturated at tick {tick}: no cell left to activate")
            }
            GrowthError::RunComplete { intervals } => {
                write!(f, "run already completed all {intervals} intervals")
            }
        }
    }
}

impl Error for GrowthError {}

/// Growth engine for one run: owns the field and the random source.
///
/// Ticks strictly alternate a relaxation sweep with one rejection-sampled
/// activation. The engine is single-use; once `number_of_intervals` ticks
/// have run it only reports its summary.
pub struct SparkEngine<R = ChaCha12Rng> {
    pub(crate) config: SparkConfig,
    pub(crate) field: PotentialField,
    pub(crate) rng: R,
    pub(crate) seed: Option<u64>,
    pub(crate) tick: usize,
    pub(crate) last_center: Position,
    pub(crate) rejected_draws: u64,
    pub(crate) fallback_selections: usize,
    pub(crate) saturated_at: Option<usize>,
    pub(crate) cancelled: bool,
    pub(crate) last_timings: Option<TickTimings>,
}

impl SparkEngine<ChaCha12Rng> {
    pub fn new(config: SparkConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Build an engine seeded from `config.seed`, or from the thread RNG when
    /// no seed is configured. The seed actually used is kept for the summary.
    pub fn try_new(config: SparkConfig) -> Result<Self, SparkConfigError> {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut engine = Self::with_rng(config, ChaCha12Rng::seed_from_u64(seed))?;
        engine.seed = Some(seed);
        Ok(engine)
    }
}

impl<R: Rng> SparkEngine<R> {
    /// Build an engine around a caller-supplied random source.
    pub fn with_rng(config: SparkConfig, rng: R) -> Result<Self, SparkConfigError> {
        config.validate()?;
        let seed_position = config.initial_position;
        let field = PotentialField::seeded(config.width, config.height, seed_position);
        Ok(Self {
            config,
            field,
            rng,
            seed: None,
            tick: 0,
            last_center: seed_position,
            rejected_draws: 0,
            fallback_selections: 0,
            saturated_at: None,
            cancelled: false,
            last_timings: None,
        })
    }

    pub fn config(&self) -> &SparkConfig {
        &self.config
    }

    pub fn field(&self) -> &PotentialField {
        &self.field
    }

    /// Ticks completed so far; 0 right after seeding.
    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn is_done(&self) -> bool {
        self.tick >= self.config.number_of_intervals
    }

    pub fn active_count(&self) -> usize {
        self.field.active_count()
    }

    /// Most recently activated cell (the seed before the first tick).
    pub fn last_center(&self) -> Position {
        self.last_center
    }

    pub fn last_timings(&self) -> Option<&TickTimings> {
        self.last_timings.as_ref()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            schema_version: 1,
            seed: self.seed,
            requested_intervals: self.config.number_of_intervals,
            ticks_completed: self.tick,
            active_count: self.field.active_count(),
            field_size: self.field.len(),
            rejected_draws: self.rejected_draws,
            fallback_selections: self.fallback_selections,
            saturated_at_tick: self.saturated_at,
            cancelled: self.cancelled,
        }
    }

    /// Run every remaining tick, collecting the snapshots.
    pub fn run(&mut self) -> Vec<SnapshotWindow> {
        let remaining = self.config.number_of_intervals - self.tick;
        let mut windows = Vec::with_capacity(remaining.min(1024));
        self.try_run(&mut windows, &StopSignal::new())
            .unwrap_or_else(|e| panic!("{e}"));
        windows
    }

    /// Run every remaining tick, handing each snapshot to `sink` as soon as it
    /// is computed.
    ///
    /// The stop signal is checked before each tick. A sink that refuses a
    /// snapshot ends the run the same way; in both cases the summary reports
    /// `cancelled`.
    pub fn try_run<S: SnapshotSink + ?Sized>(
        &mut self,
        sink: &mut S,
        stop: &StopSignal,
    ) -> Result<RunSummary, GrowthError> {
        info!(
            "spark run: {}x{} grid, seed cell {}, {} intervals, exp {}, rng seed {:?}",
            self.config.width,
            self.config.height,
            self.config.initial_position,
            self.config.number_of_intervals,
            self.config.exp,
            self.seed
        );
        while !self.is_done() {
            if stop.is_stopped() {
                self.cancelled = true;
                break;
            }
            let window = self.step()?;
            if !sink.emit(window) {
                self.cancelled = true;
                break;
            }
        }
        let summary = self.summary();
        info!(
            "spark run finished: {} ticks, {} active cells, {} field cells{}",
            summary.ticks_completed,
            summary.active_count,
            summary.field_size,
            if summary.cancelled { " (cancelled)" } else { "" }
        );
        Ok(summary)
    }
}
