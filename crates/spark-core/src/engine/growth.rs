use super::metrics::TickTimings;
use super::{GrowthError, SparkEngine};
use crate::config::SaturationPolicy;
use crate::field::Position;
use crate::snapshot::SnapshotWindow;
use log::{debug, warn};
use rand::Rng;
use std::collections::HashSet;
use std::time::Instant;

impl<R: Rng> SparkEngine<R> {
    /// Chance of accepting a candidate with weight `w`: `(1 - w)^exp`.
    pub(crate) fn acceptance(&self, weight: f64) -> f64 {
        (1.0 - weight).clamp(0.0, 1.0).powf(self.config.exp)
    }

    /// Every cell a growth step could activate, in active-set order.
    pub fn frontier(&self) -> Vec<Position> {
        let mut seen = HashSet::new();
        let mut frontier = Vec::new();
        for pos in self.field.active() {
            for candidate in self.field.candidate_neighbors(*pos, None) {
                if seen.insert(candidate) {
                    frontier.push(candidate);
                }
            }
        }
        frontier
    }

    /// Relaxation phase: one Jacobi sweep over the trace frontier.
    pub fn relax(&mut self) -> usize {
        self.field.relax()
    }

    /// Selection phase: activate one frontier cell by rejection sampling.
    ///
    /// Returns `None` when no frontier cell can ever be accepted. After
    /// `max_selection_attempts` draws without a commit the frontier cell with
    /// the highest acceptance is taken instead. When every acceptance
    /// underflows to 0 but some cell still has `w < 1`, sampling cannot
    /// succeed and the lowest-weight cell is committed straight away.
    pub fn select(&mut self) -> Option<Position> {
        // (acceptance, weight) of the best cell: higher acceptance, then lower weight.
        let mut best: Option<(Position, f64, f64)> = None;
        for candidate in self.frontier() {
            let weight = self.field.get(candidate);
            let p = self.acceptance(weight);
            if p <= 0.0 && weight >= 1.0 {
                continue;
            }
            let better = match best {
                None => true,
                Some((_, bp, bw)) => p > bp || (p == bp && weight < bw),
            };
            if better {
                best = Some((candidate, p, weight));
            }
        }
        let (fallback, best_p, _) = best?;

        if best_p > 0.0 {
            for _ in 0..self.config.max_selection_attempts {
                let active = self.field.active();
                let from = active[self.rng.random_range(0..active.len())];
                let candidates = self.field.candidate_neighbors(from, None);
                if candidates.is_empty() {
                    continue;
                }
                let candidate = candidates[self.rng.random_range(0..candidates.len())];
                if self.field.is_active(candidate) {
                    continue;
                }
                let p = self.acceptance(self.field.get(candidate));
                if self.rng.random::<f64>() < p {
                    self.field.activate(candidate);
                    return Some(candidate);
                }
                self.rejected_draws += 1;
            }
            warn!(
                "tick {}: no acceptance after {} draws, activating {} directly",
                self.tick, self.config.max_selection_attempts, fallback
            );
        } else {
            warn!(
                "tick {}: acceptance underflows for exp {}, activating {} directly",
                self.tick, self.config.exp, fallback
            );
        }
        self.fallback_selections += 1;
        self.field.activate(fallback);
        Some(fallback)
    }

    /// Advance one tick: relax, grow, and capture the window around the new
    /// active cell.
    pub fn step(&mut self) -> Result<SnapshotWindow, GrowthError> {
        if self.is_done() {
            return Err(GrowthError::RunComplete {
                intervals: self.config.number_of_intervals,
            });
        }
        let total_start = Instant::now();
        self.tick += 1;

        let t0 = Instant::now();
        let relaxed = self.relax();
        let relax_us = t0.elapsed().as_micros() as u64;

        let t1 = Instant::now();
        let selected = self.select();
        let select_us = t1.elapsed().as_micros() as u64;

        let window = match selected {
            Some(pos) => {
                self.last_center = pos;
                debug!(
                    "tick {}: relaxed {} cells, activated {} (w=1, {} active)",
                    self.tick,
                    relaxed,
                    pos,
                    self.field.active_count()
                );
                SnapshotWindow::capture(&self.field, self.tick, pos, true)
            }
            None => {
                if self.saturated_at.is_none() {
                    self.saturated_at = Some(self.tick);
                    warn!(
                        "tick {}: grid saturated with {} active cells ({} policy)",
                        self.tick,
                        self.field.active_count(),
                        self.config.saturation
                    );
                }
                if self.config.saturation == SaturationPolicy::Fail {
                    return Err(GrowthError::GridSaturated { tick: self.tick });
                }
                SnapshotWindow::capture(&self.field, self.tick, self.last_center, false)
            }
        };

        self.last_timings = Some(TickTimings {
            relax_us,
            select_us,
            total_us: total_start.elapsed().as_micros() as u64,
        });
        Ok(window)
    }
}
