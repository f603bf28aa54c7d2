use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct TickTimings {
    pub relax_us: u64,
    pub select_us: u64,
    pub total_us: u64,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Seed of the run's ChaCha12 stream; `None` for caller-supplied RNGs.
    #[serde(default)]
    pub seed: Option<u64>,
    pub requested_intervals: usize,
    pub ticks_completed: usize,
    pub active_count: usize,
    pub field_size: usize,
    /// Draws turned down by the `(1 - w)^exp` test.
    #[serde(default)]
    pub rejected_draws: u64,
    /// Ticks that hit the draw cap and activated the best frontier cell.
    #[serde(default)]
    pub fallback_selections: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_at_tick: Option<usize>,
    #[serde(default)]
    pub cancelled: bool,
}
