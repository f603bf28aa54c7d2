use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use spark_core::{Position, RunSummary, SparkConfig, SparkEngine};
use std::time::Instant;

fn batch_summaries(config: &SparkConfig, runs: u64) -> Vec<RunSummary> {
    let base_seed = config.seed.unwrap_or(0);
    (0..runs)
        .into_par_iter()
        .map(|i| {
            let rng = ChaCha12Rng::seed_from_u64(base_seed.wrapping_add(i));
            let mut engine =
                SparkEngine::with_rng(config.clone(), rng).expect("benchmark config is valid");
            engine.run();
            engine.summary()
        })
        .collect()
}

fn main() {
    env_logger::init();
    let config = SparkConfig {
        width: 250,
        height: 250,
        initial_position: Position::new(125, 125),
        number_of_intervals: 2_000,
        exp: 2.0,
        seed: Some(42),
        ..SparkConfig::default()
    };
    println!(
        "Benchmarking {}x{} grid, {} intervals, exp {}",
        config.width, config.height, config.number_of_intervals, config.exp
    );

    // Single run, per-phase timings
    let mut engine = SparkEngine::new(config.clone());
    let (mut relax_us, mut select_us, mut tick_us) = (0u64, 0u64, 0u64);
    let start = Instant::now();
    while !engine.is_done() {
        engine.step().expect("hold policy never fails a tick");
        if let Some(t) = engine.last_timings() {
            relax_us += t.relax_us;
            select_us += t.select_us;
            tick_us += t.total_us;
        }
    }
    let duration = start.elapsed();
    let ticks = config.number_of_intervals as u32;
    let summary = engine.summary();
    println!("Time for {} ticks: {:?}", ticks, duration);
    println!("Avg time per tick: {:?}", duration / ticks);
    println!(
        "Relaxation: {} us total, selection: {} us total, snapshot and bookkeeping: {} us total",
        relax_us,
        select_us,
        tick_us.saturating_sub(relax_us + select_us)
    );
    println!(
        "Final field: {} cells, {} active, {} rejected draws",
        summary.field_size, summary.active_count, summary.rejected_draws
    );

    // Independent seeds in parallel
    let runs = 8u64;
    let start = Instant::now();
    let summaries = batch_summaries(&config, runs);
    let duration = start.elapsed();
    let mean_field = summaries.iter().map(|s| s.field_size as f64).sum::<f64>() / runs as f64;
    let mean_rejected =
        summaries.iter().map(|s| s.rejected_draws as f64).sum::<f64>() / runs as f64;
    println!("Time for {} parallel runs: {:?}", runs, duration);
    println!(
        "Mean field size: {:.1}, mean rejected draws: {:.1}",
        mean_field, mean_rejected
    );
}
