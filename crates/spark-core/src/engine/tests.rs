use super::*;
use crate::config::SaturationPolicy;
use crate::host::FnSink;

fn config(
    width: i32,
    height: i32,
    seed_cell: (i32, i32),
    intervals: usize,
    exp: f64,
) -> SparkConfig {
    SparkConfig {
        width,
        height,
        initial_position: Position::new(seed_cell.0, seed_cell.1),
        number_of_intervals: intervals,
        exp,
        seed: Some(42),
        ..SparkConfig::default()
    }
}

fn assert_field_invariants<R: Rng>(engine: &SparkEngine<R>) {
    let field = engine.field();
    for (pos, weight) in field.iter() {
        assert!(
            (0.0..=1.0).contains(&weight),
            "weight {weight} at {pos} outside [0, 1]"
        );
        assert!(!field.is_out_of_bounds(pos), "{pos} stored out of bounds");
    }
    for pos in field.active() {
        assert!(field.contains(*pos), "active {pos} missing from field");
        assert_eq!(field.get(*pos), 1.0, "active {pos} not pinned at 1");
    }
}

#[test]
fn single_tick_activates_one_neighbor_of_seed() {
    let mut engine = SparkEngine::new(config(10, 10, (5, 5), 1, 2.0));
    let window = engine.step().expect("tick");

    let seed = Position::new(5, 5);
    assert_eq!(engine.active_count(), 2);
    assert_eq!(engine.field().active()[0], seed);
    let grown = engine.field().active()[1];
    assert!(seed.neighbors4().contains(&grown));

    assert_eq!(window.tick, 1);
    assert!(window.grew);
    assert_eq!(window.center, grown);
    assert_eq!(window.cells[12].position(), grown);
    assert!(window.cells.iter().all(|c| (0.0..=1.0).contains(&c.weight)));
    assert_eq!(window.weight_at(seed), Some(1.0));
    assert_eq!(window.weight_at(grown), Some(1.0));
    assert!(engine.is_done());
}

#[test]
fn active_set_grows_by_exactly_one_per_tick() {
    let mut engine = SparkEngine::new(config(40, 40, (20, 20), 60, 2.0));
    for k in 1..=60 {
        engine.step().expect("tick");
        assert_eq!(engine.active_count(), 1 + k);
        assert_eq!(engine.tick(), k);
        assert_field_invariants(&engine);
    }
    assert!(matches!(
        engine.step(),
        Err(GrowthError::RunComplete { intervals: 60 })
    ));
}

#[test]
fn small_grid_saturates_but_still_emits_every_snapshot() {
    let mut engine = SparkEngine::new(config(3, 3, (0, 0), 20, 2.0));
    let windows = engine.run();

    assert_eq!(windows.len(), 20);
    for (i, window) in windows.iter().enumerate() {
        assert_eq!(window.tick, i + 1);
    }
    let summary = engine.summary();
    assert_eq!(summary.ticks_completed, 20);
    // 4x4 cells cannot hold 21 active ones.
    assert!(summary.active_count <= 16);
    let saturated_at = summary.saturated_at_tick.expect("grid saturates");
    assert_eq!(summary.active_count, saturated_at);
    assert!(windows[saturated_at - 1..].iter().all(|w| !w.grew));
    assert!(windows[..saturated_at - 1].iter().all(|w| w.grew));
    assert_field_invariants(&engine);
}

#[test]
fn fail_policy_reports_saturation() {
    let mut cfg = config(1, 1, (0, 0), 10, 2.0);
    cfg.saturation = SaturationPolicy::Fail;
    let mut engine = SparkEngine::new(cfg);
    let mut windows: Vec<SnapshotWindow> = Vec::new();

    let result = engine.try_run(&mut windows, &StopSignal::new());

    assert_eq!(result, Err(GrowthError::GridSaturated { tick: 4 }));
    assert_eq!(windows.len(), 3);
    assert_eq!(engine.active_count(), 4);
}

#[test]
fn relaxation_spreads_quarter_weight_to_each_neighbor() {
    let mut engine = SparkEngine::new(config(10, 10, (5, 5), 1, 2.0));
    engine.relax();
    let seed = Position::new(5, 5);
    assert_eq!(engine.field().get(seed), 1.0);
    for p in seed.neighbors4() {
        assert_eq!(engine.field().get(p), 0.25);
    }
    assert_eq!(engine.field().len(), 5);
}

#[test]
fn relaxation_at_corner_never_leaves_the_grid() {
    let mut engine = SparkEngine::new(config(10, 10, (0, 0), 1, 2.0));
    engine.relax();
    assert_eq!(engine.field().get(Position::new(1, 0)), 0.25);
    assert_eq!(engine.field().get(Position::new(0, 1)), 0.25);
    assert!(!engine.field().contains(Position::new(-1, 0)));
    assert!(!engine.field().contains(Position::new(0, -1)));
}

#[test]
fn far_edge_cells_are_in_bounds() {
    let mut engine = SparkEngine::new(config(3, 3, (3, 3), 1, 2.0));
    engine.relax();
    assert!(engine.field().contains(Position::new(2, 3)));
    assert!(engine.field().contains(Position::new(3, 2)));
    assert!(!engine.field().contains(Position::new(4, 3)));
    assert!(!engine.field().contains(Position::new(3, 4)));

    let frontier = engine.frontier();
    assert_eq!(frontier, vec![Position::new(2, 3), Position::new(3, 2)]);
}

#[test]
fn same_seed_reproduces_growth_and_snapshots() {
    let cfg = config(30, 30, (15, 15), 80, 1.5);
    let mut a = SparkEngine::new(cfg.clone());
    let mut b = SparkEngine::new(cfg);

    assert_eq!(a.run(), b.run());
    assert_eq!(a.field().active(), b.field().active());
}

#[test]
fn different_seeds_diverge() {
    let mut cfg = config(30, 30, (15, 15), 80, 1.5);
    let mut a = SparkEngine::new(cfg.clone());
    cfg.seed = Some(43);
    let mut b = SparkEngine::new(cfg);
    a.run();
    b.run();
    assert_ne!(a.field().active(), b.field().active());
}

#[test]
fn zero_exponent_accepts_every_sampled_candidate() {
    let mut engine = SparkEngine::new(config(50, 50, (25, 25), 200, 0.0));
    engine.run();
    let summary = engine.summary();
    assert_eq!(summary.rejected_draws, 0);
    assert_eq!(summary.fallback_selections, 0);
    assert_eq!(summary.active_count, 201);
}

#[test]
fn acceptance_follows_inverted_weight_power() {
    let engine = SparkEngine::new(config(10, 10, (5, 5), 1, 2.0));
    assert_eq!(engine.acceptance(0.0), 1.0);
    assert_eq!(engine.acceptance(0.5), 0.25);
    assert_eq!(engine.acceptance(1.0), 0.0);

    let flat = SparkEngine::new(config(10, 10, (5, 5), 1, 0.0));
    assert_eq!(flat.acceptance(0.75), 1.0);
}

#[test]
fn draw_cap_falls_back_to_best_frontier_cell() {
    let mut cfg = config(40, 40, (20, 20), 25, 60.0);
    cfg.max_selection_attempts = 1;
    let mut engine = SparkEngine::new(cfg);
    engine.run();

    let summary = engine.summary();
    assert_eq!(summary.active_count, 26);
    assert!(summary.fallback_selections > 0);
    assert!(summary.rejected_draws > 0);
    assert_eq!(summary.saturated_at_tick, None);
    assert_field_invariants(&engine);
}

#[test]
fn underflowing_acceptance_is_not_saturation() {
    let mut engine = SparkEngine::new(config(40, 40, (20, 20), 10, 5000.0));
    assert_eq!(engine.acceptance(0.25), 0.0);
    engine.run();

    let summary = engine.summary();
    assert_eq!(summary.saturated_at_tick, None);
    assert_eq!(summary.active_count, 11);
    assert_eq!(summary.fallback_selections, 10);
    assert_eq!(summary.rejected_draws, 0);
    assert_field_invariants(&engine);
}

#[test]
fn stop_signal_prevents_further_ticks() {
    let mut engine = SparkEngine::new(config(20, 20, (10, 10), 50, 2.0));
    let stop = StopSignal::new();
    let mut emitted = 0;
    let signal = stop.clone();
    let mut sink = FnSink(|_window: SnapshotWindow| {
        emitted += 1;
        if emitted == 5 {
            signal.stop();
        }
        true
    });

    let summary = engine.try_run(&mut sink, &stop).expect("run");

    assert!(summary.cancelled);
    assert_eq!(summary.ticks_completed, 5);
    assert_eq!(emitted, 5);
    assert_eq!(engine.active_count(), 6);
}

#[test]
fn caller_supplied_rng_leaves_seed_unset() {
    let rng = ChaCha12Rng::seed_from_u64(3);
    let mut engine =
        SparkEngine::with_rng(config(10, 10, (5, 5), 3, 2.0), rng).expect("valid config");
    engine.run();
    let summary = engine.summary();
    assert_eq!(summary.seed, None);
    assert_eq!(summary.ticks_completed, 3);
}

#[test]
fn unseeded_engine_records_drawn_seed() {
    let mut cfg = config(10, 10, (5, 5), 2, 2.0);
    cfg.seed = None;
    let engine = SparkEngine::new(cfg);
    assert!(engine.summary().seed.is_some());
}

#[test]
fn invalid_config_is_rejected_before_any_tick() {
    let cfg = config(10, 10, (11, 5), 5, 2.0);
    assert!(matches!(
        SparkEngine::try_new(cfg),
        Err(SparkConfigError::SeedOutOfBounds { .. })
    ));
}

#[test]
fn summary_serializes_for_hosts() {
    let mut engine = SparkEngine::new(config(10, 10, (5, 5), 4, 2.0));
    engine.run();
    let json = serde_json::to_string(&engine.summary()).expect("serialize");
    let back: RunSummary = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, engine.summary());
    assert!(!json.contains("saturated_at_tick"));
}
