use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use spark_core::{SnapshotWindow, SparkConfig, SparkEngine, StopSignal};

/// Minimal PyO3 module exposing spark-core to Python.
#[pyfunction]
fn version() -> &'static str {
    "0.1.0"
}

/// Run a whole simulation from a JSON configuration message.
///
/// Returns a JSON object with `snapshots` (one array of 25 `{x, y, weight}`
/// records per tick) and `summary`.
#[pyfunction]
fn simulate(config_json: &str) -> PyResult<String> {
    let config =
        SparkConfig::from_json(config_json).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let mut engine =
        SparkEngine::try_new(config).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let mut snapshots: Vec<SnapshotWindow> = Vec::new();
    let summary = engine
        .try_run(&mut snapshots, &StopSignal::new())
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let messages: Vec<_> = snapshots.iter().map(|w| &w.cells).collect();
    serde_json::to_string(&serde_json::json!({
        "snapshots": messages,
        "summary": summary,
    }))
    .map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(simulate, m)?)?;
    Ok(())
}
