//! Reference trajectory files
//!
//! Benchmark trajectories are plain ASCII tables, one sample per row:
//!
//! ```text
//! t  x  y  z  ẋ  ẏ  ż
//! ```
//!
//! separated by whitespace. Row `k` (counting non-blank rows from zero) is
//! the sample at `k · interval`; the time column must agree with that epoch.
//! Reference files are conventionally in kilometers and km/s.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use crate::errors::{io_err, KeplerError, Result};
use crate::serieslib::PropagationHistory;
use crate::state::{State, STATE_DIMENSION};

/// Environment variable overriding the default benchmark data root
pub const DATA_ROOT_ENV: &str = "KEPLER_DATA_ROOT";

/// Maximum disagreement between a row's time column and its row epoch
pub const EPOCH_TOLERANCE: f64 = 1e-6;

/// Location and sampling of a benchmark file
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    /// Directory relative paths are resolved against
    pub data_root: PathBuf,
    /// File path below `data_root`
    pub relative_path: PathBuf,
    /// Time between consecutive rows
    pub output_interval: f64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        let data_root = env::var(DATA_ROOT_ENV).unwrap_or_else(|_| ".".to_string());
        BenchmarkConfig {
            data_root: PathBuf::from(data_root),
            relative_path: PathBuf::from("Astrodynamics/Propagators/twoBodyKeplerData.dat"),
            output_interval: 3600.0,
        }
    }
}

impl BenchmarkConfig {
    /// Full path of the benchmark file
    pub fn path(&self) -> PathBuf {
        self.data_root.join(&self.relative_path)
    }
}

/// Parse benchmark rows into a history keyed by `k · interval`
pub fn parse_benchmark(data: &str, interval: f64) -> Result<PropagationHistory> {
    if !(interval.is_finite() && interval > 0.0) {
        return Err(KeplerError::Configuration(format!(
            "benchmark interval must be positive, got {interval}"
        )));
    }

    let mut history = PropagationHistory::new();
    let rows = data
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    for (k, (line_index, line)) in rows.enumerate() {
        let line_number = line_index + 1;
        let values = line
            .split_whitespace()
            .map(|field| {
                field.parse::<f64>().map_err(|e| {
                    KeplerError::BenchmarkFormat(format!(
                        "line {line_number}: cannot parse '{field}': {e}"
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if values.len() != STATE_DIMENSION + 1 {
            return Err(KeplerError::BenchmarkFormat(format!(
                "line {line_number}: expected {} columns, found {}",
                STATE_DIMENSION + 1,
                values.len()
            )));
        }

        let epoch = k as f64 * interval;
        if (values[0] - epoch).abs() > EPOCH_TOLERANCE {
            return Err(KeplerError::BenchmarkFormat(format!(
                "line {line_number}: time {} does not match row epoch {epoch}",
                values[0]
            )));
        }

        let state = State::new(
            values[1], values[2], values[3], values[4], values[5], values[6],
        );
        history.insert(epoch, state)?;
    }

    Ok(history)
}

/// Read and parse the file named by `config`
pub fn load_benchmark(config: &BenchmarkConfig) -> Result<PropagationHistory> {
    let path = config.path();
    let data = fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    parse_benchmark(&data, config.output_interval)
}

/// Render a history in benchmark row format
///
/// Values use the shortest representation that parses back to the same
/// `f64`.
pub fn format_benchmark(history: &PropagationHistory) -> String {
    let mut out = String::new();
    for (epoch, state) in history.iter() {
        let _ = write!(out, "{epoch}");
        for value in state.as_vector().iter() {
            let _ = write!(out, " {value}");
        }
        out.push('\n');
    }
    out
}

/// Disagreement between a simulated and a reference sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleDifference {
    pub epoch: f64,
    /// Sum of absolute component differences
    pub difference: f64,
}

/// Compare a simulated history against a benchmark, epoch by benchmark epoch
///
/// Fails with [`KeplerError::UnknownEpoch`] when the simulation lacks a
/// benchmark epoch.
pub fn compare_histories(
    simulated: &PropagationHistory,
    benchmark: &PropagationHistory,
) -> Result<Vec<SampleDifference>> {
    benchmark
        .iter()
        .map(|(epoch, expected)| {
            let actual = simulated.state_at(epoch)?;
            Ok(SampleDifference {
                epoch,
                difference: actual.abs_difference_sum(expected),
            })
        })
        .collect()
}
