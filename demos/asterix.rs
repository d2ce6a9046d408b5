//! Asterix two-body propagation around Earth
//!
//! Samples one day of Keplerian motion every hour and prints the trajectory
//! in kilometers. If a benchmark file is found under `KEPLER_DATA_ROOT`, the
//! samples are compared against it.
//!
//! Usage: RUST_LOG=debug cargo run --example asterix

use kepler_propagator::benchmark::{compare_histories, load_benchmark, BenchmarkConfig};
use kepler_propagator::constants::GM_EARTH;
use kepler_propagator::units::history_m_to_km;
use kepler_propagator::{to_keplerian, CentralBody, SeriesConfig, SeriesPropagator, State};
use tracing_subscriber::EnvFilter;

fn main() -> kepler_propagator::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let initial = State::new(6.75e6, 0.0, 0.0, 0.0, 8059.5973215, 0.0);
    let elements = to_keplerian(&initial, GM_EARTH)?;
    println!("Initial orbit: {elements}");
    if let Some(period) = elements.period(GM_EARTH) {
        println!("Period: {:.3} s", period);
    }

    let mut series = SeriesPropagator::default();
    let asterix = series.add_body("Asterix", initial)?;
    series.set_central_body(asterix, CentralBody::new("Earth", GM_EARTH)?)?;
    series.configure(SeriesConfig {
        start: 0.0,
        end: 86400.0,
        output_interval: 3600.0,
    })?;
    series.execute()?;

    let history = history_m_to_km(series.history(asterix)?);
    println!(
        "\n{:>8}  {:>14} {:>14} {:>14}  {:>10} {:>10} {:>10}",
        "t [s]", "x [km]", "y [km]", "z [km]", "vx [km/s]", "vy [km/s]", "vz [km/s]"
    );
    for (t, s) in history.iter() {
        println!(
            "{:>8.0}  {:>14.6} {:>14.6} {:>14.6}  {:>10.6} {:>10.6} {:>10.6}",
            t,
            s.x(),
            s.y(),
            s.z(),
            s.x_dot(),
            s.y_dot(),
            s.z_dot()
        );
    }

    let config = BenchmarkConfig::default();
    if config.path().is_file() {
        println!("\nComparing with {}", config.path().display());
        let benchmark = load_benchmark(&config)?;
        for sample in compare_histories(&history, &benchmark)? {
            println!("  t = {:>8.0} s  |Δ| = {:.3e}", sample.epoch, sample.difference);
        }
    } else {
        println!("\nNo benchmark file at {}", config.path().display());
    }

    Ok(())
}
