//! End-to-end checks of the series propagator against an independent
//! Laguerre–Conway reference.
//!
//! The reference trajectory is written to a benchmark file in kilometers,
//! loaded back through the benchmark reader and compared sample by sample.

mod common;

use std::fs;
use std::path::PathBuf;

use common::asterix_initial_state;
use common::reference::reference_state;
use kepler_propagator::benchmark::{
    compare_histories, format_benchmark, load_benchmark, BenchmarkConfig,
};
use kepler_propagator::constants::GM_EARTH;
use kepler_propagator::propagator::propagate_kepler;
use kepler_propagator::units::{history_m_to_km, mu_m3_to_km3, state_m_to_km};
use kepler_propagator::{
    to_keplerian, CentralBody, KeplerError, NewtonRaphson, OrbitRegime, PropagationHistory,
    SeriesConfig, SeriesPropagator, State,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DAY: f64 = 86400.0;
const HOUR: f64 = 3600.0;

/// Maximum summed absolute difference per sample, km and km/s
const BENCHMARK_TOLERANCE: f64 = 1e-6;

/// Reference trajectory in km, sampled every `interval` from t = 0
fn reference_history_km(initial: &State, mu: f64, end: f64, interval: f64) -> PropagationHistory {
    let mut history = PropagationHistory::new();
    let mut k = 0;
    loop {
        let epoch = k as f64 * interval;
        if epoch > end {
            break;
        }
        let state = reference_state(initial, mu, epoch);
        history.insert(epoch, state_m_to_km(&state)).unwrap();
        k += 1;
    }
    history
}

fn write_benchmark_file(name: &str, history: &PropagationHistory) -> BenchmarkConfig {
    let data_root = std::env::temp_dir().join(format!("kepler-benchmark-{}", std::process::id()));
    let relative_path = PathBuf::from(name);
    fs::create_dir_all(&data_root).unwrap();
    fs::write(data_root.join(&relative_path), format_benchmark(history)).unwrap();
    BenchmarkConfig {
        data_root,
        relative_path,
        output_interval: HOUR,
    }
}

fn run_series(initial: State, mu: f64, config: SeriesConfig) -> PropagationHistory {
    let mut series = SeriesPropagator::default();
    let id = series.add_body("Asterix", initial).unwrap();
    series
        .set_central_body(id, CentralBody::new("Earth", mu).unwrap())
        .unwrap();
    series.configure(config).unwrap();
    series.execute().unwrap();
    series.history_at_fixed_intervals(id).unwrap().clone()
}

#[test]
fn test_asterix_matches_benchmark() {
    let initial = asterix_initial_state();
    let benchmark_config = write_benchmark_file(
        "asterix_two_body.dat",
        &reference_history_km(&initial, GM_EARTH, DAY, HOUR),
    );
    let benchmark = load_benchmark(&benchmark_config).unwrap();
    assert_eq!(benchmark.len(), 25);

    let simulated = run_series(
        initial,
        GM_EARTH,
        SeriesConfig {
            start: 0.0,
            end: DAY,
            output_interval: HOUR,
        },
    );
    assert_eq!(simulated.len(), 25);

    let differences = compare_histories(&history_m_to_km(&simulated), &benchmark).unwrap();
    assert_eq!(differences.len(), 25);
    for sample in differences {
        assert!(
            sample.difference <= BENCHMARK_TOLERANCE,
            "t = {} s: difference {:e} exceeds {:e}",
            sample.epoch,
            sample.difference,
            BENCHMARK_TOLERANCE
        );
    }
}

#[test]
fn test_series_detects_perturbed_benchmark() {
    let initial = asterix_initial_state();
    let mut reference = reference_history_km(&initial, GM_EARTH, 4.0 * HOUR, HOUR);
    let (_, last) = reference.last().unwrap();
    let mut nudged = *last;
    nudged.set_z(last.z() + 1e-3);
    reference.insert(4.0 * HOUR, nudged).unwrap();

    let simulated = run_series(
        initial,
        GM_EARTH,
        SeriesConfig {
            start: 0.0,
            end: 4.0 * HOUR,
            output_interval: HOUR,
        },
    );
    let differences = compare_histories(&history_m_to_km(&simulated), &reference).unwrap();
    assert!(differences[..4].iter().all(|s| s.difference <= BENCHMARK_TOLERANCE));
    assert!(differences[4].difference > BENCHMARK_TOLERANCE);
}

#[test]
fn test_benchmark_longer_than_simulation() {
    let initial = asterix_initial_state();
    let reference = reference_history_km(&initial, GM_EARTH, 3.0 * HOUR, HOUR);
    let simulated = run_series(
        initial,
        GM_EARTH,
        SeriesConfig {
            start: 0.0,
            end: HOUR,
            output_interval: HOUR,
        },
    );
    assert!(matches!(
        compare_histories(&history_m_to_km(&simulated), &reference),
        Err(KeplerError::UnknownEpoch(t)) if t == 2.0 * HOUR
    ));
}

#[test]
fn test_kilometer_units_give_same_trajectory() {
    let initial = asterix_initial_state();
    let config = SeriesConfig {
        start: 0.0,
        end: 6.0 * HOUR,
        output_interval: HOUR,
    };
    let in_meters = history_m_to_km(&run_series(initial, GM_EARTH, config));
    let in_km = run_series(state_m_to_km(&initial), mu_m3_to_km3(GM_EARTH), config);

    for sample in compare_histories(&in_km, &in_meters).unwrap() {
        assert!(sample.difference < 1e-8, "t = {}: {:e}", sample.epoch, sample.difference);
    }
}

/// Random state around Earth with a well-defined orbital plane
fn random_state(rng: &mut StdRng) -> State {
    loop {
        let radius = rng.gen_range(6.6e6..4.2e7);
        let speed = (GM_EARTH / radius).sqrt() * rng.gen_range(0.6..2.0);

        let r_dir = nalgebra::Vector3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let v_dir = nalgebra::Vector3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if r_dir.norm() < 0.1 || v_dir.norm() < 0.1 {
            continue;
        }
        let r_hat = r_dir.normalize();
        let v_hat = v_dir.normalize();
        if r_hat.cross(&v_hat).norm() < 0.3 {
            continue;
        }

        return State::from_position_velocity(&(radius * r_hat), &(speed * v_hat));
    }
}

fn assert_matches_reference(state: &State, mu: f64, elapsed: f64, relative: f64) {
    let solver = NewtonRaphson::default();
    let closed_form = propagate_kepler(&solver, state, mu, elapsed).unwrap();
    let reference = reference_state(state, mu, elapsed);

    let scale_r = reference.position().norm().max(state.position().norm());
    let scale_v = reference.velocity().norm().max(state.velocity().norm());
    let dr = (closed_form.position() - reference.position()).norm();
    let dv = (closed_form.velocity() - reference.velocity()).norm();
    assert!(
        dr < relative * scale_r && dv < relative * scale_v,
        "dt = {elapsed}: dr = {dr:e}, dv = {dv:e} from {state}"
    );
}

#[test]
fn test_random_orbits_match_reference() {
    let mut rng = StdRng::seed_from_u64(20_240_611);
    let mut hyperbolic = 0;

    for _ in 0..300 {
        let state = random_state(&mut rng);
        let elapsed = rng.gen_range(-3.0e4..3.0e4);
        if to_keplerian(&state, GM_EARTH).unwrap().regime() == OrbitRegime::Hyperbolic {
            hyperbolic += 1;
        }
        assert_matches_reference(&state, GM_EARTH, elapsed, 1e-8);
    }

    assert!(hyperbolic > 0, "sample never produced a hyperbolic orbit");
}

#[test]
fn test_near_parabolic_orbits_match_reference() {
    let periapsis = 7e6;
    let inclination = 0.4_f64;
    for &offset in &[-1e-8, 1e-8, -1e-6, 1e-6, -1e-4, 1e-4, -1e-2, 1e-2] {
        let e = 1.0 + offset;
        let speed = (GM_EARTH * (1.0 + e) / periapsis).sqrt();
        let at_periapsis = State::new(
            periapsis,
            0.0,
            0.0,
            0.0,
            speed * inclination.cos(),
            speed * inclination.sin(),
        );
        // Also start inbound, half an hour before periapsis.
        let inbound = reference_state(&at_periapsis, GM_EARTH, -1800.0);

        for start in [at_periapsis, inbound] {
            for &elapsed in &[HOUR, -HOUR, DAY] {
                assert_matches_reference(&start, GM_EARTH, elapsed, 1e-10);
            }
        }
    }
}

#[test]
fn test_inclined_orbit_series_matches_reference() {
    // Molniya-like orbit: a ≈ 26 600 km, e ≈ 0.74, i ≈ 63.4°.
    let perigee = 6.9e6;
    let apogee = 4.63e7;
    let a = 0.5 * (perigee + apogee);
    let v_perigee = (GM_EARTH * (2.0 / perigee - 1.0 / a)).sqrt();
    let inclination = 63.4_f64.to_radians();
    let initial = State::new(
        perigee,
        0.0,
        0.0,
        0.0,
        v_perigee * inclination.cos(),
        v_perigee * inclination.sin(),
    );

    let reference = reference_history_km(&initial, GM_EARTH, DAY, HOUR);
    let simulated = run_series(
        initial,
        GM_EARTH,
        SeriesConfig {
            start: 0.0,
            end: DAY,
            output_interval: HOUR,
        },
    );

    for sample in compare_histories(&history_m_to_km(&simulated), &reference).unwrap() {
        assert!(
            sample.difference <= BENCHMARK_TOLERANCE,
            "t = {} s: difference {:e}",
            sample.epoch,
            sample.difference
        );
    }
}
