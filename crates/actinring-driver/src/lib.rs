//! MC step loop and umbrella-sampling iteration loop, wiring
//! `actinring-core`'s move set and biases to `actinring-io`'s sinks.
#![forbid(unsafe_code)]

use std::io::Write;

use anyhow::{Context, Result};
use rand::Rng;
use tracing::{debug, info, warn};

use actinring_core::{
    config::RunControls, radius_move, translation_move, Biases, ConnectivityOracle, Lattice,
    SimParams, System,
};
use actinring_io::{read_bias_restart, OpsSink, VtfSink};

/// Attempt/accept counters for one MC run, split by move type.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveCounters {
    /// Translation moves attempted.
    pub translation_attempts: u64,
    /// Translation moves accepted.
    pub translation_accepts: u64,
    /// Radius moves attempted.
    pub radius_attempts: u64,
    /// Radius moves accepted.
    pub radius_accepts: u64,
}

/// Run `run_controls.steps` MC iterations against `system`/`lattice`,
/// recentering once up front, updating `biases`'s visit counts every step,
/// and emitting sink output every `write_interval` steps.
///
/// `ops_sink`/`vtf_sink` are optional: umbrella-sampling inner blocks often
/// run without either.
pub fn run<OW: Write, VW: Write>(
    system: &mut System,
    lattice: &mut Lattice,
    run_controls: &RunControls,
    biases: &mut Biases,
    oracle: &impl ConnectivityOracle,
    rng: &mut impl Rng,
    mut ops_sink: Option<&mut OpsSink<OW>>,
    mut vtf_sink: Option<&mut VtfSink<VW>>,
) -> Result<MoveCounters> {
    system.recenter(lattice);

    let mut counters = MoveCounters::default();

    for step in 1..=run_controls.steps {
        let outcome = if rng.random_bool(run_controls.radius_move_freq) {
            counters.radius_attempts += 1;
            let outcome = radius_move(system, lattice, biases, oracle, rng)
                .context("radius move failed")?;
            if outcome.accepted {
                counters.radius_accepts += 1;
            }
            outcome
        } else {
            counters.translation_attempts += 1;
            let outcome = translation_move(system, lattice, oracle, rng)
                .context("translation move failed")?;
            if outcome.accepted {
                counters.translation_accepts += 1;
            }
            outcome
        };
        if !outcome.accepted {
            debug!(step, "move rejected");
        }

        biases.update_counts(lattice.height());

        if step % run_controls.write_interval == 0 {
            let consistent = oracle
                .ring_and_system_connected(system, lattice, true)
                .context("connectivity consistency check")?;
            if !consistent {
                warn!(step, "connectivity check failed at write interval");
            }
            system.energy = actinring_core::energy::system_overlap_energy(system, lattice)
                + actinring_core::energy::total_bending_energy(&system.params, lattice.radius());

            if let Some(sink) = ops_sink.as_mut() {
                sink.write_row(step, system.energy, lattice.height(), lattice.radius())?;
            }
            if let Some(sink) = vtf_sink.as_mut() {
                sink.write_frame(system)?;
            }
            debug!(step, energy = system.energy, height = lattice.height(), "write interval");
        }
    }

    info!(
        steps = run_controls.steps,
        translation_accepts = counters.translation_accepts,
        radius_accepts = counters.radius_accepts,
        "MC run complete"
    );
    Ok(counters)
}

/// Seed `biases` per `simparms`: a bias-restart file at `restart_iter` (if
/// `restart_path` is given and `restart_iter > 0`), else the analytical
/// free-energy model, else zero.
pub fn seed_biases(
    biases: &mut Biases,
    simparms: &SimParams,
    system_params: &actinring_core::SystemParams,
    restart_path: Option<&std::path::Path>,
) -> Result<()> {
    if let Some(path) = restart_path {
        if simparms.restart_iter > 0 {
            let enes = read_bias_restart(path, simparms.restart_iter, biases.numbins)
                .context("reading bias restart file")?;
            biases.seed_from(&enes);
            return Ok(());
        }
    }
    if simparms.analytical_biases {
        biases.seed_analytical(system_params);
    } else {
        biases.seed_zero();
    }
    Ok(())
}

/// Run `run_controls.iters` umbrella-sampling iterations. Each iteration
/// runs one MC block (without per-step sinks), then emits counts, updates
/// biases via the iterative flat-histogram scheme, and emits freqs/biases.
///
/// `make_iter_sinks`, if given, is called once per iteration with the
/// iteration index to obtain fresh per-iteration `.ops`/`.vtf` writers
/// (`actinring-cli` wires this to per-iteration file paths derived from
/// `filebase`).
#[allow(clippy::too_many_arguments)]
pub fn run_us<OW: Write, VW: Write>(
    system: &mut System,
    lattice: &mut Lattice,
    run_controls: &RunControls,
    biases: &mut Biases,
    oracle: &impl ConnectivityOracle,
    rng: &mut impl Rng,
    counts_sink: &mut actinring_io::UsSink<impl Write>,
    freqs_sink: &mut actinring_io::UsSink<impl Write>,
    biases_sink: &mut actinring_io::UsSink<impl Write>,
    mut make_iter_sinks: Option<
        &mut dyn FnMut(u64) -> Result<(Option<OpsSink<OW>>, Option<VtfSink<VW>>)>,
    >,
) -> Result<Vec<MoveCounters>> {
    let mut per_iter_counters = Vec::with_capacity(run_controls.iters as usize);

    for iter in 1..=run_controls.iters {
        let (mut ops_sink, mut vtf_sink) = match make_iter_sinks.as_deref_mut() {
            Some(f) => f(iter)?,
            None => (None, None),
        };

        let counters = run(
            system,
            lattice,
            run_controls,
            biases,
            oracle,
            rng,
            ops_sink.as_mut(),
            vtf_sink.as_mut(),
        )
        .with_context(|| format!("US iteration {iter}"))?;

        counts_sink.write_counts_row(&biases.counts)?;
        biases.iterative_update(system.params.temperature, run_controls.max_bias_diff);
        freqs_sink.write_f64_row(&biases.freqs)?;
        biases_sink.write_f64_row(&biases.enes)?;

        let total_accepts = counters.translation_accepts + counters.radius_accepts;
        let total_attempts = counters.translation_attempts + counters.radius_attempts;
        if total_attempts > 0 && total_accepts == 0 {
            warn!(iter, "US iteration accepted zero moves");
        }
        info!(iter, total_accepts, total_attempts, "US iteration complete");

        per_iter_counters.push(counters);
    }

    counts_sink.flush()?;
    freqs_sink.flush()?;
    biases_sink.flush()?;

    Ok(per_iter_counters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actinring_core::{generate_startup_config, SystemParams};
    use actinring_scheduler::DfsConnectivityOracle;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run_controls() -> RunControls {
        RunControls {
            steps: 200,
            write_interval: 50,
            filebase: "test".to_string(),
            max_bias_diff: 0.01,
            radius_move_freq: 0.3,
            iters: 2,
            analytical_biases: false,
            binwidth: 1,
            restart_iter: 0,
            min_height: 3,
            max_height: 40,
            overlap: 2,
            rng_seed: 0,
        }
    }

    fn system_params() -> SystemParams {
        SystemParams {
            ks: 1e-6,
            kd: 1e-6,
            temperature: 300.0,
            delta: 5.4e-9,
            xc: 1e-6,
            ei: 6.9e-26,
            lf_length: 1e-7,
            lf: 4,
            nfil: 4,
            nsca: 2,
        }
    }

    #[test]
    fn run_updates_bias_counts_and_energy() {
        let rc = run_controls();
        let (mut system, mut lattice) =
            generate_startup_config(system_params(), rc.min_height, rc.max_height, rc.overlap)
                .unwrap();
        let mut biases = Biases::new(rc.min_height, rc.max_height, rc.binwidth);
        let oracle = DfsConnectivityOracle;
        let mut rng = StdRng::seed_from_u64(42);

        let mut ops_buf: Vec<u8> = Vec::new();
        let mut ops_sink = OpsSink::new(&mut ops_buf).unwrap();

        let counters = run::<_, &mut Vec<u8>>(
            &mut system,
            &mut lattice,
            &rc,
            &mut biases,
            &oracle,
            &mut rng,
            Some(&mut ops_sink),
            None,
        )
        .unwrap();

        assert_eq!(
            counters.translation_attempts + counters.radius_attempts,
            rc.steps
        );
        assert!(biases.counts.iter().sum::<u64>() == rc.steps);
    }
}
