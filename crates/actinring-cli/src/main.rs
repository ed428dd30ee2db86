#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use actinring_core::config::SimParams;
use actinring_core::generate_startup_config;
use actinring_io::{OpsSink, UsSink, VtfSink};
use actinring_scheduler::DfsConnectivityOracle;

#[derive(Parser, Debug)]
#[command(
    name = "actinring",
    about = "Actin-ring Monte Carlo sampler",
    long_about = "Samples equilibrium configurations of a ring-shaped assembly of\nsemi-flexible filaments on a cylindrical lattice, via Metropolis MC\nwith optional umbrella sampling for flat histograms across ring size.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run a single Metropolis MC block: writes `.parms`, `.ops`, `.vtf`.
    Run {
        /// Path to a JSON configuration file (see `SimParams`).
        #[arg(long)]
        config: PathBuf,
    },

    /// Run the umbrella-sampling iteration loop: writes `.parms`, `.counts`,
    /// `.freqs`, `.biases`, plus per-iteration `.ops`/`.vtf`.
    Us {
        /// Path to a JSON configuration file (see `SimParams`).
        #[arg(long)]
        config: PathBuf,

        /// Bias-restart text matrix to seed from, instead of analytical or
        /// zero seeding (honors `restart_iter` in the config).
        #[arg(long)]
        restart_biases: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Run { config } => run(&config),
        Cmd::Us {
            config,
            restart_biases,
        } => us(&config, restart_biases.as_deref()),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn load_config(path: &Path) -> Result<SimParams> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
}

fn run(config_path: &Path) -> Result<()> {
    let simparms = load_config(config_path)?;
    let (system_params, run_controls) = simparms
        .validate()
        .context("validating simulation parameters")?;

    let (mut system, mut lattice) = generate_startup_config(
        system_params,
        run_controls.min_height,
        run_controls.max_height,
        run_controls.overlap,
    )
    .context("generating startup configuration")?;

    actinring_io::write_parms(
        &parms_path(&run_controls.filebase),
        &system.params,
        &run_controls,
    )
    .context("writing .parms sink")?;

    let mut biases = actinring_core::Biases::new(
        run_controls.min_height,
        run_controls.max_height,
        run_controls.binwidth,
    );
    actinring_driver::seed_biases(&mut biases, &simparms, &system.params, None)
        .context("seeding biases")?;

    let oracle = DfsConnectivityOracle;
    let mut rng = StdRng::seed_from_u64(run_controls.rng_seed);

    let mut ops_sink = OpsSink::create(&ops_path(&run_controls.filebase, None))
        .context("opening .ops sink")?;
    let mut vtf_sink = VtfSink::create(&vtf_path(&run_controls.filebase, None), &system)
        .context("opening .vtf sink")?;

    let counters = actinring_driver::run(
        &mut system,
        &mut lattice,
        &run_controls,
        &mut biases,
        &oracle,
        &mut rng,
        Some(&mut ops_sink),
        Some(&mut vtf_sink),
    )
    .context("running MC block")?;

    ops_sink.flush()?;
    vtf_sink.flush()?;

    info!(
        translation_accepts = counters.translation_accepts,
        translation_attempts = counters.translation_attempts,
        radius_accepts = counters.radius_accepts,
        radius_attempts = counters.radius_attempts,
        "run complete"
    );
    println!(
        "Ran {} steps -> {} ({} translation accepts, {} radius accepts)",
        run_controls.steps,
        run_controls.filebase,
        counters.translation_accepts,
        counters.radius_accepts
    );
    Ok(())
}

fn us(config_path: &Path, restart_biases: Option<&Path>) -> Result<()> {
    let simparms = load_config(config_path)?;
    let (system_params, run_controls) = simparms
        .validate()
        .context("validating simulation parameters")?;

    let (mut system, mut lattice) = generate_startup_config(
        system_params,
        run_controls.min_height,
        run_controls.max_height,
        run_controls.overlap,
    )
    .context("generating startup configuration")?;

    actinring_io::write_parms(
        &parms_path(&run_controls.filebase),
        &system.params,
        &run_controls,
    )
    .context("writing .parms sink")?;

    let mut biases = actinring_core::Biases::new(
        run_controls.min_height,
        run_controls.max_height,
        run_controls.binwidth,
    );
    actinring_driver::seed_biases(&mut biases, &simparms, &system.params, restart_biases)
        .context("seeding biases")?;

    let oracle = DfsConnectivityOracle;
    let mut rng = StdRng::seed_from_u64(run_controls.rng_seed);

    let mut counts_sink = UsSink::create(
        &us_sink_path(&run_controls.filebase, "counts"),
        run_controls.min_height,
        run_controls.max_height,
    )
    .context("opening .counts sink")?;
    let mut freqs_sink = UsSink::create(
        &us_sink_path(&run_controls.filebase, "freqs"),
        run_controls.min_height,
        run_controls.max_height,
    )
    .context("opening .freqs sink")?;
    let mut biases_sink = UsSink::create(
        &us_sink_path(&run_controls.filebase, "biases"),
        run_controls.min_height,
        run_controls.max_height,
    )
    .context("opening .biases sink")?;

    let filebase = run_controls.filebase.clone();
    let topology: Vec<(u32, usize)> = system
        .filaments
        .iter()
        .map(|f| (f.index(), f.lf()))
        .collect();
    let mut make_iter_sinks = move |iter: u64| -> Result<(
        Option<OpsSink<BufWriter<File>>>,
        Option<VtfSink<BufWriter<File>>>,
    )> {
        let ops = OpsSink::create(&ops_path(&filebase, Some(iter)))
            .with_context(|| format!("opening .ops sink for iteration {iter}"))?;
        let vtf = VtfSink::create_from_topology(&vtf_path(&filebase, Some(iter)), &topology)
            .with_context(|| format!("opening .vtf sink for iteration {iter}"))?;
        Ok((Some(ops), Some(vtf)))
    };

    let per_iter = actinring_driver::run_us(
        &mut system,
        &mut lattice,
        &run_controls,
        &mut biases,
        &oracle,
        &mut rng,
        &mut counts_sink,
        &mut freqs_sink,
        &mut biases_sink,
        Some(&mut make_iter_sinks),
    )
    .context("running umbrella-sampling iterations")?;

    info!(iterations = per_iter.len(), "umbrella sampling complete");
    println!(
        "Ran {} US iterations of {} steps each -> {}",
        run_controls.iters, run_controls.steps, run_controls.filebase
    );
    Ok(())
}

fn parms_path(filebase: &str) -> PathBuf {
    PathBuf::from(format!("{filebase}.parms"))
}

fn ops_path(filebase: &str, iter: Option<u64>) -> PathBuf {
    match iter {
        Some(i) => PathBuf::from(format!("{filebase}_iter{i}.ops")),
        None => PathBuf::from(format!("{filebase}.ops")),
    }
}

fn vtf_path(filebase: &str, iter: Option<u64>) -> PathBuf {
    match iter {
        Some(i) => PathBuf::from(format!("{filebase}_iter{i}.vtf")),
        None => PathBuf::from(format!("{filebase}.vtf")),
    }
}

fn us_sink_path(filebase: &str, ext: &str) -> PathBuf {
    PathBuf::from(format!("{filebase}.{ext}"))
}
