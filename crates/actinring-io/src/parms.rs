//! `.parms` JSON parameter dump and the bias-restart text-matrix reader.

use std::io::BufRead;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use actinring_core::{RunControls, SystemParams};

use crate::util::{create_buffered, open_buffered};

/// The JSON shape written to `.parms`: `{lf, T, kd, ks, EI, Lf, Xc, Nfil,
/// Nsca, delta, steps, write_interval, filebase, max_bias_diff,
/// radius_move_freq, iters, analytical_biases, binwidth}`.
#[derive(Debug, Serialize)]
struct ParmsDoc {
    lf: usize,
    #[serde(rename = "T")]
    t: f64,
    kd: f64,
    ks: f64,
    #[serde(rename = "EI")]
    ei: f64,
    #[serde(rename = "Lf")]
    lf_length: f64,
    #[serde(rename = "Xc")]
    xc: f64,
    #[serde(rename = "Nfil")]
    nfil: u32,
    #[serde(rename = "Nsca")]
    nsca: u32,
    delta: f64,
    steps: u64,
    write_interval: u64,
    filebase: String,
    max_bias_diff: f64,
    radius_move_freq: f64,
    iters: u64,
    analytical_biases: bool,
    binwidth: i64,
}

/// Write the `.parms` sink: a single pretty JSON object.
pub fn write_parms(path: &Path, params: &SystemParams, controls: &RunControls) -> Result<()> {
    let doc = ParmsDoc {
        lf: params.lf,
        t: params.temperature,
        kd: params.kd,
        ks: params.ks,
        ei: params.ei,
        lf_length: params.lf_length,
        xc: params.xc,
        nfil: params.nfil,
        nsca: params.nsca,
        delta: params.delta,
        steps: controls.steps,
        write_interval: controls.write_interval,
        filebase: controls.filebase.clone(),
        max_bias_diff: controls.max_bias_diff,
        radius_move_freq: controls.radius_move_freq,
        iters: controls.iters,
        analytical_biases: controls.analytical_biases,
        binwidth: controls.binwidth,
    };
    let mut writer = create_buffered(path)?;
    serde_json::to_writer_pretty(&mut writer, &doc).context("serialize .parms JSON")?;
    use std::io::Write as _;
    writer.flush().context("flush .parms sink")?;
    Ok(())
}

/// Read a bias-restart matrix: header line skipped, then row `restart_iter`
/// (0-based, following the header) supplies `enes` (length `numbins`),
/// whitespace-delimited.
///
/// # Errors
/// Returns an error if `restart_iter` is beyond the number of data rows, or
/// if a row doesn't parse as `numbins` floats.
pub fn read_bias_restart(path: &Path, restart_iter: u64, numbins: usize) -> Result<Vec<f64>> {
    let reader = open_buffered(path)?;
    let mut lines = reader.lines();
    lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("bias restart file {} is empty", path.display()))??;

    let target = restart_iter as usize;
    for (i, line) in lines.enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        if i != target {
            continue;
        }
        let enes: Vec<f64> = line
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .with_context(|| format!("parsing bias restart row {target}"))?;
        if enes.len() != numbins {
            bail!(
                "bias restart row {target} has {} values, expected {numbins}",
                enes.len()
            );
        }
        return Ok(enes);
    }
    bail!(
        "bias restart file {} has no row {target}",
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

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

    fn controls() -> RunControls {
        RunControls {
            steps: 100,
            write_interval: 10,
            filebase: "run".to_string(),
            max_bias_diff: 0.01,
            radius_move_freq: 0.5,
            iters: 5,
            analytical_biases: false,
            binwidth: 1,
            restart_iter: 0,
            min_height: 3,
            max_height: 40,
            overlap: 2,
            rng_seed: 0,
        }
    }

    #[test]
    fn writes_expected_json_keys() {
        let dir = std::env::temp_dir().join("actinring_parms_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("run.parms");
        write_parms(&path, &system_params(), &controls()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["Nfil"], 4);
        assert_eq!(v["Nsca"], 2);
        assert_eq!(v["lf"], 4);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn reads_requested_restart_row() {
        let dir = std::env::temp_dir().join("actinring_bias_restart_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("run.biases");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "3 4 5 6").unwrap();
        writeln!(f, "0.1 0.2 0.3 0.4").unwrap();
        writeln!(f, "0.5 0.6 0.7 0.8").unwrap();
        drop(f);

        let row0 = read_bias_restart(&path, 0, 4).unwrap();
        assert_eq!(row0, vec![0.1, 0.2, 0.3, 0.4]);
        let row1 = read_bias_restart(&path, 1, 4).unwrap();
        assert_eq!(row1, vec![0.5, 0.6, 0.7, 0.8]);
        let _ = std::fs::remove_file(path);
    }
}
