//! External, serde-deserializable run configuration and its validation into
//! the typed parameter bundles the core actually runs on.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::system::SystemParams;

/// The external configuration bundle: the same JSON shape the `.parms` sink
/// writes, plus the run-control and startup fields the sink doesn't carry.
/// Unknown fields are ignored (forward compatible).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Sites per filament.
    pub lf: usize,
    /// Temperature (K).
    pub t: f64,
    /// Crosslinker dissociation rate constant.
    pub kd: f64,
    /// Crosslinker association rate constant.
    pub ks: f64,
    /// Filament bending rigidity.
    pub ei: f64,
    /// Physical filament length.
    pub lf_length: f64,
    /// Crosslinker concentration.
    pub xc: f64,
    /// Total number of filaments.
    pub nfil: u32,
    /// Number of scaffold filaments.
    pub nsca: u32,
    /// Lattice spacing (m).
    pub delta: f64,
    /// Number of MC steps per run (or per US iteration).
    pub steps: u64,
    /// Emit a sink row/frame every this many steps.
    pub write_interval: u64,
    /// Output file stem; sink extensions are appended to it.
    pub filebase: String,
    /// Clamp on a single bias update, in units of `kB*T`.
    pub max_bias_diff: f64,
    /// Fraction of moves that are radius moves rather than translations.
    pub radius_move_freq: f64,
    /// Number of umbrella-sampling iterations.
    pub iters: u64,
    /// Seed biases from the analytical free-energy model rather than zero.
    pub analytical_biases: bool,
    /// Height span covered by one bias bin.
    pub binwidth: i64,
    /// Iteration index to restart bias values from (0 = no restart).
    pub restart_iter: u64,
    /// Lower bound on lattice height.
    pub min_height: i64,
    /// Upper bound on lattice height.
    pub max_height: i64,
    /// Startup overlap (sites shared between adjacent scaffold filaments).
    pub overlap: usize,
    /// RNG seed for the single move-proposal stream.
    pub rng_seed: u64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            lf: 4,
            t: 300.0,
            kd: 1e-6,
            ks: 1e-6,
            ei: 6.9e-26,
            lf_length: 1e-7,
            xc: 1e-6,
            nfil: 4,
            nsca: 2,
            delta: 5.4e-9,
            steps: 100_000,
            write_interval: 1000,
            filebase: "run".to_string(),
            max_bias_diff: 0.01,
            radius_move_freq: 0.5,
            iters: 10,
            analytical_biases: false,
            binwidth: 1,
            restart_iter: 0,
            min_height: 3,
            max_height: 40,
            overlap: 2,
            rng_seed: 0,
        }
    }
}

/// Run controls that don't belong on [`SystemParams`] (physical/geometric
/// only) but are still needed end to end by the driver and I/O adapters.
#[derive(Clone, Debug)]
pub struct RunControls {
    /// Number of MC steps per run (or per US iteration).
    pub steps: u64,
    /// Emit a sink row/frame every this many steps.
    pub write_interval: u64,
    /// Output file stem.
    pub filebase: String,
    /// Clamp on a single bias update, in units of `kB*T`.
    pub max_bias_diff: f64,
    /// Fraction of moves that are radius moves.
    pub radius_move_freq: f64,
    /// Number of umbrella-sampling iterations.
    pub iters: u64,
    /// Seed biases analytically rather than from zero.
    pub analytical_biases: bool,
    /// Bin width for the bias histogram.
    pub binwidth: i64,
    /// Restart iteration (0 = no restart).
    pub restart_iter: u64,
    /// Lower bound on lattice height.
    pub min_height: i64,
    /// Upper bound on lattice height.
    pub max_height: i64,
    /// Startup overlap.
    pub overlap: usize,
    /// RNG seed.
    pub rng_seed: u64,
}

impl SimParams {
    /// Validate ranges and cross-field preconditions, splitting into the
    /// physical [`SystemParams`] bundle and the remaining [`RunControls`].
    ///
    /// # Errors
    /// Returns [`ConfigError`] if any field is out of range, if `Nsca` or
    /// `lf` is odd, if `Nsca > Nfil`, or if `binwidth` doesn't evenly divide
    /// `max_height - min_height + 1`.
    pub fn validate(&self) -> Result<(SystemParams, RunControls), ConfigError> {
        if self.lf == 0 {
            return Err(ConfigError::OutOfRange {
                field: "lf",
                reason: "must be nonzero".to_string(),
            });
        }
        if self.lf % 2 != 0 {
            return Err(ConfigError::Inconsistent {
                reason: format!("lf must be even, got {}", self.lf),
            });
        }
        if self.nsca % 2 != 0 {
            return Err(ConfigError::Inconsistent {
                reason: format!("Nsca must be even, got {}", self.nsca),
            });
        }
        if self.nsca > self.nfil {
            return Err(ConfigError::Inconsistent {
                reason: format!("Nsca ({}) must be <= Nfil ({})", self.nsca, self.nfil),
            });
        }
        if self.nfil == 0 {
            return Err(ConfigError::OutOfRange {
                field: "nfil",
                reason: "must be nonzero".to_string(),
            });
        }
        if self.t <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "t",
                reason: "temperature must be positive".to_string(),
            });
        }
        if self.delta <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "delta",
                reason: "lattice spacing must be positive".to_string(),
            });
        }
        if self.max_height <= self.min_height {
            return Err(ConfigError::Inconsistent {
                reason: format!(
                    "max_height ({}) must exceed min_height ({})",
                    self.max_height, self.min_height
                ),
            });
        }
        if self.binwidth <= 0 {
            return Err(ConfigError::OutOfRange {
                field: "binwidth",
                reason: "must be positive".to_string(),
            });
        }
        let range = self.max_height - self.min_height + 1;
        if range % self.binwidth != 0 {
            return Err(ConfigError::Inconsistent {
                reason: format!(
                    "binwidth ({}) must evenly divide the height range ({})",
                    self.binwidth, range
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.radius_move_freq) {
            return Err(ConfigError::OutOfRange {
                field: "radius_move_freq",
                reason: "must be in [0, 1]".to_string(),
            });
        }

        let system_params = SystemParams {
            ks: self.ks,
            kd: self.kd,
            temperature: self.t,
            delta: self.delta,
            xc: self.xc,
            ei: self.ei,
            lf_length: self.lf_length,
            lf: self.lf,
            nfil: self.nfil,
            nsca: self.nsca,
        };
        let run_controls = RunControls {
            steps: self.steps,
            write_interval: self.write_interval,
            filebase: self.filebase.clone(),
            max_bias_diff: self.max_bias_diff,
            radius_move_freq: self.radius_move_freq,
            iters: self.iters,
            analytical_biases: self.analytical_biases,
            binwidth: self.binwidth,
            restart_iter: self.restart_iter,
            min_height: self.min_height,
            max_height: self.max_height,
            overlap: self.overlap,
            rng_seed: self.rng_seed,
        };
        Ok((system_params, run_controls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        let p = SimParams::default();
        assert!(p.validate().is_ok());
    }

    #[test]
    fn odd_nsca_rejected() {
        let mut p = SimParams::default();
        p.nsca = 3;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::Inconsistent { .. })
        ));
    }

    #[test]
    fn nsca_greater_than_nfil_rejected() {
        let mut p = SimParams::default();
        p.nsca = 6;
        p.nfil = 4;
        assert!(p.validate().is_err());
    }

    #[test]
    fn binwidth_must_evenly_divide_height_range() {
        let mut p = SimParams::default();
        p.min_height = 0;
        p.max_height = 9; // range 10
        p.binwidth = 3;
        assert!(p.validate().is_err());
        p.binwidth = 5;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn deserializes_from_json_ignoring_unknown_fields() {
        let json = r#"{"lf": 6, "nfil": 6, "nsca": 2, "future_field": 42}"#;
        let p: SimParams = serde_json::from_str(json).unwrap();
        assert_eq!(p.lf, 6);
        assert_eq!(p.nfil, 6);
    }
}
