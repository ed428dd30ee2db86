//! Height-binned umbrella-sampling biases: binning, analytical seeding, and
//! the iterative flat-histogram update.

use crate::energy::{analytical_free_energy, KB};
use crate::system::SystemParams;

/// Fixed binning plus the per-bin count/freq/prob/bias arrays.
#[derive(Clone, Debug)]
pub struct Biases {
    min_height: i64,
    max_height: i64,
    /// Number of bins.
    pub numbins: usize,
    /// Height span covered by one bin (before the last, which may be wider
    /// to absorb remainder).
    pub binwidth: i64,
    /// Sorted ascending interior boundaries, length `numbins - 1`. Height
    /// `h` belongs to the smallest bin `i` with `h < barriers[i]`, else the
    /// last bin.
    pub barriers: Vec<i64>,
    /// Per-iteration visit counts, reset to zero after each bias update.
    pub counts: Vec<u64>,
    /// Per-bin visit frequency from the most recent iteration.
    pub freqs: Vec<f64>,
    /// Per-bin reweighted probability from the most recent iteration.
    pub probs: Vec<f64>,
    /// Per-bin bias energy (Joules), added to the total energy.
    pub enes: Vec<f64>,
}

impl Biases {
    /// Construct bins spanning `[min_height, max_height]` with the given
    /// `binwidth`. `numbins = (max_height - min_height + 1) / binwidth`
    /// (integer division); barriers are evenly spaced at offsets of
    /// `binsize = (max_height - min_height + 1) / numbins` from
    /// `min_height`. If `binwidth == 1`, each height is its own bin.
    #[must_use]
    pub fn new(min_height: i64, max_height: i64, binwidth: i64) -> Self {
        let range = max_height - min_height + 1;
        let numbins = (range / binwidth).max(1) as usize;
        let binsize = range / numbins as i64;
        let barriers = (1..numbins)
            .map(|i| min_height + i as i64 * binsize)
            .collect();

        Self {
            min_height,
            max_height,
            numbins,
            binwidth,
            barriers,
            counts: vec![0; numbins],
            freqs: vec![0.0; numbins],
            probs: vec![0.0; numbins],
            enes: vec![0.0; numbins],
        }
    }

    /// Bin index for height `h`: the smallest `i` with `h < barriers[i]`,
    /// else `numbins - 1`.
    #[must_use]
    pub fn bin(&self, h: i64) -> usize {
        self.barriers
            .iter()
            .position(|&b| h < b)
            .unwrap_or(self.numbins - 1)
    }

    /// Increment the visit count for `h`'s bin.
    pub fn update_counts(&mut self, h: i64) {
        let i = self.bin(h);
        self.counts[i] += 1;
    }

    /// Inclusive height bounds covered by bin `i`.
    #[must_use]
    pub fn bin_bounds(&self, i: usize) -> (i64, i64) {
        let lower = if i == 0 {
            self.min_height
        } else {
            self.barriers[i - 1]
        };
        let upper = if i == self.numbins - 1 {
            self.max_height
        } else {
            self.barriers[i] - 1
        };
        (lower, upper)
    }

    /// Zero all biases (umbrella sampling started from scratch).
    pub fn seed_zero(&mut self) {
        self.enes.iter_mut().for_each(|e| *e = 0.0);
    }

    /// Seed biases from the analytical free-energy model: per bin, the
    /// negative of the free energy at both bin endpoints, averaged.
    pub fn seed_analytical(&mut self, params: &SystemParams) {
        for i in 0..self.numbins {
            let (lo, hi) = self.bin_bounds(i);
            let f_lo = analytical_free_energy(params, self.max_height, lo);
            let f_hi = analytical_free_energy(params, self.max_height, hi);
            self.enes[i] = -(f_lo + f_hi) / 2.0;
        }
    }

    /// Load biases from an externally supplied `enes` vector (bias restart).
    ///
    /// # Panics
    /// Panics if `enes.len() != self.numbins` — a mismatched restart file is
    /// a caller error, not a recoverable runtime condition.
    pub fn seed_from(&mut self, enes: &[f64]) {
        assert_eq!(enes.len(), self.numbins, "bias restart length mismatch");
        self.enes.copy_from_slice(enes);
    }

    /// One iterative flat-histogram update (WHAM-free scheme). Given the
    /// counts accumulated over one umbrella-sampling iteration:
    ///
    /// - `freq_i = c_i / S` (0 if `c_i == 0`)
    /// - `prob_i = c_i * exp(U_i / kT) / Z` (0 if `c_i == 0`)
    /// - if `c_i == 0`: `dU_i = -max_bias_diff * kT` (never takes `log(0)`)
    /// - else: `dU_i = kT * ln(prob_i) - U_i`, clamped to `+-max_bias_diff * kT`
    /// - `U_i += dU_i`; `c_i` reset to zero.
    pub fn iterative_update(&mut self, temperature: f64, max_bias_diff: f64) {
        let kbt = KB * temperature;
        let total: u64 = self.counts.iter().sum();
        if total == 0 {
            return;
        }
        let z: f64 = self
            .counts
            .iter()
            .zip(&self.enes)
            .map(|(&c, &u)| c as f64 * (u / kbt).exp())
            .sum();
        let clamp = max_bias_diff * kbt;

        for i in 0..self.numbins {
            let c = self.counts[i];
            if c == 0 {
                self.freqs[i] = 0.0;
                self.probs[i] = 0.0;
                self.enes[i] += -clamp;
            } else {
                let freq = c as f64 / total as f64;
                let prob = c as f64 * (self.enes[i] / kbt).exp() / z;
                self.freqs[i] = freq;
                self.probs[i] = prob;
                let d_u = (kbt * prob.ln() - self.enes[i]).clamp(-clamp, clamp);
                self.enes[i] += d_u;
            }
            self.counts[i] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_cover_full_range_and_barriers_increase() {
        let b = Biases::new(4, 43, 4);
        assert_eq!(b.numbins, 10);
        for w in b.barriers.windows(2) {
            assert!(w[0] < w[1]);
        }
        for h in 4..=43 {
            let i = b.bin(h);
            assert!(i < b.numbins);
        }
    }

    #[test]
    fn single_height_bins_when_binwidth_one() {
        let b = Biases::new(0, 9, 1);
        assert_eq!(b.numbins, 10);
        assert_eq!(b.bin(0), 0);
        assert_eq!(b.bin(9), 9);
    }

    #[test]
    fn uniform_counts_give_uniform_freqs() {
        let mut b = Biases::new(0, 9, 1);
        for i in 0..b.numbins {
            b.counts[i] = 100;
        }
        b.iterative_update(300.0, 0.01);
        for f in &b.freqs {
            assert!((f - 0.1).abs() < 1e-12);
        }
        // counts reset after update
        assert!(b.counts.iter().all(|&c| c == 0));
    }

    #[test]
    fn empty_bin_gets_maximally_negative_update() {
        let mut b = Biases::new(0, 9, 1);
        b.counts[0] = 0;
        b.counts[1] = 50;
        let kbt = KB * 300.0;
        let before = b.enes[0];
        b.iterative_update(300.0, 0.01);
        assert!((b.enes[0] - (before - 0.01 * kbt)).abs() < 1e-40);
    }

    #[test]
    fn iterative_update_clamps_large_positive_delta() {
        // Bin 0 starts at a deeply negative bias and is heavily visited;
        // its reweighted probability stays far below 1 while `-enes[0]`
        // alone already exceeds the clamp, so the raw delta overshoots
        // `+clamp` and must saturate there rather than apply in full.
        let mut b = Biases::new(0, 1, 1);
        b.counts[0] = 999;
        b.counts[1] = 1;
        b.enes[0] = -1e-19;
        let kbt = KB * 300.0;
        let max_bias_diff = 1e-6;
        let clamp = max_bias_diff * kbt;
        let before = b.enes[0];
        b.iterative_update(300.0, max_bias_diff);
        assert!((b.enes[0] - (before + clamp)).abs() < 1e-40);
    }

    #[test]
    fn seed_analytical_produces_a_unimodal_bias_profile() {
        // Nsca=2, Nfil=2, lf=10, delta=5.4e-9, EI=6.9e-26, T=300, Xc=1e-6,
        // ks=kd=1e-6; lf_length is left at a small value the scenario does
        // not name, chosen so the bending term does not swamp the overlap
        // term across the whole height range. The analytical free energy
        // this seeds from has an interior minimum (bending dominates near
        // small radii, overlap dominates near the fully extended radius),
        // so the bias that cancels it out — `enes = -(f_lo+f_hi)/2` — rises
        // to a single interior peak and falls away on both sides.
        let params = SystemParams {
            ks: 1e-6,
            kd: 1e-6,
            temperature: 300.0,
            delta: 5.4e-9,
            xc: 1e-6,
            ei: 6.9e-26,
            lf_length: 1e-10,
            lf: 10,
            nfil: 2,
            nsca: 2,
        };
        let mut b = Biases::new(0, 200, 1);
        b.seed_analytical(&params);

        let (peak, _) = b
            .enes
            .iter()
            .enumerate()
            .max_by(|a, c| a.1.partial_cmp(c.1).unwrap())
            .unwrap();
        assert!(
            peak > 0 && peak < b.enes.len() - 1,
            "expected the bias peak away from both boundaries, got index {peak}"
        );
        for w in b.enes[..=peak].windows(2) {
            assert!(w[0] < w[1], "expected the bias to rise monotonically up to its peak");
        }
        for w in b.enes[peak..].windows(2) {
            assert!(w[0] > w[1], "expected the bias to fall monotonically past its peak");
        }
    }
}
