//! Property tests for the testable invariants named in the core's design:
//! periodic wrap at the seam, bin-boundary well-formedness, and energy
//! additivity.

use proptest::prelude::*;

use actinring_core::energy::{bias_energy, system_overlap_energy, total_bending_energy, total_energy};
use actinring_core::{generate_startup_config, Biases, Lattice, Pos, SystemParams};

fn params(nfil: u32, nsca: u32, lf: usize) -> SystemParams {
    SystemParams {
        ks: 1e-6,
        kd: 1e-6,
        temperature: 300.0,
        delta: 5.4e-9,
        xc: 1e-6,
        ei: 6.9e-26,
        lf_length: 1e-7,
        lf,
        nfil,
        nsca,
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    /// `wrap(pos)` applied to `y = H+1` yields `y = 0`; applied to `y = -1`
    /// yields `y = H`, for any height and any x.
    #[test]
    fn wrap_above_and_below_height(h in 1i64..200, x in -50i64..50) {
        let lat = Lattice::new(1.0, 0, 500, h);
        let above = lat.wrap(Pos::new(x, h + 1));
        prop_assert_eq!(above.y, 0);
        let below = lat.wrap(Pos::new(x, -1));
        prop_assert_eq!(below.y, h);
    }

    /// For any `min_height`/`max_height`/`binwidth` whose range divides
    /// evenly, every height in range maps to a bin index in `[0, numbins)`
    /// and barriers are strictly increasing.
    #[test]
    fn bin_indices_always_in_range(min_h in 0i64..10, span_mult in 1i64..20, binwidth in 1i64..6) {
        let span = span_mult * binwidth;
        let max_h = min_h + span - 1;
        let b = Biases::new(min_h, max_h, binwidth);

        for w in b.barriers.windows(2) {
            prop_assert!(w[0] < w[1]);
        }
        for h in min_h..=max_h {
            let i = b.bin(h);
            prop_assert!(i < b.numbins);
        }
    }
}

/// `total_energy` is exactly the sum of system overlap (halved), total
/// bending, and bias — no hidden cross term.
#[test]
fn energy_additivity_matches_sum_of_parts() {
    let p = params(4, 2, 4);
    let (system, lattice) = generate_startup_config(p, 3, 40, 2).unwrap();
    let biases = Biases::new(3, 40, 1);

    let total = total_energy(&system, &lattice, &biases);
    let expected = system_overlap_energy(&system, &lattice)
        + total_bending_energy(&system.params, lattice.radius())
        + bias_energy(&biases, lattice.height());

    assert!((total - expected).abs() < 1e-30);
}
