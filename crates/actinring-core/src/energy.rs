//! Filament bending, crosslinker overlap, and bias energies.

use std::f64::consts::PI;

use crate::biases::Biases;
use crate::filament::Filament;
use crate::lattice::{radius_from_height, Lattice, Pos};
use crate::system::{System, SystemParams};

/// Boltzmann constant (J/K).
pub const KB: f64 = 1.380649e-23;

/// Bending energy of a single filament at radius `r`: `EI*Lf/(2*r^2)`.
#[inline]
#[must_use]
pub fn bending_energy_per_filament(params: &SystemParams, r: f64) -> f64 {
    params.ei * params.lf_length / (2.0 * r * r)
}

/// Total bending energy: all `Nfil` filaments share the same ring radius.
#[inline]
#[must_use]
pub fn total_bending_energy(params: &SystemParams, r: f64) -> f64 {
    params.nfil as f64 * bending_energy_per_filament(params, r)
}

/// Overlap length for one filament: `delta` times the number of occupied
/// sites adjacent (at `x+1` or `x-1`) to any of the filament's own sites,
/// summed without de-duplication (a site with two occupied neighbors counts
/// twice).
#[must_use]
pub fn overlap_length(filament: &Filament, lattice: &Lattice) -> f64 {
    let occ = lattice.occupancy();
    let mut count: u64 = 0;
    for &p in filament.coors() {
        for dx in [-1i64, 1i64] {
            let neighbor = Pos::new(p.x + dx, p.y);
            if let Some(&(fid, _)) = occ.get(&neighbor) {
                if fid != filament.index() {
                    count += 1;
                }
            }
        }
    }
    lattice.delta() * count as f64
}

/// Overlap free energy for overlap length `l`.
///
/// Linear in `l` — this is what makes it valid to recompute only the moved
/// filament's own contribution for a translation delta (see
/// [`filament_overlap_and_bending`]): every shared edge is counted once from
/// each endpoint filament's own tally, so a single filament's delta already
/// carries the full two-sided change, with no `/2` needed.
#[must_use]
pub fn overlap_energy_for_length(params: &SystemParams, l: f64) -> f64 {
    let ratio = params.ks * params.ks * params.xc / (params.kd * (params.ks + params.xc).powi(2));
    -(l * KB * params.temperature / params.delta) * (1.0 + ratio).ln()
}

/// System-wide overlap energy: sum of per-filament contributions, halved
/// because each overlapping pair is counted from both sides.
#[must_use]
pub fn system_overlap_energy(system: &System, lattice: &Lattice) -> f64 {
    let sum: f64 = system
        .filaments
        .iter()
        .map(|f| overlap_energy_for_length(&system.params, overlap_length(f, lattice)))
        .sum();
    sum / 2.0
}

/// Bias energy at the lattice's observable height.
#[inline]
#[must_use]
pub fn bias_energy(biases: &Biases, h: i64) -> f64 {
    biases.enes[biases.bin(h)]
}

/// Total energy: overlap (halved) + bending + bias, at the lattice's
/// observable view.
#[must_use]
pub fn total_energy(system: &System, lattice: &Lattice, biases: &Biases) -> f64 {
    system_overlap_energy(system, lattice)
        + total_bending_energy(&system.params, lattice.radius())
        + bias_energy(biases, lattice.height())
}

/// A single filament's overlap + bending energy at the lattice's observable
/// view and radius.
#[must_use]
pub fn filament_overlap_and_bending(system: &System, filament: &Filament, lattice: &Lattice) -> f64 {
    overlap_energy_for_length(&system.params, overlap_length(filament, lattice))
        + bending_energy_per_filament(&system.params, lattice.radius())
}

/// Delta energy for a translation move affecting only `filament_index`:
/// the moved filament's own overlap+bending energy, current view minus
/// trial view subtracted the other way (trial - current), toggling views
/// idempotently and restoring whichever view was active on entry.
#[must_use]
pub fn delta_energy_translation(system: &mut System, lattice: &mut Lattice, filament_index: u32) -> f64 {
    let restore_current = matches!(lattice.view(), crate::lattice::View::Current);

    system.use_current(lattice);
    let before = {
        let f = system
            .filament(filament_index)
            .expect("filament index must exist");
        filament_overlap_and_bending(system, f, lattice)
    };

    system.use_trial(lattice);
    let after = {
        let f = system
            .filament(filament_index)
            .expect("filament index must exist");
        filament_overlap_and_bending(system, f, lattice)
    };

    if restore_current {
        system.use_current(lattice);
    } else {
        system.use_trial(lattice);
    }

    after - before
}

/// Delta energy for a radius move: total energy (with bias) difference
/// between current and trial views.
#[must_use]
pub fn delta_energy_radius(system: &mut System, lattice: &mut Lattice, biases: &Biases) -> f64 {
    let restore_current = matches!(lattice.view(), crate::lattice::View::Current);

    system.use_current(lattice);
    let before = total_energy(system, lattice, biases);

    system.use_trial(lattice);
    let after = total_energy(system, lattice, biases);

    if restore_current {
        system.use_current(lattice);
    } else {
        system.use_trial(lattice);
    }

    after - before
}

/// Analytical free energy at height `h`, used to seed umbrella-sampling
/// biases. Models the ring as `Nsca` scaffolds plus `Nfil - Nsca`
/// non-scaffold filaments: all overlaps share the scaffold-pair overlap
/// length `L = 2*pi*(r_max - r)/Nsca`, with
/// `Nsca + 2*(Nfil - Nsca)` total overlap instances.
#[must_use]
pub fn analytical_free_energy(params: &SystemParams, max_height: i64, h: i64) -> f64 {
    let r = radius_from_height(params.delta, h);
    let r_max = radius_from_height(params.delta, max_height);
    let l_scaffold = 2.0 * PI * (r_max - r) / params.nsca as f64;
    let overlap_instances = params.nsca as f64 + 2.0 * (params.nfil as f64 - params.nsca as f64);
    let overlap_fe = overlap_instances * overlap_energy_for_length(params, l_scaffold);
    let bending_fe = params.nfil as f64 * bending_energy_per_filament(params, r);
    overlap_fe + bending_fe
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SystemParams {
        SystemParams {
            ks: 1e-6,
            kd: 1e-6,
            temperature: 300.0,
            delta: 5.4e-9,
            xc: 1e-6,
            ei: 6.9e-26,
            lf_length: 1e-7,
            lf: 10,
            nfil: 2,
            nsca: 2,
        }
    }

    #[test]
    fn overlap_energy_is_linear_in_length() {
        let p = params();
        let e1 = overlap_energy_for_length(&p, 1.0 * p.delta);
        let e2 = overlap_energy_for_length(&p, 2.0 * p.delta);
        assert!((e2 - 2.0 * e1).abs() < 1e-30);
    }

    #[test]
    fn bending_energy_decreases_with_radius() {
        let p = params();
        let e_small = bending_energy_per_filament(&p, 1e-8);
        let e_large = bending_energy_per_filament(&p, 1e-7);
        assert!(e_small > e_large);
    }
}
