//! Deterministic uniform-overlap startup configuration.

use crate::error::CoreError;
use crate::filament::Filament;
use crate::lattice::{Lattice, Pos};
use crate::system::{System, SystemParams};

/// Build the initial system and lattice at height `min_height` (the densest,
/// maximum-overlap configuration), with `overlap` sites shared between
/// adjacent scaffold filaments.
///
/// Walks `x = 0, 1, 2, ...` in vertical stripes: on even `x` a column starts
/// at `y = 0`, on odd `x` at `y = lf - overlap`; each column places
/// `Nsca/2` filaments, stepping `y` by `lf - 2*overlap` between them
/// (wrapping modulo `min_height + 1`). Placement continues, column by
/// column, until `Nfil` filaments exist; indices are assigned 1..=Nfil in
/// placement order.
///
/// # Errors
/// Returns [`CoreError::StartupPrecondition`] if `Nsca` or `lf` is odd.
pub fn generate_startup_config(
    params: SystemParams,
    min_height: i64,
    max_height: i64,
    overlap: usize,
) -> Result<(System, Lattice), CoreError> {
    if params.nsca % 2 != 0 {
        return Err(CoreError::StartupPrecondition(format!(
            "Nsca must be even, got {}",
            params.nsca
        )));
    }
    if params.lf % 2 != 0 {
        return Err(CoreError::StartupPrecondition(format!(
            "lf must be even, got {}",
            params.lf
        )));
    }

    let period = min_height + 1;
    let per_column = (params.nsca / 2) as usize;
    let step = params.lf - 2 * overlap;

    let mut filaments = Vec::with_capacity(params.nfil as usize);
    let mut next_index: u32 = 1;
    let mut x: i64 = 0;

    'placement: loop {
        let y_start: i64 = if x % 2 == 0 {
            0
        } else {
            (params.lf as i64 - overlap as i64).rem_euclid(period)
        };

        for j in 0..per_column {
            let y0 = (y_start + j as i64 * step as i64).rem_euclid(period);
            let sites: Vec<Pos> = (0..params.lf)
                .map(|i| Pos::new(x, (y0 + i as i64).rem_euclid(period)))
                .collect();
            filaments.push(Filament::new(next_index, sites));
            next_index += 1;
            if filaments.len() as u32 >= params.nfil {
                break 'placement;
            }
        }
        x += 1;
    }

    let mut lattice = Lattice::new(params.delta, min_height, max_height, min_height);
    let mut system = System::new(params, filaments);
    system.update_occupancies(&mut lattice);

    Ok((system, lattice))
}
