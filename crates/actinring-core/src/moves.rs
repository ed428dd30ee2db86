//! Translation and radius moves, with trial/current state discipline and
//! Metropolis acceptance.

use rand::Rng;

use crate::biases::Biases;
use crate::connectivity::ConnectivityOracle;
use crate::energy::{delta_energy_radius, delta_energy_translation, KB};
use crate::error::CoreError;
use crate::lattice::{Lattice, Pos};
use crate::system::System;

/// Outcome of a single move attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Whether the proposed move was accepted.
    pub accepted: bool,
}

/// Metropolis acceptance: `p = min(1, mult*exp(-delta_e/(kB*T)))`; accept if
/// `p == 1` or `p > U(0,1)`.
#[must_use]
pub fn metropolis_accept(delta_e: f64, temperature: f64, mult: f64, rng: &mut impl Rng) -> bool {
    if delta_e <= 0.0 {
        return true;
    }
    let p = mult * (-delta_e / (KB * temperature)).exp();
    if p >= 1.0 {
        true
    } else {
        p > rng.random::<f64>()
    }
}

/// Attempt a translation move on a randomly chosen filament other than
/// index 1. Returns whether the move was accepted.
pub fn translation_move(
    system: &mut System,
    lattice: &mut Lattice,
    oracle: &impl ConnectivityOracle,
    rng: &mut impl Rng,
) -> Result<MoveOutcome, CoreError> {
    let movable: Vec<u32> = system
        .filaments
        .iter()
        .map(|f| f.index())
        .filter(|&i| i != 1)
        .collect();
    if movable.is_empty() {
        return Ok(MoveOutcome { accepted: false });
    }
    let filament_index = movable[rng.random_range(0..movable.len())];
    let dy: i64 = if rng.random_bool(0.5) { 1 } else { -1 };

    system.use_trial(lattice);

    let old_sites: Vec<Pos> = system
        .filament(filament_index)
        .expect("chosen filament exists")
        .trial_coors()
        .to_vec();
    for p in &old_sites {
        lattice.occupancy_mut().remove(p);
    }

    let new_sites: Vec<Pos> = old_sites
        .iter()
        .map(|&p| lattice.wrap(Pos::new(p.x, p.y + dy)))
        .collect();

    let mut collided = false;
    for (i, &p) in new_sites.iter().enumerate() {
        if lattice
            .occupancy_mut()
            .insert(p, (filament_index, i))
            .is_some()
        {
            collided = true;
            break;
        }
    }

    if collided {
        lattice.revert_trial_occupancy();
        system.filament_mut(filament_index).expect("chosen filament exists").accept_current();
        system.use_current(lattice);
        return Ok(MoveOutcome { accepted: false });
    }
    *system
        .filament_mut(filament_index)
        .expect("chosen filament exists")
        .trial_coors_mut() = new_sites;

    if !oracle.ring_and_system_connected(system, lattice, false)? {
        lattice.revert_trial_occupancy();
        system.filament_mut(filament_index).expect("chosen filament exists").accept_current();
        system.use_current(lattice);
        return Ok(MoveOutcome { accepted: false });
    }

    let delta_e = delta_energy_translation(system, lattice, filament_index);
    let accepted = metropolis_accept(delta_e, system.params.temperature, 1.0, rng);

    if accepted {
        system
            .filament_mut(filament_index)
            .expect("chosen filament exists")
            .accept_trial();
        lattice.accept_trial_occupancy();
    } else {
        system
            .filament_mut(filament_index)
            .expect("chosen filament exists")
            .accept_current();
        lattice.revert_trial_occupancy();
    }
    system.use_current(lattice);

    Ok(MoveOutcome { accepted })
}

/// Attempt a radius move in a random direction `+-1`, with split-point
/// segmentation across the wrapping seam. Returns whether the move was
/// accepted.
pub fn radius_move(
    system: &mut System,
    lattice: &mut Lattice,
    biases: &Biases,
    oracle: &impl ConnectivityOracle,
    rng: &mut impl Rng,
) -> Result<MoveOutcome, CoreError> {
    let dir: i64 = if rng.random_bool(0.5) { 1 } else { -1 };
    let h_new = lattice.current_height() + dir;
    if h_new < lattice.min_height() || h_new > lattice.max_height() {
        return Ok(MoveOutcome { accepted: false });
    }

    system.use_trial(lattice);
    let h_old = lattice.current_height();

    // Split points: for each filament, the largest site index i (<lf) at
    // which y == H (the last site before the wrap seam); 0 if it never
    // wraps there.
    let split_points: Vec<usize> = system
        .filaments
        .iter()
        .map(|f| {
            f.trial_coors()
                .iter()
                .enumerate()
                .filter(|&(i, p)| i < f.lf() - 1 && p.y == h_old)
                .map(|(i, _)| i + 1)
                .next_back()
                .unwrap_or(0)
        })
        .collect();

    let indices: Vec<u32> = system.filaments.iter().map(|f| f.index()).collect();
    for (&filament_index, &split) in indices.iter().zip(&split_points) {
        if split == 0 {
            continue;
        }
        let old_prefix: Vec<Pos> = system
            .filament(filament_index)
            .expect("filament exists")
            .trial_coors()[..split]
            .to_vec();
        for p in &old_prefix {
            lattice.occupancy_mut().remove(p);
        }
        let new_prefix: Vec<Pos> = old_prefix
            .iter()
            .map(|&p| Pos::new(p.x, p.y + dir))
            .collect();

        let mut collided = false;
        for (i, &p) in new_prefix.iter().enumerate() {
            if lattice
                .occupancy_mut()
                .insert(p, (filament_index, i))
                .is_some()
            {
                collided = true;
                break;
            }
        }
        if collided {
            return Ok(revert_radius(system, lattice));
        }
        system
            .filament_mut(filament_index)
            .expect("filament exists")
            .trial_coors_mut()[..split]
            .copy_from_slice(&new_prefix);
    }

    lattice.update_trial_height(h_new);

    let contiguous = system
        .filaments
        .iter()
        .all(|f| f.is_contiguous(lattice.trial_height()));
    if !contiguous {
        return Ok(revert_radius(system, lattice));
    }

    if dir == 1 && !oracle.ring_and_system_connected(system, lattice, false)? {
        return Ok(revert_radius(system, lattice));
    }

    let delta_e = delta_energy_radius(system, lattice, biases);
    let accepted = metropolis_accept(delta_e, system.params.temperature, 1.0, rng);

    if accepted {
        lattice.accept_trial_occupancy();
        lattice.accept_height();
        for f in &mut system.filaments {
            f.accept_trial();
        }
    } else {
        lattice.revert_trial_occupancy();
        lattice.revert_height();
        for f in &mut system.filaments {
            f.accept_current();
        }
    }
    system.use_current(lattice);

    Ok(MoveOutcome { accepted })
}

/// Restore trial state (occupancy, height, filament coordinates) to match
/// current after a radius-move rejection.
fn revert_radius(system: &mut System, lattice: &mut Lattice) -> MoveOutcome {
    lattice.revert_trial_occupancy();
    lattice.revert_height();
    for f in &mut system.filaments {
        f.accept_current();
    }
    system.use_current(lattice);
    MoveOutcome { accepted: false }
}
