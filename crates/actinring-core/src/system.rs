//! System-level state: immutable run parameters plus the owned filament set.

use crate::filament::Filament;
use crate::lattice::{Lattice, Pos};

/// Immutable bundle of physical and geometric parameters for one run.
#[derive(Clone, Copy, Debug)]
pub struct SystemParams {
    /// Crosslinker association rate constant.
    pub ks: f64,
    /// Crosslinker dissociation rate constant.
    pub kd: f64,
    /// Temperature (K).
    pub temperature: f64,
    /// Lattice spacing (m).
    pub delta: f64,
    /// Crosslinker concentration.
    pub xc: f64,
    /// Filament bending rigidity.
    pub ei: f64,
    /// Physical filament length.
    pub lf_length: f64,
    /// Sites per filament.
    pub lf: usize,
    /// Total number of filaments.
    pub nfil: u32,
    /// Number of scaffold filaments.
    pub nsca: u32,
}

/// Owns all filaments and the immutable run parameters. Tracks the last
/// computed total energy as an observable (never used to drive acceptance
/// directly — moves compute their own deltas).
#[derive(Clone, Debug)]
pub struct System {
    /// Immutable parameter bundle.
    pub params: SystemParams,
    /// All filaments, indexed 0-based internally; `Filament::index()` is the
    /// stable 1-based id.
    pub filaments: Vec<Filament>,
    /// Last computed total energy (Joules). Observable only.
    pub energy: f64,
}

impl System {
    /// Construct a system from parameters and an already-placed filament set.
    #[must_use]
    pub fn new(params: SystemParams, filaments: Vec<Filament>) -> Self {
        Self {
            params,
            filaments,
            energy: 0.0,
        }
    }

    /// Filament by 1-based index, if present.
    #[must_use]
    pub fn filament(&self, index: u32) -> Option<&Filament> {
        self.filaments.iter().find(|f| f.index() == index)
    }

    /// Mutable filament by 1-based index, if present.
    #[must_use]
    pub fn filament_mut(&mut self, index: u32) -> Option<&mut Filament> {
        self.filaments.iter_mut().find(|f| f.index() == index)
    }

    /// Alias every filament's observable coordinates to current.
    pub fn use_current(&mut self, lattice: &mut Lattice) {
        lattice.use_current();
        for f in &mut self.filaments {
            f.use_current();
        }
    }

    /// Alias every filament's observable coordinates to trial.
    pub fn use_trial(&mut self, lattice: &mut Lattice) {
        lattice.use_trial();
        for f in &mut self.filaments {
            f.use_trial();
        }
    }

    /// Rebuild both lattice occupancy maps from the filaments' current
    /// coordinates. Used by startup and by [`System::recenter`].
    pub fn update_occupancies(&mut self, lattice: &mut Lattice) {
        let sites = self.filaments.iter().flat_map(|f| {
            f.current_coors()
                .iter()
                .enumerate()
                .map(move |(i, &p)| (p, (f.index(), i)))
        });
        lattice.rebuild_occupancy(sites);
    }

    /// Translate all filaments uniformly in `y` so that filament 1, site 0,
    /// lies at `y = 0`. Occupancy is rebuilt afterward.
    pub fn recenter(&mut self, lattice: &mut Lattice) {
        let Some(anchor) = self.filament(1).map(|f| f.current_coors()[0]) else {
            return;
        };
        let dy = -anchor.y;
        let height = lattice.current_height();
        let period = height + 1;
        for f in &mut self.filaments {
            let shifted: Vec<Pos> = f
                .current_coors()
                .iter()
                .map(|p| Pos::new(p.x, (p.y + dy).rem_euclid(period)))
                .collect();
            *f.trial_coors_mut() = shifted;
            f.accept_trial();
        }
        self.update_occupancies(lattice);
    }
}
