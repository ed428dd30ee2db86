//! Connectivity oracle interface.
//!
//! The oracle's implementation (a path-stack DFS over shared occupancies) is
//! deliberately kept out of this crate — see `actinring-scheduler` — so the
//! move set can depend on the *question* ("is this configuration still one
//! connected ring?") without the core owning the traversal algorithm. This
//! mirrors the backend-trait split the rest of this workspace uses between
//! stable data types and swappable algorithms.

use crate::error::CoreError;
use crate::lattice::Lattice;
use crate::system::System;

/// Answers whether a [`System`]'s filaments, as laid out on a [`Lattice`],
/// form one connected assembly with a closed ring through exactly `Nsca`
/// scaffolds.
pub trait ConnectivityOracle {
    /// Returns `true` iff the filaments are fully connected via
    /// crosslinker-shared sites *and* a ring cycle closes through exactly
    /// `system.params.nsca` scaffolds.
    ///
    /// When `consistency_check` is set, the search is repeated from every
    /// filament as a starting point and all answers must agree; a
    /// disagreement is reported as [`CoreError::ConnectivityInconsistent`]
    /// rather than silently picking one answer.
    fn ring_and_system_connected(
        &self,
        system: &System,
        lattice: &Lattice,
        consistency_check: bool,
    ) -> Result<bool, CoreError>;
}
