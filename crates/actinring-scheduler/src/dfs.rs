//! Pointerless path-stack DFS connectivity/ring-closure check.
//!
//! Two filaments are crosslinked at site `i` of `A` if the lattice site at
//! `(A.x +- 1, A.y_i)` is occupied by some `B != A`. Starting from filament
//! 1, the search walks crosslink edges; a closed ring is found when a scan
//! reaches a filament already on the current path (an ancestor, not merely
//! an already-searched filament) and the accumulated signed y-displacement
//! between the two equals one full wrap of the circumference. This mirrors
//! the explicit-stack scheduler style the rest of this workspace uses for
//! recursive tree walks, in place of a recursive ring-closure search.

use std::collections::HashSet;

use actinring_core::{CoreError, Lattice, Pos, System};

/// Which direction a [`Frame`] is currently scanning its filament's sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Scanning from `entry_site` down to site 0.
    Backward,
    /// Scanning from `entry_site + 1` up to the last site.
    Forward,
}

#[derive(Clone, Debug)]
struct Frame {
    filament: u32,
    entry_site: usize,
    entry_cum_len: i64,
    phase: Phase,
    cursor: usize,
    /// Whether the `x-1` / `x+1` neighbor of `cursor` has been examined yet;
    /// both must be checked before the cursor advances, so a push into a
    /// child frame (which suspends this frame without advancing `cursor`)
    /// can be resumed at the remaining neighbor once the child pops.
    checked_neg: bool,
    checked_pos: bool,
}

impl Frame {
    fn new(filament: u32, entry_site: usize, entry_cum_len: i64) -> Self {
        Self {
            filament,
            entry_site,
            entry_cum_len,
            phase: Phase::Backward,
            cursor: entry_site,
            checked_neg: false,
            checked_pos: false,
        }
    }
}

/// Outcome of one connectivity search rooted at a given start filament.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SearchResult {
    ring_contig: bool,
    connected_count: u32,
    nsca_candidate: u32,
}

/// Run the path-stack DFS starting from `start_filament`.
fn search(system: &System, lattice: &Lattice, start_filament: u32) -> SearchResult {
    let occ = lattice.occupancy();
    let nfil_total = system.filaments.len() as u32;
    let period = lattice.current_height() + 1;

    let mut searched: HashSet<u32> = HashSet::new();
    searched.insert(start_filament);
    let mut connected: HashSet<u32> = HashSet::new();
    connected.insert(start_filament);

    let mut ring_contig = false;
    let mut nsca_candidate = nfil_total;

    if system.filament(start_filament).is_none() {
        return SearchResult {
            ring_contig: false,
            connected_count: 0,
            nsca_candidate,
        };
    }

    let mut stack = vec![Frame::new(start_filament, 0, 0)];

    'outer: loop {
        let Some(top_idx) = stack.len().checked_sub(1) else {
            break 'outer;
        };
        let (filament_id, cursor, entry_site, entry_cum_len, checked_neg, checked_pos, phase) = {
            let f = &stack[top_idx];
            (
                f.filament,
                f.cursor,
                f.entry_site,
                f.entry_cum_len,
                f.checked_neg,
                f.checked_pos,
                f.phase,
            )
        };
        let Some(filament) = system.filament(filament_id) else {
            stack.pop();
            if stack.is_empty() {
                break 'outer;
            }
            continue 'outer;
        };
        let lf = filament.lf();
        let cum_len = entry_cum_len + cursor as i64 - entry_site as i64;
        let site_pos = filament.coors()[cursor];

        let next_dx = if !checked_neg {
            Some(-1i64)
        } else if !checked_pos {
            Some(1i64)
        } else {
            None
        };

        if let Some(dx) = next_dx {
            if dx == -1 {
                stack[top_idx].checked_neg = true;
            } else {
                stack[top_idx].checked_pos = true;
            }

            let neighbor_pos = Pos::new(site_pos.x + dx, site_pos.y);
            if let Some(&(other_filament, other_site)) = occ.get(&neighbor_pos) {
                if other_filament != filament_id {
                    if let Some(ancestor_idx) =
                        stack.iter().position(|f| f.filament == other_filament)
                    {
                        let ancestor = &stack[ancestor_idx];
                        let ancestor_cum_len =
                            ancestor.entry_cum_len + other_site as i64 - ancestor.entry_site as i64;
                        let delta = cum_len - ancestor_cum_len;
                        if delta.abs() == period {
                            ring_contig = true;
                            let cycle_len = (stack.len() - ancestor_idx) as u32;
                            nsca_candidate = nsca_candidate.min(cycle_len);
                        }
                    } else if searched.insert(other_filament) {
                        connected.insert(other_filament);
                        stack.push(Frame::new(other_filament, other_site, cum_len));
                    }
                }
            }

            if ring_contig
                && connected.len() as u32 == nfil_total
                && nsca_candidate == system.params.nsca
            {
                break 'outer;
            }
            continue 'outer;
        }

        // Both neighbors at this site examined; advance within the frame.
        let top = &mut stack[top_idx];
        top.checked_neg = false;
        top.checked_pos = false;
        match phase {
            Phase::Backward => {
                if top.cursor == 0 {
                    top.phase = Phase::Forward;
                    top.cursor = top.entry_site + 1;
                    if top.cursor >= lf {
                        stack.pop();
                    }
                } else {
                    top.cursor -= 1;
                }
            }
            Phase::Forward => {
                if top.cursor + 1 >= lf {
                    stack.pop();
                } else {
                    top.cursor += 1;
                }
            }
        }
        if stack.is_empty() {
            break 'outer;
        }
    }

    SearchResult {
        ring_contig,
        connected_count: connected.len() as u32,
        nsca_candidate,
    }
}

/// Path-stack DFS implementation of [`actinring_core::ConnectivityOracle`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DfsConnectivityOracle;

impl actinring_core::ConnectivityOracle for DfsConnectivityOracle {
    fn ring_and_system_connected(
        &self,
        system: &System,
        lattice: &Lattice,
        consistency_check: bool,
    ) -> Result<bool, CoreError> {
        let nfil = system.filaments.len() as u32;
        if nfil == 0 {
            return Ok(false);
        }

        let first_start = system.filaments[0].index();
        let reference = search(system, lattice, first_start);
        let reference_ok = reference.ring_contig
            && reference.connected_count == nfil
            && reference.nsca_candidate == system.params.nsca;

        if consistency_check {
            for f in &system.filaments {
                let r = search(system, lattice, f.index());
                let ok = r.ring_contig
                    && r.connected_count == nfil
                    && r.nsca_candidate == system.params.nsca;
                if ok != reference_ok {
                    return Err(CoreError::ConnectivityInconsistent(format!(
                        "start filament {} disagreed with start filament {}: {} vs {}",
                        f.index(),
                        first_start,
                        ok,
                        reference_ok
                    )));
                }
            }
        }

        Ok(reference_ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actinring_core::generate_startup_config;
    use actinring_core::{ConnectivityOracle, Filament, SystemParams};

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

    #[test]
    fn two_scaffolds_spanning_the_circumference_close_a_ring() {
        // lf close to the full period and a small overlap: the pair of
        // scaffolds crosslinks at both the top and bottom of the cylinder.
        let p = params(2, 2, 4);
        let (system, lattice) = generate_startup_config(p, 3, 40, 1).unwrap();
        let oracle = DfsConnectivityOracle;
        let ok = oracle
            .ring_and_system_connected(&system, &lattice, true)
            .unwrap();
        assert!(ok);
    }

    #[test]
    fn disjoint_filament_is_not_connected() {
        use actinring_core::{Pos, System};
        let p = params(2, 2, 4);
        let mut lattice = Lattice::new(p.delta, 3, 40, 3);
        let f1 = Filament::new(
            1,
            vec![Pos::new(0, 0), Pos::new(0, 1), Pos::new(0, 2), Pos::new(0, 3)],
        );
        // Far away in x, never adjacent to f1.
        let f2 = Filament::new(
            2,
            vec![Pos::new(10, 0), Pos::new(10, 1), Pos::new(10, 2), Pos::new(10, 3)],
        );
        let mut system = System::new(p, vec![f1, f2]);
        system.update_occupancies(&mut lattice);

        let oracle = DfsConnectivityOracle;
        let ok = oracle
            .ring_and_system_connected(&system, &lattice, false)
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn chain_without_wraparound_is_connected_but_not_ringed() {
        use actinring_core::{Pos, System};
        let p = params(3, 2, 2);
        let mut lattice = Lattice::new(p.delta, 20, 40, 20);
        // Three short filaments in a straight adjacency chain; y never wraps.
        let f1 = Filament::new(1, vec![Pos::new(0, 0), Pos::new(0, 1)]);
        let f2 = Filament::new(2, vec![Pos::new(1, 0), Pos::new(1, 1)]);
        let f3 = Filament::new(3, vec![Pos::new(2, 0), Pos::new(2, 1)]);
        let mut system = System::new(p, vec![f1, f2, f3]);
        system.update_occupancies(&mut lattice);

        let oracle = DfsConnectivityOracle;
        let ok = oracle
            .ring_and_system_connected(&system, &lattice, false)
            .unwrap();
        assert!(!ok);
    }
}
