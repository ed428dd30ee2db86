//! Fixture scenarios from the sampler's design scenarios list.

use actinring_core::{generate_startup_config, ConnectivityOracle, SystemParams};
use actinring_scheduler::DfsConnectivityOracle;

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

/// Nfil=4, Nsca=2, lf=4, overlap=2 at H = min_height: four filaments placed
/// in two columns, each pair overlapping by two sites; the ring closes.
#[test]
fn startup_scenario_is_connected_and_ringed() {
    let p = params(4, 2, 4);
    let (system, lattice) = generate_startup_config(p, 3, 40, 2).unwrap();

    assert_eq!(system.filaments.len(), 4);
    for f in &system.filaments {
        assert_eq!(f.lf(), 4);
    }

    let oracle = DfsConnectivityOracle;
    let ok = oracle
        .ring_and_system_connected(&system, &lattice, true)
        .unwrap();
    assert!(ok, "startup configuration should already form a closed ring");
}

/// A larger, four-column startup configuration (twice the filaments and
/// scaffolds of the base scenario) still closes, and the consistency check
/// agrees from every start filament.
#[test]
fn larger_startup_configuration_is_consistent() {
    let p = params(8, 4, 6);
    let (system, lattice) = generate_startup_config(p, 7, 40, 2).unwrap();
    assert_eq!(system.filaments.len(), 8);

    let oracle = DfsConnectivityOracle;
    let ok = oracle
        .ring_and_system_connected(&system, &lattice, true)
        .unwrap();
    assert!(ok);
}
