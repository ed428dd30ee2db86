//! Lattice, filament, energy, move-set, bias, and startup core for the
//! actin-ring Monte Carlo sampler.
#![forbid(unsafe_code)]

pub mod biases;
pub mod config;
pub mod connectivity;
pub mod energy;
pub mod error;
pub mod filament;
pub mod lattice;
pub mod moves;
pub mod startup;
pub mod system;

pub use biases::Biases;
pub use config::{RunControls, SimParams};
pub use connectivity::ConnectivityOracle;
pub use error::{ConfigError, CoreError};
pub use filament::Filament;
pub use lattice::{Cell, Lattice, Occupant, Pos, View};
pub use moves::{metropolis_accept, radius_move, translation_move, MoveOutcome};
pub use startup::generate_startup_config;
pub use system::{System, SystemParams};
