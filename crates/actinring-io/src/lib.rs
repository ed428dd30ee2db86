//! Thin sink/source I/O adapters: `.ops`, `.vtf`, `.counts`/`.freqs`/`.biases`,
//! and `.parms`, plus the bias-restart reader.
#![forbid(unsafe_code)]

pub mod ops;
pub mod parms;
pub mod us;
mod util;
pub mod vtf;

pub use ops::OpsSink;
pub use parms::{read_bias_restart, write_parms};
pub use us::UsSink;
pub use vtf::VtfSink;
