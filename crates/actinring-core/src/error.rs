//! Typed domain errors for the actin-ring core.
//!
//! Move rejections (collision, broken connectivity, out-of-bounds radius)
//! are *not* represented here — they are ordinary `bool`/[`crate::moves::MoveOutcome`]
//! return values. Only precondition violations and internal inconsistencies
//! raise, per the error-handling policy: the move set handles expected
//! geometric rejections internally and never raises.

use thiserror::Error;

/// Fatal errors raised by the core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The uniform-overlap startup generator requires an even `Nsca` and an
    /// even `lf`; violating this precondition is a caller bug, not a
    /// recoverable runtime condition.
    #[error("startup precondition violated: {0}")]
    StartupPrecondition(String),

    /// The connectivity oracle's debug consistency mode (search starting
    /// from every filament) produced disagreeing answers. This indicates an
    /// implementation bug in the oracle or a corrupted occupancy map, never
    /// a legitimate configuration outcome.
    #[error("connectivity consistency check disagreed across start filaments: {0}")]
    ConnectivityInconsistent(String),
}

/// Errors raised while validating external configuration (`SimParams`)
/// before any lattice or filament state is constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric field fell outside its required range.
    #[error("{field}: {reason}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },

    /// A parity/divisibility precondition between two fields was violated.
    #[error("{reason}")]
    Inconsistent {
        /// Human-readable explanation.
        reason: String,
    },
}
