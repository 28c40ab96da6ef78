//! Error types for the circuit library.

use gatesim_core::CircuitError;
use thiserror::Error;

/// Errors raised by library circuits and bit-vector helpers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The underlying circuit rejected a construction or write.
    #[error(transparent)]
    Circuit(#[from] CircuitError),

    /// A bit vector or binary string had the wrong width.
    #[error("expected {expected} bits, found {found}")]
    WidthMismatch {
        /// Width the circuit was built for.
        expected: usize,
        /// Width supplied by the caller.
        found: usize,
    },

    /// A binary string contained something other than `0` or `1`.
    #[error("invalid binary digit {0:?}")]
    InvalidDigit(char),

    /// A value does not fit in the requested width.
    #[error("value {value} does not fit in {width} bits")]
    OutOfRange {
        /// Offending value.
        value: u64,
        /// Available width.
        width: usize,
    },
}
