//! Error taxonomy, mapped from libdivsufsort's legacy integer status codes.

use thiserror::Error;

/// Failure modes surfaced by this crate's construction, transform, search
/// and checking routines.
#[derive(Debug, Error)]
pub enum Error {
    /// Arguments failed a precondition (negative length, out-of-range
    /// index, mismatched buffer size). Corresponds to status code `-1`.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A required allocation could not be satisfied. Corresponds to status
    /// code `-2`. Rust's allocator aborts on true OOM, so this variant is
    /// reachable only for user-supplied buffers sized too small.
    #[error("allocation failed: {0}")]
    Allocation(&'static str),

    /// An internal invariant of the sorter was violated. Corresponds to
    /// status code `-3`.
    #[error("internal sort failure: {0}")]
    Sort(&'static str),

    /// [`crate::sufcheck`] rejected the array as not a valid suffix array.
    /// Corresponds to status code `-4`.
    #[error("suffix array check failed: {0}")]
    Check(&'static str),
}

impl Error {
    /// Maps each variant to its legacy libdivsufsort status code.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) => -1,
            Error::Allocation(_) => -2,
            Error::Sort(_) => -3,
            Error::Check(_) => -4,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
