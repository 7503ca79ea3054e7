use std::io;
use std::result;

use thiserror::Error;

/// Failures reported by collection and backend operations.
///
/// Metadata lookups that merely fail to find a name return `Option`/`bool`
/// instead; an `Error` always describes a request that was understood and
/// could not be satisfied.
#[derive(Debug, Error)]
pub enum Error {
    /// The named variable is not part of this collection.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// No stored volume exists for this (timestep, variable, level, lod)
    /// tuple.
    #[error("variable {name} is unavailable at ts={ts}, level={level}, lod={lod}")]
    VariableUnavailable {
        name: String,
        ts: usize,
        level: usize,
        lod: usize,
    },

    /// The file handle was never issued, or its session has been closed.
    #[error("invalid or stale file handle")]
    InvalidHandle,

    /// Region bounds fall outside the variable's extent, or min/max are
    /// malformed.
    #[error("region {min:?}..={max:?} invalid for dimensions {dims:?}")]
    BadRegion {
        min: Vec<usize>,
        max: Vec<usize>,
        dims: Vec<usize>,
    },

    /// A blocked read was requested with bounds not aligned to the storage
    /// block size.
    #[error("region {min:?}..={max:?} not aligned to block size {block_size:?}")]
    UnalignedRegion {
        min: Vec<usize>,
        max: Vec<usize>,
        block_size: Vec<usize>,
    },

    /// Caller-owned buffer was not pre-sized per the dimension contract.
    #[error("buffer holds {got} values, {want} required")]
    BadBufferSize { got: usize, want: usize },

    /// `read_slice` was called more times than the variable has hyperslices.
    #[error("all {nslices} slices already read")]
    SlicesExhausted { nslices: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Format-specific failure reported by a backend.
    #[error("backend error: {0}")]
    Backend(String),
}

pub type Result<T> = result::Result<T, Error>;
