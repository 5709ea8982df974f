//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// fewer bytes remain than the read requires
    #[error("truncated read: wanted {wanted} bytes at offset {offset:#x}, only {available} available")]
    TruncatedRead {
        /// Offset the read started at
        offset: u64,
        /// Number of bytes the read needed
        wanted: u64,
        /// Number of bytes left in the source
        available: u64,
    },

    /// a seek targeted a position outside of the source
    #[error("invalid offset {offset:#x}: source is {len:#x} bytes long")]
    InvalidOffset {
        /// Requested position
        offset: u64,
        /// Length of the source
        len: u64,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
