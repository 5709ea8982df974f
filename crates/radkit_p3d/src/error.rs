//! Error types that can be emitted from this library

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::tree::ChunkId;

/// The part of the file that was being decoded when an error occurred
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    /// The `P3D` file header
    Header,
    /// The flattened chunk records following the header
    ChunkTree,
    /// An object decoder walking a re-sliced chunk stream
    Decode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Header => "header",
            Stage::ChunkTree => "chunk tree",
            Stage::Decode => "object decoder",
        })
    }
}

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Wrapper for [`binrw::Error`] values that have no more specific meaning
    #[error("{stage}: {source}")]
    BinRWError {
        /// Stage being decoded
        stage: Stage,
        /// Underlying error
        source: binrw::Error,
    },

    /// Wrapper for a failed `winnow` parse of a chunk body
    #[error("{stage}: unable to parse chunk body: {inner}")]
    WinnowError {
        /// Stage being decoded
        stage: Stage,
        /// Underlying parse error
        inner: winnow::error::ErrMode<winnow::error::ContextError>,
    },

    /// the 3 byte signature does not match
    #[error("header: not a P3D file (bad magic at offset {offset:#x})")]
    BadMagic {
        /// Offset of the signature
        offset: u64,
    },

    /// a record could not be read from the source
    #[error("{stage}: {source}")]
    Read {
        /// Stage being decoded
        stage: Stage,
        /// Underlying cursor error
        source: radkit_bytes::Error,
    },

    /// a chunk declares a size smaller than its own header
    #[error("chunk tree: chunk at {offset:#x} declares {declared} bytes, less than its header")]
    InvalidChunkSize {
        /// Offset of the chunk header
        offset: u64,
        /// Declared size of the chunk
        declared: u32,
    },

    /// a chunk's subtree is smaller than the chunk itself
    #[error("chunk tree: chunk at {offset:#x} has subtree size {subtree} smaller than its size {declared}")]
    SubtreeSmallerThanChunk {
        /// Offset of the chunk header
        offset: u64,
        /// Declared size of the chunk
        declared: u32,
        /// Declared subtree size of the chunk
        subtree: u32,
    },

    /// a descendant is larger than the remaining bytes its ancestor declared
    #[error("chunk tree: chunk at {offset:#x} of {declared} bytes overruns the {remaining} descendant bytes left")]
    DescendantOverrun {
        /// Offset of the descendant's header
        offset: u64,
        /// Declared size of the descendant
        declared: u32,
        /// Bytes the ancestor still had to account for
        remaining: u32,
    },

    /// no decoder is registered for a chunk type
    #[error("no decoder available for chunk type {0:#x}")]
    #[diagnostic(severity(Warning))]
    UnregisteredChunkType(u32),

    /// unable to find requested chunk
    #[error("unable to find chunk {0}")]
    ChunkNotFound(ChunkId),

    /// an object decoder read beyond the chunk it then tried to close
    #[error("object decoder: read up to {position:#x}, past the end {end:#x} of the chunk at {offset:#x}")]
    ReadPastChunk {
        /// Offset of the chunk header
        offset: u64,
        /// End of the chunk's subtree
        end: u64,
        /// Cursor position when the chunk was closed
        position: u64,
    },

    /// a chunk was ended without being started
    #[error("object decoder: no chunk is open")]
    NoOpenChunk,
}

impl Error {
    /// The stage this error was raised from, if it comes from decoding
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::BadMagic { .. } => Some(Stage::Header),
            Error::BinRWError { stage, .. }
            | Error::WinnowError { stage, .. }
            | Error::Read { stage, .. } => Some(*stage),
            Error::InvalidChunkSize { .. }
            | Error::SubtreeSmallerThanChunk { .. }
            | Error::DescendantOverrun { .. } => Some(Stage::ChunkTree),
            Error::ReadPastChunk { .. } | Error::NoOpenChunk => Some(Stage::Decode),
            Error::IOError(_) | Error::UnregisteredChunkType(_) | Error::ChunkNotFound(_) => None,
        }
    }

    pub(crate) fn from_binrw(stage: Stage, err: binrw::Error) -> Self {
        match err {
            binrw::Error::BadMagic { pos, .. } => Error::BadMagic { offset: pos },
            source => Error::BinRWError { stage, source },
        }
    }
}

impl From<winnow::error::ErrMode<winnow::error::ContextError>> for Error {
    fn from(inner: winnow::error::ErrMode<winnow::error::ContextError>) -> Self {
        Error::WinnowError {
            stage: Stage::Decode,
            inner,
        }
    }
}

/// Attach a [`Stage`] to cursor errors
pub(crate) trait StageExt<T> {
    fn stage(self, stage: Stage) -> Result<T>;
}

impl<T> StageExt<T> for radkit_bytes::Result<T> {
    fn stage(self, stage: Stage) -> Result<T> {
        self.map_err(|source| Error::Read { stage, source })
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
