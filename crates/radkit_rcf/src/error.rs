//! Error types that can be emitted from this library

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// The part of the archive that was being decoded when an error occurred
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    /// The fixed size header and its signature
    Header,
    /// The table of `{hash, offset, size}` entries
    DirectoryTable,
    /// The table of dated, variable length paths
    FilenameTable,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Header => "header",
            Stage::DirectoryTable => "directory table",
            Stage::FilenameTable => "filename table",
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

    /// the signature at the start of the header does not match
    #[error("header: not an ATG CORE CEMENT LIBRARY archive (bad magic at offset {offset:#x})")]
    BadMagic {
        /// Offset of the signature
        offset: u64,
    },

    /// a table could not be read from the source
    #[error("{stage}: {source}")]
    Read {
        /// Stage being decoded
        stage: Stage,
        /// Underlying cursor error
        source: radkit_bytes::Error,
    },

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),
}

impl Error {
    /// The stage this error was raised from, if it comes from decoding
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::BadMagic { .. } => Some(Stage::Header),
            Error::BinRWError { stage, .. } | Error::Read { stage, .. } => Some(*stage),
            Error::IOError(_) | Error::FileNotFound(_) => None,
        }
    }

    pub(crate) fn from_binrw(stage: Stage, err: binrw::Error) -> Self {
        match err {
            binrw::Error::BadMagic { pos, .. } => Error::BadMagic { offset: pos },
            source => Error::BinRWError { stage, source },
        }
    }
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
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
