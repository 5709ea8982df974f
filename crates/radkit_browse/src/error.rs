//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::{filetype::FileType, tree::NodeId};

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// the backing file could not be opened, read or written
    #[error("{}: {source}", path.display())]
    IOFailure {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// fewer bytes are available than requested
    #[error("short read: wanted {wanted} bytes at offset {offset:#x}, got {got}")]
    ShortRead {
        /// Requested start offset
        offset: u64,
        /// Requested length
        wanted: u64,
        /// Bytes actually available
        got: u64,
    },

    /// Transparent wrapper for [`radkit_rcf::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Rcf(#[from] radkit_rcf::Error),

    /// Transparent wrapper for [`radkit_p3d::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    P3d(#[from] radkit_p3d::Error),

    /// the file type has no decoder that produces a tree
    #[error("{} is not an archive ({file_type})", path.display())]
    NotAnArchive {
        /// File that was requested
        path: PathBuf,
        /// Type derived from its extension
        file_type: FileType,
    },

    /// an operation needs a loaded file
    #[error("no file is loaded")]
    NoFileLoaded,

    /// an operation needs a selected node
    #[error("no node is selected")]
    NothingSelected,

    /// the node does not exist in the active tree
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Error::IOFailure { path, source }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
