//! Options controlling how a [`crate::Session`] navigates

use bon::Builder;
use derive_more::derive::Display;
use radkit_rcf::NestedLayout;
use std::path::PathBuf;

/// Which chunk is carved out when a chunk node is selected
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq)]
pub enum ResliceTarget {
    /// The outermost chunk containing the selection, a self-contained sub-resource
    #[default]
    #[display("topmost ancestor")]
    TopmostAncestor,
    /// The selected chunk with its own descendants
    #[display("selected node")]
    SelectedNode,
}

/// How the properties of a selection are rendered
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    #[display("default")]
    Default,
    #[display("values")]
    Values,
    /// Hex dump of the selected content
    #[display("hex")]
    Hex,
}

/// Options for a browsing session
///
/// ```
/// use radkit_browse::config::{ResliceTarget, SessionOptions};
///
/// let options = SessionOptions::builder()
///     .reslice_target(ResliceTarget::SelectedNode)
///     .materialize(true)
///     .build();
/// assert!(options.descend_into_archives);
/// assert_eq!(options.nested_layout, Default::default());
/// assert_eq!(options.temp_dir, None);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct SessionOptions {
    /// Chunk carved out for dispatch when a chunk node is selected
    #[builder(default)]
    pub reslice_target: ResliceTarget,

    /// Write re-sliced chunk streams to a file before dispatch
    #[builder(default)]
    pub materialize: bool,

    /// Directory for materialized files, the process temp directory when unset
    pub temp_dir: Option<PathBuf>,

    /// Re-open archive records with an archive extension when they are selected
    #[builder(default = true)]
    pub descend_into_archives: bool,

    /// Where archives re-opened at a non-zero offset keep their filename table
    #[builder(default)]
    pub nested_layout: NestedLayout,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}
