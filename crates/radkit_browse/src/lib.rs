//! Navigation of RCF archives and P3D files as a tree of selectable nodes.
//!
//! A [`Session`] opens a top level file, projects its records or chunks into a [`NodeTree`] and
//! re-slices the bytes behind whichever node gets selected:
//!
//! | Selected node                 | Result                                                      |
//! |-------------------------------|-------------------------------------------------------------|
//! | Directory or root             | Nothing is read                                             |
//! | RCF record                    | The record's bytes become the selected content              |
//! | RCF record of an archive type | The record is re-opened as the active file                  |
//! | P3D chunk                     | The chunk's bytes become the selected content and the       |
//! |                               | stream of the chunk picked by [`config::ResliceTarget`] is  |
//! |                               | decoded by its registered object decoder                    |
//!
//! ```no_run
//! # fn main() -> radkit_browse::Result<()> {
//! use radkit_browse::{config::DisplayMode, Session, SessionOptions};
//! use std::path::Path;
//!
//! let mut session = Session::new(SessionOptions::default());
//! session.open_top_level_file(Path::new("art/frontend.rcf"))?;
//!
//! let id = session.tree()?.find_path(&["sound", "intro.rsd"]);
//! if let Some(id) = id {
//!     session.select_node(id)?;
//! }
//! for property in session.selected_properties(DisplayMode::Default)? {
//!     println!("{property}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod filetype;
pub mod session;
pub mod slice;
pub mod tree;

pub use config::SessionOptions;
pub use error::{Error, Result};
pub use filetype::FileType;
pub use session::{LoadedFile, Selection, Session};
pub use tree::{Node, NodeId, NodeTree};
