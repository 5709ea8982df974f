//! The active file, its node tree and the current selection
//!
//! A [`Session`] owns at most one active [`LoadedFile`]. Every navigation builds its new state in
//! full before installing it, so a failed open or selection leaves the session untouched.
//! Re-opening a record as a nested archive keeps the previous file on a history stack that
//! [`Session::back`] returns to.

use radkit_bytes::ByteCursor;
use radkit_p3d::{ChunkTree, DecoderRegistry, Focus, ObjectDecoder, Property};
use radkit_rcf::{NestedLayout, RcfArchive};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

use crate::{
    config::{DisplayMode, ResliceTarget, SessionOptions},
    error::{Error, Result},
    filetype::{file_name, FileType},
    slice::{extract_range, materialize_to_temp},
    tree::{ByteRange, NodeId, NodeKind, NodeTree},
};

/// Property shown in place of an object when no decoder handles its chunk type
pub const NO_DECODER: &str = "no decoder available";

/// Bytes per row of the hex view
const HEX_ROW: usize = 16;

/// Decoded form of an opened file
#[derive(Debug)]
pub enum Structure {
    Archive(RcfArchive),
    Chunks(ChunkTree),
}

/// Object produced by dispatching a re-sliced chunk stream
#[derive(Debug)]
struct Dispatched {
    /// Chunk whose stream was decoded
    source: radkit_p3d::ChunkId,
    /// Offset of that chunk in the backing file
    source_offset: u64,
    /// `None` when no decoder is registered for the chunk's type
    decoder: Option<Box<dyn ObjectDecoder>>,
    /// Where the stream was written, when materialized
    materialized: Option<PathBuf>,
}

/// A decoded file together with its projected tree and selection
#[derive(Debug)]
pub struct LoadedFile {
    path: PathBuf,
    file_type: FileType,
    base_offset: u64,
    structure: Structure,
    tree: NodeTree,
    selected_range: Option<ByteRange>,
    content: Vec<u8>,
    dispatched: Option<Dispatched>,
}

impl LoadedFile {
    /// Decode the archive of `file_type` starting at `base_offset` of the file at `path`
    ///
    /// When `limit` is set, reading stops `limit` bytes past `base_offset`.
    #[instrument(skip(registry))]
    fn load(
        path: &Path,
        file_type: FileType,
        base_offset: u64,
        limit: Option<u64>,
        root_name: &str,
        layout: NestedLayout,
        registry: &DecoderRegistry,
    ) -> Result<Self> {
        let data = fs::read(path).map_err(Error::io(path))?;
        let end = limit
            .map_or(data.len() as u64, |size| {
                base_offset.saturating_add(size).min(data.len() as u64)
            }) as usize;
        let mut source = ByteCursor::new(&data[..end]);
        let root_path = path.display().to_string();

        let (structure, tree) = match file_type {
            FileType::Rcf => {
                let archive = RcfArchive::open_with(&mut source, base_offset, layout)?;
                let tree = NodeTree::from_rcf(&archive, root_name, &root_path);
                (Structure::Archive(archive), tree)
            }
            FileType::P3d => {
                let chunks = ChunkTree::open(&mut source, base_offset)?;
                let tree = NodeTree::from_chunks(&chunks, registry, root_name, &root_path);
                (Structure::Chunks(chunks), tree)
            }
            file_type => {
                return Err(Error::NotAnArchive {
                    path: path.to_path_buf(),
                    file_type,
                })
            }
        };

        info!(nodes = tree.len(), %file_type, "loaded");
        Ok(Self {
            path: path.to_path_buf(),
            file_type,
            base_offset,
            structure,
            tree,
            selected_range: None,
            content: Vec::new(),
            dispatched: None,
        })
    }

    /// Backing file every range of this file refers to
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Offset of the decoded archive within its backing file
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Byte range of the selected node
    pub fn selected_range(&self) -> Option<ByteRange> {
        self.selected_range
    }

    /// Bytes of the selected node
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// File the last dispatched chunk stream was written to
    pub fn materialized(&self) -> Option<&Path> {
        self.dispatched.as_ref()?.materialized.as_deref()
    }

    fn record_properties(&self, index: usize) -> Result<Vec<Property>> {
        let Structure::Archive(archive) = &self.structure else {
            return Ok(Vec::new());
        };
        let record = archive.by_index(index)?;
        let date = record
            .modified()
            .map(|date| date.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();

        Ok(vec![
            Property::new("Name", record.name()),
            Property::new("Path", record.path()),
            Property::new("Type", FileType::from_path(record.path())),
            Property::new("Date", date),
            Property::new("Size", record.size()),
            Property::new("Offset", format!("{:#x}", record.absolute_offset())),
            Property::new("Hash", format!("{:#010x}", record.hash())),
        ])
    }

    fn chunk_properties(
        &self,
        id: radkit_p3d::ChunkId,
        type_tag: u32,
        mode: DisplayMode,
    ) -> Vec<Property> {
        let mut properties = Vec::new();
        if mode == DisplayMode::Default {
            properties.push(Property::new("Id", id));
            properties.push(Property::new("Type", format!("{type_tag:#x}")));
        }

        let described = self.dispatched.as_ref().and_then(|dispatched| {
            let decoder = dispatched.decoder.as_ref()?;
            let offset = match &self.structure {
                Structure::Chunks(chunks) => chunks.get(id).map_or(0, |chunk| chunk.offset()),
                Structure::Archive(_) => 0,
            };
            Some(decoder.describe(Focus::new(
                type_tag,
                offset.saturating_sub(dispatched.source_offset),
            )))
        });
        match described {
            Some(Some(described)) => properties.extend(described),
            Some(None) => {}
            None => properties.push(Property::new("Object", NO_DECODER)),
        }
        properties
    }

    fn hex_rows(&self) -> Vec<Property> {
        let start = self.selected_range.map_or(0, |range| range.offset);
        self.content
            .chunks(HEX_ROW)
            .enumerate()
            .map(|(row, bytes)| {
                let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
                Property::new(
                    format!("{:08x}", start + (row * HEX_ROW) as u64),
                    hex.join(" "),
                )
            })
            .collect()
    }
}

/// What selecting a node did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The node's bytes were loaded into the active file
    Content,
    /// The node was re-opened as a nested archive, which is now the active file
    Reopened,
}

/// Navigation state over one active file
#[derive(Debug)]
pub struct Session {
    options: SessionOptions,
    registry: DecoderRegistry,
    active: Option<LoadedFile>,
    history: Vec<LoadedFile>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl Session {
    /// Session dispatching to the built-in decoders
    pub fn new(options: SessionOptions) -> Self {
        Self::with_registry(options, DecoderRegistry::with_defaults())
    }

    pub fn with_registry(options: SessionOptions, registry: DecoderRegistry) -> Self {
        Self {
            options,
            registry,
            active: None,
            history: Vec::new(),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DecoderRegistry {
        &mut self.registry
    }

    pub fn active(&self) -> Option<&LoadedFile> {
        self.active.as_ref()
    }

    fn active_file(&self) -> Result<&LoadedFile> {
        self.active.as_ref().ok_or(Error::NoFileLoaded)
    }

    /// Number of files that [`Session::back`] can return to
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Open `path` as a new top level file, dropping any navigation history
    ///
    /// The decoder is picked from the extension, falling back to the file's leading bytes when the
    /// extension is not recognized.
    #[instrument(skip(self))]
    pub fn open_top_level_file(&mut self, path: &Path) -> Result<()> {
        let name = path.display().to_string();
        let file_type = match FileType::from_path(&name) {
            FileType::Unknown => sniff(path, 0)?.unwrap_or(FileType::Unknown),
            file_type => file_type,
        };

        let loaded = LoadedFile::load(
            path,
            file_type,
            0,
            None,
            file_name(&name),
            self.options.nested_layout,
            &self.registry,
        )?;
        self.history.clear();
        self.active = Some(loaded);
        Ok(())
    }

    /// Decode the archive embedded at `offset` of `path` and make it the active file
    ///
    /// The archive type is recognized from the bytes at `offset`. The previous file is kept for
    /// [`Session::back`].
    #[instrument(skip(self))]
    pub fn reopen_as_archive(&mut self, path: &Path, offset: u64) -> Result<()> {
        let file_type = sniff(path, offset)?.unwrap_or_else(|| {
            FileType::from_path(&path.display().to_string())
        });
        let name = format!("{}@{offset:#x}", file_name(&path.display().to_string()));
        let loaded = LoadedFile::load(
            path,
            file_type,
            offset,
            None,
            &name,
            self.options.nested_layout,
            &self.registry,
        )?;
        self.push(loaded);
        Ok(())
    }

    fn push(&mut self, loaded: LoadedFile) {
        if let Some(previous) = self.active.replace(loaded) {
            self.history.push(previous);
        }
        debug!(depth = self.history.len(), "entered nested archive");
    }

    /// Return to the file that was active before the last re-open
    ///
    /// Returns `false` when there is nothing to go back to.
    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.active = Some(previous);
                true
            }
            None => false,
        }
    }

    /// Tree of the active file
    pub fn tree(&self) -> Result<&NodeTree> {
        Ok(&self.active_file()?.tree)
    }

    /// Select a node of the active tree and re-slice its bytes
    ///
    /// Archive records whose extension names an archive are re-opened as the active file when
    /// [`SessionOptions::descend_into_archives`] is set. Chunks are carved out and handed to
    /// their registered decoder.
    #[instrument(skip(self))]
    pub fn select_node(&mut self, id: NodeId) -> Result<Selection> {
        let active = self.active_file()?;
        let node = active.tree.get(id)?;

        let (range, content, dispatched) = match (node.kind, node.range) {
            (NodeKind::Record { .. }, Some(range)) => {
                if self.options.descend_into_archives && node.file_type.is_archive() {
                    let nested = LoadedFile::load(
                        &active.path,
                        node.file_type,
                        range.offset,
                        Some(range.size),
                        &node.name,
                        self.options.nested_layout,
                        &self.registry,
                    )?;
                    self.mark_selected(id, Some(range), Vec::new(), None)?;
                    self.push(nested);
                    return Ok(Selection::Reopened);
                }

                let content = extract_range(&active.path, range.offset, range.size)?;
                (Some(range), content, None)
            }
            (NodeKind::Chunk { id: chunk_id, .. }, Some(range)) => {
                let content = extract_range(&active.path, range.offset, range.size)?;
                let dispatched = self.dispatch(active, chunk_id, &content)?;
                (Some(range), content, Some(dispatched))
            }
            _ => (None, Vec::new(), None),
        };

        self.mark_selected(id, range, content, dispatched)?;
        Ok(Selection::Content)
    }

    fn mark_selected(
        &mut self,
        id: NodeId,
        range: Option<ByteRange>,
        content: Vec<u8>,
        dispatched: Option<Dispatched>,
    ) -> Result<()> {
        let active = self.active.as_mut().ok_or(Error::NoFileLoaded)?;
        active.tree.select(id)?;
        active.selected_range = range;
        active.content = content;
        active.dispatched = dispatched;
        Ok(())
    }

    /// Carve out the stream of the chunk the reslice policy targets and decode it
    fn dispatch(
        &self,
        active: &LoadedFile,
        selected: radkit_p3d::ChunkId,
        selected_stream: &[u8],
    ) -> Result<Dispatched> {
        let Structure::Chunks(chunks) = &active.structure else {
            return Err(radkit_p3d::Error::ChunkNotFound(selected).into());
        };
        let target = match self.options.reslice_target {
            ResliceTarget::TopmostAncestor => chunks.topmost_ancestor(selected)?,
            ResliceTarget::SelectedNode => chunks.get(selected)?,
        };

        let mut stream = if target.id() == selected {
            selected_stream.to_vec()
        } else {
            let range = target.subtree_range();
            extract_range(&active.path, range.start, range.end - range.start)?
        };

        let materialized = if self.options.materialize {
            let path = materialize_to_temp(
                &stream,
                &format!("chunk{}.p3d", target.id()),
                self.options.temp_dir.as_deref(),
            )?;
            stream = fs::read(&path).map_err(Error::io(&path))?;
            Some(path)
        } else {
            None
        };

        let decoder = match self.registry.decode(target.type_tag(), &stream) {
            Ok(decoder) => Some(decoder),
            Err(radkit_p3d::Error::UnregisteredChunkType(tag)) => {
                debug!(tag, "no decoder available");
                None
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Dispatched {
            source: target.id(),
            source_offset: target.offset(),
            decoder,
            materialized,
        })
    }

    /// Bytes of the selected node, for a hex view
    pub fn selected_content(&self) -> Result<&[u8]> {
        let active = self.active_file()?;
        active.tree.selected().ok_or(Error::NothingSelected)?;
        Ok(&active.content)
    }

    /// Chunk whose stream the current selection was decoded from
    pub fn dispatched_chunk(&self) -> Option<radkit_p3d::ChunkId> {
        Some(self.active.as_ref()?.dispatched.as_ref()?.source)
    }

    /// Properties of the selected node rendered in `mode`
    pub fn selected_properties(&self, mode: DisplayMode) -> Result<Vec<Property>> {
        let active = self.active_file()?;
        let id = active.tree.selected().ok_or(Error::NothingSelected)?;
        let node = active.tree.get(id)?;

        if mode == DisplayMode::Hex {
            return Ok(active.hex_rows());
        }

        match node.kind {
            NodeKind::Record { index } => active.record_properties(index),
            NodeKind::Chunk { id, type_tag } => Ok(active.chunk_properties(id, type_tag, mode)),
            NodeKind::Root => Ok(vec![
                Property::new("Name", &node.name),
                Property::new("Path", &node.path),
                Property::new("Type", active.file_type),
                Property::new("Offset", format!("{:#x}", active.base_offset)),
            ]),
            NodeKind::Directory => Ok(vec![
                Property::new("Name", &node.name),
                Property::new("Path", &node.path),
                Property::new("Type", FileType::Directory),
                Property::new("Children", node.child_ids().len()),
            ]),
        }
    }
}

/// Archive type recognized from the bytes at `offset` of `path`
fn sniff(path: &Path, offset: u64) -> Result<Option<FileType>> {
    match extract_range(path, offset, radkit_rcf::types::RCF_MAGIC.len() as u64) {
        Ok(bytes) => Ok(FileType::from_magic(&bytes)),
        Err(Error::ShortRead { got, .. }) if got > 0 => {
            Ok(FileType::from_magic(&extract_range(path, offset, got)?))
        }
        Err(Error::ShortRead { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}
