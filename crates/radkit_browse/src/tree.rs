//! Navigable node tree built from a decoded archive or chunk file
//!
//! Nodes live in an arena addressed by [`NodeId`]. Each node stores the index of its parent and
//! the indices of its children, so the tree can be walked both ways without searching.

use derive_more::derive::{Deref, Display, From};
use radkit_p3d::{ChunkId, ChunkTree, DecoderRegistry};
use radkit_rcf::{read::path_components, RcfArchive};
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    error::{Error, Result},
    filetype::FileType,
};

/// Index of a node within its [`NodeTree`]
#[derive(Debug, Display, Deref, From, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NodeId(usize);

/// Bytes backing a node, relative to the start of the backing file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ByteRange {
    /// Absolute offset of the first byte
    pub offset: u64,
    /// Number of bytes
    pub size: u64,
}

impl ByteRange {
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// Offset one past the last byte
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }

    pub fn range(&self) -> Range<u64> {
        self.offset..self.end()
    }
}

/// What a node stands for in the decoded structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(tag = "kind", rename_all = "lowercase"))]
pub enum NodeKind {
    /// The loaded file itself
    Root,
    /// A path segment shared by archive records
    Directory,
    /// An archive record
    Record {
        /// Index into the archive's record list
        index: usize,
    },
    /// A chunk of a chunk file
    Chunk {
        /// Identifier assigned while parsing
        id: ChunkId,
        /// Type tag of the chunk
        type_tag: u32,
    },
}

/// A single entry of a [`NodeTree`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Label shown for the node
    pub name: String,
    /// Full path of an archive record, or the label path of a chunk
    pub path: String,
    pub kind: NodeKind,
    pub file_type: FileType,
    /// Bytes backing the node, `None` for directories and the root
    pub range: Option<ByteRange>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    selected: bool,
}

impl Node {
    fn new(name: impl Into<String>, path: impl Into<String>, kind: NodeKind) -> Self {
        let name = name.into();
        let file_type = match kind {
            NodeKind::Record { .. } => FileType::from_path(&name),
            _ => FileType::Unknown,
        };
        Self {
            name,
            path: path.into(),
            kind,
            file_type,
            range: None,
            parent: None,
            children: Vec::new(),
            selected: false,
        }
    }

    /// Whether the node can hold children
    pub fn is_container(&self) -> bool {
        match self.kind {
            NodeKind::Root | NodeKind::Directory => true,
            NodeKind::Record { .. } => false,
            NodeKind::Chunk { .. } => !self.children.is_empty(),
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn child_ids(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena of [`Node`]s with the root at index 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTree {
    nodes: Vec<Node>,
}

impl NodeTree {
    fn with_root(name: &str, path: &str) -> Self {
        Self {
            nodes: vec![Node::new(name, path, NodeKind::Root)],
        }
    }

    /// Project the records of an archive into directories split on `\`
    ///
    /// Directory nodes are shared between records by exact name at every level.
    pub fn from_rcf(archive: &RcfArchive, root_name: &str, root_path: &str) -> Self {
        let mut tree = Self::with_root(root_name, root_path);

        for record in archive.records() {
            let components: Vec<&str> = path_components(record.path()).collect();
            let Some((leaf, directories)) = components.split_last() else {
                continue;
            };

            let mut parent = tree.root_id();
            for (depth, directory) in directories.iter().enumerate() {
                parent = match tree.find_child(parent, directory, NodeKind::Directory) {
                    Some(existing) => existing,
                    None => {
                        let path = directories[..=depth].join("\\");
                        tree.push(parent, Node::new(*directory, path, NodeKind::Directory))
                    }
                };
            }

            let mut node = Node::new(
                *leaf,
                record.path(),
                NodeKind::Record {
                    index: record.index(),
                },
            );
            node.range = Some(ByteRange::new(record.absolute_offset(), record.size()));
            tree.push(parent, node);
        }

        tree
    }

    /// Project a chunk tree, labelling every chunk with its id, hex tag and registered name
    pub fn from_chunks(
        chunks: &ChunkTree,
        registry: &DecoderRegistry,
        root_name: &str,
        root_path: &str,
    ) -> Self {
        let mut tree = Self::with_root(root_name, root_path);
        // Node of the most recent chunk at each depth
        let mut lineage: Vec<NodeId> = vec![tree.root_id()];

        for (depth, chunk) in chunks.walk() {
            lineage.truncate(depth + 1);
            let parent = lineage[depth];

            let tag = chunk.type_tag();
            let name = format!("({}){:x} - {}", chunk.id(), tag, registry.name_of(tag));
            let path = format!("{}/{}", tree.nodes[*parent].path, name);
            let mut node = Node::new(
                name,
                path,
                NodeKind::Chunk {
                    id: chunk.id(),
                    type_tag: tag,
                },
            );
            node.range = Some(ByteRange::new(
                chunk.offset(),
                chunk.header().subtree_size as u64,
            ));

            let id = tree.push(parent, node);
            lineage.push(id);
        }

        tree
    }

    fn push(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[*parent].children.push(id);
        id
    }

    fn find_child(&self, parent: NodeId, name: &str, kind: NodeKind) -> Option<NodeId> {
        self.nodes[*parent]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[*child].kind == kind && self.nodes[*child].name == name)
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds nothing besides its root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(*id).ok_or(Error::NodeNotFound(id))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .get(*id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&child| (child, &self.nodes[*child]))
    }

    /// Every node below the root with its depth, depth first in insertion order
    pub fn walk(&self) -> impl Iterator<Item = (usize, NodeId, &Node)> {
        let mut stack: Vec<(usize, NodeId)> =
            self.nodes[0].children.iter().rev().map(|&c| (0, c)).collect();
        std::iter::from_fn(move || {
            let (depth, id) = stack.pop()?;
            let node = &self.nodes[*id];
            stack.extend(node.children.iter().rev().map(|&child| (depth + 1, child)));
            Some((depth, id, node))
        })
    }

    /// Follow child labels from the root
    pub fn find_path(&self, labels: &[&str]) -> Option<NodeId> {
        labels.iter().try_fold(self.root_id(), |parent, label| {
            self.children(parent)
                .find(|(_, node)| node.name == *label)
                .map(|(id, _)| id)
        })
    }

    /// Mark `id` as the only selected node in the tree
    pub fn select(&mut self, id: NodeId) -> Result<&Node> {
        if *id >= self.nodes.len() {
            return Err(Error::NodeNotFound(id));
        }
        for node in &mut self.nodes {
            node.selected = false;
        }
        self.nodes[*id].selected = true;
        Ok(&self.nodes[*id])
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.nodes.iter().position(|node| node.selected).map(NodeId)
    }

    /// Owned nested copy of the tree for serialization
    pub fn view(&self) -> NodeView {
        self.view_of(self.root_id())
    }

    fn view_of(&self, id: NodeId) -> NodeView {
        let node = &self.nodes[*id];
        NodeView {
            id,
            name: node.name.clone(),
            path: node.path.clone(),
            kind: node.kind,
            file_type: node.file_type,
            range: node.range,
            selected: node.selected,
            children: node.children.iter().map(|&c| self.view_of(c)).collect(),
        }
    }
}

/// Nested form of a [`Node`] and its descendants
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NodeView {
    pub id: NodeId,
    pub name: String,
    pub path: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: NodeKind,
    pub file_type: FileType,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub range: Option<ByteRange>,
    pub selected: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<NodeView>,
}
