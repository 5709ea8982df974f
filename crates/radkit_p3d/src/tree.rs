//! Arena of decoded chunks
//!

use derive_more::derive::{Deref, Display, From};
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::{ChunkHeader, P3dHeader},
};

/// Identifier assigned to a chunk in read order, starting at 1
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, From)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChunkId(u64);

impl ChunkId {
    /// Value reported for the parent of a root level chunk
    pub const NONE: ChunkId = ChunkId(0);
}

/// A decoded chunk record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub(crate) id: ChunkId,
    pub(crate) header: ChunkHeader,
    pub(crate) offset: u64,
    pub(crate) body: Vec<u8>,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
}

impl Chunk {
    /// Unique identifier of the chunk within its tree
    pub fn id(&self) -> ChunkId {
        self.id
    }

    /// The chunk's header
    pub fn header(&self) -> &ChunkHeader {
        &self.header
    }

    /// Type tag of the chunk
    pub fn type_tag(&self) -> u32 {
        self.header.type_tag
    }

    /// Absolute offset of the chunk's header in the backing source
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The chunk's own body, header excluded
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Whether any chunks were attached under this one
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Header and body of this chunk in the backing source
    pub fn raw_range(&self) -> Range<u64> {
        self.offset..self.offset + self.header.declared_size as u64
    }

    /// This chunk and all of its descendants in the backing source
    pub fn subtree_range(&self) -> Range<u64> {
        self.offset..self.offset + self.header.subtree_size as u64
    }
}

/// Decoded P3D file
///
/// Chunks live in a flat arena in read order. Parents and children refer to each other by arena
/// index so the parent of any chunk is found without searching.
#[derive(Debug, Clone)]
pub struct ChunkTree {
    pub(crate) header: P3dHeader,
    pub(crate) base_offset: u64,
    pub(crate) chunks: Vec<Chunk>,
    pub(crate) roots: Vec<usize>,
}

impl ChunkTree {
    /// The decoded file header
    pub fn header(&self) -> &P3dHeader {
        &self.header
    }

    /// Offset of the file inside its backing source
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Number of chunks at every level
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the file holds no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Root level chunks in file order
    pub fn roots(&self) -> impl Iterator<Item = &Chunk> {
        self.roots.iter().map(|&index| &self.chunks[index])
    }

    /// Direct children of `chunk` in file order
    pub fn children<'a>(&'a self, chunk: &'a Chunk) -> impl Iterator<Item = &'a Chunk> {
        chunk.children.iter().map(|&index| &self.chunks[index])
    }

    /// The chunk whose child list contains `chunk`
    pub fn parent(&self, chunk: &Chunk) -> Option<&Chunk> {
        chunk.parent.map(|index| &self.chunks[index])
    }

    /// Identifier of the parent of `chunk`, [`ChunkId::NONE`] for root level chunks
    pub fn parent_id(&self, chunk: &Chunk) -> ChunkId {
        self.parent(chunk).map_or(ChunkId::NONE, Chunk::id)
    }

    /// Find a chunk anywhere in the tree by its identifier
    pub fn find_by_id(&self, id: ChunkId) -> Option<&Chunk> {
        // Identifiers are handed out in arena order
        let index = id.0.checked_sub(1)? as usize;
        self.chunks.get(index).filter(|chunk| chunk.id == id)
    }

    /// Like [`ChunkTree::find_by_id`], failing with [`Error::ChunkNotFound`]
    pub fn get(&self, id: ChunkId) -> Result<&Chunk> {
        self.find_by_id(id).ok_or(Error::ChunkNotFound(id))
    }

    /// The outermost chunk containing `id`, which is `id` itself for root level chunks
    pub fn topmost_ancestor(&self, id: ChunkId) -> Result<&Chunk> {
        let mut chunk = self.get(id)?;
        while let Some(parent) = self.parent(chunk) {
            chunk = parent;
        }
        Ok(chunk)
    }

    /// Every chunk with its nesting depth, depth first in file order
    pub fn walk(&self) -> impl Iterator<Item = (usize, &Chunk)> {
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&i| (0, i)).collect();
        std::iter::from_fn(move || {
            let (depth, index) = stack.pop()?;
            let chunk = &self.chunks[index];
            stack.extend(chunk.children.iter().rev().map(|&child| (depth + 1, child)));
            Some((depth, chunk))
        })
    }

    pub(crate) fn push(
        &mut self,
        header: ChunkHeader,
        offset: u64,
        body: Vec<u8>,
        parent: Option<usize>,
    ) -> usize {
        let index = self.chunks.len();
        self.chunks.push(Chunk {
            id: ChunkId(index as u64 + 1),
            header,
            offset,
            body,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(parent) => self.chunks[parent].children.push(index),
            None => self.roots.push(index),
        }
        index
    }
}
