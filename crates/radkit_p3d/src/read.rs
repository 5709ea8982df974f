//! Decoding of the flattened chunk records of a P3D file
//!

use binrw::BinRead;
use radkit_bytes::ByteCursor;
use tracing::{debug, info, instrument, trace};

use crate::{
    error::{Error, Result, Stage, StageExt},
    tree::ChunkTree,
    types::{ChunkHeader, P3dHeader},
};

/// Where the root level chunk list stops
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChunkBound {
    /// Read until the source is exhausted
    Unbounded,
    /// Read until the cursor reaches this absolute offset
    End(u64),
}

impl ChunkBound {
    fn reached(&self, source: &ByteCursor<'_>) -> bool {
        match self {
            ChunkBound::Unbounded => source.is_exhausted(),
            ChunkBound::End(end) => source.position() >= *end,
        }
    }
}

impl ChunkTree {
    /// Read a P3D file starting at `base_offset` of `source`
    ///
    /// A header `file_size` of zero reads until the end of the source, otherwise reading stops at
    /// `base_offset + file_size`.
    #[instrument(skip(source), fields(len = source.len()))]
    pub fn open(source: &mut ByteCursor<'_>, base_offset: u64) -> Result<Self> {
        source.seek(base_offset).stage(Stage::Header)?;
        source.require(P3dHeader::SIZE).stage(Stage::Header)?;
        let header =
            P3dHeader::read(source).map_err(|e| Error::from_binrw(Stage::Header, e))?;
        debug!(?header, "read header");

        let bound = match header.file_size {
            0 => ChunkBound::Unbounded,
            size => ChunkBound::End(base_offset + size as u64),
        };

        let mut tree = ChunkTree {
            header,
            base_offset,
            chunks: Vec::new(),
            roots: Vec::new(),
        };
        tree.read_chunk_list(source, bound)?;

        info!(
            chunks = tree.len(),
            roots = tree.roots.len(),
            base_offset,
            "opened p3d file"
        );
        Ok(tree)
    }

    /// Read a P3D file held entirely in `data`
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::open(&mut ByteCursor::new(data), 0)
    }

    /// Read root level chunks and their descendants until `bound`
    ///
    /// A non-leaf root owns `subtree_size - declared_size` bytes of records that follow its body,
    /// each one is attached as a direct child. A child that has descendants of its own takes the
    /// records after it as its children until its own accounting is satisfied; those records are
    /// also charged to the root. Anything nested deeper is flattened into the child's list.
    pub fn read_chunk_list(&mut self, source: &mut ByteCursor<'_>, bound: ChunkBound) -> Result<()> {
        while !bound.reached(source) {
            let root = self.read_chunk(source, None)?;
            let mut chunk_left = self.descendant_bytes(root);

            while chunk_left > 0 {
                let child = self.read_chunk(source, Some(root))?;
                chunk_left = self.charge(chunk_left, child)?;

                let mut child_left = self.descendant_bytes(child);
                while child_left > 0 {
                    let grandchild = self.read_chunk(source, Some(child))?;
                    child_left = self.charge(child_left, grandchild)?;
                    chunk_left = self.charge(chunk_left, grandchild)?;
                }
            }
        }
        Ok(())
    }

    fn read_chunk(&mut self, source: &mut ByteCursor<'_>, parent: Option<usize>) -> Result<usize> {
        let offset = source.position();
        source.require(ChunkHeader::SIZE).stage(Stage::ChunkTree)?;
        let header =
            ChunkHeader::read(source).map_err(|e| Error::from_binrw(Stage::ChunkTree, e))?;

        let body_size = header.body_size().ok_or(Error::InvalidChunkSize {
            offset,
            declared: header.declared_size,
        })?;
        if header.descendant_size().is_none() {
            return Err(Error::SubtreeSmallerThanChunk {
                offset,
                declared: header.declared_size,
                subtree: header.subtree_size,
            });
        }

        let body = source
            .read_bytes(body_size as u64)
            .stage(Stage::ChunkTree)?
            .to_vec();

        let index = self.push(header, offset, body, parent);
        trace!(
            id = %self.chunks[index].id,
            tag = header.type_tag,
            offset,
            "read chunk"
        );
        Ok(index)
    }

    fn descendant_bytes(&self, index: usize) -> u32 {
        self.chunks[index]
            .header
            .descendant_size()
            .unwrap_or_default()
    }

    fn charge(&self, remaining: u32, index: usize) -> Result<u32> {
        let chunk = &self.chunks[index];
        remaining
            .checked_sub(chunk.header.declared_size)
            .ok_or(Error::DescendantOverrun {
                offset: chunk.offset,
                declared: chunk.header.declared_size,
                remaining,
            })
    }
}
