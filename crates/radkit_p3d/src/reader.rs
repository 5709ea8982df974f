//! Stack based reader over a self contained chunk stream
//!

use radkit_bytes::ByteCursor;
use std::ops::Range;
use tracing::trace;

use crate::{
    error::{Error, Result, Stage, StageExt},
    types::ChunkHeader,
};

#[derive(Debug, Clone, Copy)]
struct OpenChunk {
    header: ChunkHeader,
    start: u64,
}

impl OpenChunk {
    fn body_end(&self) -> u64 {
        self.start + self.header.declared_size as u64
    }

    fn subtree_end(&self) -> u64 {
        self.start + self.header.subtree_size as u64
    }
}

/// Walks a chunk stream one nesting level at a time
///
/// The stream starts with a chunk header, which is opened on construction. Object decoders read
/// the body of the open chunk, then visit its children with [`ChunkReader::begin_chunk`] and
/// [`ChunkReader::end_chunk`]:
///
/// ```
/// # use radkit_p3d::{reader::ChunkReader, types::ChunkHeader};
/// # let mut data = Vec::new();
/// # for header in [ChunkHeader::new(1, 0, 12), ChunkHeader::new(2, 0, 0)] {
/// #     data.extend(header.type_tag.to_le_bytes());
/// #     data.extend(header.declared_size.to_le_bytes());
/// #     data.extend(header.subtree_size.to_le_bytes());
/// # }
/// let mut reader = ChunkReader::new(data.as_slice())?;
/// assert_eq!(reader.current_type(), Some(1));
///
/// while reader.chunks_remaining() {
///     let tag = reader.begin_chunk()?;
///     assert_eq!(tag, 2);
///     reader.end_chunk()?;
/// }
/// # Ok::<(), radkit_p3d::error::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    cursor: ByteCursor<'a>,
    stack: Vec<OpenChunk>,
}

impl<'a> ChunkReader<'a> {
    /// Create a reader and open the chunk at the start of `data`
    pub fn new(data: impl Into<ByteCursor<'a>>) -> Result<Self> {
        let mut reader = Self {
            cursor: data.into(),
            stack: Vec::new(),
        };
        reader.begin_chunk()?;
        Ok(reader)
    }

    /// Open the next chunk, returning its type tag
    ///
    /// When a chunk is already open the cursor first skips any unread part of that chunk's body.
    /// The new header must cover itself, and its subtree must fit in what is left of the open
    /// chunk's subtree.
    pub fn begin_chunk(&mut self) -> Result<u32> {
        let parent = self.stack.last().copied();
        if let Some(parent) = parent {
            let body_end = parent.body_end();
            if self.cursor.position() < body_end {
                self.cursor.seek(body_end).stage(Stage::Decode)?;
            }
        }

        let start = self.cursor.position();
        let header = ChunkHeader {
            type_tag: self.cursor.read_u32().stage(Stage::Decode)?,
            declared_size: self.cursor.read_u32().stage(Stage::Decode)?,
            subtree_size: self.cursor.read_u32().stage(Stage::Decode)?,
        };

        if header.body_size().is_none() {
            return Err(Error::InvalidChunkSize {
                offset: start,
                declared: header.declared_size,
            });
        }
        if header.descendant_size().is_none() {
            return Err(Error::SubtreeSmallerThanChunk {
                offset: start,
                declared: header.declared_size,
                subtree: header.subtree_size,
            });
        }
        if let Some(parent) = parent {
            let remaining = parent.subtree_end().saturating_sub(start);
            if header.subtree_size as u64 > remaining {
                return Err(Error::DescendantOverrun {
                    offset: start,
                    declared: header.subtree_size,
                    remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
                });
            }
        }

        trace!(
            tag = header.type_tag,
            start,
            depth = self.stack.len(),
            "begin chunk"
        );

        self.stack.push(OpenChunk { header, start });
        Ok(header.type_tag)
    }

    /// Close the open chunk, moving past it and all of its descendants
    ///
    /// Fails without moving when the cursor was already read past the end of the chunk.
    pub fn end_chunk(&mut self) -> Result<()> {
        let chunk = *self.stack.last().ok_or(Error::NoOpenChunk)?;
        let position = self.cursor.position();
        if position > chunk.subtree_end() {
            return Err(Error::ReadPastChunk {
                offset: chunk.start,
                end: chunk.subtree_end(),
                position,
            });
        }

        self.stack.pop();
        self.cursor.seek(chunk.subtree_end()).stage(Stage::Decode)
    }

    /// Whether the open chunk has children that have not been visited
    pub fn chunks_remaining(&self) -> bool {
        self.stack.last().is_some_and(|chunk| {
            chunk.header.subtree_size > chunk.header.declared_size
                && self.cursor.position() < chunk.subtree_end()
        })
    }

    /// Type tag of the open chunk
    pub fn current_type(&self) -> Option<u32> {
        self.stack.last().map(|chunk| chunk.header.type_tag)
    }

    /// Header of the open chunk
    pub fn current_header(&self) -> Option<&ChunkHeader> {
        self.stack.last().map(|chunk| &chunk.header)
    }

    /// Bytes of the stream covered by the open chunk and its descendants
    pub fn current_span(&self) -> Option<Range<u64>> {
        self.stack
            .last()
            .map(|chunk| chunk.start..chunk.subtree_end())
    }

    /// Number of open chunks
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The open chunk's own body, regardless of how much of it has been read
    pub fn body(&self) -> Result<&[u8]> {
        let chunk = self.stack.last().ok_or(Error::NoOpenChunk)?;
        let start = chunk.start + ChunkHeader::SIZE;
        let len = chunk.body_end().saturating_sub(start);
        self.cursor.slice(start, len).stage(Stage::Decode)
    }

    /// Direct access to the underlying cursor
    pub fn cursor(&mut self) -> &mut ByteCursor<'a> {
        &mut self.cursor
    }

    /// Read a `u8` from the open chunk
    pub fn read_u8(&mut self) -> Result<u8> {
        self.cursor.read_u8().stage(Stage::Decode)
    }

    /// Read a little endian `u32` from the open chunk
    pub fn read_u32(&mut self) -> Result<u32> {
        self.cursor.read_u32().stage(Stage::Decode)
    }

    /// Read a little endian `i32` from the open chunk
    pub fn read_i32(&mut self) -> Result<i32> {
        self.cursor.read_i32().stage(Stage::Decode)
    }

    /// Read a little endian `f32` from the open chunk
    pub fn read_f32(&mut self) -> Result<f32> {
        self.cursor.read_f32().stage(Stage::Decode)
    }

    /// Read a string prefixed by a single length byte
    pub fn read_string(&mut self) -> Result<String> {
        self.cursor.read_length_prefixed_string().stage(Stage::Decode)
    }

    /// Read `len` raw bytes
    pub fn read_bytes(&mut self, len: u64) -> Result<&[u8]> {
        self.cursor.read_bytes(len).stage(Stage::Decode)
    }
}

#[cfg(test)]
mod test {
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};

    use crate::{
        error::{Error, Result},
        reader::ChunkReader,
        types::ChunkHeader,
    };

    // parent(body "\x03abc" + u32 7) { a { a1 }, b }
    fn stream() -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        ChunkHeader::new(0x100, 8, 48).write(&mut out).unwrap();
        out.write_all(b"\x03abc").unwrap();
        out.write_all(&7u32.to_le_bytes()).unwrap();
        ChunkHeader::new(0x200, 2, 12).write(&mut out).unwrap();
        out.write_all(&[0xAA, 0xBB]).unwrap();
        ChunkHeader::new(0x210, 0, 0).write(&mut out).unwrap();
        ChunkHeader::new(0x300, 10, 0).write(&mut out).unwrap();
        out.write_all(&[0x11; 10]).unwrap();
        out.into_inner()
    }

    #[test]
    fn visit_children() -> Result<()> {
        let data = stream();
        let mut reader = ChunkReader::new(data.as_slice())?;

        assert_eq!(reader.current_type(), Some(0x100));
        assert_eq!(reader.read_string()?, "abc");
        assert_eq!(reader.body()?.len(), 8);

        let mut seen = Vec::new();
        while reader.chunks_remaining() {
            let tag = reader.begin_chunk()?;
            seen.push(tag);
            if tag == 0x200 {
                assert_eq!(reader.body()?, &[0xAA, 0xBB]);
                assert!(reader.chunks_remaining());
                assert_eq!(reader.begin_chunk()?, 0x210);
                assert_eq!(reader.depth(), 3);
                reader.end_chunk()?;
                assert!(!reader.chunks_remaining());
            }
            reader.end_chunk()?;
        }

        assert_eq!(seen, vec![0x200, 0x300]);
        reader.end_chunk()?;
        assert!(reader.cursor().is_exhausted());

        Ok(())
    }

    #[test]
    fn unread_body_is_skipped() -> Result<()> {
        let data = stream();
        let mut reader = ChunkReader::new(data.as_slice())?;

        // nothing of the parent's body was read
        assert_eq!(reader.begin_chunk()?, 0x200);
        reader.end_chunk()?;
        assert_eq!(reader.begin_chunk()?, 0x300);
        assert_eq!(reader.read_u8()?, 0x11);

        Ok(())
    }

    #[test]
    fn unbalanced_end_fails() -> Result<()> {
        let data = stream();
        let mut reader = ChunkReader::new(data.as_slice())?;

        reader.end_chunk()?;
        assert!(matches!(reader.end_chunk(), Err(Error::NoOpenChunk)));
        assert!(!reader.chunks_remaining());

        Ok(())
    }

    #[test]
    fn spans_cover_descendants() -> Result<()> {
        let data = stream();
        let mut reader = ChunkReader::new(data.as_slice())?;
        assert_eq!(reader.current_span(), Some(0..68));

        reader.begin_chunk()?;
        assert_eq!(reader.current_span(), Some(20..46));
        reader.end_chunk()?;
        reader.begin_chunk()?;
        assert_eq!(reader.current_span(), Some(46..68));

        Ok(())
    }

    #[test]
    fn undersized_child_is_rejected() -> Result<()> {
        let mut out = Cursor::new(Vec::new());
        ChunkHeader::new(0x100, 0, 12).write(&mut out).unwrap();
        ChunkHeader {
            type_tag: 0x200,
            declared_size: 4,
            subtree_size: 4,
        }
        .write(&mut out)
        .unwrap();
        let data = out.into_inner();

        let mut reader = ChunkReader::new(data.as_slice())?;
        assert!(reader.chunks_remaining());
        assert!(matches!(
            reader.begin_chunk(),
            Err(Error::InvalidChunkSize {
                offset: 12,
                declared: 4
            })
        ));

        Ok(())
    }

    #[test]
    fn subtree_smaller_than_chunk_is_rejected() {
        let mut out = Cursor::new(Vec::new());
        ChunkHeader {
            type_tag: 0x100,
            declared_size: 16,
            subtree_size: 12,
        }
        .write(&mut out)
        .unwrap();
        out.write_all(&[0; 4]).unwrap();
        let data = out.into_inner();

        assert!(matches!(
            ChunkReader::new(data.as_slice()),
            Err(Error::SubtreeSmallerThanChunk {
                offset: 0,
                declared: 16,
                subtree: 12
            })
        ));
    }

    #[test]
    fn reading_past_a_chunk_stops_the_walk() -> Result<()> {
        let data = stream();
        let mut reader = ChunkReader::new(data.as_slice())?;

        // through a1 and into b
        assert_eq!(reader.begin_chunk()?, 0x200);
        reader.read_bytes(20)?;
        assert!(matches!(
            reader.end_chunk(),
            Err(Error::ReadPastChunk {
                offset: 20,
                end: 46,
                position: 52
            })
        ));
        assert_eq!(reader.depth(), 2);

        Ok(())
    }

    #[test]
    fn truncated_stream_fails() {
        assert!(matches!(
            ChunkReader::new(&[0u8; 8][..]),
            Err(Error::Read { .. })
        ));
    }
}
