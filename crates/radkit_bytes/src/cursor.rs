//! Random access reader over an immutable byte buffer
//!

use byteorder::{ByteOrder, LittleEndian};
use std::{
    borrow::Cow,
    fmt::{self, Debug},
    io,
};
use tracing::trace;

use crate::error::{Error, Result};

/// A cursor over an owned or borrowed byte buffer
///
/// Every multi-byte read is little endian regardless of the host. A read that needs more bytes
/// than remain fails with [`Error::TruncatedRead`] and leaves the position untouched, a seek past
/// the end fails with [`Error::InvalidOffset`].
///
/// ```
/// use radkit_bytes::ByteCursor;
///
/// let mut cursor = ByteCursor::new(&[0x50, 0x33, 0x44, 0xFF, 0x0C, 0x00, 0x00, 0x00][..]);
/// assert_eq!(cursor.read_fixed_string(3)?, "P3D");
/// cursor.advance(1)?;
/// assert_eq!(cursor.read_u32()?, 12);
/// assert!(cursor.is_exhausted());
/// # Ok::<(), radkit_bytes::error::Error>(())
/// ```
#[derive(Clone)]
pub struct ByteCursor<'a> {
    data: Cow<'a, [u8]>,
    position: u64,
}

impl Debug for ByteCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ByteCursor")
            .field("len", &self.len())
            .field("position", &self.position)
            .finish()
    }
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`
    pub fn new(data: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            data: data.into(),
            position: 0,
        }
    }

    /// Detach the cursor from any borrowed buffer
    pub fn into_owned(self) -> ByteCursor<'static> {
        ByteCursor {
            data: Cow::Owned(self.data.into_owned()),
            position: self.position,
        }
    }

    /// Total length of the underlying buffer
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Whether the underlying buffer holds no bytes at all
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bytes between the current position and the end of the buffer
    pub fn remaining(&self) -> u64 {
        self.len() - self.position
    }

    /// Whether every byte has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Current absolute position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The whole underlying buffer
    pub fn get_ref(&self) -> &[u8] {
        &self.data
    }

    /// Move to an absolute position. Seeking to exactly the end is allowed.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        if offset > self.len() {
            return Err(Error::InvalidOffset {
                offset,
                len: self.len(),
            });
        }
        trace!(from = self.position, to = offset, "seek");
        self.position = offset;
        Ok(())
    }

    /// Move forward by `bytes` from the current position
    pub fn advance(&mut self, bytes: u64) -> Result<()> {
        let target = self.position.saturating_add(bytes);
        self.seek(target)
    }

    /// Fail with [`Error::TruncatedRead`] unless at least `bytes` remain
    pub fn require(&self, bytes: u64) -> Result<()> {
        if bytes > self.remaining() {
            return Err(Error::TruncatedRead {
                offset: self.position,
                wanted: bytes,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Borrow `len` bytes starting at `offset` without moving the cursor
    pub fn slice(&self, offset: u64, len: u64) -> Result<&[u8]> {
        if offset > self.len() {
            return Err(Error::InvalidOffset {
                offset,
                len: self.len(),
            });
        }
        let available = self.len() - offset;
        if len > available {
            return Err(Error::TruncatedRead {
                offset,
                wanted: len,
                available,
            });
        }
        Ok(&self.data[offset as usize..(offset + len) as usize])
    }

    /// Read the next `len` bytes
    pub fn read_bytes(&mut self, len: u64) -> Result<&[u8]> {
        self.require(len)?;
        let start = self.position as usize;
        self.position += len;
        Ok(&self.data[start..start + len as usize])
    }

    /// Read a `u8`
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a little endian `u16`
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    /// Read a little endian `u32`
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    /// Read an `i8`
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read a little endian `i16`
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_bytes(2).map(LittleEndian::read_i16)
    }

    /// Read a little endian `i32`
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_bytes(4).map(LittleEndian::read_i32)
    }

    /// Read a little endian IEEE-754 `f32`
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_bytes(4).map(LittleEndian::read_f32)
    }

    /// Read a `len` byte string field. The value stops at the first null byte, any bytes after it
    /// are padding and are consumed but discarded.
    pub fn read_fixed_string(&mut self, len: u64) -> Result<String> {
        self.read_bytes(len).map(c_string)
    }

    /// Read a string prefixed by a single length byte
    pub fn read_length_prefixed_string(&mut self) -> Result<String> {
        let start = self.position;
        let len = self.read_u8()? as u64;
        if let Err(e) = self.require(len) {
            self.position = start;
            return Err(e);
        }
        self.read_bytes(len).map(c_string)
    }
}

fn c_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

impl From<Vec<u8>> for ByteCursor<'static> {
    fn from(value: Vec<u8>) -> Self {
        ByteCursor::new(value)
    }
}

impl<'a> From<&'a [u8]> for ByteCursor<'a> {
    fn from(value: &'a [u8]) -> Self {
        ByteCursor::new(value)
    }
}

impl From<Error> for io::Error {
    fn from(value: Error) -> Self {
        let kind = match value {
            Error::TruncatedRead { .. } => io::ErrorKind::UnexpectedEof,
            Error::InvalidOffset { .. } => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, value)
    }
}

impl io::Read for ByteCursor<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = &self.data[self.position as usize..];
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.position += count as u64;
        Ok(count)
    }
}

impl io::Seek for ByteCursor<'_> {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let target = match pos {
            io::SeekFrom::Start(offset) => Some(offset),
            io::SeekFrom::End(delta) => self.len().checked_add_signed(delta),
            io::SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };

        match target {
            Some(offset) if offset <= self.len() => {
                self.position = offset;
                Ok(offset)
            }
            Some(offset) => Err(Error::InvalidOffset {
                offset,
                len: self.len(),
            }
            .into()),
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before the start of the source",
            )),
        }
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position)
    }
}
