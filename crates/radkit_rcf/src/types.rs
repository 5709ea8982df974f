//! Base types for structure of RCF file.

use binrw::{BinRead, BinWrite};
use chrono::{DateTime, Utc};
use radkit_bytes::ByteCursor;

/// The signature every RCF archive starts with, null padded to 32 bytes
pub const RCF_MAGIC: &[u8; 32] = b"ATG CORE CEMENT LIBRARY\0\0\0\0\0\0\0\0\0";

/// Separator used by the paths stored in the filename table
pub const PATH_SEPARATOR: char = '\\';

/// Bytes between the filename table offset stored in the header and the first entry
pub const FILENAME_TABLE_SKIP: u64 = 8;

/// Where an archive opened at a non-zero base offset keeps its filename table
///
/// The directory table is always found at `base + dir_offset`. Archives at base offset zero are
/// read the same way under every layout.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum NestedLayout {
    /// `base + filename_offset + 8 + base`, the layout written for archives stored in archives
    #[default]
    DoubleBase,
    /// `base + filename_offset + 8`, every table relative to the archive's own start
    SingleBase,
}

impl NestedLayout {
    /// Offset of the first filename entry in the backing source
    pub fn filename_table(self, base_offset: u64, filename_offset: u32) -> u64 {
        let table = base_offset + filename_offset as u64 + FILENAME_TABLE_SKIP;
        match self {
            NestedLayout::DoubleBase => table + base_offset,
            NestedLayout::SingleBase => table,
        }
    }
}

/// RCF file header
///
/// Defines the header of the RCF file which always starts with [`RCF_MAGIC`].
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little, magic = b"ATG CORE CEMENT LIBRARY\0\0\0\0\0\0\0\0\0")]
pub struct RcfHeader {
    /// Unknown, usually a version or alignment value
    pub reserved1: u32,

    /// Offset of the directory table from the start of the archive
    pub dir_offset: u32,

    /// Size in bytes of the directory table
    pub dir_size: u32,

    /// Offset of the filename table from the start of the archive
    pub filename_offset: u32,

    /// Size in bytes of the filename table
    pub filename_size: u32,

    /// Unknown
    pub reserved2: u32,

    /// The number of files stored in the archive
    pub record_count: u32,
}

impl RcfHeader {
    /// Size of the header on disk, signature included
    pub const SIZE: u64 = 32 + 7 * 4;
}

/// RCF directory table entry
///
/// The directory table holds one of these per contained file
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct RcfDirectoryEntry {
    /// Hash of the file's path
    pub hash: u32,

    /// Offset of the file data from the start of the archive
    pub file_offset: u32,

    /// Declared size of the file data
    pub file_size: u32,
}

impl RcfDirectoryEntry {
    /// Size of an entry on disk
    pub const SIZE: u64 = 12;
}

/// RCF filename table entry
///
/// `path_len` counts a null terminator that is not part of the stored path. Only
/// `path_len - 1` bytes of path are stored, followed by four bytes of padding.
#[derive(BinWrite, Debug, Default, Clone, PartialEq, Eq)]
#[bw(little)]
pub struct RcfFilenameEntry {
    /// Modification date as a unix timestamp
    pub modified: u32,

    /// Two unknown words
    pub reserved: [u32; 2],

    /// Length of the path including its terminator
    pub path_len: u32,

    /// Backslash separated path of the file
    #[bw(map = |path: &String| path.as_bytes().to_vec())]
    pub path: String,

    /// Trailing padding
    pub padding: u32,
}

impl RcfFilenameEntry {
    /// Build an entry for `path` with a consistent `path_len`
    pub fn new(path: impl Into<String>, modified: u32) -> Self {
        let path = path.into();
        Self {
            modified,
            path_len: path.len() as u32 + 1,
            path,
            ..Default::default()
        }
    }

    /// Read one entry, consuming exactly `16 + (path_len - 1) + 4` bytes
    pub fn read_from(cursor: &mut ByteCursor<'_>) -> radkit_bytes::Result<Self> {
        let modified = cursor.read_u32()?;
        let reserved = [cursor.read_u32()?, cursor.read_u32()?];
        let path_len = cursor.read_u32()?;
        let path = cursor.read_fixed_string(path_len.saturating_sub(1) as u64)?;
        let padding = cursor.read_u32()?;

        Ok(Self {
            modified,
            reserved,
            path_len,
            path,
            padding,
        })
    }

    /// Modification date, if the stored timestamp is representable
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.modified as i64, 0)
    }

    /// The final component of the path
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(PATH_SEPARATOR)
            .next()
            .unwrap_or(self.path.as_str())
    }
}
