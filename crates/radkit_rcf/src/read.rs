//! Types for reading RCF archives
//!

use binrw::BinRead;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use radkit_bytes::ByteCursor;
use std::{
    fmt::{self, Debug},
    ops::Range,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{Error, FileNotFoundError, Result, Stage, StageExt},
    types::{NestedLayout, RcfDirectoryEntry, RcfFilenameEntry, RcfHeader, PATH_SEPARATOR},
};

/// A single file of an RCF archive
///
/// Pairs the directory entry and filename entry found at the same position once the directory has
/// been sorted.
#[derive(Clone, Copy)]
pub struct RcfRecord<'a> {
    index: usize,
    base_offset: u64,
    directory: &'a RcfDirectoryEntry,
    filename: &'a RcfFilenameEntry,
}

impl Debug for RcfRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RcfRecord")
            .field("index", &self.index)
            .field("path", &self.path())
            .field("offset", &self.absolute_offset())
            .field("size", &self.size())
            .finish()
    }
}

impl<'a> RcfRecord<'a> {
    /// Position of this record in the sorted directory
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the full backslash separated path of the file
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this path directly when extracting an archive.
    /// It may contain an absolute path or break out of the current directory
    /// (`..\..\runtime`).
    pub fn path(&self) -> &'a str {
        &self.filename.path
    }

    /// The final component of the path
    pub fn name(&self) -> &'a str {
        self.filename.file_name()
    }

    /// Lower case extension of the file name, if there is one
    pub fn extension(&self) -> Option<String> {
        self.name()
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// Hash stored in the directory entry
    pub fn hash(&self) -> u32 {
        self.directory.hash
    }

    /// Offset of the file data relative to the archive start
    pub fn file_offset(&self) -> u64 {
        self.directory.file_offset as u64
    }

    /// Offset of the file data in the backing source
    pub fn absolute_offset(&self) -> u64 {
        self.base_offset + self.file_offset()
    }

    /// Declared size of the file data
    pub fn size(&self) -> u64 {
        self.directory.file_size as u64
    }

    /// Byte range of the file data in the backing source
    pub fn range(&self) -> Range<u64> {
        let start = self.absolute_offset();
        start..start + self.size()
    }

    /// Modification date of the file
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.filename.modified_at()
    }

    /// The raw directory entry
    pub fn directory_entry(&self) -> &'a RcfDirectoryEntry {
        self.directory
    }

    /// The raw filename entry
    pub fn filename_entry(&self) -> &'a RcfFilenameEntry {
        self.filename
    }
}

/// RCF archive reader
///
/// The archive is decoded eagerly from a [`ByteCursor`]; no handle to the source is retained.
///
/// ```no_run
/// use radkit_bytes::ByteCursor;
///
/// fn list_rcf_contents(path: &str) -> radkit_rcf::error::Result<()> {
///     let data = std::fs::read(path)?;
///     let rcf = radkit_rcf::RcfArchive::open(&mut ByteCursor::new(data), 0)?;
///
///     for record in rcf.records() {
///         println!("{} @ {:#x} ({} bytes)", record.path(), record.absolute_offset(), record.size());
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RcfArchive {
    base_offset: u64,
    header: RcfHeader,
    directory: Vec<RcfDirectoryEntry>,
    filenames: Vec<RcfFilenameEntry>,
    names: IndexMap<Box<str>, usize>,
}

impl RcfArchive {
    /// Read an RCF archive starting at `base_offset` of `source`
    ///
    /// `base_offset` is non-zero when the archive is itself a file inside another archive. The
    /// filename table of such an archive is looked for with [`NestedLayout::DoubleBase`].
    pub fn open(source: &mut ByteCursor<'_>, base_offset: u64) -> Result<Self> {
        Self::open_with(source, base_offset, NestedLayout::default())
    }

    /// Read an RCF archive starting at `base_offset` of `source`, finding its filename table
    /// according to `layout`
    #[instrument(skip(source), fields(len = source.len()))]
    pub fn open_with(
        source: &mut ByteCursor<'_>,
        base_offset: u64,
        layout: NestedLayout,
    ) -> Result<Self> {
        let header = Self::read_header(source, base_offset)?;
        let count = header.record_count as usize;
        debug!(?header, "read header");

        let mut directory = Self::read_directory(source, base_offset, &header)?;
        // Stable, so entries sharing an offset keep their stored order
        directory.sort_by_key(|entry| entry.file_offset);

        let table = layout.filename_table(base_offset, header.filename_offset);
        debug!(table, ?layout, "locating filename table");
        let filenames = Self::read_filenames(source, table, &header)?;

        let mut names = IndexMap::with_capacity(count);
        for (index, entry) in filenames.iter().enumerate() {
            names.entry(entry.path.as_str().into()).or_insert(index);
        }
        if names.len() != count {
            warn!(
                records = count,
                unique = names.len(),
                "archive contains duplicate paths"
            );
        }

        info!(records = count, base_offset, "opened rcf archive");

        Ok(Self {
            base_offset,
            header,
            directory,
            filenames,
            names,
        })
    }

    /// Read an archive held entirely in `data`
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::open(&mut ByteCursor::new(data), 0)
    }

    fn read_header(source: &mut ByteCursor<'_>, base_offset: u64) -> Result<RcfHeader> {
        source.seek(base_offset).stage(Stage::Header)?;
        source.require(RcfHeader::SIZE).stage(Stage::Header)?;
        RcfHeader::read(source).map_err(|e| Error::from_binrw(Stage::Header, e))
    }

    fn read_directory(
        source: &mut ByteCursor<'_>,
        base_offset: u64,
        header: &RcfHeader,
    ) -> Result<Vec<RcfDirectoryEntry>> {
        let stage = Stage::DirectoryTable;
        let count = header.record_count as u64;
        let table_size = count * RcfDirectoryEntry::SIZE;
        if table_size != header.dir_size as u64 {
            debug!(
                declared = header.dir_size,
                computed = table_size,
                "directory size does not match record count"
            );
        }

        source
            .seek(base_offset + header.dir_offset as u64)
            .stage(stage)?;
        source.require(table_size).stage(stage)?;

        (0..count)
            .map(|_| RcfDirectoryEntry::read(source).map_err(|e| Error::from_binrw(stage, e)))
            .collect()
    }

    fn read_filenames(
        source: &mut ByteCursor<'_>,
        table: u64,
        header: &RcfHeader,
    ) -> Result<Vec<RcfFilenameEntry>> {
        let stage = Stage::FilenameTable;
        source.seek(table).stage(stage)?;

        (0..header.record_count)
            .map(|_| RcfFilenameEntry::read_from(source).stage(stage))
            .collect()
    }

    /// Number of files contained in this archive
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    /// Whether this archive contains no files
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset of the archive inside its backing source
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// The decoded header
    pub fn header(&self) -> &RcfHeader {
        &self.header
    }

    /// Directory entries, sorted by file offset
    pub fn directory(&self) -> &[RcfDirectoryEntry] {
        &self.directory
    }

    /// Filename entries, in stored order
    pub fn filenames(&self) -> &[RcfFilenameEntry] {
        &self.filenames
    }

    /// Returns an iterator over all the paths in this archive
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.filenames.iter().map(|entry| entry.path.as_str())
    }

    /// Returns an iterator over every record, in positional order
    pub fn records(&self) -> impl Iterator<Item = RcfRecord<'_>> {
        (0..self.len()).map(|index| self.record(index))
    }

    /// Get the index of a file by its full path, if it's present
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    /// Get the path of a file by index, if it's present
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.filenames.get(index).map(|entry| entry.path.as_str())
    }

    /// Search for a file entry by its full path
    pub fn by_name(&self, name: &str) -> Result<RcfRecord<'_>> {
        self.index_for_name(name)
            .map(|index| self.record(index))
            .ok_or_else(|| FileNotFoundError::Name(name.to_string()).into())
    }

    /// Get a contained file by index
    pub fn by_index(&self, index: usize) -> Result<RcfRecord<'_>> {
        if index >= self.len() {
            return Err(FileNotFoundError::Index(index).into());
        }
        Ok(self.record(index))
    }

    /// Declared size of a file, clamped to the start of the next file's data
    ///
    /// The last file keeps its declared size.
    pub fn bounded_size(&self, index: usize) -> Result<u64> {
        let entry = self
            .directory
            .get(index)
            .ok_or(FileNotFoundError::Index(index))?;
        let size = entry.file_size as u64;

        Ok(match self.directory.get(index + 1) {
            Some(next) => size.min(next.file_offset.saturating_sub(entry.file_offset) as u64),
            None => size,
        })
    }

    fn record(&self, index: usize) -> RcfRecord<'_> {
        RcfRecord {
            index,
            base_offset: self.base_offset,
            directory: &self.directory[index],
            filename: &self.filenames[index],
        }
    }
}

/// Split a stored path into its non-empty components
pub fn path_components(path: &str) -> impl Iterator<Item = &str> {
    path.split(PATH_SEPARATOR).filter(|part| !part.is_empty())
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinWrite;
    use pretty_assertions::assert_eq;
    use radkit_bytes::ByteCursor;
    use tracing_test::traced_test;

    use crate::{
        error::{Error, FileNotFoundError, Result, Stage},
        read::{path_components, RcfArchive},
        types::{NestedLayout, RcfDirectoryEntry, RcfFilenameEntry, RcfHeader},
    };

    fn build(entries: &[(u32, u32, &str)]) -> Vec<u8> {
        let count = entries.len() as u32;
        let dir_offset = RcfHeader::SIZE as u32;
        let dir_size = count * RcfDirectoryEntry::SIZE as u32;
        let filename_offset = dir_offset + dir_size;

        let mut names = Cursor::new(vec![0u8; 8]);
        names.set_position(8);
        for (_, _, path) in entries {
            RcfFilenameEntry::new(*path, 0).write(&mut names).unwrap();
        }
        let names = names.into_inner();

        let header = RcfHeader {
            dir_offset,
            dir_size,
            filename_offset,
            filename_size: names.len() as u32,
            record_count: count,
            ..Default::default()
        };

        let mut out = Cursor::new(Vec::new());
        header.write(&mut out).unwrap();
        for (i, (offset, size, _)) in entries.iter().enumerate() {
            RcfDirectoryEntry {
                hash: i as u32,
                file_offset: *offset,
                file_size: *size,
            }
            .write(&mut out)
            .unwrap();
        }
        let mut out = out.into_inner();
        out.extend_from_slice(&names);
        out
    }

    #[test]
    #[traced_test]
    fn directory_is_sorted_by_offset() -> Result<()> {
        let data = build(&[(300, 10, "c"), (100, 50, "a"), (200, 10, "b")]);
        let rcf = RcfArchive::from_bytes(&data)?;

        let offsets: Vec<u32> = rcf.directory().iter().map(|e| e.file_offset).collect();
        assert_eq!(offsets, vec![100, 200, 300]);

        // Pairing is positional, not by hash
        let first = rcf.by_index(0)?;
        assert_eq!(first.path(), "c");
        assert_eq!(first.hash(), 1);

        Ok(())
    }

    #[test]
    fn bounded_size_clamps_to_next_offset() -> Result<()> {
        let data = build(&[(100, 500, "a"), (200, 10, "b")]);
        let rcf = RcfArchive::from_bytes(&data)?;

        assert_eq!(rcf.bounded_size(0)?, 100);
        assert_eq!(rcf.bounded_size(1)?, 10);
        assert!(matches!(
            rcf.bounded_size(2),
            Err(Error::FileNotFound(FileNotFoundError::Index(2)))
        ));

        Ok(())
    }

    #[test]
    fn lookup_by_name() -> Result<()> {
        let data = build(&[(0, 1, "art\\car.p3d"), (1, 1, "sound\\horn.rsd")]);
        let rcf = RcfArchive::from_bytes(&data)?;

        assert_eq!(rcf.index_for_name("sound\\horn.rsd"), Some(1));
        assert_eq!(rcf.by_name("art\\car.p3d")?.name(), "car.p3d");
        assert_eq!(rcf.by_name("art\\car.p3d")?.extension().as_deref(), Some("p3d"));
        assert!(matches!(
            rcf.by_name("missing"),
            Err(Error::FileNotFound(FileNotFoundError::Name(_)))
        ));

        Ok(())
    }

    #[test]
    fn zeroed_header_is_bad_magic() {
        let err = RcfArchive::from_bytes(&[0u8; 64]).unwrap_err();

        assert!(matches!(err, Error::BadMagic { offset: 0 }));
        assert_eq!(err.stage(), Some(Stage::Header));
    }

    #[test]
    fn short_header_is_truncated() {
        let err = RcfArchive::from_bytes(&[0u8; 32]).unwrap_err();

        assert!(matches!(
            err,
            Error::Read {
                stage: Stage::Header,
                source: radkit_bytes::Error::TruncatedRead { .. }
            }
        ));
    }

    #[test]
    fn nested_filename_table_adds_base_twice() -> Result<()> {
        let inner = build(&[(16, 4, "a\\b.txt")]);
        let names_at = RcfHeader::SIZE as usize + RcfDirectoryEntry::SIZE as usize;

        // the names sit another 64 bytes past where the header points
        let mut data = vec![0xAA; 64];
        data.extend_from_slice(&inner[..names_at]);
        data.extend_from_slice(&[0; 64]);
        data.extend_from_slice(&inner[names_at..]);

        let rcf = RcfArchive::open(&mut ByteCursor::new(data.as_slice()), 64)?;
        let record = rcf.by_index(0)?;
        assert_eq!(record.path(), "a\\b.txt");
        assert_eq!(record.range(), 80..84);

        let single = RcfArchive::open_with(&mut ByteCursor::new(data), 64, NestedLayout::SingleBase)
            .map(|rcf| rcf.file_names().map(str::to_string).collect::<Vec<_>>());
        assert_ne!(single.ok(), Some(vec!["a\\b.txt".to_string()]));

        Ok(())
    }

    #[test]
    fn nested_archive_offsets() -> Result<()> {
        let inner = build(&[(16, 4, "inner.bin")]);
        let mut data = vec![0xAA; 40];
        data.extend_from_slice(&inner);

        let mut source = ByteCursor::new(data);
        let rcf = RcfArchive::open_with(&mut source, 40, NestedLayout::SingleBase)?;
        let record = rcf.by_index(0)?;

        assert_eq!(rcf.base_offset(), 40);
        assert_eq!(record.file_offset(), 16);
        assert_eq!(record.path(), "inner.bin");
        assert_eq!(record.range(), 56..60);

        // read at the doubled offset, the table runs off the end of the source
        assert!(matches!(
            RcfArchive::open(&mut source, 40),
            Err(Error::Read {
                stage: Stage::FilenameTable,
                ..
            })
        ));

        Ok(())
    }

    #[test]
    fn layouts_agree_at_the_start_of_a_source() {
        assert_eq!(NestedLayout::DoubleBase.filename_table(0, 72), 80);
        assert_eq!(NestedLayout::SingleBase.filename_table(0, 72), 80);
        assert_eq!(NestedLayout::DoubleBase.filename_table(64, 72), 208);
        assert_eq!(NestedLayout::SingleBase.filename_table(64, 72), 144);
    }

    #[test]
    fn components_skip_empty_segments() {
        let parts: Vec<&str> = path_components("\\art\\\\car.p3d").collect();
        assert_eq!(parts, vec!["art", "car.p3d"]);
    }
}
