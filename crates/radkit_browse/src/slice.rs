//! Carving byte ranges out of backing files

use std::{
    fs::File,
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};
use tempfile::Builder;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    filetype::{extension, file_name, file_stem},
};

/// Read exactly `size` bytes starting at `offset` of the file at `path`
///
/// The file is closed before returning. Fails with [`Error::ShortRead`] when the file ends
/// before `offset + size`.
#[instrument]
pub fn extract_range(path: &Path, offset: u64, size: u64) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(Error::io(path))?;
    let len = file.metadata().map_err(Error::io(path))?.len();

    let available = len.saturating_sub(offset);
    if available < size {
        return Err(Error::ShortRead {
            offset,
            wanted: size,
            got: available,
        });
    }

    file.seek(SeekFrom::Start(offset)).map_err(Error::io(path))?;
    let mut buffer = Vec::new();
    let read = file
        .take(size)
        .read_to_end(&mut buffer)
        .map_err(Error::io(path))?;

    // The file may shrink between the size check and the read
    if (read as u64) < size {
        return Err(Error::ShortRead {
            offset,
            wanted: size,
            got: read as u64,
        });
    }

    debug!(read, "extracted range");
    Ok(buffer)
}

/// Write `bytes` to a new standalone file named after `suggested_name`
///
/// Only the final component of `suggested_name` is used: its stem becomes the prefix of the file
/// name and its extension is kept, with a random part in between so that no earlier file is ever
/// replaced. The file lands in `dir`, or the process temp directory when `dir` is `None`, and is
/// left on disk for the caller.
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn materialize_to_temp(
    bytes: &[u8],
    suggested_name: &str,
    dir: Option<&Path>,
) -> Result<PathBuf> {
    let dir = dir.map_or_else(std::env::temp_dir, Path::to_path_buf);
    let (stem, suffix) = match file_name(suggested_name) {
        "" => ("chunk".to_string(), ".bin".to_string()),
        name => (
            format!("{}_", file_stem(name)),
            extension(name).map(|ext| format!(".{ext}")).unwrap_or_default(),
        ),
    };

    let mut file = Builder::new()
        .prefix(&stem)
        .suffix(&suffix)
        .tempfile_in(&dir)
        .map_err(Error::io(&dir))?;
    file.write_all(bytes).map_err(Error::io(file.path()))?;
    let (_, path) = file
        .keep()
        .map_err(|err| Error::IOFailure {
            path: dir,
            source: err.error,
        })?;
    debug!(path = %path.display(), "materialized");

    Ok(path)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    use crate::{
        error::Error,
        slice::{extract_range, materialize_to_temp},
    };

    #[test]
    fn extract_exact_range() {
        let mut file = NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..=255).collect();
        file.write_all(&data).unwrap();

        let bytes = extract_range(file.path(), 128, 64).unwrap();
        assert_eq!(bytes.len(), 64);
        assert_eq!(bytes, data[128..192].to_vec());
        assert!(extract_range(file.path(), 256, 0).unwrap().is_empty());
    }

    #[test]
    fn short_backing_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xAB; 100]).unwrap();

        let err = extract_range(file.path(), 128, 64).unwrap_err();
        assert!(matches!(
            err,
            Error::ShortRead {
                offset: 128,
                wanted: 64,
                got: 0
            }
        ));

        let err = extract_range(file.path(), 64, 64).unwrap_err();
        assert!(matches!(err, Error::ShortRead { got: 36, .. }));
    }

    #[test]
    fn missing_file() {
        let dir = tempdir().unwrap();
        let err = extract_range(&dir.path().join("gone.rcf"), 0, 1).unwrap_err();
        assert!(matches!(err, Error::IOFailure { .. }));
    }

    #[test]
    fn materialize_uses_final_component() {
        let dir = tempdir().unwrap();
        let path = materialize_to_temp(b"P3D\xFF", "art\\chunk.p3d", Some(dir.path())).unwrap();

        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("chunk_"), "{name}");
        assert!(name.ends_with(".p3d"), "{name}");
        assert_eq!(std::fs::read(path).unwrap(), b"P3D\xFF".to_vec());
    }

    #[test]
    fn materialize_never_replaces_earlier_files() {
        let dir = tempdir().unwrap();
        let first = materialize_to_temp(b"first", "chunk.p3d", Some(dir.path())).unwrap();
        let second = materialize_to_temp(b"second", "chunk.p3d", Some(dir.path())).unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read(first).unwrap(), b"first".to_vec());
        assert_eq!(std::fs::read(second).unwrap(), b"second".to_vec());

        let unnamed = materialize_to_temp(b"", "", Some(dir.path())).unwrap();
        assert!(unnamed.to_str().unwrap().ends_with(".bin"));
    }
}
