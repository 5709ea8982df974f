//! Classification of files by extension

use derive_more::derive::Display;
use radkit_rcf::types::RCF_MAGIC;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Type of a file, derived from its extension
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum FileType {
    /// Flat resource archive
    #[display("rcf")]
    Rcf,
    /// Pure3D chunk file
    #[display("p3d")]
    P3d,
    /// Radical sound data
    #[display("rsd")]
    Rsd,
    /// Compiled shader object
    #[display("cso")]
    Cso,
    /// Bink video
    #[display("bik")]
    Bik,
    /// Font or shader compiled object
    #[display("fsc")]
    Fsc,
    /// Directory listing
    #[display("dir")]
    Directory,
    /// Anything else
    #[default]
    #[display("unknown")]
    Unknown,
}

impl FileType {
    /// Classify an extension without its leading dot, ignoring case
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "rcf" => FileType::Rcf,
            "p3d" => FileType::P3d,
            "rsd" => FileType::Rsd,
            "cso" => FileType::Cso,
            "bik" => FileType::Bik,
            "fsc" => FileType::Fsc,
            "dir" => FileType::Directory,
            _ => FileType::Unknown,
        }
    }

    /// Classify a `/` or `\` separated path by its extension
    pub fn from_path(path: &str) -> Self {
        extension(path).map_or(FileType::Unknown, |ext| Self::from_extension(&ext))
    }

    /// Recognize an archive from its leading bytes
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(RCF_MAGIC) {
            Some(FileType::Rcf)
        } else if bytes.starts_with(P3D_MAGIC) {
            Some(FileType::P3d)
        } else {
            None
        }
    }

    /// Whether the type decodes into a navigable tree
    pub fn is_archive(&self) -> bool {
        matches!(self, FileType::Rcf | FileType::P3d)
    }
}

const P3D_MAGIC: &[u8; 3] = b"P3D";

/// Final component of a `/` or `\` separated path
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Final component of a path without its extension
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}

/// Lower case extension of the final component of a path
pub fn extension(path: &str) -> Option<String> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(dot) => Some(name[dot + 1..].to_ascii_lowercase()),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::filetype::{extension, file_name, file_stem, FileType};

    #[test]
    fn extensions_ignore_case() {
        assert_eq!(FileType::from_extension("RCF"), FileType::Rcf);
        assert_eq!(FileType::from_extension("p3D"), FileType::P3d);
        assert_eq!(FileType::from_extension("dir"), FileType::Directory);
        assert_eq!(FileType::from_extension("txt"), FileType::Unknown);
        assert_eq!(FileType::from_path("art\\cars\\FAMIL_V.P3D"), FileType::P3d);
        assert_eq!(FileType::from_path("music/theme"), FileType::Unknown);
    }

    #[test]
    fn path_helpers() {
        assert_eq!(file_name("C:\\games\\sound\\music00.rcf"), "music00.rcf");
        assert_eq!(file_name("/tmp/chunk.p3d"), "chunk.p3d");
        assert_eq!(file_name("plain"), "plain");
        assert_eq!(file_stem("art\\frontend.scr.p3d"), "frontend.scr");
        assert_eq!(file_stem("dir.v2/readme"), "readme");
        assert_eq!(extension("dir.v2/readme"), None);
        assert_eq!(extension(".hidden"), None);
        assert_eq!(extension("a/B.Rsd").as_deref(), Some("rsd"));
    }

    #[test]
    fn magic_sniffing() {
        let mut rcf = radkit_rcf::types::RCF_MAGIC.to_vec();
        rcf.extend_from_slice(&[0; 28]);
        assert_eq!(FileType::from_magic(&rcf), Some(FileType::Rcf));
        assert_eq!(FileType::from_magic(b"P3D\xFF\x0c"), Some(FileType::P3d));
        assert_eq!(FileType::from_magic(&rcf[..10]), None);
        assert_eq!(FileType::from_magic(&[]), None);
    }

    #[test]
    fn display_matches_extension() {
        assert_eq!(FileType::Rcf.to_string(), "rcf");
        assert_eq!(FileType::Unknown.to_string(), "unknown");
        assert!(FileType::P3d.is_archive());
        assert!(!FileType::Rsd.is_archive());
    }
}
