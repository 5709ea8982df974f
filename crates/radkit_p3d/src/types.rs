//! Base types for structure of P3D file.

use binrw::{BinRead, BinWrite};

/// P3D file header
///
/// Defines the header of the P3D file which always starts with the characters `P3D`.
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little, magic = b"P3D")]
pub struct P3dHeader {
    /// Single padding byte, `0xFF` in shipped files
    pub pad: u8,

    /// Format version
    pub version: u32,

    /// Total size of the file, header included. `0` when unknown.
    pub file_size: u32,
}

impl P3dHeader {
    /// Size of the header on disk, signature included
    pub const SIZE: u64 = 12;
}

/// Header preceding every chunk record
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[brw(little)]
pub struct ChunkHeader {
    /// Type of the chunk
    pub type_tag: u32,

    /// Size of this header plus the chunk's own body
    pub declared_size: u32,

    /// Size of this header, the chunk's own body and all of its descendants
    pub subtree_size: u32,
}

impl ChunkHeader {
    /// Size of the header on disk
    pub const SIZE: u64 = 12;

    /// Build a header for a chunk with `body` bytes of its own and `descendants` bytes of children
    pub fn new(type_tag: u32, body: u32, descendants: u32) -> Self {
        let declared_size = Self::SIZE as u32 + body;
        Self {
            type_tag,
            declared_size,
            subtree_size: declared_size + descendants,
        }
    }

    /// Whether the chunk owns no descendant bytes
    pub fn is_leaf(&self) -> bool {
        self.subtree_size == self.declared_size
    }

    /// Size of the chunk's own body, if the declared size covers the header
    pub fn body_size(&self) -> Option<u32> {
        self.declared_size.checked_sub(Self::SIZE as u32)
    }

    /// Bytes of descendant records following the body, if the subtree covers the chunk
    pub fn descendant_size(&self) -> Option<u32> {
        self.subtree_size.checked_sub(self.declared_size)
    }
}

/// Well known chunk type tags
pub mod tags {
    /// Texture container
    pub const TEXTURE: u32 = 0x19000;
    /// Image within a texture
    pub const IMAGE: u32 = 0x19001;
    /// Raw payload of an image
    pub const IMAGE_DATA: u32 = 0x19002;
    /// External file name of an image
    pub const IMAGE_FILENAME: u32 = 0x19003;
    /// Volume image within a texture
    pub const VOLUME_IMAGE: u32 = 0x19004;
    /// Shader
    pub const SHADER: u32 = 0x11000;
    /// Mesh geometry
    pub const MESH: u32 = 0x10000;
    /// Skeleton
    pub const SKELETON: u32 = 0x23000;
    /// Composite drawable
    pub const COMPOSITE_DRAWABLE: u32 = 0x123000;
}
