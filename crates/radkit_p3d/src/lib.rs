//! This library handles reading **P3D** files, the nested chunk format of the Pure3D engine, and
//! handing their chunks to object decoders.
//!
//! # P3D Format Documentation
//!
//! A P3D file is a short header followed by chunk records. Every chunk declares both its own size
//! and the size of its whole subtree, so a reader can skip any chunk without understanding it.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field     | Description                                         |
//! |----------------|-----------|-----------------------------------------------------|
//! | 0x0000         | Magic     | 3 bytes: "P3D"                                      |
//! | 0x0003         | Pad       | 1 byte: `0xFF`                                      |
//! | 0x0004         | Version   | 4 bytes: Format version                             |
//! | 0x0008         | File Size | 4 bytes: Size of the whole file, `0` when unknown   |
//!
//! ### Chunk Record
//!
//! | Offset (bytes) | Field         | Description                                         |
//! |----------------|---------------|-----------------------------------------------------|
//! | 0x0000         | Type          | 4 bytes: Chunk type tag                             |
//! | 0x0004         | Size          | 4 bytes: Header plus the chunk's own body           |
//! | 0x0008         | Subtree Size  | 4 bytes: Header, body and every descendant          |
//! | 0x000C         | Body          | `Size - 12` bytes                                   |
//!
//! The `Subtree Size - Size` bytes after the body are the descendant records. A chunk is a leaf
//! when both sizes are equal.
//!
//! ## Reading
//!
//! [`ChunkTree`] decodes a whole file into an arena of [`tree::Chunk`]s. Root level chunks hold
//! their direct children, and each child holds every record nested below it, flattened into a
//! single list.
//!
//! [`reader::ChunkReader`] walks a single re-sliced chunk and its descendants one level at a time.
//! Object decoders registered in a [`DecoderRegistry`] use it to build typed objects:
//!
//! | Type tag   | Name                 | Decoder                                  |
//! |------------|----------------------|------------------------------------------|
//! | `0x19000`  | `TEXTURE`            | [`decoders::TextureDecoder`]             |
//! | `0x11000`  | `SHADER`             | [`decoders::OpaqueDecoder`]              |
//! | `0x10000`  | `MESH`               | [`decoders::OpaqueDecoder`]              |
//! | `0x123000` | `COMPOSITE_DRAWABLE` | [`decoders::OpaqueDecoder`]              |
//! | `0x23000`  | `SKELETON`           | [`decoders::OpaqueDecoder`]              |
//!
//! ## Additional Information
//!
//! - **File Extension**: `.p3d`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod decoders;
pub mod error;
pub mod read;
pub mod reader;
pub mod registry;
pub mod tree;
pub mod types;

pub use error::{Error, Stage};
pub use read::ChunkBound;
pub use registry::{DecoderRegistry, Focus, ObjectDecoder, Property};
pub use tree::{Chunk, ChunkId, ChunkTree};
