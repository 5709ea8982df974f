//! This library handles reading **RCF** files, the "ATG Core Cement Library" resource archives used
//! by Radical Entertainment titles.
//!
//! # RCF Archive Format Documentation
//!
//! An RCF archive is a flat container: one header, one directory table and one filename table.
//! Every contained file is a sibling of the others; folder structure only exists in the
//! backslash separated paths of the filename table.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field              | Description                                              |
//! |----------------|--------------------|----------------------------------------------------------|
//! | 0x0000         | Magic              | 32 bytes: "ATG CORE CEMENT LIBRARY" followed by nulls    |
//! | 0x0020         | Reserved           | 4 bytes: Unknown                                         |
//! | 0x0024         | Directory Offset   | 4 bytes: Offset of the directory table                   |
//! | 0x0028         | Directory Size     | 4 bytes: Size of the directory table                     |
//! | 0x002C         | Filename Offset    | 4 bytes: Offset of the filename table                    |
//! | 0x0030         | Filename Size      | 4 bytes: Size of the filename table                      |
//! | 0x0034         | Reserved           | 4 bytes: Unknown                                         |
//! | 0x0038         | Record Count       | 4 bytes: Number of files in the archive                  |
//!
//! ### Directory Table
//!
//! `Record Count` entries stored contiguously at `Directory Offset`:
//!
//! | Offset (bytes) | Field       | Description                                      |
//! |----------------|-------------|--------------------------------------------------|
//! | 0x0000         | Hash        | 4 bytes: Hash of the file path                   |
//! | 0x0004         | File Offset | 4 bytes: Offset of the file data                 |
//! | 0x0008         | File Size   | 4 bytes: Size of the file data                   |
//!
//! Entries are not guaranteed to be stored in offset order. They are sorted by `File Offset` once
//! loaded so that the next entry's offset bounds the current one.
//!
//! ### Filename Table
//!
//! `Record Count` entries stored sequentially, starting 8 bytes past `Filename Offset`:
//!
//! | Offset (bytes) | Field       | Description                                                |
//! |----------------|-------------|------------------------------------------------------------|
//! | 0x0000         | Date        | 4 bytes: Modification date as a unix timestamp             |
//! | 0x0004         | Reserved    | 8 bytes: Two unknown words                                 |
//! | 0x000C         | Path Length | 4 bytes: Path length, counting a terminator                |
//! | 0x0010         | Path        | `Path Length - 1` bytes: backslash separated path          |
//! | ...            | Padding     | 4 bytes                                                    |
//!
//! The *n*-th filename entry belongs to the *n*-th directory entry after sorting. The pairing is
//! positional, the hash is never consulted.
//!
//! ## Nested Archives
//!
//! An RCF may itself be stored inside another archive. When opened at a non-zero base offset the
//! directory table and file offsets are relative to that base, while the filename table lives at
//! `base + Filename Offset + 8 + base`: the base is counted twice. Archives whose filename table
//! is relative to their own start can be read with [`types::NestedLayout::SingleBase`].
//!
//! ## Additional Information
//!
//! - **File Extension**: `.rcf`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod error;
pub mod read;
pub mod types;

pub use error::{Error, Stage};
pub use read::{RcfArchive, RcfRecord};
pub use types::NestedLayout;
