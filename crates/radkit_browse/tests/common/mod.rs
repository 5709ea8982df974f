#![allow(dead_code)]

use binrw::BinWrite;
use radkit_p3d::types::{tags, ChunkHeader, P3dHeader};
use radkit_rcf::{
    types::{RcfDirectoryEntry, RcfFilenameEntry, RcfHeader},
    RcfArchive,
};
use std::{
    io::{Cursor, Write},
    path::PathBuf,
};
use tempfile::TempDir;

/// Modification date shared by every fixture record, 2001-09-09 01:46:40 UTC
pub const MODIFIED: u32 = 1_000_000_000;

/// Lay out an RCF archive holding `files` in order
pub fn rcf(files: &[(&str, Vec<u8>)]) -> Vec<u8> {
    rcf_at(files, 0)
}

/// Lay out an RCF archive to be stored `base` bytes into another archive
///
/// The filename table is preceded by `base` bytes of padding, so that it is found at
/// `base + filename_offset + 8 + base` of the outer archive.
pub fn rcf_at(files: &[(&str, Vec<u8>)], base: u32) -> Vec<u8> {
    let count = files.len() as u32;
    let dir_offset = RcfHeader::SIZE as u32;
    let dir_size = count * RcfDirectoryEntry::SIZE as u32;
    let filename_offset = dir_offset + dir_size;

    let mut names = Cursor::new(Vec::new());
    [0u32, 0].write_le(&mut names).unwrap();
    for (path, _) in files {
        RcfFilenameEntry::new(*path, MODIFIED)
            .write(&mut names)
            .unwrap();
    }
    let names = names.into_inner();

    let mut data_offset = filename_offset + base + names.len() as u32;
    let mut directory = Vec::new();
    for (i, (_, data)) in files.iter().enumerate() {
        directory.push(RcfDirectoryEntry {
            hash: 0xA000 + i as u32,
            file_offset: data_offset,
            file_size: data.len() as u32,
        });
        data_offset += data.len() as u32;
    }

    let mut out = Cursor::new(Vec::new());
    RcfHeader {
        reserved1: 0x10000,
        dir_offset,
        dir_size,
        filename_offset,
        filename_size: names.len() as u32,
        reserved2: 0,
        record_count: count,
    }
    .write(&mut out)
    .unwrap();
    directory.write(&mut out).unwrap();

    let mut out = out.into_inner();
    out.resize(out.len() + base as usize, 0);
    out.extend_from_slice(&names);
    for (_, data) in files {
        out.extend_from_slice(data);
    }
    out
}

fn pstring(s: &str) -> Vec<u8> {
    let mut out = vec![s.len() as u8];
    out.extend_from_slice(s.as_bytes());
    out
}

fn words(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// A shader leaf followed by a texture holding one image with a four byte payload
///
/// Chunk ids: 1 shader, 2 texture, 3 image, 4 image data.
pub fn p3d() -> Vec<u8> {
    let shader_body = pstring("road_m");

    let mut texture_body = pstring("road");
    texture_body.extend(words(&[14, 16, 16, 24, 0, 1, 0, 0]));
    let mut image_body = pstring("road_0");
    image_body.extend(words(&[14, 16, 16, 24, 0, 0, 1]));
    let mut data_body = words(&[4]);
    data_body.extend_from_slice(&[9, 8, 7, 6]);

    let shader = ChunkHeader::new(tags::SHADER, shader_body.len() as u32, 0);
    let data = ChunkHeader::new(tags::IMAGE_DATA, data_body.len() as u32, 0);
    let image = ChunkHeader::new(tags::IMAGE, image_body.len() as u32, data.subtree_size);
    let texture = ChunkHeader::new(
        tags::TEXTURE,
        texture_body.len() as u32,
        image.subtree_size,
    );

    let mut out = Cursor::new(Vec::new());
    P3dHeader {
        pad: 0xFF,
        version: 12,
        file_size: 0,
    }
    .write(&mut out)
    .unwrap();
    for (header, body) in [
        (shader, shader_body),
        (texture, texture_body),
        (image, image_body),
        (data, data_body),
    ] {
        header.write(&mut out).unwrap();
        out.write_all(&body).unwrap();
    }

    let mut out = out.into_inner();
    let size = out.len() as u32;
    out[8..12].copy_from_slice(&size.to_le_bytes());
    out
}

/// A texture holding two images, `sky_0` with a four byte payload and `sky_1` with two bytes
///
/// Chunk ids: 1 texture, 2 and 4 images, 3 and 5 their image data.
pub fn two_image_p3d() -> Vec<u8> {
    let mut texture_body = pstring("sky");
    texture_body.extend(words(&[14, 16, 16, 24, 0, 1, 0, 0]));

    let mut children = Vec::new();
    let mut descendants = 0;
    for (name, payload) in [("sky_0", &[1u8, 2, 3, 4][..]), ("sky_1", &[5u8, 6][..])] {
        let mut image_body = pstring(name);
        image_body.extend(words(&[14, 16, 16, 24, 0, 0, 1]));
        let mut data_body = words(&[payload.len() as u32]);
        data_body.extend_from_slice(payload);

        let data = ChunkHeader::new(tags::IMAGE_DATA, data_body.len() as u32, 0);
        let image = ChunkHeader::new(tags::IMAGE, image_body.len() as u32, data.subtree_size);
        descendants += image.subtree_size;
        children.push((image, image_body));
        children.push((data, data_body));
    }
    let texture = ChunkHeader::new(tags::TEXTURE, texture_body.len() as u32, descendants);

    let mut out = Cursor::new(Vec::new());
    P3dHeader {
        pad: 0xFF,
        version: 12,
        file_size: 0,
    }
    .write(&mut out)
    .unwrap();
    texture.write(&mut out).unwrap();
    out.write_all(&texture_body).unwrap();
    for (header, body) in children {
        header.write(&mut out).unwrap();
        out.write_all(&body).unwrap();
    }

    let mut out = out.into_inner();
    let size = out.len() as u32;
    out[8..12].copy_from_slice(&size.to_le_bytes());
    out
}

/// Archive with a nested P3D file, a nested archive and a plain record
pub fn nested_rcf() -> Vec<u8> {
    let outer = |inner: Vec<u8>| {
        rcf(&[
            ("art\\frontend.p3d", p3d()),
            ("art\\inner.rcf", inner),
            ("sound\\intro.rsd", b"RSD4 pcm ".to_vec()),
        ])
    };

    // the inner archive's position only depends on the records before it
    let draft = outer(vec![0]);
    let base = RcfArchive::from_bytes(&draft)
        .unwrap()
        .by_name("art\\inner.rcf")
        .unwrap()
        .absolute_offset();

    outer(rcf_at(&[("music\\theme.rsd", vec![0x33; 16])], base as u32))
}

/// Write `bytes` to `name` inside `dir`
pub fn write_temp(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
