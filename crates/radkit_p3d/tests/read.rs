use binrw::BinWrite;
use pretty_assertions::assert_eq;
use radkit_bytes::ByteCursor;
use radkit_p3d::{
    decoders::TextureDecoder,
    error::{Error, Result},
    types::{tags, ChunkHeader, P3dHeader},
    ChunkId, ChunkTree, DecoderRegistry, Focus,
};
use std::io::{Cursor, Write};
use tracing_test::traced_test;

fn pstring(s: &str) -> Vec<u8> {
    let mut out = vec![s.len() as u8];
    out.extend_from_slice(s.as_bytes());
    out
}

fn words(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// A shader leaf followed by a texture holding one image with a payload
fn sample() -> Vec<u8> {
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

#[test]
#[traced_test]
fn raw_range_reproduces_chunk_bytes() -> Result<()> {
    let data = sample();
    let tree = ChunkTree::from_bytes(&data)?;

    for (_, chunk) in tree.walk() {
        let range = chunk.raw_range();
        let raw = &data[range.start as usize..range.end as usize];

        let mut expected = Cursor::new(Vec::new());
        chunk.header().write(&mut expected).unwrap();
        expected.write_all(chunk.body()).unwrap();

        assert_eq!(raw, expected.into_inner().as_slice());
    }

    Ok(())
}

#[test]
fn subtree_size_is_never_smaller() -> Result<()> {
    let tree = ChunkTree::from_bytes(&sample())?;

    assert_eq!(tree.len(), 4);
    assert!(tree
        .walk()
        .all(|(_, c)| c.header().subtree_size >= c.header().declared_size));

    Ok(())
}

#[test]
fn reslice_topmost_ancestor_and_dispatch() -> Result<()> {
    let data = sample();
    let tree = ChunkTree::from_bytes(&data)?;
    let registry = DecoderRegistry::with_defaults();

    // IMAGE_DATA is nested under the texture's image
    let focused = tree.find_by_id(ChunkId::from(4)).ok_or(Error::ChunkNotFound(4.into()))?;
    assert_eq!(focused.type_tag(), tags::IMAGE_DATA);

    let top = tree.topmost_ancestor(focused.id())?;
    assert_eq!(top.type_tag(), tags::TEXTURE);
    assert_eq!(registry.name_of(top.type_tag()), "TEXTURE");

    let range = top.subtree_range();
    let stream = &data[range.start as usize..range.end as usize];
    let decoder = registry.decode(top.type_tag(), stream)?;

    let described: Vec<String> = decoder
        .describe(Focus::new(
            focused.type_tag(),
            focused.offset() - top.offset(),
        ))
        .unwrap_or_default()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(described, vec!["Image data: 4", "Format: png"]);

    Ok(())
}

#[test]
fn texture_payload() -> Result<()> {
    let data = sample();
    let tree = ChunkTree::from_bytes(&data)?;
    let texture = tree
        .roots()
        .find(|c| c.type_tag() == tags::TEXTURE)
        .ok_or(Error::UnregisteredChunkType(tags::TEXTURE))?;

    let range = texture.subtree_range();
    let mut reader =
        radkit_p3d::reader::ChunkReader::new(&data[range.start as usize..range.end as usize])?;
    let mut decoder = TextureDecoder::default();
    radkit_p3d::ObjectDecoder::decode(&mut decoder, &mut reader)?;

    let image = &decoder.texture().unwrap().images[0];
    assert_eq!(image.data.as_deref(), Some(&[9u8, 8, 7, 6][..]));

    Ok(())
}

#[test]
fn unregistered_type_is_recoverable() -> Result<()> {
    let data = sample();
    let tree = ChunkTree::from_bytes(&data)?;
    let registry = DecoderRegistry::new();
    let shader = tree.find_by_id(ChunkId::from(1)).unwrap();

    let range = shader.subtree_range();
    let err = registry
        .decode(shader.type_tag(), &data[range.start as usize..range.end as usize])
        .unwrap_err();
    assert!(matches!(err, Error::UnregisteredChunkType(tags::SHADER)));
    assert_eq!(err.to_string(), "no decoder available for chunk type 0x11000");

    Ok(())
}

#[test]
fn file_inside_a_larger_source() -> Result<()> {
    let inner = sample();
    let mut outer = vec![0u8; 100];
    outer.extend_from_slice(&inner);
    outer.extend_from_slice(&[0xCC; 32]);

    let tree = ChunkTree::open(&mut ByteCursor::new(outer.as_slice()), 100)?;
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.roots().next().map(|c| c.offset()), Some(112));

    Ok(())
}
