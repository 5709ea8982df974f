//! Fallback decoder that reports chunk structure only

use crate::{
    error::Result,
    reader::ChunkReader,
    registry::{Focus, ObjectDecoder, Property},
    types::ChunkHeader,
};

/// Decoder for registered types whose bodies are not interpreted
///
/// Reports the outer chunk's header and how many direct children it has.
#[derive(Debug, Default)]
pub struct OpaqueDecoder {
    header: Option<ChunkHeader>,
    children: Vec<u32>,
}

impl ObjectDecoder for OpaqueDecoder {
    fn decode(&mut self, reader: &mut ChunkReader<'_>) -> Result<()> {
        self.header = reader.current_header().copied();
        self.children.clear();

        while reader.chunks_remaining() {
            self.children.push(reader.begin_chunk()?);
            reader.end_chunk()?;
        }
        Ok(())
    }

    fn describe(&self, _focus: Focus) -> Option<Vec<Property>> {
        let header = self.header?;
        Some(vec![
            Property::new("Type", format!("{:#x}", header.type_tag)),
            Property::new("Size", header.declared_size),
            Property::new("Subtree Size", header.subtree_size),
            Property::new("Children", self.children.len()),
        ])
    }
}
