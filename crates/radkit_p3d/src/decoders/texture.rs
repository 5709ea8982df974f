//! Decoder for textures and the images they hold
//!
//! A `TEXTURE` chunk carries the texture header and one `IMAGE` child per image. Each image
//! carries its pixels in an `IMAGE_DATA` child or names an external file in an `IMAGE_FILENAME`
//! child.

use std::ops::Range;
use tracing::debug;
use winnow::{
    binary::{le_i32, le_u32, length_take, u8},
    combinator::seq,
    error::{ContextError, ErrMode},
    prelude::*,
};

use crate::{
    error::Result,
    reader::ChunkReader,
    registry::{Focus, ObjectDecoder, Property},
    types::tags,
};

type ParseResult<T> = core::result::Result<T, ErrMode<ContextError>>;

/// Image payload format that holds a PNG file
pub const FORMAT_PNG: u32 = 1;

/// Fields of a `TEXTURE` chunk body
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextureHeader {
    pub name: String,
    pub version: i32,
    pub width: i32,
    pub height: i32,
    pub bpp: i32,
    pub alpha_depth: i32,
    /// Stored count minus one, unless the stored count is zero
    pub mipmap_count: i32,
    pub texture_type: u32,
    pub usage: u32,
}

/// Fields of an `IMAGE` chunk body
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImageHeader {
    pub name: String,
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub bpp: u32,
    pub palettized: u32,
    pub alpha: u32,
    pub format: u32,
}

/// An image of a texture with its payload
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Image {
    pub header: ImageHeader,
    /// Raw payload from an `IMAGE_DATA` child
    pub data: Option<Vec<u8>>,
    /// External file from an `IMAGE_FILENAME` child
    pub file_name: Option<String>,
    /// Bytes of the decoded stream covered by the `IMAGE` chunk and its children
    pub span: Range<u64>,
}

/// A decoded texture
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Texture {
    pub header: TextureHeader,
    pub images: Vec<Image>,
    pub volume_images: usize,
}

fn pstring(input: &mut &[u8]) -> ParseResult<String> {
    length_take(u8)
        .map(|bytes: &[u8]| String::from_utf8_lossy(bytes).into_owned())
        .parse_next(input)
}

fn texture_header(input: &mut &[u8]) -> ParseResult<TextureHeader> {
    seq!(TextureHeader {
        name: pstring,
        version: le_i32,
        width: le_i32,
        height: le_i32,
        bpp: le_i32,
        alpha_depth: le_i32,
        mipmap_count: le_i32.map(|count: i32| if count > 0 { count - 1 } else { count }),
        texture_type: le_u32,
        usage: le_u32,
    })
    .parse_next(input)
}

fn image_header(input: &mut &[u8]) -> ParseResult<ImageHeader> {
    seq!(ImageHeader {
        name: pstring,
        version: le_u32,
        width: le_u32,
        height: le_u32,
        bpp: le_u32,
        palettized: le_u32,
        alpha: le_u32,
        format: le_u32,
    })
    .parse_next(input)
}

fn image_data<'s>(input: &mut &'s [u8]) -> ParseResult<&'s [u8]> {
    length_take(le_u32).parse_next(input)
}

/// Decoder for the `TEXTURE` family
///
/// Describes `TEXTURE`, `IMAGE`, `IMAGE_DATA`, `IMAGE_FILENAME` and `VOLUME_IMAGE` chunks. Image
/// payloads are kept as raw bytes.
#[derive(Debug, Default)]
pub struct TextureDecoder {
    texture: Option<Texture>,
}

impl TextureDecoder {
    /// The decoded texture, once [`ObjectDecoder::decode`] succeeded
    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    fn decode_image(reader: &mut ChunkReader<'_>) -> Result<Image> {
        let header = image_header.parse_next(&mut reader.body()?)?;
        let mut image = Image {
            header,
            span: reader.current_span().unwrap_or_default(),
            ..Default::default()
        };

        while reader.chunks_remaining() {
            match reader.begin_chunk()? {
                tags::IMAGE_DATA => {
                    image.data = Some(image_data.parse_next(&mut reader.body()?)?.to_vec());
                }
                tags::IMAGE_FILENAME => {
                    image.file_name = Some(pstring.parse_next(&mut reader.body()?)?);
                }
                other => debug!(tag = other, "skipping image child"),
            }
            reader.end_chunk()?;
        }

        Ok(image)
    }
}

impl ObjectDecoder for TextureDecoder {
    fn decode(&mut self, reader: &mut ChunkReader<'_>) -> Result<()> {
        let header = texture_header.parse_next(&mut reader.body()?)?;
        let mut texture = Texture {
            header,
            ..Default::default()
        };

        while reader.chunks_remaining() {
            match reader.begin_chunk()? {
                tags::IMAGE => texture.images.push(Self::decode_image(reader)?),
                tags::VOLUME_IMAGE => texture.volume_images += 1,
                other => debug!(tag = other, "skipping texture child"),
            }
            reader.end_chunk()?;
        }

        debug!(name = %texture.header.name, images = texture.images.len(), "decoded texture");
        self.texture = Some(texture);
        Ok(())
    }

    fn describe(&self, focus: Focus) -> Option<Vec<Property>> {
        let texture = self.texture.as_ref()?;
        let header = &texture.header;
        let image = texture
            .images
            .iter()
            .find(|image| image.span.contains(&focus.offset));

        match focus.type_tag {
            tags::TEXTURE => Some(vec![
                Property::new("Name", &header.name),
                Property::new("Version", header.version),
                Property::new("Width", header.width),
                Property::new("Height", header.height),
                Property::new("Bits Per Pixel", header.bpp),
                Property::new("Alpha Depth", header.alpha_depth),
                Property::new("Number of mipmaps", header.mipmap_count),
                Property::new("Texture Type", header.texture_type),
                Property::new("Usage", header.usage),
                Property::new("Images", texture.images.len()),
            ]),
            tags::IMAGE => image.map(|image| {
                vec![
                    Property::new("Name", &image.header.name),
                    Property::new("Version", image.header.version),
                    Property::new("Width", image.header.width),
                    Property::new("Height", image.header.height),
                    Property::new("Bits Per Pixel", image.header.bpp),
                    Property::new("Palettized", image.header.palettized),
                    Property::new("Has alpha", image.header.alpha),
                    Property::new("Number of mipmaps", header.mipmap_count),
                ]
            }),
            tags::IMAGE_DATA => image.map(|image| {
                let format = match image.header.format {
                    FORMAT_PNG => "png".to_string(),
                    other => other.to_string(),
                };
                vec![
                    Property::new("Image data", image.data.as_ref().map_or(0, Vec::len)),
                    Property::new("Format", format),
                ]
            }),
            tags::IMAGE_FILENAME => image.map(|image| {
                vec![Property::new(
                    "File Name",
                    image.file_name.as_deref().unwrap_or_default(),
                )]
            }),
            tags::VOLUME_IMAGE => Some(vec![Property::new(
                "Volume images",
                texture.volume_images,
            )]),
            _ => None,
        }
    }
}
