//! Built in object decoders

mod opaque;
mod texture;

pub use opaque::OpaqueDecoder;
pub use texture::{Image, ImageHeader, Texture, TextureDecoder, TextureHeader};
