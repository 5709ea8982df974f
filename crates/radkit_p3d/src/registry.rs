//! Chunk type to object decoder dispatch
//!

use derive_more::derive::Display;
use indexmap::IndexMap;
use std::{borrow::Cow, fmt::Debug};
use tracing::{debug, instrument};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    decoders::{OpaqueDecoder, TextureDecoder},
    error::{Error, Result},
    reader::ChunkReader,
    types::tags,
};

/// A single named value reported by an object decoder
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("{name}: {value}")]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Property {
    /// Label of the value
    pub name: Cow<'static, str>,
    /// Rendered value
    pub value: String,
}

impl Property {
    /// Create a property from anything that can be displayed
    pub fn new(name: impl Into<Cow<'static, str>>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

/// The chunk of a decoded stream an object is described from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    /// Type tag of the focused chunk
    pub type_tag: u32,
    /// Offset of the focused chunk's header from the start of the decoded stream
    pub offset: u64,
}

impl Focus {
    pub fn new(type_tag: u32, offset: u64) -> Self {
        Self { type_tag, offset }
    }

    /// Focus on the chunk the stream starts with
    pub fn outer(type_tag: u32) -> Self {
        Self::new(type_tag, 0)
    }
}

/// Turns a re-sliced chunk stream into a typed object
///
/// One decoder serves a family of related chunk types. It is fed the stream of the outermost
/// chunk of the family and afterwards describes whichever member of the family is focused.
pub trait ObjectDecoder: Debug {
    /// Consume the open chunk of `reader` and its descendants
    fn decode(&mut self, reader: &mut ChunkReader<'_>) -> Result<()>;

    /// Properties of the decoded object as seen from the chunk at `focus`
    ///
    /// Returns `None` when nothing has been decoded or the focused chunk is not part of the
    /// family.
    fn describe(&self, focus: Focus) -> Option<Vec<Property>>;
}

/// Creates a fresh decoder for every dispatch
pub type DecoderFactory = fn() -> Box<dyn ObjectDecoder>;

#[derive(Debug, Clone)]
struct Registration {
    name: String,
    factory: DecoderFactory,
}

/// Map from chunk type tag to its decoder and display name
///
/// ```
/// use radkit_p3d::{registry::DecoderRegistry, types::tags};
///
/// let registry = DecoderRegistry::with_defaults();
/// assert_eq!(registry.name_of(tags::TEXTURE), "TEXTURE");
/// assert_eq!(registry.name_of(0xDEAD), "");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DecoderRegistry {
    decoders: IndexMap<u32, Registration>,
}

impl DecoderRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built in decoder
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(tags::TEXTURE, "TEXTURE", || Box::<TextureDecoder>::default());
        registry.register(tags::SHADER, "SHADER", || Box::<OpaqueDecoder>::default());
        registry.register(tags::MESH, "MESH", || Box::<OpaqueDecoder>::default());
        registry.register(tags::COMPOSITE_DRAWABLE, "COMPOSITE_DRAWABLE", || {
            Box::<OpaqueDecoder>::default()
        });
        registry.register(tags::SKELETON, "SKELETON", || Box::<OpaqueDecoder>::default());
        registry
    }

    /// Register `factory` for `type_tag`, replacing any previous registration
    pub fn register(&mut self, type_tag: u32, name: impl Into<String>, factory: DecoderFactory) {
        self.decoders.insert(
            type_tag,
            Registration {
                name: name.into(),
                factory,
            },
        );
    }

    /// A new decoder for `type_tag`, if one is registered
    pub fn resolve(&self, type_tag: u32) -> Option<Box<dyn ObjectDecoder>> {
        self.decoders
            .get(&type_tag)
            .map(|registration| (registration.factory)())
    }

    /// Display name of `type_tag`, empty when unregistered
    pub fn name_of(&self, type_tag: u32) -> &str {
        self.decoders
            .get(&type_tag)
            .map_or("", |registration| registration.name.as_str())
    }

    /// Whether a decoder is registered for `type_tag`
    pub fn contains(&self, type_tag: u32) -> bool {
        self.decoders.contains_key(&type_tag)
    }

    /// Registered type tags in registration order
    pub fn type_tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.decoders.keys().copied()
    }

    /// Decode `stream`, which must start with a chunk of type `type_tag`
    #[instrument(skip(self, stream), fields(len = stream.len()))]
    pub fn decode(&self, type_tag: u32, stream: &[u8]) -> Result<Box<dyn ObjectDecoder>> {
        let mut decoder = self
            .resolve(type_tag)
            .ok_or(Error::UnregisteredChunkType(type_tag))?;

        let mut reader = ChunkReader::new(stream)?;
        decoder.decode(&mut reader)?;
        debug!(name = self.name_of(type_tag), "decoded object");

        Ok(decoder)
    }
}
