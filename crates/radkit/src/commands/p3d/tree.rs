use clap::Args;
use miette::Result;
use owo_colors::OwoColorize;
use radkit_bytes::ByteCursor;
use radkit_p3d::{ChunkTree, DecoderRegistry};
use std::path::PathBuf;

use crate::commands::read_file;

#[derive(Args)]
pub struct TreeArgs {
    /// An input P3D file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Offset of the P3D data within the file
    #[arg(long, default_value_t = 0)]
    offset: u64,
}

impl TreeArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_file(&self.file)?;
        let tree = ChunkTree::open(&mut ByteCursor::new(data.as_slice()), self.offset)?;
        let registry = DecoderRegistry::with_defaults();

        println!(
            "P3D version {}, {} chunks",
            tree.header().version,
            tree.len().bold()
        );
        for (depth, chunk) in tree.walk() {
            let tag = chunk.type_tag();
            let name = registry.name_of(tag);
            println!(
                "{}({}){:x} - {} {}",
                "  ".repeat(depth),
                chunk.id(),
                tag,
                name.green(),
                format!(
                    "[{:#x}, {} of {} bytes]",
                    chunk.offset(),
                    chunk.header().declared_size,
                    chunk.header().subtree_size
                )
                .dimmed()
            );
        }
        Ok(())
    }
}
