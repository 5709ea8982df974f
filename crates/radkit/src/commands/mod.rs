use miette::{Context, IntoDiagnostic, Result};
use radkit_rcf::NestedLayout;
use std::path::Path;

pub mod inspect;
pub mod p3d;
pub mod rcf;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle RCF archives
    Rcf {
        #[command(subcommand)]
        command: rcf::RcfCommands,
    },
    /// Handle P3D files
    P3d {
        #[command(subcommand)]
        command: p3d::P3dCommands,
    },
    /// Browse a file and inspect selected nodes
    Inspect(inspect::InspectArgs),
}

impl Commands {
    pub fn handle(&self) -> Result<()> {
        match self {
            Commands::Rcf { command } => command.handle(),
            Commands::P3d { command } => command.handle(),
            Commands::Inspect(inspect) => inspect.handle(),
        }
    }
}

/// Filename table layout picked by a `--single-base` flag
fn nested_layout(single_base: bool) -> NestedLayout {
    if single_base {
        NestedLayout::SingleBase
    } else {
        NestedLayout::DoubleBase
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))
}
