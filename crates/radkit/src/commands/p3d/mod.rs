pub mod tree;

#[derive(clap::Subcommand)]
pub enum P3dCommands {
    /// Print the chunk tree of a P3D file
    Tree(tree::TreeArgs),
}

impl P3dCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            P3dCommands::Tree(tree) => tree.handle(),
        }
    }
}
