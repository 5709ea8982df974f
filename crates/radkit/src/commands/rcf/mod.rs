pub mod extract;
pub mod list;

#[derive(clap::Subcommand)]
pub enum RcfCommands {
    /// List the records of an RCF archive
    List(list::ListArgs),
    /// Extract an RCF archive into a directory
    Extract(extract::ExtractArgs),
}

impl RcfCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            RcfCommands::List(list) => list.handle(),
            RcfCommands::Extract(extract) => extract.handle(),
        }
    }
}
