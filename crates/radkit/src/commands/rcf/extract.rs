use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use radkit_bytes::ByteCursor;
use radkit_rcf::{read::path_components, RcfArchive};
use std::{fs::File, io::Write, path::PathBuf};
use tracing::info;

use crate::commands::{nested_layout, read_file};

#[derive(Args)]
pub struct ExtractArgs {
    /// An input RCF file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Offset of the archive within the file
    #[arg(long, default_value_t = 0)]
    offset: u64,

    /// The filename table is relative to the archive's own start
    #[arg(long, default_value_t = false)]
    single_base: bool,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_file(&self.file)?;
        let rcf = RcfArchive::open_with(
            &mut ByteCursor::new(data.as_slice()),
            self.offset,
            nested_layout(self.single_base),
        )?;

        for record in rcf.records() {
            let p = path_components(record.path())
                .fold(self.directory.clone(), |p, component| p.join(component));
            info!("writing {}", p.display());

            let range = record.range();
            let bytes = data
                .get(range.start as usize..range.end as usize)
                .ok_or(miette!(
                    "{} runs past the end of {}",
                    record.path(),
                    self.file.display()
                ))?;

            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent)
                    .into_diagnostic()
                    .context(format!("creating {}", parent.display()))?;
            }
            let mut out = if !self.overwrite {
                File::create_new(&p)
                    .into_diagnostic()
                    .context(format!("creating {}", &p.display()))?
            } else {
                File::create(&p)
                    .into_diagnostic()
                    .context(format!("creating {}", &p.display()))?
            };

            out.write_all(bytes).into_diagnostic()?;
        }
        Ok(())
    }
}
