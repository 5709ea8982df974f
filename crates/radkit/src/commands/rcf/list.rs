use clap::Args;
use miette::Result;
use owo_colors::OwoColorize;
use radkit_browse::FileType;
use radkit_bytes::ByteCursor;
use radkit_rcf::RcfArchive;
use std::path::PathBuf;

use crate::commands::{nested_layout, read_file};

#[derive(Args)]
pub struct ListArgs {
    /// An input RCF file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Offset of the archive within the file
    #[arg(long, default_value_t = 0)]
    offset: u64,

    /// The filename table is relative to the archive's own start
    #[arg(long, default_value_t = false)]
    single_base: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_file(&self.file)?;
        let rcf = RcfArchive::open_with(
            &mut ByteCursor::new(data.as_slice()),
            self.offset,
            nested_layout(self.single_base),
        )?;

        println!(
            "{} records, directory at {:#x}, filenames at {:#x}",
            rcf.len().bold(),
            rcf.header().dir_offset,
            rcf.header().filename_offset
        );

        for record in rcf.records() {
            let date = record
                .modified()
                .map(|date| date.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            println!(
                "{:>10} {:>10} {:>5} {} {}",
                format!("{:#x}", record.absolute_offset()).dimmed(),
                record.size(),
                FileType::from_path(record.path()),
                date.dimmed(),
                record.path()
            );
        }
        Ok(())
    }
}
