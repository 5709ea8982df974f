use clap::{Args, ValueEnum};
use itertools::Itertools;
use miette::{miette, Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use radkit_browse::{
    config::{DisplayMode, ResliceTarget},
    NodeTree, Selection, Session, SessionOptions,
};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

use crate::commands::nested_layout;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Mode {
    #[default]
    Default,
    Values,
    Hex,
}

impl From<Mode> for DisplayMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Default => DisplayMode::Default,
            Mode::Values => DisplayMode::Values,
            Mode::Hex => DisplayMode::Hex,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Reslice {
    /// Decode the outermost chunk containing the selection
    #[default]
    Topmost,
    /// Decode the selected chunk itself
    Selected,
}

impl From<Reslice> for ResliceTarget {
    fn from(reslice: Reslice) -> Self {
        match reslice {
            Reslice::Topmost => ResliceTarget::TopmostAncestor,
            Reslice::Selected => ResliceTarget::SelectedNode,
        }
    }
}

#[derive(Args)]
pub struct InspectArgs {
    /// An input RCF or P3D file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Node to select, as `/` separated labels from the root. Repeat to walk into nested archives
    #[arg(short, long, value_name = "PATH")]
    select: Vec<String>,

    /// How the properties of the selection are shown
    #[arg(long, value_enum, default_value_t = Mode::Default)]
    mode: Mode,

    /// Which chunk is decoded when a chunk is selected
    #[arg(long, value_enum, default_value_t = Reslice::Topmost)]
    reslice: Reslice,

    /// Write re-sliced chunk streams to a file before decoding them
    #[arg(long, default_value_t = false)]
    materialize: bool,

    /// Directory for materialized streams
    #[arg(long, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    /// Do not re-open archive records as nested archives
    #[arg(long, default_value_t = false)]
    no_descend: bool,

    /// Nested archives keep their filename table relative to their own start
    #[arg(long, default_value_t = false)]
    single_base: bool,

    /// Emit the tree and properties as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl InspectArgs {
    pub fn handle(&self) -> Result<()> {
        let options = SessionOptions::builder()
            .reslice_target(self.reslice.into())
            .materialize(self.materialize)
            .maybe_temp_dir(self.temp_dir.clone())
            .descend_into_archives(!self.no_descend)
            .nested_layout(nested_layout(self.single_base))
            .build();
        let mut session = Session::new(options);
        session.open_top_level_file(&self.file)?;

        for path in &self.select {
            let labels = path.split('/').filter(|l| !l.is_empty()).collect_vec();
            let id = session
                .tree()?
                .find_path(&labels)
                .ok_or(miette!("no node at {path}"))?;

            match session
                .select_node(id)
                .context(format!("selecting {path}"))?
            {
                Selection::Reopened => info!("entered {path}"),
                Selection::Content => info!("selected {path}"),
            }
        }

        let tree = session.tree()?;
        let properties = match tree.selected() {
            Some(_) => session.selected_properties(self.mode.into())?,
            None => Vec::new(),
        };

        if self.json {
            let out = json!({
                "tree": tree.view(),
                "properties": properties,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&out).into_diagnostic()?
            );
            return Ok(());
        }

        print_tree(tree);
        if !properties.is_empty() {
            println!();
            for property in properties {
                println!("{}: {}", property.name.bold(), property.value);
            }
        }
        Ok(())
    }
}

fn print_tree(tree: &NodeTree) {
    println!("{}", tree.root().name.bold());
    for (depth, _, node) in tree.walk() {
        let indent = "  ".repeat(depth + 1);
        let label = if node.is_container() {
            node.name.blue().to_string()
        } else {
            node.name.clone()
        };
        if node.is_selected() {
            println!("{indent}{} {}", label.reversed(), "<".green());
        } else {
            println!("{indent}{label}");
        }
    }
}
