//! Standards command - list the supported document photo standards.

use anyhow::Result;
use clap::Args;
use photo_id_core::{standards, PhotoStandard};

use super::check::{parse_standard, resolve_standard};

/// Arguments for the standards command.
#[derive(Args, Clone)]
pub struct StandardsArgs {
    /// Show a single standard
    #[arg(value_parser = parse_standard)]
    pub id: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Run the standards command.
pub fn run(args: &StandardsArgs) -> Result<()> {
    let selected: Vec<&PhotoStandard> = match args.id {
        Some(ref id) => vec![resolve_standard(Some(id))?],
        None => standards().iter().collect(),
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&selected)?
    } else {
        serde_json::to_string(&selected)?
    };
    println!("{json}");
    Ok(())
}
