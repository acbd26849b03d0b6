//! CLI command definitions and handlers.

pub mod check;
pub mod render;
pub mod standards;

use clap::{Parser, Subcommand};

/// Photo ID - identity photo compliance checks
#[derive(Parser)]
#[command(name = "photo-id")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared check arguments (paths, standard, flags).
    #[command(flatten)]
    pub check: check::CheckArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Check images against a document photo standard
    Check(check::CheckArgs),
    /// Render a print-ready photo and sheet for one image
    Render(render::RenderArgs),
    /// List the supported photo standards
    Standards(standards::StandardsArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every image is ready to print.
    Success,
    /// At least one image needs attention.
    IssuesFound,
    /// The command failed.
    Error,
    /// Content moderation blocked at least one image.
    Blocked,
}

impl ExitCode {
    /// Numeric status passed to the operating system.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::IssuesFound => 1,
            Self::Error => 2,
            Self::Blocked => 3,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code.code())
    }
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
pub fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            tracing::debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
