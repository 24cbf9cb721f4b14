//! # CLI Argument Definitions
//!
//! Subcommands and flags of the `docfill` binary, parsed with `clap`.

use clap::{Args, Parser, Subcommand};
use docfill::domain::constants::{DEFAULT_ARCHIVE_NAME, DEFAULT_BASE_NAME, DEFAULT_MAX_DOCUMENTS};
use std::path::PathBuf;

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "docfill")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Fill a Word template once per row of a CSV sheet")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: AppCommands,
}

/// Enumeration of available subcommands.
#[derive(Debug, Subcommand)]
pub enum AppCommands {
    /// Generate one document per sheet row
    Generate(GenerateArgs),
    /// Show the tokens and row count of a sheet
    Inspect {
        /// Replacements sheet (.csv)
        #[arg(short, long)]
        sheet: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Word template (.docx)
    #[arg(short, long)]
    pub template: PathBuf,

    /// Replacements sheet (.csv); the header row holds the tokens to replace
    #[arg(short, long)]
    pub sheet: PathBuf,

    /// Directory with category templates at `<DIR>/<category>/<template file name>`
    #[arg(long, value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Where generated files are written
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Prefix of every generated file name
    #[arg(short, long, default_value = DEFAULT_BASE_NAME)]
    pub base_name: String,

    /// Rows beyond this limit are ignored
    #[arg(short, long, default_value_t = DEFAULT_MAX_DOCUMENTS)]
    pub max_documents: usize,

    /// Also pack every document into a zip archive
    #[arg(long, value_name = "NAME", num_args = 0..=1, default_missing_value = DEFAULT_ARCHIVE_NAME)]
    pub zip: Option<String>,

    /// Replace in headers, footers, footnotes and endnotes as well as the body
    #[arg(long)]
    pub all_parts: bool,
}
