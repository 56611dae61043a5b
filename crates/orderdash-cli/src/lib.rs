//! Shared CLI definitions for orderdash.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

/// Seller group to include in the analysis
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash)]
pub enum GroupArg {
    /// The reserved seller (compared against everyone else)
    Reserved,
    /// Every other seller
    Other,
}

/// How strictly the loaded dataset is checked for suspicious values
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ValidationArg {
    /// Skip validation entirely
    Off,
    /// Log negative/zero amounts and duplicate order numbers, then continue
    Warn,
    /// Refuse to load a dataset with negative amounts or duplicate order numbers
    Strict,
}

impl ValidationArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Warn => "warn",
            Self::Strict => "strict",
        }
    }
}

/// Command-line arguments for orderdash
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "orderdash",
    version,
    about = "Order analytics dashboard in the terminal",
    long_about = "Loads the pre-processed order dataset once, filters it by seller group and \
                  renders revenue, channel, seller loyalty, regional and channel-detail views.\n\n\
                  Without --path the dataset is looked up in the current directory first and \
                  then in every directory listed under [data] search_paths in the config file."
)]
pub struct Args {
    /// Dataset file to open. Skips the search path lookup.
    #[arg(long = "path", value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Configuration file to use instead of ~/.config/orderdash/config.toml
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print every dashboard section to stdout and exit instead of starting the TUI
    #[arg(long = "report", action)]
    pub report: bool,

    /// With --report, print the results as JSON
    #[arg(long = "json", requires = "report", action)]
    pub json: bool,

    /// Seller group to include (repeatable). Default: both groups
    #[arg(long = "group", value_enum, value_name = "GROUP")]
    pub groups: Vec<GroupArg>,

    /// Region used for the best channel x seller combination table
    #[arg(long = "region", value_name = "REGION")]
    pub region: Option<String>,

    /// Dataset validation strictness (overrides config [validation] mode)
    #[arg(long = "validation", value_enum)]
    pub validation: Option<ValidationArg>,

    /// Specify the delimiter to use when reading the dataset
    #[arg(long = "delimiter")]
    pub delimiter: Option<u8>,

    /// Enable debug logging
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Clear all cache data (log file) and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,

    /// Generate default configuration file at ~/.config/orderdash/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let mut parts = Vec::new();
        if let Some(s) = arg.get_short() {
            parts.push(format!("-{s}"));
        }
        if let Some(l) = arg.get_long() {
            parts.push(format!("--{l}"));
        }
        let op = parts.join(", ");
        let placeholder: String = if arg.get_action().takes_values() {
            arg.get_value_names()
                .map(|names| {
                    names
                        .iter()
                        .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default()
        } else {
            String::new()
        };
        let option_str = if placeholder.is_empty() {
            op
        } else {
            format!("{op} {placeholder}")
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
