//! CLI argument parsing using clap derive API
//!
//! Purely declarative; no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// ComposeGenie -- browse container images and assemble docker-compose files.
///
/// Use `composegenie <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "composegenie", version, about, long_about = None)]
pub struct Cli {
    /// Path to the composegenie.toml configuration file (missing file = defaults).
    #[arg(short, long, global = true, default_value = "composegenie.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse the image catalog.
    Catalog(CatalogArgs),

    /// Manage the persisted service selection.
    Select(SelectArgs),

    /// Generate a docker-compose file from the current selection.
    Compose(ComposeArgs),

    /// Score images from vulnerability counts or recorded scans.
    Security(SecurityArgs),

    /// Browse the built-in compose templates.
    Template(TemplateArgs),

    /// Show recorded compose validation results.
    Validate(ValidateArgs),

    /// Inspect configuration.
    Config(ConfigArgs),
}

// ---- catalog ----

#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub action: CatalogAction,
}

#[derive(Subcommand, Debug)]
pub enum CatalogAction {
    /// Filter and sort catalog images.
    Search {
        /// Free-text query matched against name, description and tags.
        #[arg(default_value = "")]
        query: String,

        /// Category filter (e.g. databases, "web servers"). Default: all.
        #[arg(long)]
        category: Option<String>,
    },
    /// List the fixed category set in display order.
    Categories,
    /// Read queries from stdin line by line and print results once typing pauses.
    Watch {
        /// Category filter. Default: all.
        #[arg(long)]
        category: Option<String>,

        /// Override catalog.debounce_ms.
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

// ---- select ----

#[derive(Args, Debug)]
pub struct SelectArgs {
    #[command(subcommand)]
    pub action: SelectAction,
}

#[derive(Subcommand, Debug)]
pub enum SelectAction {
    /// Add an image to the selection.
    Add {
        /// Image name.
        name: String,
        /// Image tag (default: the catalog's latest tag for this image).
        tag: Option<String>,
    },
    /// Remove an image from the selection.
    Remove {
        /// Image name.
        name: String,
        /// Image tag.
        tag: String,
    },
    /// Show the current selection.
    List,
    /// Remove every selected image.
    Clear,
}

// ---- compose ----

#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Write the compose file here instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Override compose.version.
    #[arg(long)]
    pub compose_version: Option<String>,
}

// ---- security ----

#[derive(Args, Debug)]
pub struct SecurityArgs {
    #[command(subcommand)]
    pub action: SecurityAction,
}

#[derive(Subcommand, Debug)]
pub enum SecurityAction {
    /// Score a vulnerability summary.
    Score {
        #[arg(long, default_value_t = 0)]
        critical: u32,
        #[arg(long, default_value_t = 0)]
        high: u32,
        #[arg(long, default_value_t = 0)]
        medium: u32,
        #[arg(long, default_value_t = 0)]
        low: u32,
    },
    /// Show recorded scan reports.
    Report {
        /// Only reports for this image.
        image: Option<String>,
        /// Only reports for this tag (requires IMAGE).
        #[arg(requires = "image")]
        tag: Option<String>,
    },
    /// Show the recorded usage statistics snapshot.
    Stats {
        /// How many of the most scanned images to list.
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
}

// ---- template ----

#[derive(Args, Debug)]
pub struct TemplateArgs {
    #[command(subcommand)]
    pub action: TemplateAction,
}

#[derive(Subcommand, Debug)]
pub enum TemplateAction {
    /// List templates, most popular first.
    List {
        /// Only templates in this category (case-insensitive).
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one template by id.
    Show {
        /// Template id (e.g. tpl_001).
        id: String,
    },
}

// ---- validate ----

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Validation result id. Default: the most recent result.
    pub id: Option<String>,

    /// Only issues of this severity (blocker, warning, suggestion).
    #[arg(long)]
    pub severity: Option<String>,
}

// ---- config ----

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show,
}
