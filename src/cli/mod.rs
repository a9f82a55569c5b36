//! CLI module - Command line interface definitions and handlers

pub mod commands;
pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::prefs::{Theme, ViewMode};
use crate::query::{DateRange, KindFilter, SortKey};

/// Knowledge Lens - terminal view of a knowledge base
///
/// Lists, filters, sorts and searches the documents, links and search
/// history served by a knowledge backend.
#[derive(Parser, Debug)]
#[command(name = "knowledge-lens")]
#[command(author = "Ryan Cashmoney <tunclon@proton.me>")]
#[command(version)]
#[command(about = "Terminal dashboard for a knowledge base backend", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Output format for machine parsing
    #[arg(long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, global = true)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn is_json(&self) -> bool {
        matches!(self.output, Some(OutputFormat::Json))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dashboard: recent documents, most searched, library totals (default)
    Dashboard(DashboardArgs),

    /// List documents in the library
    Library(ListArgs),

    /// List saved links
    Links(ListArgs),

    /// Search documents and links
    Search(SearchArgs),

    /// Show search history
    Logs(LogsArgs),

    /// Show one document
    Show(ShowArgs),

    /// Upload documents
    Upload(UploadArgs),

    /// Save a link
    AddLink(AddLinkArgs),

    /// Show or change theme and accent color
    Prefs(PrefsArgs),

    /// Show or create the config file
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Parser, Default)]
pub struct DashboardArgs {
    /// Also run this search while loading
    #[arg(long, short)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Parser)]
pub struct ListArgs {
    /// Only show entries containing this text
    #[arg(long, short, default_value = "")]
    pub filter: String,

    /// Sort order (default from config)
    #[arg(long, short, value_enum)]
    pub sort: Option<SortArg>,

    /// Layout
    #[arg(long, value_enum)]
    pub view: Option<ViewArg>,
}

#[derive(Debug, Clone, Parser)]
pub struct SearchArgs {
    /// Search query
    #[arg(required = true)]
    pub query: String,

    /// Result kind
    #[arg(long, short, value_enum, default_value = "all")]
    pub kind: KindArg,

    /// Only results created within this window
    #[arg(long, short, value_enum, default_value = "all")]
    pub range: RangeArg,
}

#[derive(Debug, Clone, Parser)]
pub struct LogsArgs {
    /// Only show queries containing this text
    #[arg(long, short, default_value = "")]
    pub filter: String,

    /// Show the results recorded with each search
    #[arg(long)]
    pub results: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct ShowArgs {
    /// Document id
    #[arg(required = true)]
    pub id: String,
}

#[derive(Debug, Clone, Parser)]
pub struct UploadArgs {
    /// Files to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Parser)]
pub struct AddLinkArgs {
    /// Link URL
    #[arg(required = true)]
    pub url: String,

    /// Display title
    #[arg(long, short)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Parser)]
pub struct PrefsArgs {
    /// Set the theme
    #[arg(long, value_enum, conflicts_with = "toggle_theme")]
    pub theme: Option<ThemeArg>,

    /// Switch between light and dark
    #[arg(long)]
    pub toggle_theme: bool,

    /// Set the accent color by palette name (blue, green, orange, purple, pink, red)
    #[arg(long)]
    pub accent: Option<String>,

    /// List the accent palette
    #[arg(long)]
    pub palette: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct ConfigArgs {
    /// Print a commented sample config
    #[arg(long)]
    pub sample: bool,

    /// Write the default config if none exists
    #[arg(long)]
    pub init: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human readable (default)
    Human,
    /// JSON output
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Recent,
    Title,
    Owner,
    Size,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Recent => SortKey::Recent,
            SortArg::Title => SortKey::Title,
            SortArg::Owner => SortKey::Owner,
            SortArg::Size => SortKey::Size,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    All,
    Documents,
    Pdf,
    Links,
}

impl From<KindArg> for KindFilter {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::All => KindFilter::All,
            KindArg::Documents => KindFilter::Documents,
            KindArg::Pdf => KindFilter::Pdf,
            KindArg::Links => KindFilter::Links,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RangeArg {
    All,
    Day,
    Week,
    Month,
}

impl From<RangeArg> for DateRange {
    fn from(arg: RangeArg) -> Self {
        match arg {
            RangeArg::All => DateRange::All,
            RangeArg::Day => DateRange::Day,
            RangeArg::Week => DateRange::Week,
            RangeArg::Month => DateRange::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ViewArg {
    Grid,
    List,
}

impl From<ViewArg> for ViewMode {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Grid => ViewMode::Grid,
            ViewArg::List => ViewMode::List,
        }
    }
}
