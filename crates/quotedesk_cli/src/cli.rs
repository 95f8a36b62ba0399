use clap::{Args, Parser, Subcommand, ValueEnum};
use quotedesk_core::config::{
    ENV_DB_PATH, ENV_ENRICH_WORKERS, ENV_IDENTICAL_THRESHOLD, ENV_LOG_DIR, ENV_LOG_LEVEL,
    ENV_SIMILAR_THRESHOLD,
};
use quotedesk_core::QuoteSortKey;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quotedesk")]
#[command(about = "Quote, author and subject admin store with duplicate detection")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database file
    #[arg(long, global = true, env = ENV_DB_PATH)]
    pub db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = ENV_LOG_DIR)]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = ENV_LOG_LEVEL)]
    pub log_level: Option<String>,

    /// Minimum score reported as a similar quote
    #[arg(long, global = true, env = ENV_SIMILAR_THRESHOLD)]
    pub similar_threshold: Option<f64>,

    /// Minimum score that blocks a new quote as identical
    #[arg(long, global = true, env = ENV_IDENTICAL_THRESHOLD)]
    pub identical_threshold: Option<f64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check text against stored quotes without saving it
    Check(CheckArgs),

    /// Add a quote unless an identical one exists
    Add(AddArgs),

    /// List stored quotes
    List(ListArgs),

    /// Full-text search over quote text and author
    Search(SearchArgs),

    /// Subject counts and maintenance
    Subjects {
        #[command(subcommand)]
        command: Option<SubjectsCommand>,
    },

    /// Author registry and profile enrichment
    Authors {
        #[command(subcommand)]
        command: Option<AuthorsCommand>,
    },

    /// Super-subject groupings
    Groups {
        #[command(subcommand)]
        command: Option<GroupsCommand>,
    },

    /// Export all quotes to CSV
    Export(ExportArgs),

    /// Score two strings with the duplicate similarity metric
    Similarity(SimilarityArgs),
}

#[derive(Args)]
pub struct CheckArgs {
    /// Quote text to check
    pub text: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Quote author
    #[arg(short, long)]
    pub author: String,

    /// Quote text
    #[arg(short, long)]
    pub text: String,

    /// Subject tag (repeatable)
    #[arg(short, long = "subject")]
    pub subjects: Vec<String>,

    #[arg(long)]
    pub author_link: Option<String>,

    #[arg(long)]
    pub video_link: Option<String>,

    #[arg(long)]
    pub contributed_by: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    Updated,
    Created,
    Author,
    Text,
}

impl From<SortArg> for QuoteSortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Updated => Self::UpdatedAt,
            SortArg::Created => Self::CreatedAt,
            SortArg::Author => Self::Author,
            SortArg::Text => Self::QuoteText,
        }
    }
}

#[derive(Args)]
pub struct ListArgs {
    /// Only quotes by this author
    #[arg(long)]
    pub author: Option<String>,

    /// Only quotes tagged with this subject
    #[arg(long)]
    pub subject: Option<String>,

    #[arg(long, value_enum, default_value = "updated")]
    pub sort: SortArg,

    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,

    /// Page size (default 50, max 500)
    #[arg(short, long)]
    pub limit: Option<u32>,

    #[arg(long, default_value = "0")]
    pub offset: u32,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search text
    pub text: String,

    /// Only hits by this author
    #[arg(long)]
    pub author: Option<String>,

    #[arg(short, long, default_value = "20")]
    pub limit: u32,

    /// Pass the text to FTS5 as a raw MATCH expression
    #[arg(long)]
    pub raw: bool,
}

#[derive(Subcommand)]
pub enum SubjectsCommand {
    /// Subjects in use with quote counts
    List,

    /// Rename a subject on every quote
    Rename { from: String, to: String },

    /// Remove a subject from every quote
    Remove { subject: String },

    /// Split legacy comma/newline separated subject entries
    Cleanup,
}

#[derive(Subcommand)]
pub enum AuthorsCommand {
    /// Registered authors
    List,

    /// Register every quote author that has no author row yet
    Populate,

    /// Fill missing author bios and photos from Wikipedia
    Enrich(EnrichArgs),
}

#[derive(Args)]
pub struct EnrichArgs {
    /// Author names; defaults to every registered author
    pub names: Vec<String>,

    /// Concurrent lookups
    #[arg(long, env = ENV_ENRICH_WORKERS)]
    pub workers: Option<usize>,
}

#[derive(Subcommand)]
pub enum GroupsCommand {
    /// Groupings with their subjects and authors
    List,

    /// Insert the default groupings into an empty store
    Seed,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file; defaults to quotes_export_<date>.csv
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct SimilarityArgs {
    pub first: String,
    pub second: String,
}
