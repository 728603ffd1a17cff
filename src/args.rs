use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tapwater-sources")]
#[command(about = "Find and rank authoritative drinking-water documents for a location")]
#[command(version)]
pub struct Args {
    /// Free-text location, e.g. "Austin, TX"
    pub location: String,

    /// Question used to seed the search step
    #[arg(short, long, default_value = "")]
    pub question: String,

    /// JSON configuration file (defaults to environment variables)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Allow off-list documents that strongly match the location
    #[arg(long)]
    pub no_strict: bool,

    /// Log dropped and selected documents
    #[arg(short, long)]
    pub debug: bool,

    /// Override maximum concurrent fetches
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Override total retrieval budget in seconds
    #[arg(long)]
    pub total_timeout: Option<u64>,
}
