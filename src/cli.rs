use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "unfurl")]
#[command(author, version, about = "Link metadata resolution engine")]
pub struct Cli {
    /// Path to the SQLite cache database
    #[arg(long, global = true, default_value = "unfurl-cache.sqlite")]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve preview metadata for one or more URLs
    Resolve {
        /// URLs to resolve
        #[arg(required = true)]
        urls: Vec<String>,

        /// Archive payload file attached to the links
        #[arg(long)]
        payload: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete expired rows from the cache database
    Sweep,
}
