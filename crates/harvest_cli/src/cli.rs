use std::path::PathBuf;

use clap::Parser;

/// Harvest the media of one profile into local storage
#[derive(Debug, Parser)]
#[command(name = "harvest")]
#[command(about = "Harvest the media of one profile into local storage", long_about = None)]
pub struct Cli {
    /// RON run file describing the source and settings
    #[arg(short, long)]
    pub config: PathBuf,

    /// Profile handle; a leading `@` is ignored
    #[arg(short, long)]
    pub username: String,

    /// Maximum number of harvested items (profile images are not counted)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Only harvest these collections, comma separated (e.g. `posts,stories`)
    #[arg(long, value_delimiter = ',')]
    pub collections: Vec<String>,

    /// Parallel downloads
    #[arg(long, env = "THREADS_DOWNLOAD")]
    pub concurrency: Option<usize>,

    /// Root folder for downloaded media
    #[arg(long, env = "DIR_STORAGE")]
    pub storage_root: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
