use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Create a compact sprint prd.json from the full backlog.json"
)]
pub struct Cli {
    /// Modules to sprint on, e.g. US-001 US-002 (default: next incomplete module)
    pub modules: Vec<String>,

    /// Show backlog progress
    #[clap(long)]
    pub status: bool,

    /// Sync prd.json completion back to the backlog without creating a sprint
    #[clap(long)]
    pub sync: bool,

    /// Project root holding backlog.json and prd.json (default: $SPRINT_PROJECT_ROOT or the current directory)
    #[clap(long)]
    pub root: Option<PathBuf>,
}
