use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Convert markdown user stories (US-*.md) into backlog.json"
)]
pub struct Cli {
    /// Directory containing the US-*.md story files (default: docs/userstories)
    #[clap(long)]
    pub dir: Option<PathBuf>,

    /// Project name written to the backlog
    #[clap(long)]
    pub project: Option<String>,

    /// Branch name written to the backlog
    #[clap(long)]
    pub branch: Option<String>,

    /// Project root holding backlog.json (default: $SPRINT_PROJECT_ROOT or the current directory)
    #[clap(long)]
    pub root: Option<PathBuf>,
}
