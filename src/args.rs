use std::path::PathBuf;

use clap::Parser;
use dirsweep::SizeStrategy;

/// Find and remove node_modules and target directories
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Specify the root directory where dirsweep should search for build artefacts.
    /// Note: This can be a relative path.
    #[arg(short, long, verbatim_doc_comment)]
    pub root: Option<PathBuf>,

    /// Display the log in the terminal as a split screen.
    #[arg(long)]
    pub ui_logger: bool,

    /// Do not actually delete anything. Just simulate it.
    #[arg(short, long)]
    pub dry_run: bool,

    /// Measure file lengths instead of the allocated disk space.
    #[arg(long)]
    pub apparent_size: bool,

    /// Print all found directories and exit.
    #[arg(short, long, conflicts_with = "bridge")]
    pub list: bool,

    /// Print the listing as JSON.
    #[arg(long, requires = "list")]
    pub json: bool,

    /// Serve scan and delete requests as JSON lines on stdin/stdout.
    /// Every request has the shape {"id": 1, "channel": "scan-directory", "args": ["/path"]}.
    #[arg(long, verbatim_doc_comment)]
    pub bridge: bool,
}

impl Args {
    pub fn size_strategy(&self) -> SizeStrategy {
        if self.apparent_size {
            SizeStrategy::Apparent
        } else {
            SizeStrategy::detect()
        }
    }
}
