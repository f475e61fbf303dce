use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "autounzip")]
#[command(version)]
#[command(about = "Extract the first .zip archive found in a directory, in parallel", long_about = None)]
#[command(after_help = "Examples:\n  \
  autounzip                 extract the first .zip in the current directory next to it\n  \
  autounzip -C ~/Downloads  look for the archive in ~/Downloads instead\n  \
  autounzip -j 2 -q         use two workers and print only the summary")]
pub struct Cli {
    /// Directory to search for the archive (default: current directory)
    #[arg(short = 'C', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Number of entries to extract concurrently (default: available parallelism)
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Quiet mode, no progress line
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Verbose logging to stderr (-vv => debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn workers(&self) -> usize {
        self.jobs.unwrap_or_else(crate::default_workers).max(1)
    }

    /// Default log level when `RUST_LOG` is unset
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}
