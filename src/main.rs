//! Main entry point for the autounzip CLI application.
//!
//! Looks for the first `.zip` file in the working directory (or `-C DIR`)
//! and extracts it next to itself.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use autounzip::{Cli, ConsoleProgress, NoProgress, ParallelExtractor, ProgressSink, find_first_zip};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Warning: could not set up logging: {e}");
    }

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Install a compact stderr subscriber; stdout is reserved for progress.
fn init_logging(cli: &Cli) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(cli.log_level().into())
        .from_env()?;
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .with(env_filter)
        .try_init()?;
    Ok(())
}

/// Locate the archive, extract it, and print the outcome.
async fn run(cli: &Cli) -> Result<ExitCode> {
    let search_dir = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };

    let Some(archive) = find_first_zip(&search_dir)
        .with_context(|| format!("cannot read directory {}", search_dir.display()))?
    else {
        eprintln!("No .zip file found in {}", search_dir.display());
        return Ok(ExitCode::FAILURE);
    };

    let destination = destination_for(&archive);
    let workers = cli.workers();

    if !cli.quiet {
        println!("Found ZIP file: {}", display_name(&archive));
        println!("Extracting files to: {}", destination.display());
        println!("Extracting with {workers} workers...");
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing in-flight entries");
            on_signal.cancel();
        }
    });

    let console = Arc::new(ConsoleProgress::default());
    let sink: Arc<dyn ProgressSink> = if cli.quiet {
        Arc::new(NoProgress)
    } else {
        console.clone()
    };

    let result = ParallelExtractor::new(&archive)
        .workers(workers)
        .progress(sink)
        .cancel_token(cancel)
        .extract_to(&destination)
        .await;
    console.finish();

    match result {
        Ok(report) => {
            println!(
                "Extraction complete! {} entries extracted to: {}",
                report.total_count,
                report.destination_dir.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_corrupt() => {
            eprintln!(
                "Error: {} is not a valid ZIP archive ({e})",
                display_name(&archive)
            );
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            for failure in e.failures() {
                eprintln!("  {failure}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Archives are extracted into the directory that holds them.
fn destination_for(archive: &Path) -> PathBuf {
    match archive.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
