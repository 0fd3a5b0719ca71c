//! Whisper Rooms TUI entry point.

use std::path::PathBuf;

use clap::Parser;
use whisper_tui::runtime::Runtime;

/// Whisper Rooms terminal client
#[derive(Parser, Debug)]
#[command(name = "whisper-tui")]
#[command(about = "Terminal client for Whisper Rooms group chat")]
#[command(version)]
struct Args {
    /// Write logs to this file (respects RUST_LOG).
    ///
    /// Logging is file-only so the alternate screen stays clean.
    #[arg(short, long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    Ok(Runtime::new()?.run().await?)
}
