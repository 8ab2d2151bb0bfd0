mod backend;
mod cli;
mod error;
mod export;
mod model;
mod orchestrator;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;
mod workflow;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Route logs to `--log-file` when given, otherwise to stderr outside the TUI.
/// The TUI owns the terminal, so it stays silent unless a log file is set.
fn init_tracing(args: &cli::Cli) -> Result<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| "sme_navigator=info".into());

    if let Some(path) = args.log_file.as_deref() {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init();
    } else if !args.is_interactive() || cfg!(not(feature = "tui")) {
        tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = cli::Cli::parse();
    init_tracing(&args)?;
    let is_non_tui = !args.is_interactive();

    match cli::run(args).await {
        Ok(()) => {
            // Explicitly exit with code 0 on success, especially for non-TUI modes
            if is_non_tui {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %format!("{e:#}"), "sme-navigator failed");
            Err(e)
        }
    }
}
