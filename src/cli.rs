use crate::backend::{self, BackendClient};
use crate::model::{AnalysisConfig, FileBlob, Language, Outcome, Sector};
use crate::workflow::Workflow;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Parser, Clone)]
#[command(
    name = "sme-navigator",
    version,
    about = "Submit a financial statement for analysis and read the advisory"
)]
pub struct Cli {
    /// Financial statement to analyse (.csv or .xlsx)
    pub file: Option<PathBuf>,

    /// Base URL of the analysis backend
    #[arg(long, env = "FINANCIAL_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Business sector used for benchmarking
    #[arg(long, value_enum, default_value_t = Sector::General)]
    pub sector: Sector,

    /// Language of the generated summary
    #[arg(long, value_enum, default_value_t = Language::En)]
    pub lang: Language,

    /// Give up on an analysis request after this long
    #[arg(long, env = "FINANCIAL_API_TIMEOUT", default_value = "120s")]
    pub timeout: humantime::Duration,

    /// Print the analysis as JSON and exit (no TUI)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Print a text summary and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Write an audit record (JSON) after a successful analysis
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Download the backend's sample statement to this path and exit
    #[arg(long)]
    pub download_sample: Option<PathBuf>,

    /// Write logs to this file (TUI mode only logs when this is set)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        !self.json && !self.text && self.download_sample.is_none()
    }
}

/// Build an `AnalysisConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> AnalysisConfig {
    AnalysisConfig {
        api_url: args.api_url.clone(),
        timeout: Duration::from(args.timeout),
        user_agent: format!("sme-navigator/{}", env!("CARGO_PKG_VERSION")),
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let client = BackendClient::new(&cfg)?;

    if let Some(dest) = args.download_sample.as_deref() {
        let n = backend::download_sample(&client, dest).await?;
        eprintln!("Saved sample statement ({n} bytes): {}", dest.display());
        return Ok(());
    }

    if args.is_interactive() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args, client).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_once(args, client).await;
        }
    }

    run_once(args, client).await
}

/// One submission without the TUI: load the file, submit, print, exit.
async fn run_once(args: Cli, client: BackendClient) -> Result<()> {
    let path = args
        .file
        .as_deref()
        .context("a statement file is required when running without the TUI")?;

    let mut workflow = Workflow::new();
    workflow.select_file(FileBlob::from_path(path)?)?;
    workflow.set_sector(args.sector);
    workflow.set_language(args.lang);
    workflow.submit(&client).await?;

    let result = match workflow.outcome() {
        Outcome::Analysed(result) => result,
        Outcome::Failed(e) => anyhow::bail!("{}", e.message()),
        Outcome::Empty => anyhow::bail!("analysis finished without an outcome"),
    };

    let selection = workflow.selection();
    let processed = crate::orchestrator::process_analysis(
        client.config(),
        args.export_json.as_deref(),
        selection.file_name().unwrap_or_default(),
        selection.sector,
        selection.language,
        result,
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        let body = serde_json::to_string_pretty(&**result)?;
        writeln!(out, "{body}")?;
    } else {
        let summary = crate::text_summary::build_text_summary(selection, result);
        for line in summary.lines {
            writeln!(out, "{line}")?;
        }
    }
    out.flush()?;

    for msg in processed.export_messages {
        eprintln!("{msg}");
    }
    Ok(())
}
