use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use fakesense_analyzer::{user_message, Analyzer, RecordedOracle, Submission};
use fakesense_common::observability::init_logging;
use fakesense_patterns::fingerprint;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

mod wiring;

#[derive(Parser, Debug)]
#[command(
    name = "fakesense",
    version,
    about = "Authenticity pattern history for analysed news articles"
)]
struct Cli {
    /// YAML configuration file (default: <config dir>/fakesense/fakesense.yaml if present)
    #[arg(long, global = true, env = "FAKESENSE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count stored analyses
    Stats,
    /// Delete the stored history
    Clear,
    /// Print the stored history as JSON, newest first
    History,
    /// Print the text fingerprint of a file (`-` for stdin)
    Fingerprint { file: String },
    /// Replay recorded scores for a text through the pattern matcher
    Check {
        /// Scores as an inline JSON object or a path to a JSON file
        #[arg(long)]
        scores: String,
        /// Article text file (`-` for stdin)
        #[arg(long)]
        text: String,
        #[arg(long)]
        headline: Option<String>,
        /// Add the analysis to the history afterwards
        #[arg(long)]
        remember: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = wiring::load_config(cli.config.as_deref())?;
    let log_path = init_logging(cfg.logging.to_log_config("fakesense"))?;
    tracing::debug!(log = %log_path.display(), command = ?cli.command, "app.start");

    match cli.command {
        Command::Stats => {
            let stats = wiring::pattern_store(&cfg).stats();
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Clear => {
            wiring::pattern_store(&cfg).clear()?;
            println!("Pattern history cleared");
        }
        Command::History => {
            let history = wiring::pattern_store(&cfg).load();
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        Command::Fingerprint { file } => {
            let text = wiring::read_input(&file)?;
            println!("{}", fingerprint(&text));
        }
        Command::Check {
            scores,
            text,
            headline,
            remember,
        } => {
            let scores = wiring::parse_scores(&scores)?;
            let text = wiring::read_input(&text)?;
            let submission =
                Submission::with_limit(text, headline.as_deref(), cfg.submission.max_text_chars)
                    .map_err(|e| anyhow!(user_message(&e)))?;

            let analyzer = Analyzer::new(RecordedOracle::new(scores), wiring::pattern_store(&cfg))
                .with_retry(cfg.retry.to_options());

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let report = analyzer
                .analyze_cancellable(submission, &cancel)
                .await
                .map_err(|e| anyhow!(user_message(&e)))?;
            if remember && analyzer.remember(&report).is_none() {
                eprintln!("warning: analysis could not be added to the history");
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
