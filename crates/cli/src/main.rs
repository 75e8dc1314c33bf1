use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use voyage_agents::{Extractor, ExtractorConfig};
use voyage_core::{
    validate_business_rules, violation_messages, ExtractRequest, Itinerary, DEFAULT_CURRENCY,
    DEFAULT_MAX_DAYS,
};
use voyage_observability::{init_tracing, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "voyage")]
#[command(about = "Extract structured travel itineraries from free text")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract an itinerary from --text or stdin and print it as JSON.
    Extract(ExtractArgs),
    /// Check an itinerary JSON file against the business rules.
    Check { path: PathBuf },
}

/// Flags left unset fall back to the same environment settings the API
/// server reads (DEMO_MODE, OPENAI_MODEL, VOYAGE_MAX_REPAIRS, ...).
#[derive(Debug, Args)]
struct ExtractArgs {
    #[arg(long)]
    text: Option<String>,
    #[arg(long, default_value_t = DEFAULT_MAX_DAYS)]
    max_days: u32,
    #[arg(long, default_value = DEFAULT_CURRENCY)]
    currency: String,
    #[arg(long)]
    max_repairs: Option<u32>,
    #[arg(long)]
    demo: bool,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_seconds: Option<u64>,
}

impl ExtractArgs {
    fn apply_to(&self, mut config: ExtractorConfig) -> ExtractorConfig {
        if self.demo {
            config.demo_mode = true;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = self.timeout_seconds {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(max_repairs) = self.max_repairs {
            config.max_repairs = max_repairs;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing("voyage_cli");
    let cli = Cli::parse();

    match cli.command {
        Command::Extract(args) => {
            let config = args.apply_to(ExtractorConfig::from_env());
            let text = match args.text {
                Some(text) => text,
                None => read_stdin()?,
            };
            let request = ExtractRequest {
                text,
                max_days: args.max_days,
                currency: args.currency,
            };
            run_extract(&config, &request, &mut io::stdout()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { path } => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed reading {}", path.display()))?;
            let itinerary = Itinerary::from_model_json(&raw)
                .with_context(|| format!("{} is not a valid itinerary", path.display()))?;

            let violations = violation_messages(&validate_business_rules(&itinerary));
            if violations.is_empty() {
                println!("ok: {} days, no rule violations", itinerary.days().len());
                return Ok(ExitCode::SUCCESS);
            }
            for violation in &violations {
                println!("- {violation}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Writes only the itinerary JSON to `out`; the repair count goes to stderr.
async fn run_extract<W: Write>(
    config: &ExtractorConfig,
    request: &ExtractRequest,
    out: &mut W,
) -> Result<()> {
    request.validate().context("invalid extraction request")?;

    let extractor = Extractor::from_config(config, AppMetrics::shared())?;
    let outcome = extractor
        .extract(
            &request.text,
            request.max_days,
            &request.currency,
            config.max_repairs,
        )
        .await?;

    eprintln!("repairs used: {}", outcome.repairs_used);
    writeln!(out, "{}", serde_json::to_string_pretty(&outcome.itinerary)?)?;
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed reading itinerary text from stdin")?;
    if buffer.trim().is_empty() {
        bail!("no text given: pass --text or pipe the request on stdin");
    }
    Ok(buffer)
}
