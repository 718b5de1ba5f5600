use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use shared::{
    channels, load_state, run_channels, save_state, Config, ConfigError, DiscordWebhook,
    RunReport, YouTubeSource, DEFAULT_STATE_FILE,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceMode {
    /// Channel RSS/Atom feeds, no credentials needed
    Feed,
    /// YouTube Data API first (needs an API key), feeds as fallback
    Api,
}

fn parse_channel(value: &str) -> Result<String, String> {
    let keys = channels::keys();
    if value == "all" || keys.iter().any(|k| k == value) {
        Ok(value.to_string())
    } else {
        Err(format!(
            "unknown channel '{}'. Use 'all' or one of: {}",
            value,
            keys.join(", ")
        ))
    }
}

#[derive(Parser)]
#[command(name = "announce-videos")]
#[command(about = "Post new YouTube uploads from watched channels to a Discord webhook")]
struct Args {
    /// Channel key to process, or 'all'
    #[arg(long, default_value = "all", value_parser = parse_channel)]
    channel: String,

    /// Path to the JSON file storing the last posted video id per channel
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    state_file: PathBuf,

    /// Post the latest video of each selected channel even if already posted
    #[arg(long)]
    force_latest: bool,

    /// Where to read channel uploads from
    #[arg(long, value_enum, default_value_t = SourceMode::Feed)]
    source: SourceMode,

    /// YouTube Data API key (overrides YOUTUBE_API_KEY / GOOGLE_API_KEY)
    #[arg(long)]
    api_key: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let use_api = args.source == SourceMode::Api;
    let config = match Config::from_env(args.api_key.clone(), use_api) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            return if e.downcast_ref::<ConfigError>().is_some() {
                ExitCode::from(EXIT_CONFIG)
            } else {
                ExitCode::FAILURE
            };
        }
    };

    match run(args, config).await {
        Ok(report) => ExitCode::from(report.exit_code()),
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, config: Config) -> Result<RunReport> {
    let selected = channels::select(&args.channel)
        .ok_or_else(|| anyhow::anyhow!("Unknown channel: {}", args.channel))?;

    let mut state = load_state(&args.state_file)?;

    let api_key = match args.source {
        SourceMode::Api => config.api_key.clone(),
        SourceMode::Feed => None,
    };
    let source = YouTubeSource::new(api_key)?;
    let announcer = DiscordWebhook::new(config.webhook_url)?;

    let report = run_channels(&source, &announcer, &selected, &mut state, args.force_latest).await;

    if report.state_changed {
        save_state(&args.state_file, &state).context("Failed to save last-seen state")?;
    }

    if !report.errors.is_empty() {
        println!("\n⚠ {} channel(s) failed:", report.errors.len());
        for failure in &report.errors {
            println!("  ✗ {}: {:#}", failure.key, failure.error);
        }
    }

    println!("Done. Posted {} video(s).", report.posted);

    Ok(report)
}
