use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use aegis_core::document::Enriched;
use aegis_core::events::EventNormalizer;
use aegis_core::{
    EventProcessor, MatchDocument, analyze_records, load_config, load_ultimates,
    match_id_from_path, read_records, write_document,
};
use aegis_types::formatting::{format_lead, format_match_time, format_pct_ratio};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Turn a decoded Dota 2 replay into an analytics document")]
struct Cli {
    /// Decoded replay, one JSON record per line
    #[arg(long = "in", value_name = "PATH")]
    input: PathBuf,

    /// Where to write the analytics document
    #[arg(long = "out", value_name = "PATH")]
    output: PathBuf,

    /// TOML file overriding analysis thresholds
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON array of ultimate ability names
    #[arg(long, value_name = "PATH")]
    ults: Option<PathBuf>,

    /// Write single-line JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // If AEGIS_LOG_PATH is set, append to that file
    if let Ok(path) = std::env::var("AEGIS_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    // Fallback to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    // Usage errors exit with clap's own code (2) before logging starts
    let cli = Cli::parse();
    init_logging();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Analysis failed");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let timer = Instant::now();

    let config = load_config(cli.config.as_deref())?;
    let ultimates = load_ultimates(cli.ults.as_deref())?;
    let processor = EventProcessor::new(EventNormalizer::new(ultimates));
    tracing::info!(
        ultimates = processor.normalizer().ultimate_count(),
        "Configuration loaded"
    );

    let (records, _) = read_records(&cli.input)?;
    let enriched = analyze_records(&records, &processor, config);
    log_summary(&enriched);

    let document = MatchDocument::new(enriched, match_id(&cli.input));
    write_document(&document, &cli.output, cli.compact)?;

    tracing::info!(
        elapsed_ms = timer.elapsed().as_millis() as u64,
        out = %cli.output.display(),
        "Done"
    );
    Ok(())
}

fn log_summary(enriched: &Enriched) {
    let last_fight = enriched.fights.last().map_or(-1, |f| f.end);
    let final_lead = enriched
        .aggregated
        .economy_lead_series
        .last()
        .map_or(0, |p| p.lead_gold);
    let observers = enriched
        .wards
        .iter()
        .filter(|w| w.ward_type == aegis_core::tracking::WardType::Observer);
    let (placed, dewarded) = observers.fold((0, 0), |(p, d), w| (p + 1, d + w.dewarded as i64));

    tracing::info!(
        fights = enriched.fights.len(),
        last_fight = %format_match_time(last_fight),
        gold_lead = %format_lead(final_lead),
        observers_dewarded = %format_pct_ratio(dewarded, placed),
        "Match summary"
    );
}

fn match_id(input: &Path) -> Option<u64> {
    let id = match_id_from_path(input);
    if id.is_none() {
        tracing::debug!(path = %input.display(), "No match id in input file name");
    }
    id
}
