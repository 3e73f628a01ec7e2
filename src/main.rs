use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use track_analyzer::analysis::BitrateRounding;
use track_analyzer::{
    AnalysisRequest, AnalysisService, AnalyzerConfig, DecoderConfig, FailurePolicy, ServiceConfig,
    Upload,
};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "track-analyzer")]
#[command(about = "Detect tempo, key and file metadata of audio files", long_about = None)]
struct Args {
    /// Audio files or directories to analyze
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Client identity used for rate limiting and the analysis log
    #[arg(long, default_value = "local")]
    client: String,

    /// Minimum seconds between accepted requests per client (disabled by default)
    #[arg(long)]
    rate_limit: Option<u64>,

    /// Append one line per completed analysis to this file
    #[arg(long)]
    log_file: Option<String>,

    /// Fail a file when tempo or key can't be estimated instead of degrading the field
    #[arg(long)]
    strict: bool,

    /// Minimum BPM for the reported range (default: 70)
    #[arg(long, default_value = "70")]
    min_bpm: f32,

    /// Maximum BPM for the reported range (default: 170)
    #[arg(long, default_value = "170")]
    max_bpm: f32,

    /// Only decode the first N seconds of each file
    #[arg(long)]
    max_seconds: Option<u32>,

    /// Report bitrate with two decimals instead of whole kbps
    #[arg(long)]
    precise_bitrate: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let analyzer_config = AnalyzerConfig::new()
        .with_bpm_range(args.min_bpm, args.max_bpm)
        .with_policy(if args.strict {
            FailurePolicy::Strict
        } else {
            FailurePolicy::Partial
        })
        .with_bitrate_rounding(if args.precise_bitrate {
            BitrateRounding::Hundredths
        } else {
            BitrateRounding::Integer
        });

    let mut config = ServiceConfig::new()
        .with_analyzer(analyzer_config)
        .with_decoder(DecoderConfig::new().with_max_seconds(args.max_seconds))
        .with_rate_limit(args.rate_limit.map(Duration::from_secs));

    if let Some(log_file) = &args.log_file {
        let expanded = shellexpand::tilde(log_file);
        config = config.with_log_path(PathBuf::from(expanded.as_ref()));
    }

    let files = collect_files(&args.paths, &config);
    if files.is_empty() {
        anyhow::bail!("No audio files found in {:?}", args.paths);
    }
    log::info!("Analyzing {} file(s)", files.len());

    let service = AnalysisService::from_config(config)?;

    let outcomes: Vec<(PathBuf, serde_json::Value, bool)> = files
        .par_iter()
        .map(|path| {
            let (value, ok) = match analyze_path(&service, &args.client, path) {
                Ok(value) => (value, true),
                Err(value) => (value, false),
            };
            (path.clone(), value, ok)
        })
        .collect();

    let mut failures = 0;
    for (path, value, ok) in &outcomes {
        if !ok {
            failures += 1;
        }
        let record = serde_json::json!({ "file": path, "analysis": value });
        let rendered = if args.pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };
        println!("{}", rendered);
    }

    if failures > 0 {
        anyhow::bail!("{} of {} file(s) failed", failures, outcomes.len());
    }

    Ok(())
}

/// Expand directories into the audio files they contain
fn collect_files(paths: &[PathBuf], config: &ServiceConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(true).sort_by_file_name() {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        log::warn!("Skipping unreadable entry: {}", e);
                        continue;
                    }
                };
                let is_audio = entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| config.allows_extension(e))
                    .unwrap_or(false);
                if entry.file_type().is_file() && is_audio {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    files
}

/// Run one file through the service, rendering success or failure as JSON
fn analyze_path(
    service: &AnalysisService,
    client: &str,
    path: &Path,
) -> std::result::Result<serde_json::Value, serde_json::Value> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {:?}", path))
        .map_err(|e| serde_json::json!({ "error": format!("{:#}", e) }))?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let request = AnalysisRequest::new(client, Upload::new(filename, bytes));
    match service.handle(&request) {
        Ok(result) => serde_json::to_value(&result)
            .map_err(|e| serde_json::json!({ "error": e.to_string() })),
        Err(e) => {
            log::warn!("{:?}: {}", path, e);
            Err(serde_json::json!({
                "error": e.to_string(),
                "status": e.status_code(),
                "retry_after": e.retry_after_secs(),
            }))
        }
    }
}
