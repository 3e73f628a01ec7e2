//! Service configuration

use crate::analysis::AnalyzerConfig;
use crate::decode::DecoderConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Extensions accepted for upload
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["mp3", "wav", "flac", "m4a"];

/// Configuration for the request-handling layer around the analysis core
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Lowercase extensions accepted for upload
    pub allowed_extensions: Vec<String>,

    /// Largest accepted upload in bytes
    pub max_upload_bytes: u64,

    /// Minimum time between accepted requests from one client (None = unlimited)
    pub rate_limit_interval: Option<Duration>,

    /// Append-only analysis log (None = log through the `log` facade only)
    pub log_path: Option<PathBuf>,

    /// Where uploads are staged while decoding (None = system temp dir)
    pub staging_dir: Option<PathBuf>,

    pub analyzer: AnalyzerConfig,

    pub decoder: DecoderConfig,
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self {
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_upload_bytes: 50 * 1024 * 1024,
            rate_limit_interval: Some(Duration::from_secs(30)),
            log_path: None,
            staging_dir: None,
            analyzer: AnalyzerConfig::new(),
            decoder: DecoderConfig::new(),
        }
    }

    /// Set the per-client minimum request interval
    pub fn with_rate_limit(mut self, interval: Option<Duration>) -> Self {
        self.rate_limit_interval = interval;
        self
    }

    /// Write completed analyses to a log file
    pub fn with_log_path(mut self, path: PathBuf) -> Self {
        self.log_path = Some(path);
        self
    }

    pub fn with_staging_dir(mut self, dir: PathBuf) -> Self {
        self.staging_dir = Some(dir);
        self
    }

    pub fn with_analyzer(mut self, analyzer: AnalyzerConfig) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_decoder(mut self, decoder: DecoderConfig) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Whether `extension` (any case, no dot) is accepted
    pub fn allows_extension(&self, extension: &str) -> bool {
        let ext = extension.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|allowed| *allowed == ext)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}
