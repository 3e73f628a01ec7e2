//! Request pipeline: validate → rate limit → stage → decode → analyze → log

use super::config::ServiceConfig;
use super::journal::{AnalysisLog, ConsoleAnalysisLog, FileAnalysisLog, LogEntry};
use super::rate_limit::{IntervalRateLimiter, RateLimiter, Unlimited};
use super::upload::{StagedUpload, Upload};
use super::ServiceError;
use crate::analysis::{Analyzer, AudioAnalyzer, SourceInfo};
use crate::decode::{sniff, SymphoniaDecoder, WaveformDecoder};
use crate::model::AnalysisResult;
use anyhow::Result;
use std::time::Instant;

/// One analysis request
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Client identity used for rate limiting and logging
    pub client: String,

    /// The uploaded file, if the request carried one
    pub file: Option<Upload>,
}

impl AnalysisRequest {
    pub fn new(client: impl Into<String>, file: Upload) -> Self {
        Self {
            client: client.into(),
            file: Some(file),
        }
    }
}

/// Sequences the collaborators around the analysis core
///
/// Shares nothing mutable between requests except the rate limiter and the
/// log, both of which synchronise internally, so one service can handle
/// requests from several threads.
pub struct AnalysisService<A = Analyzer, D = SymphoniaDecoder> {
    config: ServiceConfig,
    analyzer: A,
    decoder: D,
    limiter: Box<dyn RateLimiter>,
    log: Box<dyn AnalysisLog>,
}

impl AnalysisService<Analyzer, SymphoniaDecoder> {
    /// Build the default service from configuration
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let limiter: Box<dyn RateLimiter> = match config.rate_limit_interval {
            Some(interval) => Box::new(IntervalRateLimiter::new(interval)),
            None => Box::new(Unlimited),
        };

        let log: Box<dyn AnalysisLog> = match &config.log_path {
            Some(path) => Box::new(FileAnalysisLog::open(path)?),
            None => Box::new(ConsoleAnalysisLog),
        };

        let analyzer = Analyzer::with_config(config.analyzer.clone());
        let decoder = SymphoniaDecoder::new(config.decoder.clone());

        Ok(Self::new(config, analyzer, decoder, limiter, log))
    }
}

impl<A: AudioAnalyzer, D: WaveformDecoder> AnalysisService<A, D> {
    pub fn new(
        config: ServiceConfig,
        analyzer: A,
        decoder: D,
        limiter: Box<dyn RateLimiter>,
        log: Box<dyn AnalysisLog>,
    ) -> Self {
        Self {
            config,
            analyzer,
            decoder,
            limiter,
            log,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Handle one request end to end
    pub fn handle(&self, request: &AnalysisRequest) -> std::result::Result<AnalysisResult, ServiceError> {
        let upload = request
            .file
            .as_ref()
            .ok_or_else(|| ServiceError::InputValidation("No file part".to_string()))?;

        let extension = upload.validate(&self.config)?;

        self.limiter
            .check_and_record(&request.client, Instant::now())
            .map_err(|retry_after| {
                log::info!(
                    "Rate limited {} for another {:.1}s",
                    request.client,
                    retry_after.as_secs_f32()
                );
                ServiceError::RateLimited { retry_after }
            })?;

        log::debug!("Analyzing {:?} for {}", upload.filename, request.client);

        let result = {
            let staged = StagedUpload::stage(upload, &extension, self.config.staging_dir.as_deref())?;
            sniff::check_declared(sniff::sniff_file(staged.path()), &extension);

            let waveform = self.decoder.decode_file(staged.path(), &extension)?;
            let source = SourceInfo {
                byte_size: upload.byte_size(),
                extension: &extension,
            };
            self.analyzer.analyze(&waveform, source)?
        };

        let entry = LogEntry::now(&request.client, &upload.filename, &result);
        if let Err(e) = self.log.append(&entry) {
            log::warn!("Failed to record analysis of {:?}: {:#}", upload.filename, e);
        }

        Ok(result)
    }
}
