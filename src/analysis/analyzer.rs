//! Analysis orchestrator
//!
//! Runs chroma → key, tempo and metadata over one decoded waveform and
//! applies the configured failure policy to estimator errors.

use super::chroma::ChromaExtractor;
use super::config::{AnalyzerConfig, FailurePolicy};
use super::key::estimate_key;
use super::metadata;
use super::tempo::TempoEstimator;
use super::traits::{AudioAnalyzer, ChromaTransform, SourceInfo};
use crate::error::{AnalysisError, Result};
use crate::model::{AnalysisResult, DetectedKey, Waveform};

/// Default analyzer: STFT chroma, template key scoring, onset autocorrelation tempo
pub struct Analyzer<C = ChromaExtractor> {
    config: AnalyzerConfig,
    chroma: C,
    tempo: TempoEstimator,
}

impl Analyzer<ChromaExtractor> {
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::new())
    }

    /// Create analyzer that fails on any estimator error
    pub fn strict() -> Self {
        Self::with_config(AnalyzerConfig::strict())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        let chroma = ChromaExtractor::new(config.chroma_frame_size, config.chroma_hop_size);
        let tempo = TempoEstimator::new(config.onset_frame_size, config.onset_hop_size)
            .with_bpm_range(config.min_bpm, config.max_bpm);

        Self {
            config,
            chroma,
            tempo,
        }
    }
}

impl Default for Analyzer<ChromaExtractor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ChromaTransform> Analyzer<C> {
    /// Swap in a different chroma transform
    pub fn with_chroma_transform<D: ChromaTransform>(self, chroma: D) -> Analyzer<D> {
        Analyzer {
            config: self.config,
            chroma,
            tempo: self.tempo,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Apply the failure policy to an estimator error
    fn degrade(&self, err: AnalysisError, field: &str, warnings: &mut Vec<String>) -> Result<()> {
        if self.config.policy == FailurePolicy::Strict || !err.is_recoverable() {
            return Err(err);
        }

        log::warn!("{} estimate degraded to default: {}", field, err);
        warnings.push(format!("{}: {}", field, err));
        Ok(())
    }
}

impl<C: ChromaTransform> AudioAnalyzer for Analyzer<C> {
    fn analyze(&self, waveform: &Waveform, source: SourceInfo<'_>) -> Result<AnalysisResult> {
        if waveform.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "waveform has no samples".to_string(),
            ));
        }

        log::debug!(
            "Analyzing {} samples ({:.1}s) at {}Hz",
            waveform.len(),
            waveform.duration_secs(),
            waveform.sample_rate()
        );

        let mut warnings = Vec::new();

        let key = match self.chroma.chroma(waveform).and_then(|c| estimate_key(&c)) {
            Ok(estimate) => DetectedKey::Known(estimate),
            Err(e) => {
                self.degrade(e, "key", &mut warnings)?;
                DetectedKey::Unknown
            }
        };

        let tempo = match self.tempo.estimate(waveform) {
            Ok(tempo) => Some(tempo),
            Err(e) => {
                self.degrade(e, "bpm", &mut warnings)?;
                None
            }
        };

        let meta = metadata::assemble(
            waveform.source_len(),
            waveform.sample_rate(),
            source.byte_size,
            source.extension,
            self.config.bitrate_rounding,
        );

        let bpm = tempo.map(|t| t.rounded()).unwrap_or(0);

        log::info!(
            "Analysis complete: BPM={}, Key={}, {:.1}s {} @ {} kbps",
            bpm,
            key,
            meta.duration_sec,
            meta.format,
            meta.bitrate_kbps
        );

        Ok(AnalysisResult {
            bpm,
            key,
            duration_sec: meta.duration_sec,
            format: meta.format,
            bitrate_kbps: meta.bitrate_kbps,
            warnings,
            tempo,
        })
    }
}
