//! Audio analysis layer
//!
//! This module provides the estimators and the orchestrator that runs them
//! over a decoded waveform. The chroma transform sits behind a trait so a
//! different feature extractor can be plugged in without touching the key,
//! tempo or metadata stages.

mod analyzer;
mod chroma;
mod config;
pub mod key;
pub mod metadata;
mod spectrum;
mod tempo;
mod traits;

pub use analyzer::Analyzer;
pub use chroma::ChromaExtractor;
pub use config::{AnalyzerConfig, BitrateRounding, FailurePolicy};
pub use key::{estimate_key, KeyScores, ToneTemplate};
pub use tempo::TempoEstimator;
pub use traits::{AudioAnalyzer, ChromaTransform, SourceInfo};
