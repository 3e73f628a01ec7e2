//! Analysis trait definitions

use crate::error::Result;
use crate::model::{AnalysisResult, ChromaProfile, Waveform};

/// Chroma transform collaborator - allows swapping the feature extractor
pub trait ChromaTransform {
    /// Time-averaged pitch-class energy of the whole waveform
    fn chroma(&self, waveform: &Waveform) -> Result<ChromaProfile>;
}

/// Description of where a waveform came from, needed for metadata
#[derive(Debug, Clone, Copy)]
pub struct SourceInfo<'a> {
    /// Size of the encoded file in bytes
    pub byte_size: u64,

    /// Declared extension of the upload (e.g. "mp3")
    pub extension: &'a str,
}

/// Audio analyzer trait - the orchestrator seam used by the service layer
pub trait AudioAnalyzer {
    /// Run every estimator over one decoded waveform
    fn analyze(&self, waveform: &Waveform, source: SourceInfo<'_>) -> Result<AnalysisResult>;
}
