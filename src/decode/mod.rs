//! Waveform decoding layer
//!
//! Turns an encoded audio byte stream into a mono [`Waveform`]. The rest of
//! the crate only depends on the [`WaveformDecoder`] trait.

mod media;
pub mod sniff;

pub use media::SymphoniaDecoder;

use crate::error::Result;
use crate::model::Waveform;
use std::path::Path;

/// Decoder collaborator - allows swapping the codec backend
pub trait WaveformDecoder {
    /// Decode an in-memory byte stream; `extension` is a probing hint
    fn decode(&self, bytes: &[u8], extension: &str) -> Result<Waveform>;

    /// Decode a file on disk
    fn decode_file(&self, path: &Path, extension: &str) -> Result<Waveform>;
}

/// Decoder configuration
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Stop decoding after this many seconds (None = whole file)
    pub max_seconds: Option<u32>,
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the decoded length
    pub fn with_max_seconds(mut self, seconds: Option<u32>) -> Self {
        self.max_seconds = seconds;
        self
    }
}
