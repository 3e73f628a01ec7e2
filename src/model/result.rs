use super::DetectedKey;
use serde::{Serialize, Serializer};
use std::fmt;

/// Tempo estimate in beats per minute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEstimate {
    /// Unrounded BPM
    pub bpm: f32,

    /// Normalised autocorrelation strength at the chosen period (0.0-1.0)
    pub confidence: f32,
}

impl TempoEstimate {
    /// BPM rounded for presentation
    pub fn rounded(&self) -> u32 {
        self.bpm.max(0.0).round() as u32
    }
}

/// Container format, derived from the declared file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    M4a,
    Unknown,
}

impl AudioFormat {
    /// Map a declared extension (with or without a leading dot, any case)
    ///
    /// Total: anything outside the known set is `Unknown`.
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.trim().trim_start_matches('.');
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => AudioFormat::Mp3,
            "wav" => AudioFormat::Wav,
            "flac" => AudioFormat::Flac,
            "m4a" => AudioFormat::M4a,
            _ => AudioFormat::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "MP3",
            AudioFormat::Wav => "WAV",
            AudioFormat::Flac => "FLAC",
            AudioFormat::M4a => "M4A",
            AudioFormat::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AudioFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Descriptive metadata about the source file
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioMetadata {
    pub duration_sec: f64,
    pub format: AudioFormat,
    pub bitrate_kbps: f64,
}

/// Final record returned for one analysed file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub bpm: u32,
    pub key: DetectedKey,
    pub duration_sec: f64,
    pub format: AudioFormat,
    pub bitrate_kbps: f64,

    /// Fields that degraded to a default, with the reason
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Full tempo estimate, when one was produced
    #[serde(skip)]
    pub tempo: Option<TempoEstimate>,
}

impl AnalysisResult {
    pub fn metadata(&self) -> AudioMetadata {
        AudioMetadata {
            duration_sec: self.duration_sec,
            format: self.format,
            bitrate_kbps: self.bitrate_kbps,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}
