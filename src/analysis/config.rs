//! Analyzer configuration

/// What the orchestrator does when a single estimator fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Substitute a default for the failed field and record a warning
    Partial,

    /// Fail the whole analysis with the estimator's error
    Strict,
}

/// How bitrate is rounded for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitrateRounding {
    /// Nearest whole kbps
    Integer,

    /// Two decimal places
    Hundredths,
}

impl BitrateRounding {
    pub fn apply(&self, kbps: f64) -> f64 {
        match self {
            BitrateRounding::Integer => kbps.round(),
            BitrateRounding::Hundredths => (kbps * 100.0).round() / 100.0,
        }
    }
}

/// Configuration for the analysis core
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// FFT frame size for chroma extraction
    pub chroma_frame_size: usize,

    /// Hop between chroma frames
    pub chroma_hop_size: usize,

    /// FFT frame size for the onset envelope
    pub onset_frame_size: usize,

    /// Hop between onset frames
    pub onset_hop_size: usize,

    /// Lower bound of the reported tempo range
    pub min_bpm: f32,

    /// Upper bound of the reported tempo range
    pub max_bpm: f32,

    pub policy: FailurePolicy,

    pub bitrate_rounding: BitrateRounding,
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self {
            chroma_frame_size: 4096,
            chroma_hop_size: 2048,
            onset_frame_size: 2048,
            onset_hop_size: 512,
            min_bpm: 70.0,
            max_bpm: 170.0,
            policy: FailurePolicy::Partial,
            bitrate_rounding: BitrateRounding::Integer,
        }
    }

    /// Configuration that fails the whole analysis on any estimator error
    pub fn strict() -> Self {
        Self::new().with_policy(FailurePolicy::Strict)
    }

    /// Set the reported BPM range
    pub fn with_bpm_range(mut self, min: f32, max: f32) -> Self {
        self.min_bpm = min;
        self.max_bpm = max;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_bitrate_rounding(mut self, rounding: BitrateRounding) -> Self {
        self.bitrate_rounding = rounding;
        self
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::new()
    }
}
