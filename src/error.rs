//! Error types for the analysis core

use std::fmt;
use thiserror::Error;

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decode,
    Chroma,
    Key,
    Tempo,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Decode => "decode",
            Stage::Chroma => "chroma",
            Stage::Key => "key",
            Stage::Tempo => "tempo",
        };
        f.write_str(name)
    }
}

/// Errors produced by the analysis core
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Caller handed the core something it cannot work with (e.g. a zero sample rate)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Audio bytes could not be turned into a waveform
    #[error("decode failed: {0}")]
    Decode(String),

    /// Signal too short or silent for the stage to produce an estimate
    #[error("insufficient audio for {stage} stage: {reason}")]
    InsufficientAudio { stage: Stage, reason: String },

    /// Chroma vector with the wrong number of bins
    #[error("invalid feature vector: expected 12 bins, got {len}")]
    InvalidFeatureVector { len: usize },

    /// NaN or infinite values showed up inside an estimator
    #[error("numerical failure in {stage} stage")]
    NumericalFailure { stage: Stage },
}

impl AnalysisError {
    pub(crate) fn insufficient(stage: Stage, reason: impl Into<String>) -> Self {
        Self::InsufficientAudio {
            stage,
            reason: reason.into(),
        }
    }

    /// Stage that failed, when the error is tied to one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AnalysisError::Decode(_) => Some(Stage::Decode),
            AnalysisError::InsufficientAudio { stage, .. } => Some(*stage),
            AnalysisError::InvalidFeatureVector { .. } => Some(Stage::Key),
            AnalysisError::NumericalFailure { stage } => Some(*stage),
            AnalysisError::InvalidInput(_) => None,
        }
    }

    /// Whether the orchestrator may substitute a default for the affected field
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalysisError::InsufficientAudio { .. }
                | AnalysisError::InvalidFeatureVector { .. }
                | AnalysisError::NumericalFailure { .. }
        )
    }
}

/// Result alias for the analysis core
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_errors_are_fatal() {
        let err = AnalysisError::Decode("bad header".to_string());
        assert!(!err.is_recoverable());
        assert_eq!(err.stage(), Some(Stage::Decode));
    }

    #[test]
    fn stage_names() {
        let names: Vec<String> = [Stage::Decode, Stage::Chroma, Stage::Key, Stage::Tempo]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, ["decode", "chroma", "key", "tempo"]);
    }

    #[test]
    fn estimator_errors_are_recoverable() {
        let err = AnalysisError::insufficient(Stage::Tempo, "silent");
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "insufficient audio for tempo stage: silent");
        assert!(AnalysisError::InvalidFeatureVector { len: 3 }.is_recoverable());
    }
}
