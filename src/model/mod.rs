//! Data model shared by the decoder, the estimators and the service layer
//!
//! These types carry no behaviour beyond validation and rendering; the
//! analysis itself lives in `crate::analysis`.

mod chroma;
mod key;
mod result;
mod waveform;

pub use chroma::{ChromaProfile, CHROMA_BINS};
pub use key::{DetectedKey, KeyEstimate, Mode, PitchClass};
pub use result::{AnalysisResult, AudioFormat, AudioMetadata, TempoEstimate};
pub use waveform::Waveform;
