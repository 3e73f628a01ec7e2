//! Track Analyzer - tempo, key and file metadata for uploaded audio
//!
//! This library decodes an audio file, estimates its tempo (BPM) and musical
//! key, and reports duration, container format and approximate bitrate.

pub mod analysis;
pub mod decode;
pub mod error;
pub mod model;
pub mod service;

pub use analysis::{Analyzer, AnalyzerConfig, AudioAnalyzer, FailurePolicy, SourceInfo};
pub use decode::{DecoderConfig, SymphoniaDecoder, WaveformDecoder};
pub use error::{AnalysisError, Stage};
pub use model::{AnalysisResult, Waveform};
pub use service::{AnalysisRequest, AnalysisService, ServiceConfig, ServiceError, Upload};
