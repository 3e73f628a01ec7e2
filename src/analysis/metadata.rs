//! Duration, container format and approximate bitrate

use super::config::BitrateRounding;
use crate::model::{AudioFormat, AudioMetadata};

/// Seconds of audio in `sample_count` samples; 0 for a zero sample rate
pub fn duration_secs(sample_count: usize, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    sample_count as f64 / sample_rate as f64
}

/// Average bitrate in kbps from file size and duration; 0 when duration is not positive
pub fn bitrate_kbps(byte_size: u64, duration_sec: f64) -> f64 {
    if duration_sec <= 0.0 || !duration_sec.is_finite() {
        return 0.0;
    }
    (byte_size as f64 * 8.0) / (duration_sec * 1000.0)
}

/// Build the metadata record for one file
pub fn assemble(
    sample_count: usize,
    sample_rate: u32,
    byte_size: u64,
    extension: &str,
    rounding: BitrateRounding,
) -> AudioMetadata {
    let duration_sec = duration_secs(sample_count, sample_rate);
    AudioMetadata {
        duration_sec,
        format: AudioFormat::from_extension(extension),
        bitrate_kbps: rounding.apply(bitrate_kbps(byte_size, duration_sec)),
    }
}
