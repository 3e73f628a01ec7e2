use crate::error::{AnalysisError, Result};

/// Decoded mono audio
#[derive(Debug, Clone)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
    /// Samples in the source, which exceeds `samples.len()` when decoding was capped
    source_len: usize,
}

impl Waveform {
    /// Wrap decoded samples; the sample rate must be positive
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "sample rate must be positive".to_string(),
            ));
        }

        let source_len = samples.len();
        Ok(Self {
            samples,
            sample_rate,
            source_len,
        })
    }

    /// Record the full length of the source when only a prefix was kept
    pub fn with_source_len(mut self, source_len: usize) -> Self {
        self.source_len = source_len.max(self.samples.len());
        self
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the signal in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Length of the whole source in seconds
    pub fn source_duration_secs(&self) -> f64 {
        self.source_len as f64 / self.sample_rate as f64
    }

    /// Peak absolute amplitude
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_sample_rate() {
        assert!(matches!(
            Waveform::new(vec![0.0; 16], 0),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn reports_duration() {
        let waveform = Waveform::new(vec![0.0; 44100], 22050).unwrap();
        assert_eq!(waveform.len(), 44100);
        assert!((waveform.duration_secs() - 2.0).abs() < 1e-9);
        assert_eq!(waveform.peak(), 0.0);
        assert_eq!(waveform.source_len(), 44100);
    }

    #[test]
    fn truncated_waveform_keeps_source_length() {
        let waveform = Waveform::new(vec![0.0; 22050], 22050)
            .unwrap()
            .with_source_len(22050 * 10);
        assert!((waveform.duration_secs() - 1.0).abs() < 1e-9);
        assert!((waveform.source_duration_secs() - 10.0).abs() < 1e-9);

        let clamped = Waveform::new(vec![0.0; 100], 22050).unwrap().with_source_len(10);
        assert_eq!(clamped.source_len(), 100);
    }
}
