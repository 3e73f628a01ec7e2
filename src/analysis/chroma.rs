//! Chroma feature extraction
//!
//! Folds the STFT power spectrum into 12 semitone bins (one per pitch class,
//! collapsed across octaves). Each frame is normalised to its strongest bin
//! before averaging so loud passages don't dominate the profile.

use super::spectrum::Stft;
use super::traits::ChromaTransform;
use crate::error::{AnalysisError, Result, Stage};
use crate::model::{ChromaProfile, Waveform, CHROMA_BINS};

/// C1, the lowest pitch folded into the profile
const MIN_FREQ_HZ: f32 = 32.703;
/// Roughly C8; partials above this are mostly noise for key purposes
const MAX_FREQ_HZ: f32 = 4200.0;

/// STFT-based chroma extractor
#[derive(Debug, Clone)]
pub struct ChromaExtractor {
    frame_size: usize,
    hop_size: usize,
}

impl ChromaExtractor {
    pub fn new(frame_size: usize, hop_size: usize) -> Self {
        Self {
            frame_size,
            hop_size,
        }
    }

    /// Pitch class for each FFT bin, `None` outside the analysed range
    fn bin_map(&self, sample_rate: u32) -> Vec<Option<usize>> {
        let bin_hz = sample_rate as f32 / self.frame_size as f32;
        let max_freq = MAX_FREQ_HZ.min(sample_rate as f32 / 2.0);

        (0..self.frame_size / 2 + 1)
            .map(|bin| {
                let freq = bin as f32 * bin_hz;
                if freq < MIN_FREQ_HZ || freq > max_freq {
                    return None;
                }
                let semitones = 12.0 * (freq / MIN_FREQ_HZ).log2();
                Some(semitones.round() as usize % CHROMA_BINS)
            })
            .collect()
    }
}

impl Default for ChromaExtractor {
    fn default() -> Self {
        Self::new(4096, 2048)
    }
}

impl ChromaTransform for ChromaExtractor {
    fn chroma(&self, waveform: &Waveform) -> Result<ChromaProfile> {
        let stft = Stft::new(self.frame_size, self.hop_size);
        let frames = stft.frame_count(waveform.len());
        if frames == 0 {
            return Err(AnalysisError::insufficient(
                Stage::Chroma,
                format!(
                    "{} samples is shorter than one {}-sample frame",
                    waveform.len(),
                    stft.frame_size()
                ),
            ));
        }

        let bin_map = self.bin_map(waveform.sample_rate());
        let mut sum = [0.0f32; CHROMA_BINS];
        let mut frame_chroma = [0.0f32; CHROMA_BINS];

        stft.for_each_magnitudes(waveform.samples(), |mags| {
            frame_chroma.fill(0.0);
            for (mag, pitch_class) in mags.iter().zip(bin_map.iter()) {
                if let Some(pc) = pitch_class {
                    frame_chroma[*pc] += mag * mag;
                }
            }

            let peak = frame_chroma.iter().copied().fold(0.0f32, f32::max);
            if peak > f32::EPSILON {
                for (acc, value) in sum.iter_mut().zip(frame_chroma.iter()) {
                    *acc += value / peak;
                }
            }
        });

        for value in &mut sum {
            *value /= frames as f32;
        }

        let profile = ChromaProfile::new(sum);
        if !profile.is_finite() {
            return Err(AnalysisError::NumericalFailure {
                stage: Stage::Chroma,
            });
        }

        log::debug!(
            "Chroma over {} frames: {:?}",
            frames,
            profile.bins().map(|v| (v * 100.0).round() / 100.0)
        );

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone(freqs: &[f32], sample_rate: u32, seconds: f32) -> Waveform {
        let len = (sample_rate as f32 * seconds) as usize;
        let samples = (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                freqs.iter().map(|f| (2.0 * PI * f * t).sin()).sum::<f32>() / freqs.len() as f32
            })
            .collect();
        Waveform::new(samples, sample_rate).unwrap()
    }

    #[test]
    fn a440_lands_in_a_bin() {
        let profile = ChromaExtractor::default()
            .chroma(&tone(&[440.0], 22050, 2.0))
            .unwrap();
        assert_eq!(profile.dominant_bin(), 9);
    }

    #[test]
    fn triad_energy_concentrates_on_chord_tones() {
        // C4, E4, G4
        let profile = ChromaExtractor::default()
            .chroma(&tone(&[261.63, 329.63, 392.0], 22050, 2.0))
            .unwrap();
        let bins = profile.bins();
        for chord_tone in [0, 4, 7] {
            for other in [1, 3, 6, 8, 10] {
                assert!(bins[chord_tone] > bins[other]);
            }
        }
    }

    #[test]
    fn silence_gives_zero_profile() {
        let silent = Waveform::new(vec![0.0; 22050], 22050).unwrap();
        let profile = ChromaExtractor::default().chroma(&silent).unwrap();
        assert_eq!(profile, ChromaProfile::zeros());
    }

    #[test]
    fn too_short_is_insufficient() {
        let short = Waveform::new(vec![0.1; 1000], 22050).unwrap();
        assert!(matches!(
            ChromaExtractor::default().chroma(&short),
            Err(AnalysisError::InsufficientAudio {
                stage: Stage::Chroma,
                ..
            })
        ));
    }
}
