//! Tempo estimation
//!
//! 1. Onset strength envelope: log-compressed spectral flux, half-wave rectified
//! 2. Autocorrelation of the envelope via FFT (Wiener-Khinchin)
//! 3. Strongest period between 30 and 300 BPM, weighted toward 120 BPM
//! 4. Fold the result into the configured BPM range by doubling/halving

use super::spectrum::Stft;
use crate::error::{AnalysisError, Result, Stage};
use crate::model::{TempoEstimate, Waveform};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

const SEARCH_MIN_BPM: f32 = 30.0;
const SEARCH_MAX_BPM: f32 = 300.0;
/// Centre of the log-normal tempo prior
const PRIOR_CENTER_BPM: f32 = 120.0;
/// Prior standard deviation, in octaves
const PRIOR_WIDTH_OCTAVES: f32 = 1.0;
/// Normalised autocorrelation below this counts as "no periodicity"
const MIN_PERIODICITY: f32 = 0.05;

/// Onset/autocorrelation tempo estimator
#[derive(Debug, Clone)]
pub struct TempoEstimator {
    frame_size: usize,
    hop_size: usize,
    min_bpm: f32,
    max_bpm: f32,
}

impl TempoEstimator {
    pub fn new(frame_size: usize, hop_size: usize) -> Self {
        Self {
            frame_size,
            hop_size,
            min_bpm: 70.0,
            max_bpm: 170.0,
        }
    }

    /// Create estimator with custom BPM range
    pub fn with_bpm_range(mut self, min: f32, max: f32) -> Self {
        self.min_bpm = min;
        self.max_bpm = max;
        self
    }

    /// Onset strength per STFT frame
    pub fn onset_envelope(&self, waveform: &Waveform) -> Vec<f32> {
        let stft = Stft::new(self.frame_size, self.hop_size);
        let mut envelope = Vec::with_capacity(stft.frame_count(waveform.len()));
        let mut prev = vec![0.0f32; stft.bins()];

        stft.for_each_magnitudes(waveform.samples(), |mags| {
            let mut flux = 0.0;
            for (m, p) in mags.iter().zip(prev.iter_mut()) {
                let log_mag = m.ln_1p();
                flux += (log_mag - *p).max(0.0);
                *p = log_mag;
            }
            envelope.push(flux);
        });

        envelope
    }

    pub fn estimate(&self, waveform: &Waveform) -> Result<TempoEstimate> {
        let envelope = self.onset_envelope(waveform);
        let envelope_rate = waveform.sample_rate() as f32 / self.hop_size as f32;

        let min_lag = ((envelope_rate * 60.0 / SEARCH_MAX_BPM).floor() as usize).max(1);
        let max_lag = ((envelope_rate * 60.0 / SEARCH_MIN_BPM).ceil() as usize).min(envelope.len() / 2);
        if max_lag < min_lag + 2 {
            return Err(AnalysisError::insufficient(
                Stage::Tempo,
                format!("{} onset frames is too few to measure a beat period", envelope.len()),
            ));
        }

        if envelope.iter().all(|v| *v <= f32::EPSILON) {
            return Err(AnalysisError::insufficient(Stage::Tempo, "no onset energy"));
        }

        let mean = envelope.iter().sum::<f32>() / envelope.len() as f32;
        let centered: Vec<f32> = envelope.iter().map(|v| v - mean).collect();
        let acf = autocorrelate(&centered);

        let zero_lag = acf[0];
        if !zero_lag.is_finite() || zero_lag <= f32::EPSILON {
            return Err(AnalysisError::insufficient(Stage::Tempo, "flat onset envelope"));
        }

        let weighted: Vec<f32> = (0..=max_lag + 1)
            .map(|lag| {
                if lag == 0 || lag >= acf.len() {
                    return 0.0;
                }
                acf[lag] * tempo_prior(60.0 * envelope_rate / lag as f32)
            })
            .collect();

        let mut peak_lag = min_lag;
        for lag in min_lag..=max_lag {
            if weighted[lag] > weighted[peak_lag] {
                peak_lag = lag;
            }
        }

        let periodicity = acf[peak_lag] / zero_lag;
        if !periodicity.is_finite() {
            return Err(AnalysisError::NumericalFailure { stage: Stage::Tempo });
        }
        if periodicity < MIN_PERIODICITY {
            return Err(AnalysisError::insufficient(
                Stage::Tempo,
                format!("no periodic onsets (peak correlation {:.3})", periodicity),
            ));
        }

        let period = peak_lag as f32
            + parabolic_offset(weighted[peak_lag - 1], weighted[peak_lag], weighted[peak_lag + 1]);
        let raw_bpm = 60.0 * envelope_rate / period;
        let bpm = fold_into_range(raw_bpm, self.min_bpm, self.max_bpm);

        log::debug!(
            "Tempo: lag {} ({:.2} frames) -> {:.1} BPM, folded to {:.1} (periodicity {:.2})",
            peak_lag,
            period,
            raw_bpm,
            bpm,
            periodicity
        );

        Ok(TempoEstimate {
            bpm,
            confidence: periodicity.clamp(0.0, 1.0),
        })
    }
}

impl Default for TempoEstimator {
    fn default() -> Self {
        Self::new(2048, 512)
    }
}

/// Log-normal weighting around 120 BPM
fn tempo_prior(bpm: f32) -> f32 {
    let octaves = (bpm / PRIOR_CENTER_BPM).log2() / PRIOR_WIDTH_OCTAVES;
    (-0.5 * octaves * octaves).exp()
}

/// Sub-sample offset of a peak from its two neighbours
fn parabolic_offset(left: f32, centre: f32, right: f32) -> f32 {
    let denom = left - 2.0 * centre + right;
    if denom >= 0.0 {
        return 0.0;
    }
    let offset = 0.5 * (left - right) / denom;
    if offset.is_finite() {
        offset.clamp(-0.5, 0.5)
    } else {
        0.0
    }
}

/// Double or halve `bpm` until it sits inside `[min, max]` where possible
fn fold_into_range(mut bpm: f32, min: f32, max: f32) -> f32 {
    if min <= 0.0 || max <= 0.0 || bpm <= 0.0 {
        return bpm;
    }
    while bpm < min && bpm * 2.0 <= max {
        bpm *= 2.0;
    }
    while bpm > max && bpm / 2.0 >= min {
        bpm /= 2.0;
    }
    bpm
}

/// Linear autocorrelation via zero-padded FFT
fn autocorrelate(signal: &[f32]) -> Vec<f32> {
    let fft_len = (signal.len() * 2).next_power_of_two();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(fft_len);
    let ifft = planner.plan_fft_inverse(fft_len);

    let mut buffer: Vec<Complex<f32>> = signal
        .iter()
        .map(|&s| Complex::new(s, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(fft_len)
        .collect();

    fft.process(&mut buffer);
    for c in buffer.iter_mut() {
        *c = Complex::new(c.norm_sqr(), 0.0);
    }
    ifft.process(&mut buffer);

    let scale = 1.0 / fft_len as f32;
    buffer
        .iter()
        .take(signal.len())
        .map(|c| c.re * scale)
        .collect()
}
