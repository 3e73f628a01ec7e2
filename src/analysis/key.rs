//! Key estimation by cyclic correlation against tonal templates
//!
//! The chroma profile is scored against the major and minor templates rotated
//! to each of the 12 possible tonics. The tonic whose better-fitting mode
//! scores highest wins; ties go to the lowest tonic index, and a tie between
//! modes at the winning tonic resolves to minor.

use crate::error::{AnalysisError, Result, Stage};
use crate::model::{ChromaProfile, KeyEstimate, Mode, PitchClass, CHROMA_BINS};
use once_cell::sync::Lazy;

/// Krumhansl-Kessler major profile, tonic first
const MAJOR_PROFILE: [f32; CHROMA_BINS] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Kessler minor profile, tonic first
const MINOR_PROFILE: [f32; CHROMA_BINS] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Zero-mean, unit-norm reference profile for one mode
#[derive(Debug, Clone)]
pub struct ToneTemplate {
    mode: Mode,
    weights: [f32; CHROMA_BINS],
}

impl ToneTemplate {
    fn normalized(mode: Mode, raw: &[f32; CHROMA_BINS]) -> Self {
        let mean = raw.iter().sum::<f32>() / CHROMA_BINS as f32;
        let mut weights = raw.map(|v| v - mean);
        let norm = weights.iter().map(|v| v * v).sum::<f32>().sqrt();
        for w in &mut weights {
            *w /= norm;
        }
        Self { mode, weights }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn weights(&self) -> &[f32; CHROMA_BINS] {
        &self.weights
    }

    /// Correlation with `centered` when the template's tonic sits at `shift`
    fn score(&self, centered: &[f32; CHROMA_BINS], shift: usize) -> f32 {
        self.weights
            .iter()
            .enumerate()
            .map(|(k, w)| w * centered[(k + shift) % CHROMA_BINS])
            .sum()
    }
}

static MAJOR: Lazy<ToneTemplate> = Lazy::new(|| ToneTemplate::normalized(Mode::Major, &MAJOR_PROFILE));
static MINOR: Lazy<ToneTemplate> = Lazy::new(|| ToneTemplate::normalized(Mode::Minor, &MINOR_PROFILE));

/// Major and minor scores for every tonic shift
#[derive(Debug, Clone, PartialEq)]
pub struct KeyScores {
    pub major: [f32; CHROMA_BINS],
    pub minor: [f32; CHROMA_BINS],
}

impl KeyScores {
    /// Score every tonic shift of both templates against `profile`
    pub fn compute(profile: &ChromaProfile) -> Result<Self> {
        if !profile.is_finite() {
            return Err(AnalysisError::NumericalFailure { stage: Stage::Key });
        }

        let centered = center(profile.bins());
        let mut major = [0.0f32; CHROMA_BINS];
        let mut minor = [0.0f32; CHROMA_BINS];
        for shift in 0..CHROMA_BINS {
            major[shift] = MAJOR.score(&centered, shift);
            minor[shift] = MINOR.score(&centered, shift);
        }

        if major.iter().chain(minor.iter()).any(|s| !s.is_finite()) {
            return Err(AnalysisError::NumericalFailure { stage: Stage::Key });
        }

        Ok(Self { major, minor })
    }

    /// Pick the winning key
    pub fn best(&self) -> KeyEstimate {
        let mut best_shift = 0;
        let mut best_score = self.major[0].max(self.minor[0]);
        for shift in 1..CHROMA_BINS {
            let score = self.major[shift].max(self.minor[shift]);
            if score > best_score {
                best_shift = shift;
                best_score = score;
            }
        }

        let mode = if self.major[best_shift] > self.minor[best_shift] {
            Mode::Major
        } else {
            Mode::Minor
        };

        let runner_up = (0..CHROMA_BINS)
            .flat_map(|shift| {
                [
                    (shift, Mode::Major, self.major[shift]),
                    (shift, Mode::Minor, self.minor[shift]),
                ]
            })
            .filter(|(shift, m, _)| !(*shift == best_shift && *m == mode))
            .map(|(_, _, score)| score)
            .fold(f32::NEG_INFINITY, f32::max);

        KeyEstimate {
            tonic: PitchClass::from_index(best_shift),
            mode,
            margin: (best_score - runner_up).max(0.0),
        }
    }
}

/// Subtract the profile mean; an all-equal profile centres to exact zeros
fn center(bins: &[f32; CHROMA_BINS]) -> [f32; CHROMA_BINS] {
    let min = bins.iter().copied().fold(f32::INFINITY, f32::min);
    let max = bins.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max == min {
        return [0.0; CHROMA_BINS];
    }

    // Summing in sorted order makes the mean independent of rotation
    let mut sorted = *bins;
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mean = sorted.iter().sum::<f32>() / CHROMA_BINS as f32;

    bins.map(|v| v - mean)
}

/// Estimate the key of a chroma profile
pub fn estimate_key(profile: &ChromaProfile) -> Result<KeyEstimate> {
    let estimate = KeyScores::compute(profile)?.best();
    log::debug!("Key scores resolved to {} (margin {:.3})", estimate, estimate.margin);
    Ok(estimate)
}

/// Estimate the key of a chroma vector supplied by an external transform
pub fn estimate_key_from_slice(bins: &[f32]) -> Result<KeyEstimate> {
    estimate_key(&ChromaProfile::from_slice(bins)?)
}
