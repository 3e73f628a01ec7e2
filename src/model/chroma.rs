use crate::error::{AnalysisError, Result};

/// Number of pitch classes in a chroma vector
pub const CHROMA_BINS: usize = 12;

/// Time-averaged energy per pitch class, index 0 = C
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromaProfile([f32; CHROMA_BINS]);

impl ChromaProfile {
    pub fn new(bins: [f32; CHROMA_BINS]) -> Self {
        Self(bins)
    }

    /// Build a profile from a collaborator-supplied vector
    pub fn from_slice(bins: &[f32]) -> Result<Self> {
        let bins: [f32; CHROMA_BINS] = bins
            .try_into()
            .map_err(|_| AnalysisError::InvalidFeatureVector { len: bins.len() })?;
        Ok(Self(bins))
    }

    pub fn zeros() -> Self {
        Self([0.0; CHROMA_BINS])
    }

    pub fn bins(&self) -> &[f32; CHROMA_BINS] {
        &self.0
    }

    /// Transpose up by `semitones`: energy at bin `k` moves to bin `k + semitones`
    pub fn rotated(&self, semitones: usize) -> Self {
        let mut out = [0.0; CHROMA_BINS];
        for (k, value) in self.0.iter().enumerate() {
            out[(k + semitones) % CHROMA_BINS] = *value;
        }
        Self(out)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Index of the strongest bin (first wins on ties)
    pub fn dominant_bin(&self) -> usize {
        let mut best = 0;
        for (k, value) in self.0.iter().enumerate() {
            if *value > self.0[best] {
                best = k;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_checks_length() {
        assert!(ChromaProfile::from_slice(&[0.0; 12]).is_ok());
        assert!(matches!(
            ChromaProfile::from_slice(&[0.0; 11]),
            Err(AnalysisError::InvalidFeatureVector { len: 11 })
        ));
    }

    #[test]
    fn rotation_wraps() {
        let mut bins = [0.0; 12];
        bins[11] = 1.0;
        let rotated = ChromaProfile::new(bins).rotated(2);
        assert_eq!(rotated.bins()[1], 1.0);
        assert_eq!(rotated.dominant_bin(), 1);
    }
}
