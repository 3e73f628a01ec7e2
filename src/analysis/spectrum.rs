//! Short-time Fourier transform shared by the chroma and onset stages

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Hann-windowed STFT over a mono signal
pub(crate) struct Stft {
    frame_size: usize,
    hop_size: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl Stft {
    pub fn new(frame_size: usize, hop_size: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame_size);

        Self {
            frame_size,
            hop_size: hop_size.max(1),
            window: hann_window(frame_size),
            fft,
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Number of non-negative frequency bins per frame
    pub fn bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Number of complete frames that fit in `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        if len < self.frame_size || self.frame_size == 0 {
            0
        } else {
            (len - self.frame_size) / self.hop_size + 1
        }
    }

    /// Call `f` with the magnitude spectrum of every complete frame
    pub fn for_each_magnitudes<F>(&self, samples: &[f32], mut f: F)
    where
        F: FnMut(&[f32]),
    {
        let mut buffer = vec![Complex::new(0.0f32, 0.0f32); self.frame_size];
        let mut magnitudes = vec![0.0f32; self.bins()];

        for frame_idx in 0..self.frame_count(samples.len()) {
            let start = frame_idx * self.hop_size;
            let frame = &samples[start..start + self.frame_size];

            for (slot, (s, w)) in buffer.iter_mut().zip(frame.iter().zip(self.window.iter())) {
                *slot = Complex::new(s * w, 0.0);
            }

            self.fft.process(&mut buffer);

            for (m, c) in magnitudes.iter_mut().zip(buffer.iter()) {
                *m = c.norm();
            }

            f(&magnitudes);
        }
    }
}

pub(crate) fn hann_window(len: usize) -> Vec<f32> {
    if len <= 1 {
        return vec![1.0; len];
    }

    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (len - 1) as f32).cos()))
        .collect()
}
