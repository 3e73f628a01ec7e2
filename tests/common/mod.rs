//! Synthetic audio helpers shared by the integration tests

use std::f32::consts::PI;

/// Encode samples as a 16-bit PCM WAV file (interleaved when `channels > 1`)
pub fn wav_bytes(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let byte_rate = sample_rate * channels as u32 * 2;

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&(channels * 2).to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    for s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Decaying 1 kHz blips at a steady tempo
pub fn click_track(bpm: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
    let len = (sample_rate as f32 * seconds) as usize;
    let period = (60.0 / bpm * sample_rate as f32) as usize;
    let click_len = sample_rate as usize / 50;
    let mut samples = vec![0.0f32; len];
    for start in (0..len).step_by(period) {
        for i in 0..click_len.min(len - start) {
            let t = i as f32 / sample_rate as f32;
            samples[start + i] = 0.8 * (2.0 * PI * 1000.0 * t).sin() * (-t * 200.0).exp();
        }
    }
    samples
}

pub fn silence(sample_rate: u32, seconds: f32) -> Vec<f32> {
    vec![0.0; (sample_rate as f32 * seconds) as usize]
}
