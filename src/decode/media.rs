//! Waveform decoding with symphonia
//!
//! Decodes any container/codec symphonia is built with into mono f32 samples
//! at the source sample rate. Multi-channel audio is folded to mono by
//! averaging channels.

use super::{DecoderConfig, WaveformDecoder};
use crate::error::{AnalysisError, Result};
use crate::model::Waveform;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoder backed by symphonia's default codec and format registries
#[derive(Debug, Clone, Default)]
pub struct SymphoniaDecoder {
    config: DecoderConfig,
}

impl SymphoniaDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    fn decode_source(&self, source: Box<dyn MediaSource>, extension: &str) -> Result<Waveform> {
        let mss = MediaSourceStream::new(source, Default::default());

        let mut hint = Hint::new();
        let extension = extension.trim_start_matches('.');
        if !extension.is_empty() {
            hint.with_extension(extension);
        }

        let format_opts = FormatOptions::default();
        let metadata_opts = MetadataOptions::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &format_opts, &metadata_opts)
            .map_err(|e| AnalysisError::Decode(format!("failed to probe audio format: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AnalysisError::Decode("no audio track found".to_string()))?;

        let track_id = track.id;
        let sample_rate = track_sample_rate(&track.codec_params)?;
        let declared_frames = track.codec_params.n_frames;

        let dec_opts = DecoderOptions::default();
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &dec_opts)
            .map_err(|e| AnalysisError::Decode(format!("failed to create audio decoder: {}", e)))?;

        let max_samples = self
            .config
            .max_seconds
            .map(|secs| sample_rate as usize * secs as usize);
        let mut all_samples: Vec<f32> = Vec::new();
        // Frames in the source, including any past the cap
        let mut total_frames: u64 = 0;
        let mut capped = false;

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(e) => {
                    end_of_stream(e)?;
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(e) => {
                    skip_packet(e)?;
                    continue;
                }
            };

            total_frames += decoded.frames() as u64;
            if capped {
                continue;
            }

            let spec = *decoded.spec();
            let duration = decoded.capacity() as u64;

            let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
            sample_buf.copy_interleaved_ref(decoded);

            let samples = sample_buf.samples();

            let channels = spec.channels.count();
            if channels > 1 {
                for chunk in samples.chunks(channels) {
                    let mono: f32 = chunk.iter().sum::<f32>() / channels as f32;
                    all_samples.push(mono);
                }
            } else {
                all_samples.extend_from_slice(samples);
            }

            if let Some(max) = max_samples {
                if all_samples.len() >= max {
                    all_samples.truncate(max);
                    capped = true;
                    log::debug!("Stopped keeping samples at the {}-sample cap", max);
                    if declared_frames.is_some() {
                        break;
                    }
                }
            }
        }

        if all_samples.is_empty() {
            return Err(AnalysisError::Decode("no audio samples decoded".to_string()));
        }

        let source_len = match (capped, declared_frames) {
            (true, Some(frames)) => frames as usize,
            (true, None) => total_frames as usize,
            (false, _) => all_samples.len(),
        };

        log::debug!(
            "Decoded {} samples ({:.1}s of {:.1}s) at {}Hz",
            all_samples.len(),
            all_samples.len() as f32 / sample_rate as f32,
            source_len as f32 / sample_rate as f32,
            sample_rate
        );

        Ok(Waveform::new(all_samples, sample_rate)?.with_source_len(source_len))
    }
}

/// Sample rate of a track; missing or zero means the audio is unreadable
fn track_sample_rate(params: &CodecParameters) -> Result<u32> {
    params
        .sample_rate
        .filter(|rate| *rate > 0)
        .ok_or_else(|| AnalysisError::Decode("no sample rate in audio track".to_string()))
}

/// Classify an error from reading the next packet: end of stream or fatal
fn end_of_stream(err: SymphoniaError) -> Result<()> {
    match err {
        SymphoniaError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(()),
        SymphoniaError::ResetRequired => Err(AnalysisError::Decode(
            "stream changed mid-decode".to_string(),
        )),
        e => Err(AnalysisError::Decode(format!("failed to read packet: {}", e))),
    }
}

/// Classify an error from decoding one packet
///
/// A malformed packet is dropped, as codecs resynchronise on the next one.
/// Anything else means the stream can't be trusted and fails the decode.
fn skip_packet(err: SymphoniaError) -> Result<()> {
    match err {
        SymphoniaError::DecodeError(reason) => {
            log::warn!("Skipping undecodable packet: {}", reason);
            Ok(())
        }
        e => Err(AnalysisError::Decode(format!("failed to decode packet: {}", e))),
    }
}

impl WaveformDecoder for SymphoniaDecoder {
    fn decode(&self, bytes: &[u8], extension: &str) -> Result<Waveform> {
        if bytes.is_empty() {
            return Err(AnalysisError::Decode("audio stream is empty".to_string()));
        }
        self.decode_source(Box::new(Cursor::new(bytes.to_vec())), extension)
    }

    fn decode_file(&self, path: &Path, extension: &str) -> Result<Waveform> {
        let file = File::open(path).map_err(|e| {
            AnalysisError::Decode(format!("failed to open audio file {:?}: {}", path, e))
        })?;
        self.decode_source(Box::new(file), extension)
    }
}
