use chrono::{DateTime, Utc};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, warn};

use super::backend::AudioFrame;
use crate::error::CaptureError;

/// Media type of every finalized clip
pub const CLIP_MEDIA_TYPE: &str = "audio/wav";

/// A finalized, playable recording
///
/// Cloning is cheap: the encoded bytes are shared.
#[derive(Debug, Clone)]
pub struct Clip {
    bytes: Arc<[u8]>,
    /// Sample rate
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Number of samples across all chunks
    pub sample_count: usize,
    /// Number of chunks the clip was assembled from
    pub chunk_count: usize,
    /// When capture began
    pub recorded_at: DateTime<Utc>,
}

impl Clip {
    pub fn media_type(&self) -> &'static str {
        CLIP_MEDIA_TYPE
    }

    /// Encoded WAV bytes
    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Duration of the audio actually captured
    pub fn audio_seconds(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.sample_count as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    pub fn write_to(&self, path: impl AsRef<std::path::Path>) -> anyhow::Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Accumulates chunks in emission order and encodes them into one clip
pub struct ClipWriter {
    sample_rate: u32,
    channels: u16,
    samples: Vec<i16>,
    chunk_count: usize,
    dropped_chunks: usize,
    recorded_at: DateTime<Utc>,
}

impl ClipWriter {
    pub fn new(sample_rate: u32, channels: u16, recorded_at: DateTime<Utc>) -> Self {
        Self {
            sample_rate,
            channels,
            samples: Vec::new(),
            chunk_count: 0,
            dropped_chunks: 0,
            recorded_at,
        }
    }

    /// Append one chunk. Chunks whose format differs from the stream's are dropped.
    pub fn push(&mut self, frame: &AudioFrame) {
        if frame.sample_rate != self.sample_rate || frame.channels != self.channels {
            warn!(
                "Chunk format mismatch: expected {}Hz/{}ch, got {}Hz/{}ch. Dropping chunk.",
                self.sample_rate, self.channels, frame.sample_rate, frame.channels
            );
            self.dropped_chunks += 1;
            return;
        }

        self.samples.extend_from_slice(&frame.samples);
        self.chunk_count += 1;
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn dropped_chunks(&self) -> usize {
        self.dropped_chunks
    }

    /// Encode the accumulated samples as a 16-bit PCM WAV
    pub fn finish(self) -> Result<Clip, CaptureError> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::with_capacity(44 + self.samples.len() * 2));
        {
            let mut writer =
                hound::WavWriter::new(&mut cursor, spec).map_err(|e| CaptureError::Encode(e.to_string()))?;
            for &sample in &self.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| CaptureError::Encode(e.to_string()))?;
            }
            writer.finalize().map_err(|e| CaptureError::Encode(e.to_string()))?;
        }

        let bytes: Arc<[u8]> = cursor.into_inner().into();
        debug!(
            "Clip finalized: {} chunks, {} samples, {} bytes",
            self.chunk_count,
            self.samples.len(),
            bytes.len()
        );

        Ok(Clip {
            bytes,
            sample_rate: self.sample_rate,
            channels: self.channels,
            sample_count: self.samples.len(),
            chunk_count: self.chunk_count,
            recorded_at: self.recorded_at,
        })
    }
}
