use anyhow::{Context, Result};
use hound::WavReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::backend::{AudioFrame, CaptureDevice, CaptureStream, DeviceConfig};
use crate::error::CaptureError;

pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path).context("Failed to open WAV file")?;

        Self::from_reader(path.display().to_string(), reader)
    }

    /// Decode an in-memory WAV, e.g. a finalized clip
    pub fn from_bytes(label: &str, bytes: &[u8]) -> Result<Self> {
        let reader = WavReader::new(std::io::Cursor::new(bytes)).context("Failed to parse WAV data")?;

        Self::from_reader(label.to_string(), reader)
    }

    fn from_reader<R: std::io::Read>(path: String, reader: WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let duration_seconds = samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        debug!(
            "Audio loaded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path,
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Convert to `sample_rate` Hz and `channels` channels
    ///
    /// Supports stereo to mono (summed, clamped) and downsampling by an
    /// integer ratio (decimation). Anything else is an error.
    pub fn conform(mut self, sample_rate: u32, channels: u16) -> Result<Self> {
        if self.channels != channels {
            if self.channels != 2 || channels != 1 {
                anyhow::bail!(
                    "Cannot convert {} channels to {} in {}",
                    self.channels,
                    channels,
                    self.path
                );
            }
            self.samples = self
                .samples
                .chunks_exact(2)
                .map(|pair| (pair[0] as i32 + pair[1] as i32).clamp(i16::MIN as i32, i16::MAX as i32) as i16)
                .collect();
            self.channels = 1;
        }

        if self.sample_rate != sample_rate {
            if sample_rate == 0 || self.sample_rate < sample_rate || self.sample_rate % sample_rate != 0 {
                anyhow::bail!(
                    "Cannot convert {}Hz to {}Hz in {}",
                    self.sample_rate,
                    sample_rate,
                    self.path
                );
            }
            let ratio = (self.sample_rate / sample_rate) as usize;
            let width = self.channels as usize;
            self.samples = self
                .samples
                .chunks_exact(width)
                .step_by(ratio)
                .flatten()
                .copied()
                .collect();
            self.sample_rate = sample_rate;
        }

        debug!("Audio conformed to {}Hz, {} channels", self.sample_rate, self.channels);
        Ok(self)
    }
}

/// Capture device backed by a WAV file, replayed in real time
///
/// Stands in for a microphone on machines without one and in demos. The
/// file is converted to the configured rate and channel count. A missing,
/// unreadable or unconvertible file is reported as `DeviceUnavailable`, the
/// same way a denied microphone permission would be.
pub struct FileCaptureDevice {
    path: PathBuf,
    config: DeviceConfig,
}

impl FileCaptureDevice {
    pub fn new(path: impl Into<PathBuf>, config: DeviceConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }
}

#[async_trait::async_trait]
impl CaptureDevice for FileCaptureDevice {
    async fn request_access(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        let path = self.path.clone();
        let audio = tokio::task::spawn_blocking(move || AudioFile::open(path))
            .await
            .map_err(|e| CaptureError::DeviceUnavailable(format!("device task failed: {}", e)))?
            .map_err(|e| CaptureError::DeviceUnavailable(format!("{:#}", e)))?
            .conform(self.config.sample_rate, self.config.channels)
            .map_err(|e| CaptureError::DeviceUnavailable(format!("{:#}", e)))?;

        Ok(Box::new(FileStream::spawn(audio, self.config.buffer_duration_ms)))
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Open stream over a decoded file
struct FileStream {
    sample_rate: u32,
    channels: u16,
    frames: Option<mpsc::Receiver<AudioFrame>>,
    cancel: CancellationToken,
    pump: Option<JoinHandle<()>>,
}

impl FileStream {
    fn spawn(audio: AudioFile, buffer_duration_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let cancel = CancellationToken::new();
        let sample_rate = audio.sample_rate;
        let channels = audio.channels;

        let buffer_ms = buffer_duration_ms.max(1);
        let frame_len = ((sample_rate as u64 * channels as u64 * buffer_ms) / 1000).max(channels as u64) as usize;
        let samples: Arc<[i16]> = audio.samples.into();
        let token = cancel.clone();

        let pump = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(buffer_ms));

            for (index, chunk) in samples.chunks(frame_len).enumerate() {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let frame = AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate,
                    channels,
                    timestamp_ms: index as u64 * buffer_ms,
                };

                if tx.send(frame).await.is_err() {
                    break;
                }
            }

            debug!("File capture pump finished");
        });

        Self {
            sample_rate,
            channels,
            frames: Some(rx),
            cancel,
            pump: Some(pump),
        }
    }
}

#[async_trait::async_trait]
impl CaptureStream for FileStream {
    fn take_frames(&mut self) -> Option<mpsc::Receiver<AudioFrame>> {
        self.frames.take()
    }

    async fn stop(&mut self) -> Result<()> {
        let Some(pump) = self.pump.take() else {
            debug!("File capture stream already released");
            return Ok(());
        };

        self.cancel.cancel();
        if let Err(e) = pump.await {
            error!("File capture pump panicked: {}", e);
        }

        info!("File capture stream released");
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        if self.pump.is_some() {
            self.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(sample_rate: u32, channels: u16, samples: Vec<i16>) -> AudioFile {
        AudioFile {
            path: "test.wav".to_string(),
            duration_seconds: 0.0,
            sample_rate,
            channels,
            samples,
        }
    }

    #[test]
    fn test_conform_stereo_to_mono() -> Result<()> {
        let converted = audio(16000, 2, vec![100, 50, i16::MAX, 1]).conform(16000, 1)?;

        assert_eq!(converted.channels, 1);
        assert_eq!(converted.samples, vec![150, i16::MAX]);
        Ok(())
    }

    #[test]
    fn test_conform_decimates_whole_frames() -> Result<()> {
        let converted = audio(32000, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).conform(16000, 2)?;

        assert_eq!(converted.sample_rate, 16000);
        assert_eq!(converted.samples, vec![1, 2, 5, 6]);
        Ok(())
    }

    #[test]
    fn test_conform_rejects_unsupported() {
        assert!(audio(8000, 1, vec![0; 8]).conform(16000, 1).is_err());
        assert!(audio(44100, 1, vec![0; 8]).conform(16000, 1).is_err());
        assert!(audio(16000, 1, vec![0; 8]).conform(16000, 2).is_err());
    }
}
