use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::file::FileCaptureDevice;
use crate::error::CaptureError;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration handed to a capture device when it opens a stream
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Sample rate the device should deliver
    pub sample_rate: u32,
    /// Channel count (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Size of each emitted chunk in milliseconds
    pub buffer_duration_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            buffer_duration_ms: 100,
        }
    }
}

/// Capture device provider
///
/// Access is exclusive: the returned stream owns the hardware until
/// [`CaptureStream::stop`] is called or the stream is dropped.
#[async_trait::async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Ask for access to the device. Resolves once permission is granted or
    /// denied.
    async fn request_access(&self) -> Result<Box<dyn CaptureStream>, CaptureError>;

    /// Get device name for logging
    fn name(&self) -> &str;
}

/// An open capture stream emitting chunks in order
#[async_trait::async_trait]
pub trait CaptureStream: Send {
    /// Take the chunk receiver. Returns `None` after the first call.
    fn take_frames(&mut self) -> Option<mpsc::Receiver<AudioFrame>>;

    /// Stop emitting chunks and release the underlying tracks.
    ///
    /// Closes the chunk channel once the last chunk has been sent.
    async fn stop(&mut self) -> Result<()>;

    fn sample_rate(&self) -> u32;

    fn channels(&self) -> u16;
}

/// Device that never grants access, for platforms without capture hardware
pub struct UnavailableDevice {
    reason: String,
}

impl UnavailableDevice {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl CaptureDevice for UnavailableDevice {
    async fn request_access(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        Err(CaptureError::DeviceUnavailable(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

/// Where captured audio comes from
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeviceSource {
    /// WAV file replayed in real time as if it were a microphone
    File { path: String },
    /// No capture hardware
    #[default]
    Unavailable,
}

/// Capture device factory
pub struct DeviceFactory;

impl DeviceFactory {
    /// Create a capture device for the configured source
    pub fn create(source: &DeviceSource, config: DeviceConfig) -> Arc<dyn CaptureDevice> {
        match source {
            DeviceSource::File { path } => Arc::new(FileCaptureDevice::new(path, config)),
            DeviceSource::Unavailable => {
                Arc::new(UnavailableDevice::new("no capture hardware configured"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_device_denies_access() {
        let device = UnavailableDevice::new("permission denied");

        let result = device.request_access().await;

        assert!(matches!(
            result,
            Err(CaptureError::DeviceUnavailable(reason)) if reason == "permission denied"
        ));
    }

    #[tokio::test]
    async fn test_factory_selects_device() {
        let device = DeviceFactory::create(&DeviceSource::Unavailable, DeviceConfig::default());
        assert_eq!(device.name(), "unavailable");

        let device = DeviceFactory::create(
            &DeviceSource::File {
                path: "/nonexistent.wav".to_string(),
            },
            DeviceConfig::default(),
        );
        assert_eq!(device.name(), "file");
    }
}
