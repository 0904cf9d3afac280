// Test doubles shared by the integration tests

#![allow(dead_code)]

use anyhow::Result;
use asset_capture::{AssetId, AudioFrame, CaptureDevice, CaptureError, CaptureStream, Clip, IngestedFile, VaultSink};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const SAMPLE_RATE: u32 = 16000;

/// 100ms mono chunk filled with `value`
pub fn chunk(value: i16, index: u64) -> AudioFrame {
    AudioFrame {
        samples: vec![value; 1600],
        sample_rate: SAMPLE_RATE,
        channels: 1,
        timestamp_ms: index * 100,
    }
}

/// Device that emits a fixed set of chunks as soon as access is granted
pub struct MockDevice {
    frames: Vec<AudioFrame>,
    available: bool,
    access_delay: Option<Duration>,
    pub grants: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
}

impl MockDevice {
    pub fn with_frames(frames: Vec<AudioFrame>) -> Self {
        Self {
            frames,
            available: true,
            access_delay: None,
            grants: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::with_frames(Vec::new())
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            access_delay: Some(delay),
            ..Self::with_frames(Vec::new())
        }
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CaptureDevice for MockDevice {
    async fn request_access(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        if let Some(delay) = self.access_delay {
            tokio::time::sleep(delay).await;
        }

        if !self.available {
            return Err(CaptureError::DeviceUnavailable("permission denied".to_string()));
        }

        let (tx, rx) = mpsc::channel(self.frames.len().max(1));
        for frame in &self.frames {
            tx.try_send(frame.clone()).expect("channel sized for all frames");
        }
        self.grants.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MockStream {
            frames: Some(rx),
            sender: Some(tx),
            releases: Arc::clone(&self.releases),
        }))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

struct MockStream {
    frames: Option<mpsc::Receiver<AudioFrame>>,
    sender: Option<mpsc::Sender<AudioFrame>>,
    releases: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl CaptureStream for MockStream {
    fn take_frames(&mut self) -> Option<mpsc::Receiver<AudioFrame>> {
        self.frames.take()
    }

    async fn stop(&mut self) -> Result<()> {
        if self.sender.take().is_some() {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn channels(&self) -> u16 {
        1
    }
}

/// Vault that records every hand-off
#[derive(Default)]
pub struct RecordingVault {
    pub file_batches: Vec<Vec<IngestedFile>>,
    pub recordings: Vec<(Clip, u64)>,
    pub fail: bool,
}

impl RecordingVault {
    pub fn calls(&self) -> usize {
        self.file_batches.len() + self.recordings.len()
    }
}

impl VaultSink for RecordingVault {
    fn on_files_ingested(&mut self, files: Vec<IngestedFile>) -> Result<Vec<AssetId>> {
        if self.fail {
            anyhow::bail!("vault offline");
        }
        let ids = files.iter().map(|f| f.id).collect();
        self.file_batches.push(files);
        Ok(ids)
    }

    fn on_recording_saved(&mut self, clip: Clip, duration_seconds: u64) -> Result<AssetId> {
        if self.fail {
            anyhow::bail!("vault offline");
        }
        self.recordings.push((clip, duration_seconds));
        Ok(AssetId::new())
    }
}
