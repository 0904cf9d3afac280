use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::{RecorderConfig, ELAPSED_TICK};
use super::playback::Playback;
use super::ticker::Ticker;
use crate::asset::AssetId;
use crate::audio::{AudioFrame, CaptureDevice, CaptureStream, Clip, ClipWriter};
use crate::content::{ContentHandle, ContentStore};
use crate::display::format_duration;
use crate::error::CaptureError;
use crate::vault::VaultSink;

/// Observable state of the recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    /// A finished clip awaits play, save or delete
    Stopped,
    PlayingBack,
}

/// Live capture: the open stream plus its collector and tick tasks
///
/// `stream` is `None` once released. Dropping a capture that still holds
/// its stream (controller dropped mid-recording) releases it on the
/// runtime and abandons the collector.
struct ActiveCapture {
    stream: Option<Box<dyn CaptureStream>>,
    collector: JoinHandle<ClipWriter>,
    ticker: Ticker,
}

impl Drop for ActiveCapture {
    fn drop(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };

        self.ticker.cancel();
        self.collector.abort();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                info!("Recording abandoned, releasing capture stream");
                handle.spawn(async move {
                    release_stream(stream.as_mut()).await;
                });
            }
            Err(_) => warn!("Recording abandoned outside a runtime, capture stream not released"),
        }
    }
}

/// Finished clip waiting for a save/discard decision
struct PendingRecording {
    clip: Clip,
    duration_seconds: u64,
    preview: ContentHandle,
    playback: Playback,
}

enum Phase {
    Idle,
    Recording(ActiveCapture),
    Stopped(PendingRecording),
}

/// Owns one voice-note recording session end to end
///
/// All transitions take `&mut self`; the only background work is the
/// elapsed-time ticker, the chunk collector and the playback position task,
/// each of which is cancelled and joined (or superseded) before the state
/// that owns it goes away.
pub struct RecordingController {
    device: Arc<dyn CaptureDevice>,
    store: ContentStore,
    config: RecorderConfig,
    phase: Phase,
}

impl RecordingController {
    pub fn new(device: Arc<dyn CaptureDevice>, store: ContentStore, config: RecorderConfig) -> Self {
        Self {
            device,
            store,
            config,
            phase: Phase::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        match &self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Recording(_) => SessionState::Recording,
            Phase::Stopped(pending) if pending.playback.is_playing() => SessionState::PlayingBack,
            Phase::Stopped(_) => SessionState::Stopped,
        }
    }

    /// Seconds recorded so far; frozen as the clip duration once stopped
    pub fn elapsed_seconds(&self) -> u64 {
        match &self.phase {
            Phase::Idle => 0,
            Phase::Recording(active) => active.ticker.count(),
            Phase::Stopped(pending) => pending.duration_seconds,
        }
    }

    pub fn playback_position_seconds(&self) -> u64 {
        match &self.phase {
            Phase::Stopped(pending) => pending.playback.position_seconds(),
            _ => 0,
        }
    }

    pub fn elapsed_display(&self) -> String {
        format_duration(self.elapsed_seconds())
    }

    pub fn playback_display(&self) -> String {
        format_duration(self.playback_position_seconds())
    }

    pub fn pending_clip(&self) -> Option<&Clip> {
        match &self.phase {
            Phase::Stopped(pending) => Some(&pending.clip),
            _ => None,
        }
    }

    /// URL of the playable preview while a clip is pending
    pub fn preview_url(&self) -> Option<&str> {
        match &self.phase {
            Phase::Stopped(pending) => Some(pending.preview.url()),
            _ => None,
        }
    }

    /// Acquire the capture device and begin recording
    ///
    /// Suspends until the device grants or denies access. On any failure the
    /// session stays `Idle` and the error is returned for the caller to show.
    /// Cancelling `cancel` while access is pending abandons the request.
    /// Calling this outside `Idle` does nothing.
    pub async fn start(&mut self, cancel: CancellationToken) -> Result<(), CaptureError> {
        if !matches!(self.phase, Phase::Idle) {
            warn!("Start ignored: session is {:?}", self.state());
            return Ok(());
        }

        info!("Requesting capture device: {}", self.device.name());

        let requested = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CaptureError::Cancelled),
            result = self.device.request_access() => result,
        };

        let mut stream = match requested {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Recording not started: {}", e);
                return Err(e);
            }
        };

        if cancel.is_cancelled() {
            info!("Device request cancelled after access was granted, releasing stream");
            release_stream(stream.as_mut()).await;
            return Err(CaptureError::Cancelled);
        }

        let Some(frames) = stream.take_frames() else {
            release_stream(stream.as_mut()).await;
            return Err(CaptureError::DeviceUnavailable(
                "stream provided no chunk channel".to_string(),
            ));
        };

        let writer = ClipWriter::new(stream.sample_rate(), stream.channels(), Utc::now());
        let collector = tokio::spawn(collect_chunks(frames, writer));
        let ticker = Ticker::spawn(ELAPSED_TICK);

        info!(
            "Recording started ({}Hz, {} channels)",
            stream.sample_rate(),
            stream.channels()
        );

        self.phase = Phase::Recording(ActiveCapture {
            stream: Some(stream),
            collector,
            ticker,
        });

        Ok(())
    }

    /// Finish recording and finalize the clip
    ///
    /// Ignored unless `Recording`. The tick is cancelled before anything else
    /// so the duration cannot move while the stream drains.
    pub async fn stop(&mut self) -> Result<()> {
        let mut active = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Recording(active) => active,
            other => {
                self.phase = other;
                debug!("Stop ignored: not recording");
                return Ok(());
            }
        };

        let duration_seconds = active.ticker.stop().await;

        if let Some(mut stream) = active.stream.take() {
            release_stream(stream.as_mut()).await;
        }

        let writer = (&mut active.collector).await.context("Chunk collector panicked")?;
        let clip = writer.finish()?;

        let preview = self.store.register(clip.media_type(), clip.bytes());
        let playback = Playback::new(duration_seconds, self.config.playback_interval);

        info!(
            "Recording stopped: {} ({} chunks, {} bytes)",
            format_duration(duration_seconds),
            clip.chunk_count,
            clip.size_bytes()
        );

        self.phase = Phase::Stopped(PendingRecording {
            clip,
            duration_seconds,
            preview,
            playback,
        });

        Ok(())
    }

    /// Start or resume playback of the pending clip
    pub fn play(&mut self) {
        match &mut self.phase {
            Phase::Stopped(pending) => {
                if pending.playback.play() {
                    debug!("Playback started at {}s", pending.playback.position_seconds());
                }
            }
            _ => debug!("Play ignored: no pending clip"),
        }
    }

    pub fn pause(&mut self) {
        if let Phase::Stopped(pending) = &mut self.phase {
            if pending.playback.pause() {
                debug!("Playback paused at {}s", pending.playback.position_seconds());
            }
        }
    }

    pub fn toggle_playback(&mut self) {
        match self.state() {
            SessionState::PlayingBack => self.pause(),
            SessionState::Stopped => self.play(),
            _ => {}
        }
    }

    /// Discard the pending clip and reset. No-op without one.
    pub fn delete(&mut self) {
        match self.take_pending() {
            Some(pending) => {
                info!("Discarded recording ({})", format_duration(pending.duration_seconds));
            }
            None => debug!("Delete ignored: no pending clip"),
        }
    }

    /// Hand the pending clip to the vault, then reset like `delete`
    ///
    /// Returns `Ok(None)` without a pending clip. If the vault refuses the
    /// clip it stays pending so the user can try again.
    pub fn save(&mut self, vault: &mut dyn VaultSink) -> Result<Option<AssetId>> {
        let (clip, duration_seconds) = match &mut self.phase {
            Phase::Stopped(pending) => {
                pending.playback.halt();
                (pending.clip.clone(), pending.duration_seconds)
            }
            _ => {
                debug!("Save ignored: no pending clip");
                return Ok(None);
            }
        };

        let id = vault
            .on_recording_saved(clip, duration_seconds)
            .context("Vault rejected recording")?;

        self.take_pending();
        info!("Saved recording as {}", id);

        Ok(Some(id))
    }

    fn take_pending(&mut self) -> Option<PendingRecording> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Stopped(mut pending) => {
                pending.playback.halt();
                Some(pending)
            }
            other => {
                self.phase = other;
                None
            }
        }
    }
}

/// Drain chunks in arrival order until the stream closes its channel
async fn collect_chunks(mut frames: mpsc::Receiver<AudioFrame>, mut writer: ClipWriter) -> ClipWriter {
    while let Some(frame) = frames.recv().await {
        writer.push(&frame);
    }
    debug!("Chunk channel closed after {} chunks", writer.chunk_count());
    writer
}

async fn release_stream(stream: &mut dyn CaptureStream) {
    if let Err(e) = stream.stop().await {
        error!("Failed to release capture stream: {}", e);
    }
}
