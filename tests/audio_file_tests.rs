// Integration tests for WAV-backed capture
//
// Fixtures are generated into a temp dir with hound, so no binary files
// are checked in.

use anyhow::Result;
use asset_capture::{
    AudioFile, CaptureDevice, CaptureError, ContentStore, DeviceConfig, FileCaptureDevice, RecorderConfig,
    RecordingController, SessionState,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Write `seconds` of a 16kHz mono ramp
fn write_fixture(dir: &Path, seconds: u32) -> Result<PathBuf> {
    let path = dir.join("voice-note.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec)?;
    for i in 0..(16000 * seconds) {
        writer.write_sample((i % 1000) as i16)?;
    }
    writer.finalize()?;
    Ok(path)
}

/// Write one second of constant stereo (left 100, right 50)
fn write_stereo_fixture(dir: &Path, sample_rate: u32) -> Result<PathBuf> {
    let path = dir.join(format!("stereo-{}.wav", sample_rate));
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec)?;
    for _ in 0..sample_rate {
        writer.write_sample(100i16)?;
        writer.write_sample(50i16)?;
    }
    writer.finalize()?;
    Ok(path)
}

#[test]
fn test_audio_file_open() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_fixture(temp_dir.path(), 2)?;

    let audio = AudioFile::open(&path)?;

    assert!((audio.duration_seconds - 2.0).abs() < 0.001);
    assert_eq!(audio.sample_rate, 16000);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.samples.len(), 32000);
    assert!(audio.path.contains("voice-note.wav"));

    Ok(())
}

#[test]
fn test_audio_file_nonexistent() {
    let result = AudioFile::open("/nonexistent/path/to/audio.wav");

    assert!(result.is_err(), "Opening nonexistent file should fail");
}

#[tokio::test]
async fn test_missing_file_is_device_unavailable() {
    let device = FileCaptureDevice::new("/nonexistent/voice.wav", DeviceConfig::default());

    let result = device.request_access().await;

    assert!(matches!(result, Err(CaptureError::DeviceUnavailable(_))));
}

#[tokio::test(start_paused = true)]
async fn test_stream_emits_buffered_chunks() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_fixture(temp_dir.path(), 1)?;
    let device = FileCaptureDevice::new(&path, DeviceConfig::default());

    let mut stream = device.request_access().await?;
    let mut frames = stream.take_frames().expect("frames available once");
    assert!(stream.take_frames().is_none());

    let mut received = Vec::new();
    while let Some(frame) = frames.recv().await {
        received.push(frame);
    }

    // 1s at 100ms buffers
    assert_eq!(received.len(), 10);
    assert!(received.iter().all(|f| f.samples.len() == 1600));
    assert_eq!(received[3].timestamp_ms, 300);

    stream.stop().await?;
    stream.stop().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stream_delivers_configured_format() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_stereo_fixture(temp_dir.path(), 32000)?;
    let device = FileCaptureDevice::new(&path, DeviceConfig::default());

    let mut stream = device.request_access().await?;
    assert_eq!(stream.sample_rate(), 16000);
    assert_eq!(stream.channels(), 1);

    let mut frames = stream.take_frames().expect("frames");
    let mut received = Vec::new();
    while let Some(frame) = frames.recv().await {
        received.push(frame);
    }

    assert_eq!(received.len(), 10);
    assert!(received.iter().all(|f| f.sample_rate == 16000 && f.channels == 1));
    assert!(received.iter().all(|f| f.samples.len() == 1600));
    assert!(received[0].samples.iter().all(|&s| s == 150));

    stream.stop().await?;
    Ok(())
}

#[tokio::test]
async fn test_unconvertible_file_is_device_unavailable() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_stereo_fixture(temp_dir.path(), 8000)?;
    let device = FileCaptureDevice::new(&path, DeviceConfig::default());

    let result = device.request_access().await;

    assert!(matches!(
        result,
        Err(CaptureError::DeviceUnavailable(reason)) if reason.contains("8000Hz")
    ));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_record_from_file_device() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_fixture(temp_dir.path(), 5)?;
    let store = ContentStore::new();
    let device = Arc::new(FileCaptureDevice::new(&path, DeviceConfig::default()));
    let mut recorder = RecordingController::new(device, store.clone(), RecorderConfig::default());

    recorder.start(CancellationToken::new()).await?;
    tokio::time::sleep(Duration::from_millis(2050)).await;
    recorder.stop().await?;

    assert_eq!(recorder.state(), SessionState::Stopped);
    assert_eq!(recorder.elapsed_seconds(), 2);

    let clip = recorder.pending_clip().expect("clip");
    assert!(clip.chunk_count >= 20 && clip.chunk_count <= 21, "got {} chunks", clip.chunk_count);

    let out = temp_dir.path().join("saved.wav");
    clip.write_to(&out)?;
    let reread = AudioFile::open(&out)?;
    assert_eq!(reread.samples.len(), clip.sample_count);
    assert_eq!(reread.samples[1], 1);

    Ok(())
}
