use anyhow::Result;
use serde::Deserialize;

use crate::audio::DeviceSource;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Size of each emitted chunk in milliseconds
    pub buffer_duration_ms: u64,
    pub device: DeviceSource,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            buffer_duration_ms: 100,
            device: DeviceSource::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Media type prefix a file must carry to be accepted
    pub accepted_prefix: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            accepted_prefix: "image/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub position_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            position_interval_ms: 1000,
        }
    }
}

impl Config {
    /// Load configuration from `path` (extension optional) layered with
    /// `ASSET_CAPTURE__SECTION__KEY` environment overrides.
    ///
    /// A missing file is not an error; defaults fill in whatever is absent.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("ASSET_CAPTURE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() -> Result<()> {
        let cfg = Config::load("/nonexistent/asset-capture")?;

        assert_eq!(cfg.capture.sample_rate, 16000);
        assert_eq!(cfg.ingest.accepted_prefix, "image/");
        assert_eq!(cfg.playback.position_interval_ms, 1000);
        assert_eq!(cfg.capture.device, DeviceSource::Unavailable);
        Ok(())
    }

    #[test]
    fn test_file_values_override_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("capture.toml");
        let mut file = std::fs::File::create(&path)?;
        writeln!(
            file,
            "[capture]\nchannels = 2\n[capture.device]\nkind = \"file\"\npath = \"note.wav\"\n[ingest]\naccepted_prefix = \"audio/\""
        )?;

        let cfg = Config::load(path.to_str().unwrap())?;

        assert_eq!(cfg.capture.channels, 2);
        assert_eq!(cfg.capture.sample_rate, 16000);
        assert_eq!(cfg.ingest.accepted_prefix, "audio/");
        assert_eq!(
            cfg.capture.device,
            DeviceSource::File {
                path: "note.wav".to_string()
            }
        );
        Ok(())
    }
}
