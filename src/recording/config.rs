use std::time::Duration;

use crate::config::Config;

/// Period of the elapsed-time tick while recording
///
/// Elapsed time is counted in whole seconds, so this is not configurable.
pub const ELAPSED_TICK: Duration = Duration::from_secs(1);

/// Timing configuration for a recording controller
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// How often the playback position advances
    /// Default: 1 second
    pub playback_interval: Duration,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            playback_interval: Duration::from_secs(1),
        }
    }
}

impl From<&Config> for RecorderConfig {
    fn from(config: &Config) -> Self {
        Self {
            playback_interval: Duration::from_millis(config.playback.position_interval_ms.clamp(1, 1000)),
        }
    }
}
