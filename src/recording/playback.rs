use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct PlaybackState {
    position_ms: u64,
    playing: bool,
    /// Bumped on every play/pause so a superseded task cannot move the position
    generation: u64,
}

/// Transport over a finished clip
///
/// Position advances on a background task every `interval`. Reaching the
/// end rewinds to zero and stops. Must be driven from within a Tokio runtime.
pub struct Playback {
    duration_ms: u64,
    interval: Duration,
    state: Arc<Mutex<PlaybackState>>,
    cancel: Option<CancellationToken>,
}

impl Playback {
    pub fn new(duration_seconds: u64, interval: Duration) -> Self {
        Self {
            duration_ms: duration_seconds * 1000,
            interval,
            state: Arc::new(Mutex::new(PlaybackState {
                position_ms: 0,
                playing: false,
                generation: 0,
            })),
            cancel: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn position_seconds(&self) -> u64 {
        self.state.lock().position_ms / 1000
    }

    /// Start or resume. Returns false if already playing or nothing to play.
    pub fn play(&mut self) -> bool {
        if self.duration_ms == 0 {
            debug!("Playback ignored: empty clip");
            return false;
        }

        let generation = {
            let mut state = self.state.lock();
            if state.playing {
                return false;
            }
            state.playing = true;
            state.generation += 1;
            state.generation
        };

        let token = CancellationToken::new();
        self.cancel = Some(token.clone());

        let state = Arc::clone(&self.state);
        let interval = self.interval;
        let step_ms = interval.as_millis() as u64;
        let duration_ms = self.duration_ms;

        tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticks.tick() => {}
                }

                let mut guard = state.lock();
                if guard.generation != generation || !guard.playing {
                    break;
                }

                guard.position_ms += step_ms;
                if guard.position_ms >= duration_ms {
                    debug!("Playback reached end");
                    guard.position_ms = 0;
                    guard.playing = false;
                    break;
                }
            }
        });

        true
    }

    /// Pause, keeping the position. Returns false if not playing.
    pub fn pause(&mut self) -> bool {
        {
            let mut state = self.state.lock();
            if !state.playing {
                return false;
            }
            state.playing = false;
            state.generation += 1;
        }

        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        true
    }

    /// Stop and rewind to zero
    pub fn halt(&mut self) {
        self.pause();
        self.state.lock().position_ms = 0;
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_plays_to_end_and_rewinds() {
        let mut playback = Playback::new(3, Duration::from_secs(1));

        assert!(playback.play());
        assert!(playback.is_playing());

        time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(playback.position_seconds(), 1);

        time::sleep(Duration::from_secs(2)).await;
        assert!(!playback.is_playing());
        assert_eq!(playback.position_seconds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_keeps_position() {
        let mut playback = Playback::new(10, Duration::from_secs(1));
        playback.play();

        time::sleep(Duration::from_millis(2500)).await;
        assert!(playback.pause());
        assert_eq!(playback.position_seconds(), 2);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(playback.position_seconds(), 2, "Paused position must not move");

        assert!(playback.play());
        time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(playback.position_seconds(), 3);
    }

    #[tokio::test]
    async fn test_empty_clip_does_not_play() {
        let mut playback = Playback::new(0, Duration::from_secs(1));
        assert!(!playback.play());
        assert!(!playback.pause());
    }

    #[tokio::test(start_paused = true)]
    async fn test_halt_rewinds() {
        let mut playback = Playback::new(10, Duration::from_secs(1));
        playback.play();
        time::sleep(Duration::from_millis(4500)).await;

        playback.halt();

        assert!(!playback.is_playing());
        assert_eq!(playback.position_seconds(), 0);
    }
}
