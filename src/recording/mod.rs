//! Voice-note recording
//!
//! This module provides the `RecordingController` that manages:
//! - Capture device acquisition and release
//! - In-order chunk accumulation into a finalized clip
//! - The elapsed-time tick while recording
//! - Playback transport over the finished clip
//! - Save / discard hand-off to the vault

mod config;
mod controller;
mod playback;
mod ticker;

pub use config::RecorderConfig;
pub use controller::{RecordingController, SessionState};
pub use playback::Playback;
pub use ticker::Ticker;
