use thiserror::Error;

/// Failures surfaced by the capture side of a recording session.
///
/// Anything that goes wrong while talking to the capture device is mapped
/// into one of these and returned from `RecordingController::start`, so a
/// denied permission never escapes as an unhandled failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Permission denied or no capture hardware present
    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The caller cancelled the device request before it resolved
    #[error("Device request cancelled")]
    Cancelled,

    /// Finalizing the recorded chunks into a clip failed
    #[error("Failed to encode recording: {0}")]
    Encode(String),
}
