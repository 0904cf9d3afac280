pub mod backend;
pub mod clip;
pub mod file;

pub use backend::{
    AudioFrame, CaptureDevice, CaptureStream, DeviceConfig, DeviceFactory, DeviceSource, UnavailableDevice,
};
pub use clip::{Clip, ClipWriter, CLIP_MEDIA_TYPE};
pub use file::{AudioFile, FileCaptureDevice};
