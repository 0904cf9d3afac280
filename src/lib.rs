pub mod asset;
pub mod audio;
pub mod config;
pub mod content;
pub mod display;
pub mod error;
pub mod ingest;
pub mod recording;
pub mod vault;

pub use asset::{Asset, AssetId, AssetKind};
pub use audio::{
    AudioFile, AudioFrame, CaptureDevice, CaptureStream, Clip, ClipWriter, DeviceConfig, DeviceFactory,
    DeviceSource, FileCaptureDevice, UnavailableDevice,
};
pub use config::Config;
pub use content::{ContentHandle, ContentStore};
pub use display::{format_date, format_duration, AssetCard, AssetGrid};
pub use error::CaptureError;
pub use ingest::{ingest, DragEvent, DragState, IncomingFile, IngestedFile, IngestionBatch, IngestionPipeline};
pub use recording::{RecorderConfig, RecordingController, SessionState};
pub use vault::{MemoryVault, VaultSink};
