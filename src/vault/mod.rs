//! Hand-off to the vault collection owner
//!
//! The capture side never stores anything itself. Finalized recordings and
//! accepted files go through [`VaultSink`]; [`MemoryVault`] is the in-process
//! owner used by the CLI and tests.

mod memory;

pub use memory::MemoryVault;

use anyhow::Result;

use crate::asset::AssetId;
use crate::audio::Clip;
use crate::ingest::IngestedFile;

pub trait VaultSink {
    /// Accepted files, in the order they were ingested
    fn on_files_ingested(&mut self, files: Vec<IngestedFile>) -> Result<Vec<AssetId>>;

    /// A finalized recording and the duration shown while it was captured
    fn on_recording_saved(&mut self, clip: Clip, duration_seconds: u64) -> Result<AssetId>;
}
