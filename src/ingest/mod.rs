//! File ingestion
//!
//! Turns files supplied by a drop surface or file picker into pending
//! assets:
//! - Media-type filtering (mismatches are dropped silently)
//! - Identifier assignment and preview handles
//! - Hand-off of accepted files to the vault owner

mod filter;
mod pipeline;
mod source;

pub use filter::{ingest, IngestionBatch};
pub use pipeline::{DragEvent, DragState, IngestionPipeline, PendingFile};
pub use source::{media_type_for, DirectorySource, FileSource};

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::asset::AssetId;

/// A file as supplied by the platform
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn byte_length(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// An accepted file with the identity it keeps once committed
#[derive(Debug, Clone)]
pub struct IngestedFile {
    pub id: AssetId,
    pub file: IncomingFile,
    pub ingested_at: DateTime<Utc>,
}
