use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};

use super::filter::{ingest, IngestionBatch};
use super::{IncomingFile, IngestedFile};
use crate::asset::AssetId;
use crate::content::{ContentHandle, ContentStore};
use crate::vault::VaultSink;

/// Events raised by a drop surface
#[derive(Debug, Clone)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
    /// Files become readable only here
    Drop(Vec<IncomingFile>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    /// Something is being dragged over the surface (visual affordance only)
    DragOver,
}

/// Accepted file waiting to be committed, with its preview handle
#[derive(Debug)]
pub struct PendingFile {
    ingested: IngestedFile,
    preview: ContentHandle,
}

impl PendingFile {
    pub fn id(&self) -> AssetId {
        self.ingested.id
    }

    pub fn file(&self) -> &IncomingFile {
        &self.ingested.file
    }

    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }
}

/// Stateful ingestion surface: drag tracking, pending previews, commit
///
/// Previews are released when an item is removed, committed, or when the
/// pipeline itself is dropped.
pub struct IngestionPipeline {
    expected_prefix: String,
    store: ContentStore,
    drag_state: DragState,
    pending: Vec<PendingFile>,
}

impl IngestionPipeline {
    pub fn new(expected_prefix: impl Into<String>, store: ContentStore) -> Self {
        Self {
            expected_prefix: expected_prefix.into(),
            store,
            drag_state: DragState::Idle,
            pending: Vec::new(),
        }
    }

    pub fn expected_prefix(&self) -> &str {
        &self.expected_prefix
    }

    pub fn drag_state(&self) -> DragState {
        self.drag_state
    }

    pub fn pending(&self) -> &[PendingFile] {
        &self.pending
    }

    /// Feed one drag event. Only a drop yields a batch.
    pub fn handle_drag(&mut self, event: DragEvent) -> Option<IngestionBatch> {
        match event {
            DragEvent::Enter | DragEvent::Over => {
                self.drag_state = DragState::DragOver;
                None
            }
            DragEvent::Leave => {
                self.drag_state = DragState::Idle;
                None
            }
            DragEvent::Drop(files) => {
                self.drag_state = DragState::Idle;
                Some(self.accept(files))
            }
        }
    }

    /// Files chosen through a file picker
    pub fn pick(&mut self, files: Vec<IncomingFile>) -> IngestionBatch {
        self.accept(files)
    }

    fn accept(&mut self, files: Vec<IncomingFile>) -> IngestionBatch {
        let batch = ingest(files, &self.expected_prefix);
        if batch.is_empty() {
            return batch;
        }

        let now = Utc::now();
        for file in &batch.accepted {
            let preview = self.store.register(&file.media_type, file.bytes.clone());
            let ingested = IngestedFile {
                id: AssetId::new(),
                file: file.clone(),
                ingested_at: now,
            };
            debug!("Pending {} as {}", file.name, ingested.id);
            self.pending.push(PendingFile { ingested, preview });
        }

        info!(
            "Accepted {} files ({} rejected), {} pending",
            batch.accepted.len(),
            batch.rejected_count,
            self.pending.len()
        );

        batch
    }

    /// Discard one pending item, releasing its preview
    pub fn remove(&mut self, index: usize) -> Option<IngestedFile> {
        if index >= self.pending.len() {
            debug!("Remove ignored: index {} out of range", index);
            return None;
        }

        let PendingFile { ingested, preview } = self.pending.remove(index);
        preview.release();
        Some(ingested)
    }

    /// Hand every pending file to the vault
    ///
    /// Nothing pending means no hand-off call. If the vault rejects the
    /// batch the pending list is left as it was.
    pub fn commit(&mut self, vault: &mut dyn VaultSink) -> Result<Vec<AssetId>> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        let files: Vec<IngestedFile> = self.pending.iter().map(|p| p.ingested.clone()).collect();
        let ids = vault.on_files_ingested(files)?;

        self.pending.clear();
        info!("Committed {} files to vault", ids.len());

        Ok(ids)
    }

    /// Discard all pending items without handing them off, releasing
    /// their previews
    pub fn clear(&mut self) {
        if !self.pending.is_empty() {
            info!("Discarded {} pending files", self.pending.len());
        }
        self.pending.clear();
    }
}
