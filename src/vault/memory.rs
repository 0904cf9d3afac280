use anyhow::Result;
use std::collections::VecDeque;
use tracing::{info, warn};

use super::VaultSink;
use crate::asset::{Asset, AssetId};
use crate::audio::Clip;
use crate::content::ContentStore;
use crate::display::AssetGrid;
use crate::ingest::IngestedFile;

/// In-memory vault, newest first
pub struct MemoryVault {
    store: ContentStore,
    assets: VecDeque<Asset>,
}

impl MemoryVault {
    pub fn new(store: ContentStore) -> Self {
        Self {
            store,
            assets: VecDeque::new(),
        }
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id() == id)
    }

    /// Remove an asset and release its content. Returns false if unknown.
    pub fn delete(&mut self, id: AssetId) -> bool {
        match self.assets.iter().position(|a| a.id() == id) {
            Some(index) => {
                if let Some(asset) = self.assets.remove(index) {
                    info!("Deleted asset {} ({})", id, asset.display_name());
                }
                true
            }
            None => {
                warn!("Delete ignored: unknown asset {}", id);
                false
            }
        }
    }

    pub fn grid(&self) -> AssetGrid {
        AssetGrid::from_assets(self.assets.iter())
    }
}

impl VaultSink for MemoryVault {
    fn on_files_ingested(&mut self, files: Vec<IngestedFile>) -> Result<Vec<AssetId>> {
        let mut added: Vec<Asset> = Vec::with_capacity(files.len());

        for ingested in files {
            if self.get(ingested.id).is_some() || added.iter().any(|a| a.id() == ingested.id) {
                warn!("Asset {} already in vault, skipping", ingested.id);
                continue;
            }

            let content = self.store.register(&ingested.file.media_type, ingested.file.bytes.clone());
            added.push(Asset::image(ingested.id, &ingested.file.name, content, ingested.ingested_at));
        }

        let ids: Vec<AssetId> = added.iter().map(Asset::id).collect();

        // The batch goes on top as a block, keeping its own order
        for asset in added.into_iter().rev() {
            self.assets.push_front(asset);
        }

        info!("Vault received {} files ({} total)", ids.len(), self.assets.len());
        Ok(ids)
    }

    fn on_recording_saved(&mut self, clip: Clip, duration_seconds: u64) -> Result<AssetId> {
        let content = self.store.register(clip.media_type(), clip.bytes());
        let asset = Asset::voice_note(AssetId::new(), content, clip.recorded_at, duration_seconds);
        let id = asset.id();

        info!("Vault received voice note {} ({}s)", id, duration_seconds);
        self.assets.push_front(asset);

        Ok(id)
    }
}
