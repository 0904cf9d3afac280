//! Preview and content handles
//!
//! A [`ContentHandle`] makes a blob of bytes addressable by a `blob:` URL
//! for as long as the handle lives. Handles are not `Clone`, so exactly one
//! owner releases each one, and release happens on drop.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

const URL_PREFIX: &str = "blob:asset-capture/";

/// Registry of live content handles
#[derive(Clone, Default)]
pub struct ContentStore {
    entries: Arc<Mutex<HashMap<Uuid, Arc<[u8]>>>>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `bytes` addressable and return the owning handle
    pub fn register(&self, media_type: &str, bytes: Arc<[u8]>) -> ContentHandle {
        let id = Uuid::new_v4();
        let size_bytes = bytes.len() as u64;

        self.entries.lock().insert(id, bytes);
        debug!("Registered content {} ({}, {} bytes)", id, media_type, size_bytes);

        ContentHandle {
            id,
            url: format!("{}{}", URL_PREFIX, id),
            media_type: media_type.to_string(),
            size_bytes,
            store: self.clone(),
        }
    }

    /// Look up the bytes behind a URL. `None` once the handle is released.
    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        let id = Uuid::parse_str(url.strip_prefix(URL_PREFIX)?).ok()?;
        self.entries.lock().get(&id).map(Arc::clone)
    }

    /// Number of handles not yet released
    pub fn live_count(&self) -> usize {
        self.entries.lock().len()
    }

    fn release(&self, id: &Uuid) {
        if self.entries.lock().remove(id).is_some() {
            debug!("Released content {}", id);
        } else {
            warn!("Content {} released twice", id);
        }
    }
}

/// Exclusive owner of one registered blob
pub struct ContentHandle {
    id: Uuid,
    url: String,
    media_type: String,
    size_bytes: u64,
    store: ContentStore,
}

impl ContentHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn bytes(&self) -> Option<Arc<[u8]>> {
        self.store.resolve(&self.url)
    }

    /// Release now rather than at end of scope
    pub fn release(self) {}
}

impl Drop for ContentHandle {
    fn drop(&mut self) {
        self.store.release(&self.id);
    }
}

impl std::fmt::Debug for ContentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentHandle")
            .field("url", &self.url)
            .field("media_type", &self.media_type)
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}
