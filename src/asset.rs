use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::content::ContentHandle;

/// Opaque, unique asset identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(Uuid);

impl AssetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Audio,
}

/// A committed unit of vault content
///
/// Everything except the content handle is fixed at construction. Dropping
/// the asset releases its content.
#[derive(Debug)]
pub struct Asset {
    id: AssetId,
    kind: AssetKind,
    display_name: String,
    content: ContentHandle,
    created_at: DateTime<Utc>,
    size_bytes: Option<u64>,
    duration_seconds: Option<u64>,
}

impl Asset {
    pub fn image(id: AssetId, name: &str, content: ContentHandle, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: AssetKind::Image,
            display_name: name.to_string(),
            size_bytes: Some(content.size_bytes()),
            duration_seconds: None,
            content,
            created_at,
        }
    }

    /// A recorded voice note, labelled from its capture time
    pub fn voice_note(
        id: AssetId,
        content: ContentHandle,
        created_at: DateTime<Utc>,
        duration_seconds: u64,
    ) -> Self {
        Self {
            id,
            kind: AssetKind::Audio,
            display_name: crate::display::voice_note_label(created_at),
            size_bytes: None,
            duration_seconds: Some(duration_seconds),
            content,
            created_at,
        }
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn content(&self) -> &ContentHandle {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }

    pub fn duration_seconds(&self) -> Option<u64> {
        self.duration_seconds
    }
}
