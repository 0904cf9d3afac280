//! Display strings derived from asset data
//!
//! Everything here is pure so the grid renders identically regardless of
//! the host locale.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::asset::{Asset, AssetId, AssetKind};

/// Message shown when the vault holds nothing
pub const EMPTY_MESSAGE: &str = "No assets yet";

/// `m:ss`, seconds zero-padded (65 -> `"1:05"`)
pub fn format_duration(total_seconds: u64) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// `Jan 5, 2025`
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

pub fn voice_note_label(at: DateTime<Utc>) -> String {
    format!("Voice note {} {}", format_date(at), at.format("%H:%M"))
}

/// Human-readable byte size for image cards
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetCard {
    pub id: AssetId,
    pub kind: AssetKind,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub url: String,
}

impl AssetCard {
    pub fn from_asset(asset: &Asset) -> Self {
        let subtitle = match asset.kind() {
            AssetKind::Image => asset.size_bytes().map(format_size).unwrap_or_default(),
            AssetKind::Audio => format_duration(asset.duration_seconds().unwrap_or(0)),
        };

        Self {
            id: asset.id(),
            kind: asset.kind(),
            title: asset.display_name().to_string(),
            subtitle,
            date: format_date(asset.created_at()),
            url: asset.content().url().to_string(),
        }
    }
}

/// What the asset grid shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "cards", rename_all = "lowercase")]
pub enum AssetGrid {
    Empty,
    Cards(Vec<AssetCard>),
}

impl AssetGrid {
    pub fn from_assets<'a>(assets: impl IntoIterator<Item = &'a Asset>) -> Self {
        let cards: Vec<AssetCard> = assets.into_iter().map(AssetCard::from_asset).collect();
        if cards.is_empty() {
            Self::Empty
        } else {
            Self::Cards(cards)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
