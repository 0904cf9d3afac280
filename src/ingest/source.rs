use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::IncomingFile;

/// Platform side that hands over user-selected files
pub trait FileSource {
    fn files(&self) -> Result<Vec<IncomingFile>>;
}

/// Guess a media type from a file extension
pub fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "webm" => "audio/webm",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Regular files of one directory, in name order
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Read a single file from disk
    pub fn read_file(path: &Path) -> Result<IncomingFile> {
        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(IncomingFile::new(name, media_type_for(path), bytes))
    }
}

impl FileSource for DirectorySource {
    fn files(&self) -> Result<Vec<IncomingFile>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir).with_context(|| format!("Failed to list {}", self.dir.display()))? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        info!("Reading {} files from {}", paths.len(), self.dir.display());

        paths
            .iter()
            .map(|path| {
                debug!("Reading {}", path.display());
                Self::read_file(path)
            })
            .collect()
    }
}
