use tracing::debug;

use super::IncomingFile;

/// Files accepted from one drop or picker selection
#[derive(Debug, Clone, Default)]
pub struct IngestionBatch {
    /// Accepted files in input order
    pub accepted: Vec<IncomingFile>,
    /// Files dropped by the type filter
    pub rejected_count: usize,
}

impl IngestionBatch {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Keep the files whose media type starts with `expected_prefix`
///
/// Mismatched files are not an error; they are counted and dropped. The
/// comparison ignores ASCII case since platforms disagree on it.
pub fn ingest(files: impl IntoIterator<Item = IncomingFile>, expected_prefix: &str) -> IngestionBatch {
    let prefix = expected_prefix.to_ascii_lowercase();
    let mut batch = IngestionBatch::default();

    for file in files {
        if file.media_type.to_ascii_lowercase().starts_with(&prefix) {
            batch.accepted.push(file);
        } else {
            debug!("Skipping {} ({}): does not match {}", file.name, file.media_type, expected_prefix);
            batch.rejected_count += 1;
        }
    }

    debug!(
        "Ingested {} files, rejected {}",
        batch.accepted.len(),
        batch.rejected_count
    );

    batch
}
