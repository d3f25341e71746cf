// Dataset store trait — backend-agnostic async interface over the canonical
// training data.
//
// The shipped implementation is file-backed (CsvStore); the methods are
// async so a database-backed store could slot in behind the same interface
// without touching the retrain pipeline or the handlers.

use anyhow::Result;
use async_trait::async_trait;

use super::models::LabeledRecord;

#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Create the backing storage (and its header/schema) if absent.
    async fn ensure_initialized(&self) -> Result<()>;

    /// Append one complete labeled record. Appends must be atomic at record
    /// granularity: a concurrent load never sees a partial row.
    async fn append(&self, record: &LabeledRecord) -> Result<()>;

    /// Read the whole dataset. Fails on a missing file, a header that
    /// doesn't match the canonical feature names, or any malformed row —
    /// retraining on silently-dropped rows is worse than failing.
    async fn load_all(&self) -> Result<Vec<LabeledRecord>>;

    /// Number of labeled rows currently stored.
    async fn row_count(&self) -> Result<usize>;
}
