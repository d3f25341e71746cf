// FeedbackLog — user-asserted labels, quarantined from the canonical data.
//
// Two columns: url,label. The URL is stored normalized (same rule as the
// extractor) with the label last, so rows are parsed from the right — a
// comma inside a URL cannot shift the label column. Rows sit here until an
// operator merges them into the training store; feedback never trains a
// model by itself.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::Mutex;

use crate::features::url_parts;

use super::models::FeedbackEntry;

const HEADER: &str = "url,label";

pub struct FeedbackLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn init_file(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        fs::write(&self.path, format!("{HEADER}\n"))
            .with_context(|| format!("creating feedback log {}", self.path.display()))?;
        Ok(())
    }

    pub async fn ensure_initialized(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.init_file()
    }

    /// Append one feedback row. The URL is normalized and stripped of line
    /// breaks so every row stays a single complete line.
    pub async fn append(&self, url: &str, label: u8) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.init_file()?;

        let url = url_parts::normalize(url).replace(['\n', '\r'], "");
        let line = format!("{url},{label}\n");

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening feedback log {}", self.path.display()))?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Read every feedback row without consuming it.
    pub async fn read_all(&self) -> Result<Vec<FeedbackEntry>> {
        let _guard = self.lock.lock().await;
        self.read_rows()
    }

    pub async fn row_count(&self) -> Result<usize> {
        let _guard = self.lock.lock().await;
        if !self.path.exists() {
            return Ok(0);
        }
        Ok(self.read_rows()?.len())
    }

    /// Remove the first `n` rows, keeping anything appended since the
    /// caller read them. The merge operation calls this only after the rows
    /// it read have landed in the training store — a row leaves the log
    /// when and only when it has been persisted somewhere else.
    pub async fn remove_first(&self, n: usize) -> Result<()> {
        let _guard = self.lock.lock().await;
        if n == 0 {
            return Ok(());
        }
        let entries = self.read_rows()?;

        let mut content = String::from(HEADER);
        content.push('\n');
        for entry in entries.iter().skip(n) {
            content.push_str(&format!("{},{}\n", entry.url, entry.label));
        }
        fs::write(&self.path, content)
            .with_context(|| format!("rewriting feedback log {}", self.path.display()))?;
        Ok(())
    }

    fn read_rows(&self) -> Result<Vec<FeedbackEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading feedback log {}", self.path.display()))?;

        let mut entries = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() || (idx == 0 && line == HEADER) {
                continue;
            }
            // Label last: split from the right so URL commas are harmless.
            let Some((url, label)) = line.rsplit_once(',') else {
                anyhow::bail!("feedback row {}: missing label column", idx + 1);
            };
            let label: u8 = label
                .trim()
                .parse()
                .with_context(|| format!("feedback row {}: bad label {label:?}", idx + 1))?;
            if label > 1 {
                anyhow::bail!("feedback row {}: label must be 0 or 1", idx + 1);
            }
            entries.push(FeedbackEntry {
                url: url.to_string(),
                label,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_in(dir: &tempfile::TempDir) -> FeedbackLog {
        FeedbackLog::new(dir.path().join("feedback.csv"))
    }

    #[tokio::test]
    async fn test_append_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        log.append("http://phish.example/login", 1).await.unwrap();
        log.append("example.com", 0).await.unwrap();

        let rows = log.read_all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].url, "http://phish.example/login");
        assert_eq!(rows[0].label, 1);
        // Normalized on the way in.
        assert_eq!(rows[1].url, "http://example.com");
        assert_eq!(rows[1].label, 0);
    }

    #[tokio::test]
    async fn test_url_with_comma_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        log.append("http://a.com/p?x=1,2,3", 1).await.unwrap();
        let rows = log.read_all().await.unwrap();
        assert_eq!(rows[0].url, "http://a.com/p?x=1,2,3");
        assert_eq!(rows[0].label, 1);
    }

    #[tokio::test]
    async fn test_remove_first_clears_merged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        log.append("http://a.com", 1).await.unwrap();
        log.append("http://b.com", 0).await.unwrap();
        log.remove_first(2).await.unwrap();

        assert_eq!(log.read_all().await.unwrap().len(), 0);
        assert_eq!(log.row_count().await.unwrap(), 0);
        // Header survives the rewrite.
        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content, "url,label\n");
    }

    #[tokio::test]
    async fn test_remove_first_keeps_later_rows() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        log.append("http://a.com", 1).await.unwrap();
        log.append("http://b.com", 0).await.unwrap();
        log.append("http://c.com/x?y=1,2", 1).await.unwrap();
        log.remove_first(2).await.unwrap();

        let rows = log.read_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].url, "http://c.com/x?y=1,2");
        assert_eq!(rows[0].label, 1);
    }

    #[tokio::test]
    async fn test_remove_first_zero_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        log.append("http://a.com", 1).await.unwrap();
        log.remove_first(0).await.unwrap();
        assert_eq!(log.row_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bad_label_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);
        log.ensure_initialized().await.unwrap();
        fs::write(log.path(), "url,label\nhttp://a.com,7\n").unwrap();

        assert!(log.read_all().await.is_err());
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);
        assert_eq!(log.read_all().await.unwrap().len(), 0);
    }
}
