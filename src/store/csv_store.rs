// CsvStore — the canonical training dataset as a headered CSV file.
//
// Layout: the 20 canonical feature names, then CLASS_LABEL. The header is
// generated from FEATURE_NAMES and checked byte-for-byte on load, so a file
// written by this store round-trips exactly, and a reordered or renamed
// column is a hard error rather than silently shifted features.
//
// All file I/O happens under a tokio Mutex: lock, do synchronous work,
// return. Each append is a single write_all of one complete line, so a load
// (which also takes the lock) can never observe a torn record.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::features::{FEATURE_COUNT, FEATURE_NAMES};

use super::models::LabeledRecord;
use super::traits::DatasetStore;

/// The label column name in the dataset header.
pub const CLASS_LABEL: &str = "CLASS_LABEL";

pub struct CsvStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The exact header row: 20 canonical names plus CLASS_LABEL.
    pub fn header() -> String {
        let mut header = FEATURE_NAMES.join(",");
        header.push(',');
        header.push_str(CLASS_LABEL);
        header
    }

    fn format_row(record: &LabeledRecord) -> String {
        let mut row = String::new();
        for value in &record.features {
            // f64 Display renders integer-valued features without a
            // trailing ".0", keeping the file integer-clean.
            row.push_str(&value.to_string());
            row.push(',');
        }
        row.push_str(&record.label.to_string());
        row
    }

    fn parse_row(line: &str, line_no: usize) -> Result<LabeledRecord> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != FEATURE_COUNT + 1 {
            anyhow::bail!(
                "row {line_no}: expected {} fields, found {}",
                FEATURE_COUNT + 1,
                fields.len()
            );
        }

        let mut features = [0.0f64; FEATURE_COUNT];
        for (i, field) in fields[..FEATURE_COUNT].iter().enumerate() {
            let value = field
                .trim()
                .parse::<f64>()
                .with_context(|| format!("row {line_no}: bad value {field:?} in {}", FEATURE_NAMES[i]))?;
            // "NaN" and "inf" parse as f64 but would poison training.
            if !value.is_finite() {
                anyhow::bail!(
                    "row {line_no}: non-finite value {field:?} in {}",
                    FEATURE_NAMES[i]
                );
            }
            features[i] = value;
        }

        let label_field = fields[FEATURE_COUNT].trim();
        let label_value: f64 = label_field
            .parse()
            .with_context(|| format!("row {line_no}: bad {CLASS_LABEL} {label_field:?}"))?;
        let label = match label_value {
            v if v == 0.0 => 0,
            v if v == 1.0 => 1,
            _ => anyhow::bail!("row {line_no}: {CLASS_LABEL} must be 0 or 1, got {label_field}"),
        };

        Ok(LabeledRecord { features, label })
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
        fs::write(&self.path, format!("{}\n", Self::header()))
            .with_context(|| format!("creating dataset file {}", self.path.display()))?;
        Ok(())
    }

    fn read_rows(&self) -> Result<Vec<LabeledRecord>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading dataset file {}", self.path.display()))?;

        let mut lines = content.lines().enumerate();
        let header = match lines.next() {
            Some((_, line)) => line,
            None => anyhow::bail!("dataset file {} is empty", self.path.display()),
        };
        if header != Self::header() {
            anyhow::bail!(
                "dataset file {} has a non-canonical header; refusing to train on \
                 reordered or renamed columns",
                self.path.display()
            );
        }

        let mut records = Vec::new();
        for (idx, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            records.push(Self::parse_row(line, idx + 1)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl DatasetStore for CsvStore {
    async fn ensure_initialized(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.init_file()
    }

    async fn append(&self, record: &LabeledRecord) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.init_file()?;

        let line = format!("{}\n", Self::format_row(record));
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening dataset file {}", self.path.display()))?;
        // One complete record per write call.
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<LabeledRecord>> {
        let _guard = self.lock.lock().await;
        self.read_rows()
    }

    async fn row_count(&self) -> Result<usize> {
        let _guard = self.lock.lock().await;
        if !self.path.exists() {
            return Ok(0);
        }
        Ok(self.read_rows()?.len())
    }
}
