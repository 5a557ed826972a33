//! Dataset Layer
//!
//! Loads the labeled split CSVs produced by the preprocessing step.

use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Named partition of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Split {
    Train,
    Val,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => write!(f, "train"),
            Split::Val => write!(f, "val"),
        }
    }
}

/// One labeled evaluation sample
#[derive(Debug, Clone, Deserialize)]
pub struct SplitRecord {
    /// Filesystem path to the image
    pub path: String,
    /// Expected recognized text, typically a single character
    pub label: String,
}

/// Errors from loading a split
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("{} not found. Run the preprocess-and-split step first.", path.display())]
    SplitNotFound { path: PathBuf },

    #[error("failed to read split CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Load a split CSV, preserving file order
pub fn load_split(csv_path: &Path) -> Result<Vec<SplitRecord>, DatasetError> {
    if !csv_path.exists() {
        return Err(DatasetError::SplitNotFound {
            path: csv_path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_load_split_preserves_order() {
        let file = write_csv("path,label\nimg/0001.png,あ\nimg/0002.png,い\nimg/0003.png,う\n");

        let records = load_split(file.path()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].path, "img/0001.png");
        assert_eq!(records[0].label, "あ");
        assert_eq!(records[2].label, "う");
    }

    #[test]
    fn test_load_split_missing_file() {
        let missing = Path::new("/nonexistent/clean/val.csv");

        let err = load_split(missing).unwrap_err();

        match err {
            DatasetError::SplitNotFound { path } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
        // The message must name the file and point at the prerequisite step.
        let msg = load_split(missing).unwrap_err().to_string();
        assert!(msg.contains("val.csv"));
        assert!(msg.contains("preprocess"));
    }

    #[test]
    fn test_load_split_extra_columns_ignored() {
        let file = write_csv("path,label,width\nimg/a.png,A,32\n");

        let records = load_split(file.path()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label, "A");
    }

    #[test]
    fn test_split_display() {
        assert_eq!(Split::Train.to_string(), "train");
        assert_eq!(Split::Val.to_string(), "val");
    }
}
