//! Evaluation Report
//!
//! Per-row evaluation records and the CSV writer that persists them.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// One scored row of the evaluation output
///
/// Created once per input row and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalRecord {
    /// Image path from the split
    pub path: String,
    /// Ground-truth label
    pub label: String,
    /// First character of the normalized prediction, or empty
    pub pred: String,
    /// Engine-reported confidence in [0, 1]
    pub conf: f64,
    /// 1 iff `pred == label` and `conf` cleared the admission threshold
    pub is_correct: u8,
    /// Empty, or an error tag such as `ocr_error:<message>`
    pub err: String,
}

impl EvalRecord {
    /// Record for a row whose engine call failed
    pub fn failure(path: &str, label: &str, err: String) -> Self {
        Self {
            path: path.to_string(),
            label: label.to_string(),
            pred: String::new(),
            conf: 0.0,
            is_correct: 0,
            err,
        }
    }
}

/// Errors from writing the report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write evaluation CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Write the evaluation records to a CSV, overwriting any existing file
///
/// UTF-8, header row, one row per record, no index column.
pub fn write_eval(path: &Path, records: &[EvalRecord]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<EvalRecord> {
        vec![
            EvalRecord {
                path: "img/0001.png".to_string(),
                label: "あ".to_string(),
                pred: "あ".to_string(),
                conf: 0.93,
                is_correct: 1,
                err: String::new(),
            },
            EvalRecord::failure("img/0002.png", "い", "ocr_error:corrupt image".to_string()),
        ]
    }

    fn read_back(path: &Path) -> Vec<EvalRecord> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader.deserialize().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_write_and_read_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("ocr_eval_val.csv");
        let records = sample_records();

        write_eval(&out, &records).unwrap();

        assert_eq!(read_back(&out), records);
    }

    #[test]
    fn test_header_and_column_order() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("ocr_eval_val.csv");

        write_eval(&out, &sample_records()).unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, "path,label,pred,conf,is_correct,err");
    }

    #[test]
    fn test_overwrites_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("ocr_eval_val.csv");

        write_eval(&out, &sample_records()).unwrap();
        write_eval(&out, &sample_records()[..1]).unwrap();

        assert_eq!(read_back(&out).len(), 1);
    }

    #[test]
    fn test_failure_record_fields() {
        let record = EvalRecord::failure("a.png", "A", "ocr_error:boom".to_string());

        assert_eq!(record.pred, "");
        assert_eq!(record.conf, 0.0);
        assert_eq!(record.is_correct, 0);
        assert!(record.err.starts_with("ocr_error:"));
    }
}
