//! Scoring Loop
//!
//! Runs the engine over every row of a split and scores the predictions.
//! Per-row engine failures are captured in the output record instead of
//! aborting, so a single corrupt image never invalidates the rest of the
//! split: the output always has exactly one row per input row.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::debug;

use crate::dataset::SplitRecord;
use crate::ocr::{extract_text_conf, recognize_single, OcrEngine};
use crate::report::EvalRecord;

/// Evaluate every row of a split against the engine
///
/// `rec_thresh` is the minimum confidence (inclusive) for a prediction to be
/// admitted as correct; the text must also match exactly.
pub fn evaluate_split(
    engine: &dyn OcrEngine,
    rows: &[SplitRecord],
    rec_thresh: f64,
    show_progress: bool,
) -> Vec<EvalRecord> {
    let pb = if show_progress {
        let pb = ProgressBar::new(rows.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} OCR eval [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap()
                .progress_chars("##-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(score_row(engine, row, rec_thresh));
        pb.inc(1);
    }
    pb.finish_and_clear();

    records
}

/// Score a single row, capturing engine failures as a tagged error field
fn score_row(engine: &dyn OcrEngine, row: &SplitRecord, rec_thresh: f64) -> EvalRecord {
    let raw = match recognize_single(engine, Path::new(&row.path)) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("engine failed on {}: {e}", row.path);
            return EvalRecord::failure(&row.path, &row.label, format!("ocr_error:{e}"));
        }
    };

    let (text, conf) = extract_text_conf(&raw);
    let pred: String = text.chars().next().map(String::from).unwrap_or_default();
    let ok = pred == row.label && conf >= rec_thresh;

    EvalRecord {
        path: row.path.clone(),
        label: row.label.clone(),
        pred,
        conf,
        is_correct: ok as u8,
        err: String::new(),
    }
}
