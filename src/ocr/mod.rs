//! OCR Engine Layer
//!
//! Defines the engine seam the harness scores against, plus the
//! version-compatibility glue around it: a constructor fallback cascade and a
//! call shim that tolerates engines with different calling conventions.

pub mod bridge;
pub mod normalize;

use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::EngineConfig;

pub use bridge::PaddleBridge;
pub use normalize::extract_text_conf;

/// Raw engine output: an engine-specific, weakly-typed nested structure
pub type RawResult = serde_json::Value;

/// Errors from engine construction and inference
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("engine does not support this call")]
    Unsupported,

    #[error("engine rejected parameters: {0}")]
    UnsupportedParams(String),

    #[error("engine construction failed: {0}")]
    Construction(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("failed to run engine process: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid engine output: {0}")]
    InvalidOutput(#[from] serde_json::Error),
}

/// Toggles for the legacy recognition call; `None` omits the flag entirely
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecognizeFlags {
    /// Run text-region detection
    pub det: Option<bool>,
    /// Run orientation classification
    pub cls: Option<bool>,
}

impl RecognizeFlags {
    /// Recognition-only flags: detection and orientation classification off
    pub fn recognition_only() -> Self {
        Self {
            det: Some(false),
            cls: Some(false),
        }
    }
}

/// Black-box OCR engine
///
/// Engines expose a legacy recognition call, and optionally the newer
/// single-argument `predict` entry point.
pub trait OcrEngine {
    /// Whether the engine exposes the single-argument `predict` entry point
    fn supports_predict(&self) -> bool {
        false
    }

    /// Modern single-argument inference
    fn predict(&self, _image: &Path) -> Result<RawResult, OcrError> {
        Err(OcrError::Unsupported)
    }

    /// Legacy recognition call with optional detection/classification toggles
    fn recognize(&self, image: &Path, flags: RecognizeFlags) -> Result<RawResult, OcrError>;
}

/// One described construction attempt
pub struct BuildAttempt<T> {
    /// Human-readable mode description, e.g. `lang=japan, use_gpu=false`
    pub mode: String,
    /// Construction thunk, run at most once
    pub build: Box<dyn FnOnce() -> Result<T, OcrError>>,
}

impl<T> BuildAttempt<T> {
    pub fn new(mode: impl Into<String>, build: impl FnOnce() -> Result<T, OcrError> + 'static) -> Self {
        Self {
            mode: mode.into(),
            build: Box::new(build),
        }
    }
}

/// Run ordered construction attempts until one succeeds
///
/// Each failure is logged and discarded; the error surfaced when every
/// attempt fails is the last one. No retry within a single attempt.
pub fn first_success<T>(attempts: Vec<BuildAttempt<T>>) -> Result<(T, String), OcrError> {
    let mut last_err = OcrError::Construction("no construction attempts".to_string());

    for attempt in attempts {
        info!("[build_engine] trying mode: {}", attempt.mode);
        match (attempt.build)() {
            Ok(engine) => return Ok((engine, attempt.mode)),
            Err(e) => {
                warn!("[build_engine] mode '{}' failed: {e}", attempt.mode);
                last_err = e;
            }
        }
    }

    Err(last_err)
}

/// Construct the sidecar engine, falling back to less specific modes
///
/// Different bridge releases accept different argument sets, so construction
/// is attempted with decreasing specificity: lang + GPU toggle, lang only,
/// then the bridge's own defaults.
pub fn build_engine(
    cfg: &EngineConfig,
    lang: &str,
    use_gpu: bool,
) -> Result<(PaddleBridge, String), OcrError> {
    let attempts = vec![
        BuildAttempt::new(format!("lang={lang}, use_gpu={use_gpu}"), {
            let cfg = cfg.clone();
            let lang = lang.to_string();
            move || PaddleBridge::new(&cfg).with_lang(&lang).with_gpu(use_gpu).probe()
        }),
        BuildAttempt::new(format!("lang={lang}"), {
            let cfg = cfg.clone();
            let lang = lang.to_string();
            move || PaddleBridge::new(&cfg).with_lang(&lang).probe()
        }),
        BuildAttempt::new("default", {
            let cfg = cfg.clone();
            move || PaddleBridge::new(&cfg).probe()
        }),
    ];

    first_success(attempts)
}

/// Run inference on a single image, tolerating both calling conventions
///
/// Tries `predict` when the engine advertises it, then the recognition-only
/// legacy call, then the bare legacy call if the engine rejects the
/// detection/classification flags. Any other inference error propagates to
/// the caller, which records it per row.
pub fn recognize_single(engine: &dyn OcrEngine, image: &Path) -> Result<RawResult, OcrError> {
    if engine.supports_predict() {
        match engine.predict(image) {
            Ok(result) => return Ok(result),
            Err(e) => warn!("predict() failed: {e}, falling back to recognize()"),
        }
    }

    match engine.recognize(image, RecognizeFlags::recognition_only()) {
        Err(OcrError::UnsupportedParams(_)) => engine.recognize(image, RecognizeFlags::default()),
        other => other,
    }
}
