//! PaddleOCR sidecar backend
//!
//! Reaches PaddleOCR through a small Python bridge script invoked per call.
//! The bridge prints one JSON document on stdout; its argument surface varies
//! across releases, which construction probes for instead of pinning a
//! version.

use serde::Deserialize;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use super::{OcrEngine, OcrError, RawResult, RecognizeFlags};
use crate::config::EngineConfig;

/// MKL/OMP runtime pins for the bridge process; some Paddle builds crash or
/// oversubscribe without them.
const RUNTIME_ENV: &[(&str, &str)] = &[
    ("KMP_DUPLICATE_LIB_OK", "TRUE"),
    ("MKL_NUM_THREADS", "1"),
    ("NUMEXPR_NUM_THREADS", "1"),
    ("OMP_NUM_THREADS", "1"),
    ("MKL_THREADING_LAYER", "GNU"),
];

/// Capability handshake reported by `--probe`
#[derive(Debug, Deserialize)]
struct ProbeInfo {
    /// Whether the bridge exposes the modern `--predict` entry point
    #[serde(default)]
    predict: bool,
    #[serde(default)]
    version: Option<String>,
}

/// PaddleOCR engine reached through the bridge script
#[derive(Debug)]
pub struct PaddleBridge {
    python: String,
    script: std::path::PathBuf,
    lang: Option<String>,
    use_gpu: Option<bool>,
    supports_predict: bool,
}

impl PaddleBridge {
    /// Create an unprobed bridge handle with the bridge's own defaults
    pub fn new(cfg: &EngineConfig) -> Self {
        Self {
            python: cfg.python.clone(),
            script: cfg.script.clone(),
            lang: None,
            use_gpu: None,
            supports_predict: false,
        }
    }

    /// Request a recognition language
    pub fn with_lang(mut self, lang: &str) -> Self {
        self.lang = Some(lang.to_string());
        self
    }

    /// Request the GPU toggle
    pub fn with_gpu(mut self, use_gpu: bool) -> Self {
        self.use_gpu = Some(use_gpu);
        self
    }

    /// Validate the requested arguments against the installed bridge and
    /// discover its capabilities
    ///
    /// Older bridge releases reject the `--lang`/`--use_gpu` arguments, which
    /// surfaces here as a construction error and drives the builder cascade.
    pub fn probe(mut self) -> Result<Self, OcrError> {
        let mut args = self.base_args();
        args.push(OsString::from("--probe"));

        let output = self.spawn(&args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Construction(stderr.trim().to_string()));
        }

        let info: ProbeInfo = serde_json::from_slice(&output.stdout)?;
        self.supports_predict = info.predict;
        info!(
            "bridge probe ok (version: {}, predict: {})",
            info.version.as_deref().unwrap_or("unknown"),
            info.predict
        );
        Ok(self)
    }

    /// Arguments shared by every bridge invocation
    fn base_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(lang) = &self.lang {
            args.push(OsString::from("--lang"));
            args.push(OsString::from(lang));
        }
        if let Some(use_gpu) = self.use_gpu {
            args.push(OsString::from(format!("--use_gpu={use_gpu}")));
        }
        args
    }

    fn predict_args(&self, image: &Path) -> Vec<OsString> {
        let mut args = self.base_args();
        args.push(OsString::from("--predict"));
        args.push(OsString::from("--image"));
        args.push(image.as_os_str().to_os_string());
        args
    }

    fn recognize_args(&self, image: &Path, flags: RecognizeFlags) -> Vec<OsString> {
        let mut args = self.base_args();
        args.push(OsString::from("--image"));
        args.push(image.as_os_str().to_os_string());
        match flags.det {
            Some(false) => args.push(OsString::from("--no-det")),
            Some(true) => args.push(OsString::from("--det")),
            None => {}
        }
        match flags.cls {
            Some(false) => args.push(OsString::from("--no-cls")),
            Some(true) => args.push(OsString::from("--cls")),
            None => {}
        }
        args
    }

    fn spawn(&self, args: &[OsString]) -> Result<std::process::Output, OcrError> {
        debug!("running bridge: {} {} {:?}", self.python, self.script.display(), args);
        let mut cmd = Command::new(&self.python);
        cmd.arg(&self.script).args(args);
        for (key, value) in RUNTIME_ENV {
            cmd.env(key, value);
        }
        Ok(cmd.output()?)
    }

    /// Run the bridge and parse its stdout as a raw result
    fn run(&self, args: &[OsString]) -> Result<RawResult, OcrError> {
        let output = self.spawn(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr));
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

impl OcrEngine for PaddleBridge {
    fn supports_predict(&self) -> bool {
        self.supports_predict
    }

    fn predict(&self, image: &Path) -> Result<RawResult, OcrError> {
        if !self.supports_predict {
            return Err(OcrError::Unsupported);
        }
        self.run(&self.predict_args(image))
    }

    fn recognize(&self, image: &Path, flags: RecognizeFlags) -> Result<RawResult, OcrError> {
        self.run(&self.recognize_args(image, flags))
    }
}

/// Map a failed bridge invocation to an error variant
///
/// argparse reports unknown flags as "unrecognized arguments"; older bridges
/// forwarding kwargs blindly raise "unexpected keyword argument". Both mean
/// the parameters, not the image, were the problem.
fn classify_failure(stderr: &str) -> OcrError {
    let trimmed = stderr.trim();
    if trimmed.contains("unrecognized arguments") || trimmed.contains("unexpected keyword argument")
    {
        OcrError::UnsupportedParams(trimmed.to_string())
    } else {
        OcrError::Inference(trimmed.to_string())
    }
}
