//! Result normalization
//!
//! PaddleOCR's raw result shape varies by release. Recognition-only calls
//! return `[[("text", conf), ...]]`; detection-enabled calls return
//! `[[ [box], ("text", conf) ], ...]`. This module classifies the nested
//! structure into one of the known shapes and extracts `(text, confidence)`,
//! degrading to an empty zero-confidence result on anything else. It never
//! fails: shape drift across engine versions is expected input, not an error.

use serde_json::Value;

/// Recognized raw-result shapes, checked in order
#[derive(Debug, Clone, PartialEq)]
enum ResultShape {
    /// `[[("text", conf), ...]]` from a detection-less call
    RecOnly { text: String, conf: f64 },
    /// `[[ [box], ("text", conf) ], ...]` from a detection-enabled call
    DetRec { text: String, conf: f64 },
    Unrecognized,
}

/// Extract `(text, confidence)` from a raw engine result
///
/// Only the first candidate of a multi-candidate result is inspected (top-1).
pub fn extract_text_conf(result: &Value) -> (String, f64) {
    match classify(result) {
        ResultShape::RecOnly { text, conf } | ResultShape::DetRec { text, conf } => (text, conf),
        ResultShape::Unrecognized => (String::new(), 0.0),
    }
}

fn classify(result: &Value) -> ResultShape {
    let Some(outer) = result.as_array() else {
        return ResultShape::Unrecognized;
    };
    let Some(first) = outer.first().and_then(Value::as_array) else {
        return ResultShape::Unrecognized;
    };

    // [[('text', conf), ...]]
    if let Some((text, conf)) = as_text_conf_pair(first.first()) {
        return ResultShape::RecOnly { text, conf };
    }

    // [[ [box], ('text', conf) ], ...]
    if first.len() >= 2 {
        if let Some((text, conf)) = as_text_conf_pair(first.get(1)) {
            return ResultShape::DetRec { text, conf };
        }
    }

    ResultShape::Unrecognized
}

/// Interpret a node as a `(text, confidence)` pair
fn as_text_conf_pair(node: Option<&Value>) -> Option<(String, f64)> {
    let pair = node?.as_array()?;
    if pair.len() < 2 {
        return None;
    }
    let text = pair[0].as_str()?.to_string();
    Some((text, coerce_conf(&pair[1])))
}

/// Best-effort confidence coercion; anything non-numeric becomes 0.0
fn coerce_conf(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recognition_only_shape() {
        let raw = json!([[["A", 0.9]]]);
        assert_eq!(extract_text_conf(&raw), ("A".to_string(), 0.9));
    }

    #[test]
    fn test_detection_shape() {
        let raw = json!([[[[0, 0], [1, 0], [1, 1], [0, 1]], ["B", 0.75]]]);
        assert_eq!(extract_text_conf(&raw), ("B".to_string(), 0.75));
    }

    #[test]
    fn test_top_candidate_only() {
        let raw = json!([[["first", 0.8], ["second", 0.7]]]);
        assert_eq!(extract_text_conf(&raw), ("first".to_string(), 0.8));
    }

    #[test]
    fn test_empty_and_non_sequence_inputs() {
        assert_eq!(extract_text_conf(&json!([])), (String::new(), 0.0));
        assert_eq!(extract_text_conf(&json!(null)), (String::new(), 0.0));
        assert_eq!(extract_text_conf(&json!("text")), (String::new(), 0.0));
        assert_eq!(extract_text_conf(&json!(42)), (String::new(), 0.0));
        assert_eq!(extract_text_conf(&json!({"text": "A"})), (String::new(), 0.0));
    }

    #[test]
    fn test_unrecognized_nested_shapes() {
        // Empty inner list
        assert_eq!(extract_text_conf(&json!([[]])), (String::new(), 0.0));
        // Inner element is not a pair
        assert_eq!(extract_text_conf(&json!([["A"]])), (String::new(), 0.0));
        // Pair whose first element is not a string
        assert_eq!(extract_text_conf(&json!([[[0.9, "A"]]])), (String::new(), 0.0));
        // Box present but no recognition pair after it
        assert_eq!(
            extract_text_conf(&json!([[[[0, 0], [1, 1]]]])),
            (String::new(), 0.0)
        );
    }

    #[test]
    fn test_confidence_coercion() {
        // Numeric string coerces
        let raw = json!([[["あ", "0.93"]]]);
        assert_eq!(extract_text_conf(&raw), ("あ".to_string(), 0.93));

        // Non-numeric confidence degrades to zero, not an error
        let raw = json!([[["あ", "high"]]]);
        assert_eq!(extract_text_conf(&raw), ("あ".to_string(), 0.0));

        let raw = json!([[["あ", null]]]);
        assert_eq!(extract_text_conf(&raw), ("あ".to_string(), 0.0));
    }
}
