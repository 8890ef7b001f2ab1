//! Parse classifier output into candidates

use crate::error::ExtractorError;
use crate::types::ClassificationCandidate;
use serde_json::{Deserializer, Map, Value};
use tracing::debug;

/// Confidence assumed when the classifier omits one
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Parse a classifier response for a batch of `expected` patterns
///
/// The first well-formed JSON array anywhere in the response is used, so
/// markdown fences and surrounding prose are tolerated. The array must hold
/// exactly one object per pattern.
pub(crate) fn parse_classifier_response(
    response: &str,
    expected: usize,
) -> Result<Vec<ClassificationCandidate>, ExtractorError> {
    let items = find_json_array(response)
        .ok_or_else(|| ExtractorError::InvalidFormat("no JSON array in response".to_string()))?;

    if items.len() != expected {
        return Err(ExtractorError::LengthMismatch {
            expected,
            actual: items.len(),
        });
    }

    let mut candidates = items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let obj = item.as_object().ok_or_else(|| {
                ExtractorError::InvalidFormat(format!("item {} is not a JSON object", position))
            })?;
            Ok(parse_item(position, obj))
        })
        .collect::<Result<Vec<_>, ExtractorError>>()?;

    // Trust the reported indices only if they form a permutation of the batch
    let reported: Vec<Option<usize>> = items
        .iter()
        .map(|item| {
            item.get("pattern_index")
                .and_then(Value::as_u64)
                .map(|i| i as usize)
        })
        .collect();
    if is_permutation(&reported, expected) {
        for (candidate, index) in candidates.iter_mut().zip(&reported) {
            if let Some(index) = index {
                candidate.position = *index;
            }
        }
        candidates.sort_by_key(|c| c.position);
    } else {
        debug!("Classifier indices unusable, falling back to array order");
    }

    Ok(candidates)
}

/// Locate the first `[` that starts a complete JSON array
fn find_json_array(response: &str) -> Option<Vec<Value>> {
    response
        .match_indices('[')
        .find_map(|(pos, _)| {
            let mut stream = Deserializer::from_str(&response[pos..]).into_iter::<Value>();
            match stream.next() {
                Some(Ok(Value::Array(items))) => Some(items),
                _ => None,
            }
        })
}

fn is_permutation(indices: &[Option<usize>], n: usize) -> bool {
    let mut seen = vec![false; n];
    for index in indices {
        match index {
            Some(i) if *i < n && !seen[*i] => seen[*i] = true,
            _ => return false,
        }
    }
    true
}

fn parse_item(position: usize, obj: &Map<String, Value>) -> ClassificationCandidate {
    let mut field_key = obj
        .get("field_identified")
        .and_then(Value::as_str)
        .and_then(clean_key);
    let mut compile = obj.get("compile").and_then(Value::as_bool);

    match obj.get("compile_or_field") {
        Some(Value::Bool(flag)) => compile = Some(*flag),
        Some(Value::String(key)) => {
            if let Some(key) = clean_key(key) {
                field_key.get_or_insert(key);
                compile.get_or_insert(true);
            }
        }
        _ => {}
    }

    let value = match obj.get("value") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    let confidence = match obj.get("confidence") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(DEFAULT_CONFIDENCE),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(DEFAULT_CONFIDENCE),
        _ => DEFAULT_CONFIDENCE,
    };

    ClassificationCandidate {
        position,
        compile: compile.unwrap_or(field_key.is_some() && !value.is_empty()),
        field_key,
        value,
        confidence,
    }
}

fn clean_key(key: &str) -> Option<String> {
    let key = key.trim();
    if key.is_empty() || key.eq_ignore_ascii_case("null") || key.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let response = r#"[
            {"pattern_index": 0, "compile_or_field": true, "field_identified": "nome",
             "value": "Mario", "confidence": 0.8},
            {"pattern_index": 1, "compile_or_field": false, "value": "", "confidence": 0.2}
        ]"#;
        let candidates = parse_classifier_response(response, 2).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].field_key.as_deref(), Some("nome"));
        assert!(candidates[0].compile);
        assert_eq!(candidates[0].value, "Mario");
        assert!(!candidates[1].compile);
        assert_eq!(candidates[1].confidence, 0.2);
    }

    #[test]
    fn test_parse_markdown_fenced_with_prose() {
        let response = "Here you go:\n```json\n[{\"pattern_index\": 0, \"compile\": true, \"value\": \"Roma\", \"confidence\": 0.9}]\n```\nDone.";
        let candidates = parse_classifier_response(response, 1).unwrap();
        assert_eq!(candidates[0].value, "Roma");
        assert!(candidates[0].compile);
    }

    #[test]
    fn test_skips_malformed_bracket_before_array() {
        let response = "Note [see below]: [{\"value\": \"x\", \"compile\": true}]";
        let candidates = parse_classifier_response(response, 1).unwrap();
        assert_eq!(candidates[0].value, "x");
        assert_eq!(candidates[0].confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_compile_or_field_as_key() {
        let response = r#"[{"pattern_index": 0, "compile_or_field": "codice_fiscale", "value": "RSSMRA80A01H501U", "confidence": 0.7}]"#;
        let candidates = parse_classifier_response(response, 1).unwrap();
        assert_eq!(candidates[0].field_key.as_deref(), Some("codice_fiscale"));
        assert!(candidates[0].compile);
    }

    #[test]
    fn test_indices_reorder_candidates() {
        let response = r#"[
            {"pattern_index": 1, "compile": true, "value": "B"},
            {"pattern_index": 0, "compile": true, "value": "A"}
        ]"#;
        let candidates = parse_classifier_response(response, 2).unwrap();
        assert_eq!(candidates[0].value, "A");
        assert_eq!(candidates[1].value, "B");
    }

    #[test]
    fn test_bad_indices_fall_back_to_array_order() {
        let response = r#"[
            {"pattern_index": 7, "compile": true, "value": "A"},
            {"pattern_index": 7, "compile": true, "value": "B"}
        ]"#;
        let candidates = parse_classifier_response(response, 2).unwrap();
        assert_eq!(candidates[0].position, 0);
        assert_eq!(candidates[0].value, "A");
        assert_eq!(candidates[1].value, "B");
    }

    #[test]
    fn test_length_mismatch() {
        let response = r#"[{"compile": false, "value": ""}]"#;
        let err = parse_classifier_response(response, 3).unwrap_err();
        assert!(matches!(
            err,
            ExtractorError::LengthMismatch { expected: 3, actual: 1 }
        ));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_no_array() {
        let err = parse_classifier_response("I cannot help with that.", 1).unwrap_err();
        assert!(matches!(err, ExtractorError::InvalidFormat(_)));
    }

    #[test]
    fn test_non_object_item() {
        let err = parse_classifier_response("[1, 2]", 2).unwrap_err();
        assert!(matches!(err, ExtractorError::InvalidFormat(_)));
    }

    #[test]
    fn test_null_field_and_string_confidence() {
        let response = r#"[{"field_identified": "null", "value": "", "confidence": "0.3"}]"#;
        let candidates = parse_classifier_response(response, 1).unwrap();
        assert_eq!(candidates[0].field_key, None);
        assert!(!candidates[0].compile);
        assert_eq!(candidates[0].confidence, 0.3);
    }
}
