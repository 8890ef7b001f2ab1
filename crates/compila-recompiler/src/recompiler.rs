//! Reverse-order substitution into the serialized body

use crate::error::RecompileError;
use crate::escape::BodyFormat;
use compila_domain::{CompilationResult, FieldMapping, Pattern};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Applies mappings to a serialized document body
#[derive(Debug, Clone, Copy, Default)]
pub struct Recompiler {
    format: BodyFormat,
}

/// One pattern paired with its mapping
struct Association<'a> {
    pattern: &'a Pattern,
    mapping: &'a FieldMapping,
}

impl Recompiler {
    /// Create a recompiler for the given body format
    pub fn new(format: BodyFormat) -> Self {
        Self { format }
    }

    /// Body format in use
    pub fn format(&self) -> BodyFormat {
        self.format
    }

    /// Substitute mapped values into `body`
    ///
    /// # Errors
    ///
    /// Returns an error only when the inputs are inconsistent: different
    /// lengths, duplicate pattern offsets, or mappings that reference no
    /// pattern (or the same pattern twice).
    pub fn recompile(
        &self,
        body: &str,
        patterns: &[Pattern],
        mappings: &[FieldMapping],
    ) -> Result<CompilationResult, RecompileError> {
        let mut associations = associate(patterns, mappings)?;

        // Descending document order: edits never shift a marker still pending
        associations.sort_by(|a, b| b.pattern.index.cmp(&a.pattern.index));

        let mut result = CompilationResult {
            body: body.to_string(),
            ..CompilationResult::default()
        };
        // Markers are searched only before this byte offset
        let mut limit = result.body.len();

        for Association { pattern, mapping } in associations {
            let located = self.locate(&result.body[..limit], &pattern.raw_text);

            if !mapping.should_compile() {
                // Still consume the occurrence so an earlier marker with the
                // same text cannot claim it.
                if let Some((start, _)) = located {
                    limit = start;
                }
                result.skipped_count += 1;
                continue;
            }

            match located {
                Some((start, end)) => {
                    let value = self.format.escape(mapping.value());
                    debug!(
                        "Replacing marker at offset {} (body {}..{}) with {} bytes",
                        pattern.index,
                        start,
                        end,
                        value.len()
                    );
                    result.body.replace_range(start..end, &value);
                    limit = start;
                    result.compiled_count += 1;
                }
                None => {
                    warn!(
                        "Marker {:?} at offset {} not found in serialized body",
                        pattern.raw_text, pattern.index
                    );
                    result.not_found_count += 1;
                }
            }
        }

        info!(
            "Recompiled body: {} compiled, {} skipped, {} not found",
            result.compiled_count, result.skipped_count, result.not_found_count
        );

        Ok(result)
    }

    /// Find the last literal occurrence of a marker in `haystack`
    ///
    /// In markup bodies the marker may have been serialized escaped
    /// (`<NOME>` as `&lt;NOME&gt;`); both forms are tried and the later
    /// occurrence wins.
    fn locate(&self, haystack: &str, raw_text: &str) -> Option<(usize, usize)> {
        if raw_text.is_empty() {
            return None;
        }

        let escaped = self.format.escape(raw_text);
        let escaped_hit = haystack
            .rfind(escaped.as_ref())
            .map(|start| (start, start + escaped.len()));

        if escaped.as_ref() == raw_text {
            return escaped_hit;
        }

        let raw_hit = haystack
            .rfind(raw_text)
            .map(|start| (start, start + raw_text.len()));

        match (escaped_hit, raw_hit) {
            (Some(a), Some(b)) => Some(if a.0 >= b.0 { a } else { b }),
            (a, b) => a.or(b),
        }
    }
}

/// Pair every mapping with its pattern, checking input shape
fn associate<'a>(
    patterns: &'a [Pattern],
    mappings: &'a [FieldMapping],
) -> Result<Vec<Association<'a>>, RecompileError> {
    if patterns.len() != mappings.len() {
        return Err(RecompileError::LengthMismatch {
            patterns: patterns.len(),
            mappings: mappings.len(),
        });
    }

    let mut by_index: HashMap<usize, &Pattern> = HashMap::with_capacity(patterns.len());
    for pattern in patterns {
        if by_index.insert(pattern.index, pattern).is_some() {
            return Err(RecompileError::DuplicatePattern(pattern.index));
        }
    }

    let mut associations = Vec::with_capacity(mappings.len());
    for mapping in mappings {
        let pattern = by_index
            .remove(&mapping.pattern_index)
            .ok_or_else(|| {
                if patterns.iter().any(|p| p.index == mapping.pattern_index) {
                    RecompileError::DuplicateMapping(mapping.pattern_index)
                } else {
                    RecompileError::UnknownPattern(mapping.pattern_index)
                }
            })?;
        associations.push(Association { pattern, mapping });
    }

    Ok(associations)
}

/// Recompile a markup body with the default settings
pub fn recompile(
    body: &str,
    patterns: &[Pattern],
    mappings: &[FieldMapping],
) -> Result<CompilationResult, RecompileError> {
    Recompiler::default().recompile(body, patterns, mappings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use compila_domain::{MappingSource, PatternType};

    fn underscores(index: usize, raw: &str) -> Pattern {
        Pattern::new(index, PatternType::UnderscoreRun, raw)
    }

    fn fill(index: usize, value: &str) -> FieldMapping {
        FieldMapping::compile(index, None, value, 0.9, MappingSource::Deterministic)
    }

    fn skip(index: usize) -> FieldMapping {
        FieldMapping::skip(index, None, 0.0, MappingSource::Classifier)
    }

    fn plain() -> Recompiler {
        Recompiler::new(BodyFormat::PlainText)
    }

    /// Minimal markup reader: text between tags, entities decoded
    fn text_content(body: &str) -> String {
        let mut text = String::new();
        let mut in_tag = false;
        for c in body.chars() {
            match c {
                '<' => in_tag = true,
                '>' => in_tag = false,
                _ if !in_tag => text.push(c),
                _ => {}
            }
        }
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&")
    }

    #[test]
    fn test_reverse_order_keeps_offsets_valid() {
        let patterns = vec![underscores(3, "____"), underscores(10, "____")];
        let mappings = vec![fill(3, "X"), fill(10, "YY")];

        let result = plain()
            .recompile("AAA____BBB____CCC", &patterns, &mappings)
            .unwrap();

        assert_eq!(result.body, "AAAXBBBYYCCC");
        assert_eq!(result.compiled_count, 2);
        assert_eq!(result.skipped_count, 0);
        assert_eq!(result.not_found_count, 0);
    }

    #[test]
    fn test_mapping_order_does_not_matter() {
        let patterns = vec![underscores(3, "____"), underscores(10, "____")];
        let mappings = vec![fill(10, "a much longer value"), fill(3, "X")];

        let result = plain()
            .recompile("AAA____BBB____CCC", &patterns, &mappings)
            .unwrap();

        assert_eq!(result.body, "AAAXBBBa much longer valueCCC");
    }

    #[test]
    fn test_duplicate_markers_are_not_cross_assigned() {
        let text = "Nome _____ Cognome _____ Città _____";
        let patterns = vec![
            underscores(5, "_____"),
            underscores(19, "_____"),
            underscores(31, "_____"),
        ];
        let mappings = vec![fill(5, "Mario"), fill(19, "Rossi"), fill(31, "Roma")];

        let result = plain().recompile(text, &patterns, &mappings).unwrap();
        assert_eq!(result.body, "Nome Mario Cognome Rossi Città Roma");
    }

    #[test]
    fn test_skipped_duplicate_marker_keeps_its_place() {
        let text = "A _____ B _____ C _____";
        let patterns = vec![
            underscores(2, "_____"),
            underscores(10, "_____"),
            underscores(18, "_____"),
        ];
        let mappings = vec![fill(2, "uno"), skip(10), fill(18, "tre")];

        let result = plain().recompile(text, &patterns, &mappings).unwrap();

        assert_eq!(result.body, "A uno B _____ C tre");
        assert_eq!(result.compiled_count, 2);
        assert_eq!(result.skipped_count, 1);
    }

    #[test]
    fn test_marker_not_found_is_counted() {
        let patterns = vec![underscores(0, "_____"), underscores(8, "[...]")];
        let mappings = vec![fill(0, "Mario"), fill(8, "Roma")];

        // The bracket marker was split across runs during serialization
        let body = "<w:t>_____</w:t> <w:t>[..</w:t><w:t>.]</w:t>";
        let result = Recompiler::new(BodyFormat::Markup)
            .recompile(body, &patterns, &mappings)
            .unwrap();

        assert_eq!(result.compiled_count, 1);
        assert_eq!(result.not_found_count, 1);
        assert!(result.body.contains("<w:t>Mario</w:t>"));
    }

    #[test]
    fn test_markup_value_escaping_round_trip() {
        let value = r#"Rossi & Figli <S.r.l.> "sede" l'Aquila"#;
        let patterns = vec![underscores(10, "_____")];
        let mappings = vec![fill(10, value)];
        let body = "<w:p><w:t>Società: _____</w:t></w:p>";

        let result = Recompiler::new(BodyFormat::Markup)
            .recompile(body, &patterns, &mappings)
            .unwrap();

        assert_eq!(text_content(&result.body), format!("Società: {}", value));
        // Structure untouched: still exactly two elements opened and closed
        assert_eq!(result.body.matches('<').count(), 4);
    }

    #[test]
    fn test_markup_escaped_marker_is_located() {
        let patterns = vec![Pattern::new(6, PatternType::AngleBracket, "<NOME>")];
        let mappings = vec![fill(6, "Mario")];
        let body = "<w:t>Nome: &lt;NOME&gt;</w:t>";

        let result = Recompiler::new(BodyFormat::Markup)
            .recompile(body, &patterns, &mappings)
            .unwrap();

        assert_eq!(result.body, "<w:t>Nome: Mario</w:t>");
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let patterns = vec![Pattern::new(4, PatternType::EllipsisInBrackets, "[...]")];
        let mappings = vec![fill(4, "Roma")];

        let result = plain()
            .recompile("Via [...] n. 3, a.b.c.d.e", &patterns, &mappings)
            .unwrap();

        assert_eq!(result.body, "Via Roma n. 3, a.b.c.d.e");
    }

    #[test]
    fn test_length_mismatch_is_error() {
        let patterns = vec![underscores(0, "___")];
        let result = plain().recompile("___", &patterns, &[]);
        assert_eq!(
            result,
            Err(RecompileError::LengthMismatch {
                patterns: 1,
                mappings: 0
            })
        );
    }

    #[test]
    fn test_unknown_pattern_is_error() {
        let patterns = vec![underscores(0, "___")];
        let mappings = vec![fill(99, "x")];
        let result = plain().recompile("___", &patterns, &mappings);
        assert_eq!(result, Err(RecompileError::UnknownPattern(99)));
    }

    #[test]
    fn test_duplicate_mapping_is_error() {
        let patterns = vec![underscores(0, "___"), underscores(5, "___")];
        let mappings = vec![fill(0, "x"), fill(0, "y")];
        let result = plain().recompile("___  ___", &patterns, &mappings);
        assert_eq!(result, Err(RecompileError::DuplicateMapping(0)));
    }

    #[test]
    fn test_duplicate_pattern_is_error() {
        let patterns = vec![underscores(0, "___"), underscores(0, "___")];
        let mappings = vec![fill(0, "x"), skip(0)];
        let result = plain().recompile("___", &patterns, &mappings);
        assert_eq!(result, Err(RecompileError::DuplicatePattern(0)));
    }

    #[test]
    fn test_empty_inputs() {
        let result = plain().recompile("nothing to do", &[], &[]).unwrap();
        assert_eq!(result.body, "nothing to do");
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_free_function_uses_markup() {
        let patterns = vec![underscores(0, "___")];
        let mappings = vec![fill(0, "a&b")];
        let result = recompile("___", &patterns, &mappings).unwrap();
        assert_eq!(result.body, "a&amp;b");
    }
}
