//! Blank marker detection
//!
//! Every [`PatternType`] has one matcher. Matchers run independently over the
//! whole text; their hits are then merged so that each byte belongs to at most
//! one marker.

use crate::labels::LabelInferencer;
use compila_domain::{Pattern, PatternType};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Default context captured on each side of a marker (characters)
pub const DEFAULT_CONTEXT_WINDOW: usize = 150;

static MATCHERS: Lazy<Vec<(PatternType, Regex)>> = Lazy::new(|| {
    PatternType::ALL
        .into_iter()
        .map(|t| (t, Regex::new(matcher_source(t)).unwrap()))
        .collect()
});

fn matcher_source(pattern_type: PatternType) -> &'static str {
    match pattern_type {
        PatternType::EllipsisInBrackets => r"[\[(][ \t]*(?:\.{3,}|…+)[ \t]*[\])]",
        PatternType::UnderscoreRun => r"_{3,}",
        PatternType::DotRun => r"\.{4,}|…{2,}",
        PatternType::EmptyBrackets => r"\[[ \t\x{00A0}]*\]|\([ \t\x{00A0}]{3,}\)",
        PatternType::DashRun => r"-{4,}|[–—]{3,}",
        PatternType::BracketedKeyword => r"\[\p{L}[\p{L}0-9 _./'-]{1,39}\]",
        PatternType::DoubleBrace => r"\{\{[ \t]*[^{}\s][^{}\n]{0,60}?[ \t]*\}\}",
        PatternType::AngleBracket => r"<[ \t]*[\p{L}_][\p{L}0-9_ .-]{0,40}>",
    }
}

/// A raw matcher hit before merging
#[derive(Debug, Clone, Copy)]
struct Hit {
    start: usize,
    end: usize,
    pattern_type: PatternType,
}

/// Finds blank markers and captures their surroundings
#[derive(Debug)]
pub struct PatternExtractor {
    context_window_chars: usize,
    inferencer: LabelInferencer,
}

impl PatternExtractor {
    /// Create an extractor with the given context window and the standard
    /// label strategies
    pub fn new(context_window_chars: usize) -> Self {
        Self {
            context_window_chars,
            inferencer: LabelInferencer::standard(),
        }
    }

    /// Replace the label inferencer
    pub fn with_inferencer(mut self, inferencer: LabelInferencer) -> Self {
        self.inferencer = inferencer;
        self
    }

    /// Extract every marker from `text`, labelled, in ascending index order
    pub fn extract(&self, text: &str) -> Vec<Pattern> {
        let hits = merge_hits(collect_hits(text));

        let mut patterns: Vec<Pattern> = hits
            .into_iter()
            .map(|hit| {
                let mut pattern =
                    Pattern::new(hit.start, hit.pattern_type, &text[hit.start..hit.end]);
                pattern.context_before =
                    window_before(text, hit.start, self.context_window_chars);
                pattern.context_after = window_after(text, hit.end, self.context_window_chars);
                pattern
            })
            .collect();

        self.inferencer.apply(&mut patterns);

        debug!(
            "Extracted {} patterns ({} labelled) from {} bytes",
            patterns.len(),
            patterns.iter().filter(|p| p.has_label()).count(),
            text.len()
        );
        patterns
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_WINDOW)
    }
}

/// Extract markers with the default context window and label strategies
pub fn extract_patterns(text: &str) -> Vec<Pattern> {
    PatternExtractor::default().extract(text)
}

fn collect_hits(text: &str) -> Vec<Hit> {
    MATCHERS
        .iter()
        .flat_map(|(pattern_type, re)| {
            re.find_iter(text).map(move |m| Hit {
                start: m.start(),
                end: m.end(),
                pattern_type: *pattern_type,
            })
        })
        .collect()
}

/// Order hits by start, then longest first, then matcher order, and keep a
/// hit only if it does not overlap one already kept.
fn merge_hits(mut hits: Vec<Hit>) -> Vec<Hit> {
    hits.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then((b.end - b.start).cmp(&(a.end - a.start)))
            .then(a.pattern_type.cmp(&b.pattern_type))
    });

    let mut kept: Vec<Hit> = Vec::with_capacity(hits.len());
    for hit in hits {
        if kept.last().is_none_or(|last| hit.start >= last.end) {
            kept.push(hit);
        }
    }
    kept
}

/// Up to `chars` characters ending at byte `end`, whitespace-collapsed
fn window_before(text: &str, end: usize, chars: usize) -> String {
    if chars == 0 {
        return String::new();
    }
    let slice = &text[..end];
    let from = slice
        .char_indices()
        .rev()
        .nth(chars - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    collapse_whitespace(&slice[from..])
}

/// Up to `chars` characters starting at byte `start`, whitespace-collapsed
fn window_after(text: &str, start: usize, chars: usize) -> String {
    let slice = &text[start..];
    let to = slice
        .char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(slice.len());
    collapse_whitespace(&slice[..to])
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(text: &str) -> Vec<PatternType> {
        extract_patterns(text)
            .into_iter()
            .map(|p| p.pattern_type)
            .collect()
    }

    #[test]
    fn test_no_markers() {
        assert!(extract_patterns("").is_empty());
        assert!(extract_patterns("Testo senza campi da compilare.").is_empty());
    }

    #[test]
    fn test_each_marker_shape() {
        assert_eq!(types("nome [...] fine"), vec![PatternType::EllipsisInBrackets]);
        assert_eq!(types("nome (…) fine"), vec![PatternType::EllipsisInBrackets]);
        assert_eq!(types("nome _____ fine"), vec![PatternType::UnderscoreRun]);
        assert_eq!(types("nome .......... fine"), vec![PatternType::DotRun]);
        assert_eq!(types("nome [   ] fine"), vec![PatternType::EmptyBrackets]);
        assert_eq!(types("nome (     ) fine"), vec![PatternType::EmptyBrackets]);
        assert_eq!(types("nome ------ fine"), vec![PatternType::DashRun]);
        assert_eq!(types("nome [NOME] fine"), vec![PatternType::BracketedKeyword]);
        assert_eq!(types("nome {{nome}} fine"), vec![PatternType::DoubleBrace]);
        assert_eq!(types("nome <NOME> fine"), vec![PatternType::AngleBracket]);
    }

    #[test]
    fn test_short_runs_are_not_markers() {
        assert!(extract_patterns("a__b").is_empty());
        assert!(extract_patterns("fine frase...").is_empty());
        assert!(extract_patterns("a -- b").is_empty());
    }

    #[test]
    fn test_nested_hit_is_dropped() {
        // The dot run inside the brackets overlaps the bracketed ellipsis
        let patterns = extract_patterns("Data [.....] firma");
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].pattern_type, PatternType::EllipsisInBrackets);
        assert_eq!(patterns[0].raw_text, "[.....]");
    }

    #[test]
    fn test_indices_are_byte_offsets() {
        let text = "Città: _____ e CAP: ____";
        let patterns = extract_patterns(text);
        assert_eq!(patterns.len(), 2);
        for p in &patterns {
            assert_eq!(&text[p.index..p.end()], p.raw_text);
        }
        assert!(patterns[0].index < patterns[1].index);
    }

    #[test]
    fn test_context_is_collapsed_and_bounded() {
        let text = "Il   sottoscritto\n\n_____ nato a\t\tRoma";
        let patterns = PatternExtractor::new(10).extract(text);
        assert_eq!(patterns[0].context_before, "oscritto");
        assert_eq!(patterns[0].context_after, "nato a R");
    }

    #[test]
    fn test_context_truncated_at_text_edges() {
        let patterns = extract_patterns("_____");
        assert_eq!(patterns[0].context_before, "");
        assert_eq!(patterns[0].context_after, "");
    }

    #[test]
    fn test_labels_are_inferred() {
        let patterns = extract_patterns("Il sottoscritto _____, C.F. _____ {{cap}}");
        let labels: Vec<&str> = patterns.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["sottoscritto", "C.F.", "cap"]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn template_text() -> impl Strategy<Value = String> {
            prop::collection::vec(
                prop_oneof![
                    "[a-zA-Z ]{0,12}",
                    Just("_____".to_string()),
                    Just("[...]".to_string()),
                    Just("......".to_string()),
                    Just("[NOME]".to_string()),
                    Just("{{ cap }}".to_string()),
                    Just("-----".to_string()),
                    Just("Codice fiscale: ".to_string()),
                    Just("àè ".to_string()),
                ],
                0..20,
            )
            .prop_map(|parts| parts.concat())
        }

        proptest! {
            #[test]
            fn extraction_is_deterministic(text in template_text()) {
                prop_assert_eq!(extract_patterns(&text), extract_patterns(&text));
            }

            #[test]
            fn indices_strictly_increase_without_overlap(text in template_text()) {
                let patterns = extract_patterns(&text);
                for pair in patterns.windows(2) {
                    prop_assert!(pair[0].end() <= pair[1].index);
                }
            }

            #[test]
            fn raw_text_matches_source(text in template_text()) {
                for p in extract_patterns(&text) {
                    prop_assert_eq!(&text[p.index..p.end()], p.raw_text.as_str());
                }
            }
        }
    }
}
