//! Label inference
//!
//! A label is derived by trying an ordered list of strategies; the first one
//! returning a non-empty label wins. An empty label is a valid outcome.

use crate::dictionary::find_keyword;
use compila_domain::Pattern;
use once_cell::sync::Lazy;
use regex::Regex;

/// One label heuristic
pub trait LabelStrategy: Send + Sync {
    /// Short name, for logging
    fn name(&self) -> &'static str;

    /// Infer a label for `pattern`, or `None` to defer to the next strategy
    fn infer(&self, pattern: &Pattern) -> Option<String>;
}

/// Tokens that name themselves: `[NOME]`, `{{codice_fiscale}}`, `<CAP>`
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerKeyword;

impl LabelStrategy for MarkerKeyword {
    fn name(&self) -> &'static str {
        "marker_keyword"
    }

    fn infer(&self, pattern: &Pattern) -> Option<String> {
        if !pattern.pattern_type.carries_keyword() {
            return None;
        }
        let inner = pattern
            .raw_text
            .trim_matches(|c: char| matches!(c, '[' | ']' | '{' | '}' | '<' | '>'))
            .replace('_', " ");
        non_empty(inner.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

/// `Label text:` right before the marker
static TRAILING_COLON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\p{L}[\p{L} .'/]{0,39}?)\s*:$").unwrap());

/// Trailing `<label text>:` immediately before the marker
///
/// Label text is limited to letters, spaces and `. ' /`, at most 40
/// characters, so it cannot swallow a whole sentence.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingColon;

impl LabelStrategy for TrailingColon {
    fn name(&self) -> &'static str {
        "trailing_colon"
    }

    fn infer(&self, pattern: &Pattern) -> Option<String> {
        let context = pattern.context_before.trim_end();
        let captures = TRAILING_COLON_RE.captures(context)?;
        let captured = captures.get(1)?.as_str();
        // Only the last sentence: "Dati anagrafici. Codice fiscale:"
        let label = captured.rsplit(". ").next().unwrap_or(captured);
        non_empty(label.trim().to_string())
    }
}

/// Last whitespace-delimited token of the preceding context
///
/// Surrounding separators are dropped; a token without letters (a number,
/// another marker) yields nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastToken;

impl LabelStrategy for LastToken {
    fn name(&self) -> &'static str {
        "last_token"
    }

    fn infer(&self, pattern: &Pattern) -> Option<String> {
        let token = pattern.context_before.split_whitespace().next_back()?;
        let token = token
            .trim_end_matches([',', ';', ':', ')', '('])
            .trim_start_matches(['(', '"', '\'']);
        if !token.chars().any(char::is_alphabetic) {
            return None;
        }
        non_empty(token.to_string())
    }
}

/// First dictionary keyword appearing anywhere in the preceding context
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordScan;

impl LabelStrategy for KeywordScan {
    fn name(&self) -> &'static str {
        "keyword_scan"
    }

    fn infer(&self, pattern: &Pattern) -> Option<String> {
        find_keyword(&pattern.context_before).map(str::to_string)
    }
}

fn non_empty(label: String) -> Option<String> {
    if label.trim().is_empty() {
        None
    } else {
        Some(label)
    }
}

/// Runs label strategies in order
pub struct LabelInferencer {
    strategies: Vec<Box<dyn LabelStrategy>>,
}

impl LabelInferencer {
    /// Create an inferencer with a custom strategy list
    pub fn new(strategies: Vec<Box<dyn LabelStrategy>>) -> Self {
        Self { strategies }
    }

    /// Standard order: marker keyword, trailing colon, last token, keyword scan
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(MarkerKeyword),
            Box::new(TrailingColon),
            Box::new(LastToken),
            Box::new(KeywordScan),
        ])
    }

    /// Names of the configured strategies, in order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Infer a label for one pattern; empty when every strategy declines
    pub fn infer(&self, pattern: &Pattern) -> String {
        self.strategies
            .iter()
            .find_map(|s| s.infer(pattern))
            .unwrap_or_default()
    }

    /// Fill in `label` on every pattern
    pub fn apply(&self, patterns: &mut [Pattern]) {
        for pattern in patterns {
            pattern.label = self.infer(pattern);
        }
    }
}

impl Default for LabelInferencer {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for LabelInferencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelInferencer")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}
