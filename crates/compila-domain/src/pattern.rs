//! Pattern module - blank markers detected in document text

/// Lexical shape of a blank marker
///
/// The set is closed: supporting a new convention means adding a variant,
/// never widening the meaning of an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatternType {
    /// Ellipsis inside brackets: `[...]`, `(…)`
    EllipsisInBrackets,

    /// Run of underscores: `_____`
    UnderscoreRun,

    /// Run of dots: `..........`
    DotRun,

    /// Brackets holding only whitespace: `[   ]`
    EmptyBrackets,

    /// Run of dashes: `-----`
    DashRun,

    /// Keyword in square brackets: `[NOME]`
    BracketedKeyword,

    /// Template token in double braces: `{{nome}}`
    DoubleBrace,

    /// Token in angle brackets: `<NOME>`
    AngleBracket,
}

impl PatternType {
    /// Every pattern type, in matcher priority order
    pub const ALL: [PatternType; 8] = [
        PatternType::EllipsisInBrackets,
        PatternType::UnderscoreRun,
        PatternType::DotRun,
        PatternType::EmptyBrackets,
        PatternType::DashRun,
        PatternType::BracketedKeyword,
        PatternType::DoubleBrace,
        PatternType::AngleBracket,
    ];

    /// Get the pattern type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::EllipsisInBrackets => "ellipsis_in_brackets",
            PatternType::UnderscoreRun => "underscore_run",
            PatternType::DotRun => "dot_run",
            PatternType::EmptyBrackets => "empty_brackets",
            PatternType::DashRun => "dash_run",
            PatternType::BracketedKeyword => "bracketed_keyword",
            PatternType::DoubleBrace => "double_brace",
            PatternType::AngleBracket => "angle_bracket",
        }
    }

    /// Parse a pattern type from its string name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Whether the marker text itself names the field (`[NOME]`, `{{cap}}`)
    pub fn carries_keyword(&self) -> bool {
        matches!(
            self,
            PatternType::BracketedKeyword | PatternType::DoubleBrace | PatternType::AngleBracket
        )
    }
}

/// A single blank marker found in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    /// Byte offset of the marker's first character in the source text.
    /// Assigned at extraction time and never renumbered.
    pub index: usize,

    /// Shape of the marker
    pub pattern_type: PatternType,

    /// Exact matched substring, used verbatim when substituting
    pub raw_text: String,

    /// Best-effort field name inferred from context (may be empty)
    pub label: String,

    /// Whitespace-collapsed text immediately before the marker
    pub context_before: String,

    /// Whitespace-collapsed text immediately after the marker
    pub context_after: String,
}

impl Pattern {
    /// Create a pattern without label or context
    pub fn new(index: usize, pattern_type: PatternType, raw_text: impl Into<String>) -> Self {
        Self {
            index,
            pattern_type,
            raw_text: raw_text.into(),
            label: String::new(),
            context_before: String::new(),
            context_after: String::new(),
        }
    }

    /// Byte offset one past the marker's last character
    pub fn end(&self) -> usize {
        self.index + self.raw_text.len()
    }

    /// Check whether a label was inferred
    pub fn has_label(&self) -> bool {
        !self.label.trim().is_empty()
    }
}
