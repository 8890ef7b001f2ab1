//! Escaping for the serialized body format

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Serialization format of the document body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyFormat {
    /// Plain text: values are inserted verbatim
    PlainText,

    /// XML-like markup (e.g. a word-processing document part)
    #[default]
    Markup,
}

impl BodyFormat {
    /// Escape `text` for insertion into a body of this format
    pub fn escape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            BodyFormat::PlainText => Cow::Borrowed(text),
            BodyFormat::Markup => escape_markup(text),
        }
    }
}

/// Escape the five markup-reserved characters
pub fn escape_markup(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_verbatim() {
        assert_eq!(BodyFormat::PlainText.escape("a < b & c"), "a < b & c");
    }

    #[test]
    fn test_markup_escapes_reserved() {
        assert_eq!(
            escape_markup(r#"Rossi & Figli <S.r.l.> "Roma" l'Aquila"#),
            "Rossi &amp; Figli &lt;S.r.l.&gt; &quot;Roma&quot; l&apos;Aquila"
        );
    }

    #[test]
    fn test_markup_without_reserved_is_borrowed() {
        assert!(matches!(escape_markup("Mario Rossi"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_ampersand_escaped_once() {
        assert_eq!(escape_markup("&amp;"), "&amp;amp;");
    }

    #[test]
    fn test_default_is_markup() {
        assert_eq!(BodyFormat::default(), BodyFormat::Markup);
    }
}
