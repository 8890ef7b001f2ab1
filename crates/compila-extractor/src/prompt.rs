//! Prompt construction for the batch classifier

use crate::types::{BatchItem, ClassifierRequest};
use compila_domain::{Pattern, ProfileData};

/// Builds the classification prompt for one batch
pub struct PromptBuilder<'a> {
    batch: &'a [Pattern],
    profile: &'a ProfileData,
    context_chars: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt builder for `batch`
    pub fn new(batch: &'a [Pattern], profile: &'a ProfileData) -> Self {
        Self {
            batch,
            profile,
            context_chars: 100,
        }
    }

    /// Limit the context sent per side of each marker
    pub fn with_context_chars(mut self, context_chars: usize) -> Self {
        self.context_chars = context_chars;
        self
    }

    /// Build the request payload
    pub(crate) fn request(&self) -> ClassifierRequest {
        let batch_items = self
            .batch
            .iter()
            .enumerate()
            .map(|(position, pattern)| BatchItem {
                index: position,
                pattern_type: pattern.pattern_type.as_str().to_string(),
                label: pattern.label.clone(),
                context_before: tail_chars(&pattern.context_before, self.context_chars),
                context_after: head_chars(&pattern.context_after, self.context_chars),
            })
            .collect();

        let available_profile_entries = self
            .profile
            .available_entries()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        ClassifierRequest {
            batch_items,
            available_profile_entries,
        }
    }

    /// Build the complete classification prompt
    pub fn build(&self) -> Result<String, serde_json::Error> {
        let payload = serde_json::to_string_pretty(&self.request())?;

        let mut prompt = String::new();
        prompt.push_str(CLASSIFICATION_INSTRUCTIONS);
        prompt.push_str("\n\nInput:\n");
        prompt.push_str(&payload);
        prompt.push_str("\n\n");
        prompt.push_str(&format!(
            "Return exactly {} objects, one per batch item, in the same order.\n",
            self.batch.len()
        ));
        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        Ok(prompt)
    }
}

/// JSON schema passed to providers that support structured output
pub const RESPONSE_SCHEMA: &str = r#"{
  "type": "array",
  "items": {
    "type": "object",
    "properties": {
      "pattern_index": { "type": "integer" },
      "compile_or_field": { "type": ["boolean", "string"] },
      "field_identified": { "type": ["string", "null"] },
      "value": { "type": "string" },
      "confidence": { "type": "number" }
    },
    "required": ["pattern_index", "value", "confidence"]
  }
}"#;

const CLASSIFICATION_INSTRUCTIONS: &str = r#"You fill in blank fields of Italian legal and administrative forms.

Each batch item is a blank marker found in the document: its position in the
batch ("index"), its shape ("type"), a label guessed from the surrounding text
(may be empty) and the text immediately before and after it.

For every item decide which profile entry, if any, belongs in the blank:
- "pattern_index": the item's "index"
- "field_identified": the profile key the blank asks for, or null
- "compile_or_field": true when the blank must be filled, false to leave it
- "value": the text to insert (empty when not filling)
- "confidence": a number between 0.0 and 1.0

Use only values present in "availableProfileEntries". Never invent data.
Leave signatures, dates of signature and free-text declarations unfilled."#;

const OUTPUT_FORMAT_REMINDER: &str =
    "Respond with a JSON array only, no markdown and no commentary.";

/// Last `n` characters of `s`
fn tail_chars(s: &str, n: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(n)).collect()
}

/// First `n` characters of `s`
fn head_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
