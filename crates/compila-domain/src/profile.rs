//! Profile data supplied by the caller

use std::collections::BTreeMap;

/// Values that stand for "no data" in profile stores
const PLACEHOLDER_VALUES: &[&str] = &[
    "n/a", "n.a.", "n/d", "n.d.", "null", "none", "undefined", "tbd",
    "da definire", "non disponibile",
];

/// Check whether a profile value is empty or a placeholder
///
/// Runs made only of marker characters (`____`, `...`, `---`) count as
/// placeholders too.
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }
    if trimmed
        .chars()
        .all(|c| matches!(c, '_' | '.' | '-' | '…' | '*' | ' '))
    {
        return true;
    }
    let lower = trimmed.to_lowercase();
    PLACEHOLDER_VALUES.contains(&lower.as_str())
}

/// Read-only key/value profile
///
/// No structure is assumed beyond key lookup. Empty and placeholder values
/// are reported as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileData {
    entries: BTreeMap<String, String>,
}

impl ProfileData {
    /// Create an empty profile
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a usable value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !is_placeholder(v))
    }

    /// Check whether `key` has a usable value
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over entries with usable values, ordered by key
    pub fn available_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.trim()))
            .filter(|(_, v)| !is_placeholder(v))
    }

    /// Number of usable entries
    pub fn available_len(&self) -> usize {
        self.available_entries().count()
    }

    /// Total number of entries, placeholders included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the profile has no entries at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ProfileData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
