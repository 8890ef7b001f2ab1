//! Static label vocabulary: synonyms for canonical profile fields and the
//! keyword list used by label inference.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical field key → label spellings that refer to it
///
/// A spelling must belong to exactly one key.
pub const FIELD_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "nome_completo",
        &[
            "sottoscritto",
            "sottoscritta",
            "il sottoscritto",
            "la sottoscritta",
            "il/la sottoscritto/a",
            "sottoscritto/a",
            "nome e cognome",
            "cognome e nome",
            "nominativo",
            "dichiarante",
            "full name",
        ],
    ),
    ("nome", &["nome", "first name"]),
    ("cognome", &["cognome", "last name", "surname"]),
    (
        "codice_fiscale",
        &[
            "codice fiscale",
            "c.f.",
            "c. f.",
            "cf",
            "cod. fisc.",
            "cod. fiscale",
            "tax code",
        ],
    ),
    (
        "partita_iva",
        &[
            "partita iva",
            "partita i.v.a.",
            "p.iva",
            "p. iva",
            "p.i.",
            "piva",
            "vat",
            "vat number",
        ],
    ),
    (
        "ragione_sociale",
        &[
            "ragione sociale",
            "nome azienda",
            "denominazione",
            "denominazione sociale",
            "società",
            "ditta",
            "impresa",
            "company name",
        ],
    ),
    (
        "legale_rappresentante",
        &[
            "legale rappresentante",
            "rappresentante legale",
            "in qualità di legale rappresentante",
        ],
    ),
    ("sede_legale", &["sede legale", "con sede in", "con sede legale in"]),
    (
        "indirizzo",
        &[
            "indirizzo",
            "via",
            "residente in via",
            "domicilio",
            "domiciliato in",
            "residenza",
            "address",
        ],
    ),
    ("numero_civico", &["civico", "numero civico", "n. civico"]),
    ("cap", &["cap", "c.a.p.", "codice postale", "zip"]),
    (
        "citta",
        &["città", "comune", "residente a", "residente in", "località", "city"],
    ),
    ("provincia", &["provincia", "prov.", "pr."]),
    (
        "data_nascita",
        &["data di nascita", "nato il", "nata il", "nato/a il", "date of birth"],
    ),
    (
        "luogo_nascita",
        &["luogo di nascita", "nato a", "nata a", "nato/a a", "place of birth"],
    ),
    (
        "email",
        &["email", "e-mail", "mail", "indirizzo email", "indirizzo e-mail", "posta elettronica"],
    ),
    (
        "pec",
        &["pec", "posta elettronica certificata", "indirizzo pec"],
    ),
    (
        "telefono",
        &["telefono", "tel.", "tel", "cellulare", "cell.", "recapito telefonico", "phone"],
    ),
    ("iban", &["iban", "codice iban", "coordinate bancarie"]),
    (
        "numero_documento",
        &["documento n.", "n. documento", "carta d'identità n.", "numero documento"],
    ),
    ("data", &["data", "lì", "addì", "in data", "date"]),
    ("luogo", &["luogo"]),
];

/// Keywords searched anywhere in the context when no better label exists,
/// longest spellings first so multi-word names win over their parts.
pub const LABEL_KEYWORDS: &[&str] = &[
    "posta elettronica certificata",
    "data di nascita",
    "luogo di nascita",
    "ragione sociale",
    "codice fiscale",
    "partita iva",
    "sede legale",
    "indirizzo",
    "telefono",
    "provincia",
    "cognome",
    "comune",
    "email",
    "città",
    "iban",
    "nome",
    "via",
    "cap",
    "pec",
];

/// How a label matched the dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Normalized label equals a spelling
    Exact,
    /// One contains the other as whole words
    Substring,
}

/// Result of a dictionary lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryMatch {
    /// Canonical field key
    pub field_key: &'static str,
    /// Spelling that matched
    pub synonym: &'static str,
    /// Exact or substring
    pub kind: MatchKind,
}

/// Spelling → key, including each key written with spaces
static EXACT_INDEX: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for &(key, synonyms) in FIELD_SYNONYMS {
        index.insert(normalize_label(key), key);
        for synonym in synonyms {
            index.insert(normalize_label(synonym), key);
        }
    }
    index
});

/// Normalize a label for lookup
///
/// Lowercases, turns underscores into spaces, collapses whitespace and drops
/// trailing separators (`:`, `,`, `;`).
pub fn normalize_label(label: &str) -> String {
    let lowered = label.to_lowercase().replace('_', " ");
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches([':', ',', ';'])
        .trim()
        .to_string()
}

/// Check whether `needle` occurs in `haystack` on word boundaries
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

/// Look up a label in the synonym dictionary
///
/// Exact matches always win. Otherwise the longest spelling contained in the
/// label (or containing it, for labels of three or more characters) is used.
pub fn lookup(label: &str) -> Option<DictionaryMatch> {
    let normalized = normalize_label(label);
    if normalized.is_empty() {
        return None;
    }

    if let Some(&key) = EXACT_INDEX.get(&normalized) {
        let synonym = FIELD_SYNONYMS
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, synonyms)| {
                synonyms
                    .iter()
                    .find(|s| normalize_label(s) == normalized)
                    .copied()
            })
            .unwrap_or(key);
        return Some(DictionaryMatch {
            field_key: key,
            synonym,
            kind: MatchKind::Exact,
        });
    }

    let mut best: Option<DictionaryMatch> = None;
    for &(key, synonyms) in FIELD_SYNONYMS {
        for &synonym in synonyms {
            let spelling = normalize_label(synonym);
            let label_contains = contains_word(&normalized, &spelling);
            let spelling_contains =
                normalized.chars().count() >= 3 && contains_word(&spelling, &normalized);
            if !(label_contains || spelling_contains) {
                continue;
            }
            let longer = best.is_none_or(|b| synonym.len() > b.synonym.len());
            if longer {
                best = Some(DictionaryMatch {
                    field_key: key,
                    synonym,
                    kind: MatchKind::Substring,
                });
            }
        }
    }
    best
}

/// First dictionary keyword present in `text` as a whole word
pub fn find_keyword(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    LABEL_KEYWORDS
        .iter()
        .find(|kw| contains_word(&lowered, kw))
        .copied()
}
