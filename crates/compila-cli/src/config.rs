//! Loading of configuration and profile files.

use crate::error::{CliError, Result};
use compila_domain::ProfileData;
use compila_extractor::CompilerConfig;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Load the compiler configuration, falling back to defaults.
pub fn load_compiler_config(path: Option<&Path>) -> Result<CompilerConfig> {
    let Some(path) = path else {
        return Ok(CompilerConfig::default());
    };

    let content = fs::read_to_string(path)?;
    let config = CompilerConfig::from_toml(&content).map_err(CliError::Config)?;
    config.validate().map_err(CliError::Config)?;
    debug!("Loaded compiler config from {}", path.display());
    Ok(config)
}

/// Load a profile from a JSON object file.
pub fn load_profile(path: &Path) -> Result<ProfileData> {
    let content = fs::read_to_string(path)?;
    parse_profile(&content)
}

/// Parse a profile from a flat JSON object.
///
/// Strings, numbers and booleans become values; null entries are dropped and
/// nested structures are ignored.
pub fn parse_profile(json: &str) -> Result<ProfileData> {
    let value: Value = serde_json::from_str(json)?;
    let object = value
        .as_object()
        .ok_or_else(|| CliError::InvalidInput("Profile must be a JSON object".to_string()))?;

    let mut profile = ProfileData::new();
    for (key, value) in object {
        match value {
            Value::String(s) => profile.insert(key.as_str(), s.as_str()),
            Value::Number(n) => profile.insert(key.as_str(), n.to_string()),
            Value::Bool(b) => profile.insert(key.as_str(), b.to_string()),
            Value::Null => {}
            _ => warn!("Profile entry '{}' is not a scalar, ignored", key),
        }
    }
    Ok(profile)
}

/// Parse `OFFSET=VALUE` override arguments.
pub fn parse_overrides(args: &[String]) -> Result<BTreeMap<usize, String>> {
    args.iter()
        .map(|arg| {
            let (offset, value) = arg.split_once('=').ok_or_else(|| {
                CliError::InvalidInput(format!("Override '{}' is not OFFSET=VALUE", arg))
            })?;
            let offset = offset.trim().parse::<usize>().map_err(|e| {
                CliError::InvalidInput(format!("Invalid offset in '{}': {}", arg, e))
            })?;
            Ok((offset, value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_profile() {
        let profile = parse_profile(
            r#"{"nome": "Mario", "cap": 20100, "privacy": true, "pec": null, "extra": {"a": 1}}"#,
        )
        .unwrap();
        assert_eq!(profile.get("nome"), Some("Mario"));
        assert_eq!(profile.get("cap"), Some("20100"));
        assert_eq!(profile.get("privacy"), Some("true"));
        assert!(!profile.contains("pec"));
        assert!(!profile.contains("extra"));
    }

    #[test]
    fn test_profile_must_be_object() {
        assert!(matches!(
            parse_profile("[1, 2]"),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_load_profile_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"codice_fiscale": "RSSMRA80A01H501U"}}"#).unwrap();
        let profile = load_profile(file.path()).unwrap();
        assert_eq!(profile.get("codice_fiscale"), Some("RSSMRA80A01H501U"));
    }

    #[test]
    fn test_load_config_defaults_without_file() {
        let config = load_compiler_config(None).unwrap();
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = 10\nclassifier_enabled = false").unwrap();
        let config = load_compiler_config(Some(file.path())).unwrap();
        assert_eq!(config.batch_size, 10);
        assert!(!config.classifier_enabled);
    }

    #[test]
    fn test_invalid_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = 500").unwrap();
        assert!(matches!(
            load_compiler_config(Some(file.path())),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_parse_overrides() {
        let overrides =
            parse_overrides(&["16=Giulia Bianchi".to_string(), "40=a=b".to_string()]).unwrap();
        assert_eq!(overrides[&16], "Giulia Bianchi");
        assert_eq!(overrides[&40], "a=b");
        assert!(parse_overrides(&["nope".to_string()]).is_err());
        assert!(parse_overrides(&["x=1".to_string()]).is_err());
    }
}
