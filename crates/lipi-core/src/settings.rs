//! Process-wide settings: table search paths, preloads, aliases and
//! per-script schwa overrides.
//!
//! The embedded `default_settings.toml` is used unless [`init_custom`] ran
//! before the first [`settings`] call.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::script::SchwaRules;

const EMBEDDED_SETTINGS: &str = include_str!("default_settings.toml");

static OVERRIDE: OnceLock<String> = OnceLock::new();
static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Install `toml_content` as the settings source. Fails once settings are
/// in use or another override is installed.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    if SETTINGS.get().is_some() {
        return Err(SettingsError::AlreadyInitialized);
    }
    OVERRIDE
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| {
        let source = OVERRIDE.get().map_or(EMBEDDED_SETTINGS, String::as_str);
        parse_settings_toml(source).expect("settings TOML must be valid")
    })
}

/// The embedded settings TOML, for export and editing.
pub fn default_toml() -> &'static str {
    EMBEDDED_SETTINGS
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

fn invalid(field: impl Into<String>, reason: &str) -> SettingsError {
    SettingsError::InvalidValue {
        field: field.into(),
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub registry: RegistrySettings,
    #[serde(default, rename = "aliases")]
    raw_aliases: HashMap<String, String>,
    /// Schwa rules replacing a table's own, by code.
    #[serde(default)]
    pub schwa: HashMap<String, SchwaRules>,
    /// Lowercased alias name → code.
    #[serde(skip)]
    aliases: HashMap<String, String>,
}

impl Settings {
    /// Look up a language alias, ignoring case.
    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(&name.to_lowercase()).map(String::as_str)
    }

    /// All aliases as `(lowercased name, code)`.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySettings {
    /// Directories searched for tables before the embedded set, in order.
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
    /// Codes loaded when the global registry is first used.
    #[serde(default)]
    pub preload: Vec<String>,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let mut parsed: Settings =
        toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    check_entries(&parsed)?;
    parsed.aliases = fold_aliases(&parsed.raw_aliases)?;
    Ok(parsed)
}

/// Lowercase alias names. Two spellings of one name must agree.
fn fold_aliases(raw: &HashMap<String, String>) -> Result<HashMap<String, String>, SettingsError> {
    let mut folded: HashMap<String, String> = HashMap::with_capacity(raw.len());
    for (name, code) in raw {
        if code.is_empty() {
            return Err(invalid(format!("aliases.{name}"), "code must not be empty"));
        }
        match folded.get(&name.to_lowercase()) {
            Some(existing) if existing != code => {
                return Err(invalid(
                    format!("aliases.{name}"),
                    "another spelling of this name maps to a different code",
                ));
            }
            Some(_) => {}
            None => {
                folded.insert(name.to_lowercase(), code.clone());
            }
        }
    }
    Ok(folded)
}

fn check_entries(s: &Settings) -> Result<(), SettingsError> {
    if s
        .registry
        .search_paths
        .iter()
        .any(|p| p.as_os_str().is_empty())
    {
        return Err(invalid("registry.search_paths", "entries must not be empty"));
    }
    if s.registry.preload.iter().any(String::is_empty) {
        return Err(invalid("registry.preload", "entries must not be empty"));
    }
    if s.schwa.contains_key("") {
        return Err(invalid("schwa", "override code must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::SchwaPolicy;

    #[test]
    fn embedded_settings_parse() {
        let s = parse_settings_toml(default_toml()).unwrap();
        assert!(s.registry.search_paths.is_empty());
        assert!(s.registry.preload.is_empty());
        assert!(s.schwa.is_empty());
        assert_eq!(s.alias("Hindi"), Some("de"));
        assert_eq!(s.alias("sanskrit"), Some("de"));
        assert_eq!(s.alias("KANNADA"), Some("kn"));
        assert_eq!(s.alias("Romanized"), Some("ro"));
        assert_eq!(s.alias("Normal"), Some("nr"));
        assert_eq!(s.alias("Klingon"), None);
    }

    #[test]
    fn embedded_settings_back_the_singleton() {
        let err = init_custom("[registry]\npreload = [\"\"]\n".to_string()).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));

        assert_eq!(settings().alias("Hindi"), Some("de"));
        let err = init_custom("[registry]\n".to_string()).unwrap_err();
        assert!(matches!(err, SettingsError::AlreadyInitialized));
    }

    #[test]
    fn custom_registry_and_schwa() {
        let toml = r#"
[registry]
search_paths = ["/usr/share/lipi", "tables"]
preload = ["de", "kn"]

[aliases]
Hindi = "de"

[schwa.de]
policy = "contextual_delete"
medial = false
"#;
        let s = parse_settings_toml(toml).unwrap();
        assert_eq!(s.registry.search_paths.len(), 2);
        assert_eq!(s.registry.preload, vec!["de", "kn"]);
        let rules = s.schwa["de"];
        assert_eq!(rules.policy, SchwaPolicy::ContextualDelete);
        assert!(!rules.medial);
        assert!(rules.word_final);
        assert_eq!(s.aliases().count(), 1);
    }

    #[test]
    fn only_registry_is_required() {
        let s = parse_settings_toml("[registry]\n").unwrap();
        assert_eq!(s.alias("Hindi"), None);
        assert!(s.schwa.is_empty());

        let err = parse_settings_toml("[aliases]\nHindi = \"de\"\n").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn empty_entries_rejected() {
        let err = parse_settings_toml("[registry]\nsearch_paths = [\"\"]\n").unwrap_err();
        assert!(err.to_string().contains("registry.search_paths"));

        let err = parse_settings_toml("[registry]\npreload = [\"\"]\n").unwrap_err();
        assert!(err.to_string().contains("registry.preload"));

        let err = parse_settings_toml("[registry]\n[aliases]\nHindi = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("aliases.Hindi"));
    }

    #[test]
    fn alias_spellings_must_agree() {
        let toml = "[registry]\n[aliases]\nHindi = \"de\"\nhindi = \"bn\"\n";
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));

        let toml = "[registry]\n[aliases]\nHindi = \"de\"\nHINDI = \"de\"\n";
        let s = parse_settings_toml(toml).unwrap();
        assert_eq!(s.aliases().count(), 1);
    }

    #[test]
    fn unknown_schwa_policy_rejected() {
        let toml = "[registry]\n[schwa.nr]\npolicy = \"never\"\n";
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
