use std::collections::HashMap;
use std::fs;

const SCHWA_POLICIES: [&str; 2] = ["always_retain", "contextual_delete"];

fn main() {
    let settings_path = "src/default_settings.toml";
    println!("cargo:rerun-if-changed={settings_path}");
    let settings = validate_toml(settings_path, include_str!("src/default_settings.toml"));
    validate_settings(settings_path, &settings);

    // Embedded tables must at least be well-formed TOML.
    let dir = "src/script/data";
    println!("cargo:rerun-if-changed={dir}");
    let entries = fs::read_dir(dir).unwrap_or_else(|e| panic!("cannot read {dir}: {e}"));
    for entry in entries {
        let path = entry.expect("readable directory entry").path();
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
        let value = validate_toml(&path.display().to_string(), &content);
        if value.get("script").is_none() {
            panic!("{} is missing its [script] header", path.display());
        }
    }
}

fn validate_toml(path: &str, content: &str) -> toml::Value {
    match content.parse::<toml::Value>() {
        Ok(v) => v,
        Err(e) => panic!("{path} contains invalid TOML: {e}"),
    }
}

/// The same rules `settings::parse_settings_toml` enforces, so the embedded
/// settings always load.
fn validate_settings(path: &str, value: &toml::Value) {
    let registry = value
        .get("registry")
        .and_then(toml::Value::as_table)
        .unwrap_or_else(|| panic!("{path}: missing [registry] table"));
    for key in ["search_paths", "preload"] {
        let Some(list) = registry.get(key) else {
            continue;
        };
        let entries = list
            .as_array()
            .unwrap_or_else(|| panic!("{path}: registry.{key} must be an array"));
        for entry in entries {
            match entry.as_str() {
                Some(s) if !s.is_empty() => {}
                _ => panic!("{path}: registry.{key} entries must be non-empty strings"),
            }
        }
    }

    let mut folded: HashMap<String, &str> = HashMap::new();
    if let Some(aliases) = value.get("aliases") {
        let aliases = aliases
            .as_table()
            .unwrap_or_else(|| panic!("{path}: [aliases] must be a table"));
        for (name, code) in aliases {
            let code = match code.as_str() {
                Some(c) if !c.is_empty() => c,
                _ => panic!("{path}: aliases.{name} must be a non-empty code"),
            };
            if let Some(existing) = folded.insert(name.to_lowercase(), code) {
                if existing != code {
                    panic!("{path}: aliases.{name} disagrees with another spelling");
                }
            }
        }
    }

    if let Some(schwa) = value.get("schwa") {
        let schwa = schwa
            .as_table()
            .unwrap_or_else(|| panic!("{path}: [schwa] must be a table"));
        for (code, rules) in schwa {
            if code.is_empty() {
                panic!("{path}: schwa override code must not be empty");
            }
            let policy = rules.get("policy").and_then(toml::Value::as_str);
            if let Some(policy) = policy {
                if !SCHWA_POLICIES.contains(&policy) {
                    panic!("{path}: schwa.{code}.policy {policy:?} is not a known policy");
                }
            }
        }
    }
}
