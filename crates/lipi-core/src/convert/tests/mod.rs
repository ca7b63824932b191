mod fixtures;
mod properties;

use std::sync::Arc;

use crate::registry::Registry;
use crate::script::{embedded, ScriptDefinition};

pub(super) fn script(code: &str) -> ScriptDefinition {
    ScriptDefinition::from_toml(embedded(code).unwrap()).unwrap()
}

/// Embedded registry with the default aliases and every embedded script loaded.
pub(super) fn loaded_registry() -> Registry {
    let registry = Registry::embedded()
        .with_alias("Devanagari", "de")
        .with_alias("Kannada", "kn")
        .with_alias("Tamil", "ta");
    for code in registry.available_codes() {
        registry.load(&code).unwrap();
    }
    registry
}

pub(super) fn pair(
    registry: &Registry,
    from: &str,
    to: &str,
) -> (Arc<ScriptDefinition>, Arc<ScriptDefinition>) {
    (registry.get(from).unwrap(), registry.get(to).unwrap())
}
