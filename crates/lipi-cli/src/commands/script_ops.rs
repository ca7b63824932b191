use std::fs;
use std::path::Path;

use serde::Serialize;

use lipi_core::script::{parse_script_toml, Coverage, SchwaPolicy, ScriptTable};
use lipi_core::{Registry, ScriptDefinition};

#[derive(Debug, Serialize)]
struct ScriptSummary<'a> {
    code: &'a str,
    name: &'a str,
    inherent_explicit: bool,
    schwa_deletion: bool,
    coverage: Coverage,
    fallbacks: Vec<Fallback>,
}

#[derive(Debug, Serialize)]
struct Fallback {
    kind: &'static str,
    from: &'static str,
    to: &'static str,
}

fn summarize(def: &ScriptDefinition) -> ScriptSummary<'_> {
    ScriptSummary {
        code: def.code(),
        name: def.name(),
        inherent_explicit: def.inherent_explicit(),
        schwa_deletion: def.schwa().policy == SchwaPolicy::ContextualDelete,
        coverage: def.coverage(),
        fallbacks: def
            .fallbacks()
            .into_iter()
            .map(|(kind, from, to)| Fallback { kind, from, to })
            .collect(),
    }
}

fn print_summary(summary: &ScriptSummary<'_>) {
    let c = &summary.coverage;
    println!("{} ({})", summary.code, summary.name);
    println!(
        "  vowels {}, signs {}, consonants {}, modifiers {}, punctuation {}",
        c.vowels, c.vowel_signs, c.consonants, c.modifiers, c.punctuation
    );
    if summary.inherent_explicit {
        println!("  inherent vowel written explicitly");
    }
    if summary.schwa_deletion {
        println!("  contextual schwa deletion");
    }
    if !summary.fallbacks.is_empty() {
        println!("  fallbacks ({}):", summary.fallbacks.len());
        for f in &summary.fallbacks {
            println!("    {:<12} {} -> {}", f.kind, f.from, f.to);
        }
    }
}

/// Every code the registry can load, with its display name.
pub fn list(registry: &Registry) {
    for code in registry.available_codes() {
        if let Err(e) = registry.load(&code) {
            println!("{code:<4} (unloadable: {e})");
            continue;
        }
        if let Ok(def) = registry.get(&code) {
            println!("{code:<4} {}", def.name());
        }
    }
}

/// Load one script through the registry and describe it.
pub fn show(registry: &Registry, name: &str, json: bool) {
    die!(registry.load(name), "Error loading {name}: {}");
    let def = die!(registry.get(name), "Error: {}");
    emit(&summarize(&def), json);
}

/// Validate a script table file (TOML or compiled) and describe it.
pub fn check(file: &str, json: bool) {
    let table = read_table(Path::new(file));
    let def = die!(ScriptDefinition::from_table(table), "Invalid table {file}: {}");
    emit(&summarize(&def), json);
}

/// Compile a TOML script table into the binary `.lpsd` format.
pub fn compile(input: &str, output: &str) {
    let content = die!(fs::read_to_string(input), "Error reading {input}: {}");
    let table = die!(parse_script_toml(&content), "Error parsing {input}: {}");
    let _ = die!(
        ScriptDefinition::from_table(table.clone()),
        "Invalid table {input}: {}"
    );
    die!(table.save(Path::new(output)), "Error writing {output}: {}");
    let size = fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    eprintln!("{} -> {} ({} bytes)", input, output, size);
}

fn read_table(path: &Path) -> ScriptTable {
    let display = path.display();
    if path.extension().and_then(|e| e.to_str()) == Some("lpsd") {
        return die!(ScriptTable::open(path), "Error reading {display}: {}");
    }
    let content = die!(fs::read_to_string(path), "Error reading {display}: {}");
    die!(parse_script_toml(&content), "Error parsing {display}: {}")
}

fn emit(summary: &ScriptSummary<'_>, json: bool) {
    if json {
        let rendered = die!(
            serde_json::to_string_pretty(summary),
            "JSON serialization failed: {}"
        );
        println!("{rendered}");
    } else {
        print_summary(summary);
    }
}
