use std::fs;

use lipi_core::script::embedded;
use lipi_core::settings;

pub fn settings_export() {
    print!("{}", settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(settings::parse_settings_toml(&content), "Error: {}");
    println!(
        "OK: {} search paths, {} preloads, {} aliases, {} schwa overrides",
        s.registry.search_paths.len(),
        s.registry.preload.len(),
        s.aliases().count(),
        s.schwa.len()
    );
}

/// Print an embedded script table as a starting point for a custom one.
pub fn script_export(code: &str) {
    match embedded(code) {
        Some(toml) => print!("{toml}"),
        None => {
            eprintln!("No embedded table for {code}");
            std::process::exit(1);
        }
    }
}
