macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            std::process::exit(1);
        })
    };
}

pub mod config_ops;
pub mod convert_ops;
pub mod script_ops;

use std::path::PathBuf;

use lipi_core::settings::settings;
use lipi_core::Registry;
use tracing::debug;

/// The settings registry with `data_dirs` searched before its own paths.
pub fn open_registry(data_dirs: &[PathBuf]) -> Registry {
    let mut s = settings().clone();
    let mut search_paths = data_dirs.to_vec();
    search_paths.append(&mut s.registry.search_paths);
    s.registry.search_paths = search_paths;
    debug!(search_paths = ?s.registry.search_paths, "opening registry");
    Registry::from_settings(&s)
}

/// Load every named script or exit.
pub fn load_all(registry: &Registry, names: &[&str]) {
    for name in names {
        die!(registry.load(name), "Error loading {name}: {}");
    }
}
