use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use super::{LoadError, ScriptSource};
use crate::script::{embedded, parse_script_toml, ScriptIoError, ScriptTable, EMBEDDED};

/// Tables compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedSource;

impl ScriptSource for EmbeddedSource {
    fn fetch(&self, code: &str) -> Result<Option<ScriptTable>, LoadError> {
        let Some(toml) = embedded(code) else {
            return Ok(None);
        };
        parse_script_toml(toml)
            .map(Some)
            .map_err(|e| LoadError::invalid(code, e))
    }

    fn codes(&self) -> Vec<String> {
        EMBEDDED.iter().map(|(c, _)| c.to_string()).collect()
    }
}

/// `<dir>/<code>.lpsd` (compiled) or `<dir>/<code>.toml`, compiled first.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ScriptSource for DirSource {
    fn fetch(&self, code: &str) -> Result<Option<ScriptTable>, LoadError> {
        let compiled = self.dir.join(format!("{code}.lpsd"));
        match ScriptTable::open(&compiled) {
            Ok(table) => {
                debug!(path = %compiled.display(), "read compiled script table");
                return Ok(Some(table));
            }
            Err(ScriptIoError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {}
            Err(ScriptIoError::Io(e)) => return Err(LoadError::io(code, e)),
            Err(e) => return Err(LoadError::invalid(code, e)),
        }

        let path = self.dir.join(format!("{code}.toml"));
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LoadError::io(code, e)),
        };
        debug!(path = %path.display(), "read script table");
        parse_script_toml(&content)
            .map(Some)
            .map_err(|e| LoadError::invalid(code, e))
    }

    fn codes(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let codes: BTreeSet<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("toml" | "lpsd")
                )
            })
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        codes.into_iter().collect()
    }
}

/// Sources tried in order; the first that knows a code wins.
pub struct LayeredSource {
    layers: Vec<Box<dyn ScriptSource>>,
}

impl LayeredSource {
    pub fn new(layers: Vec<Box<dyn ScriptSource>>) -> Self {
        Self { layers }
    }
}

impl ScriptSource for LayeredSource {
    fn fetch(&self, code: &str) -> Result<Option<ScriptTable>, LoadError> {
        for layer in &self.layers {
            if let Some(table) = layer.fetch(code)? {
                return Ok(Some(table));
            }
        }
        Ok(None)
    }

    fn codes(&self) -> Vec<String> {
        let all: BTreeSet<String> = self.layers.iter().flat_map(|l| l.codes()).collect();
        all.into_iter().collect()
    }
}
