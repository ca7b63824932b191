//! Loaded script definitions, keyed by language code.
//!
//! Definitions are fetched from a [`ScriptSource`] on the first `load` of a
//! code and shared as `Arc<ScriptDefinition>` afterwards. Concurrent loads
//! of one code are coalesced: the first caller fetches, later callers wait
//! on its in-flight marker and receive the same result.

mod source;

pub use source::{DirSource, EmbeddedSource, LayeredSource};

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::{Arc, Condvar, Mutex, OnceLock, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::convert::ConversionError;
use crate::script::{SchwaRules, ScriptDefinition, ScriptTable};
use crate::settings::{settings, Settings};

/// Why a script could not be loaded. Cloned to every waiter of a
/// coalesced load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("unsupported script: {0}")]
    Unsupported(String),
    #[error("invalid script data for {code}: {reason}")]
    InvalidData { code: String, reason: String },
    #[error("IO error loading {code}: {reason}")]
    Io { code: String, reason: String },
}

impl LoadError {
    pub(crate) fn invalid(code: &str, reason: impl fmt::Display) -> Self {
        Self::InvalidData {
            code: code.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(code: &str, err: io::Error) -> Self {
        Self::Io {
            code: code.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Where script tables come from.
pub trait ScriptSource: Send + Sync {
    /// `Ok(None)` when this source does not know `code`.
    fn fetch(&self, code: &str) -> Result<Option<ScriptTable>, LoadError>;

    /// Codes this source can provide, sorted.
    fn codes(&self) -> Vec<String>;
}

/// A load in progress; waiters block on `settled`.
#[derive(Default)]
struct InFlight {
    result: Mutex<Option<Result<(), LoadError>>>,
    settled: Condvar,
}

impl InFlight {
    fn finish(&self, result: Result<(), LoadError>) {
        *self.result.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
        self.settled.notify_all();
    }

    fn wait(&self) -> Result<(), LoadError> {
        let mut guard = self.result.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(result) = guard.as_ref() {
                return result.clone();
            }
            guard = self
                .settled
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

pub struct Registry {
    source: Box<dyn ScriptSource>,
    aliases: HashMap<String, String>,
    schwa_overrides: HashMap<String, SchwaRules>,
    loaded: RwLock<HashMap<String, Arc<ScriptDefinition>>>,
    in_flight: Mutex<HashMap<String, Arc<InFlight>>>,
}

impl Registry {
    pub fn new(source: impl ScriptSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            aliases: HashMap::new(),
            schwa_overrides: HashMap::new(),
            loaded: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Registry over the embedded tables only.
    pub fn embedded() -> Self {
        Self::new(EmbeddedSource)
    }

    /// Search paths first, embedded tables last; aliases and schwa
    /// overrides from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut layers: Vec<Box<dyn ScriptSource>> = settings
            .registry
            .search_paths
            .iter()
            .map(|dir| Box::new(DirSource::new(dir)) as Box<dyn ScriptSource>)
            .collect();
        layers.push(Box::new(EmbeddedSource));
        let mut registry = Self::new(LayeredSource::new(layers));
        for (name, code) in settings.aliases() {
            registry = registry.with_alias(name, code);
        }
        for (code, rules) in &settings.schwa {
            registry = registry.with_schwa_override(code, *rules);
        }
        registry
    }

    /// Let `name` (case-insensitive) stand for `code`.
    pub fn with_alias(mut self, name: &str, code: &str) -> Self {
        self.aliases.insert(name.to_lowercase(), code.to_string());
        self
    }

    /// Replace the schwa rules of `code`'s table when it is loaded.
    pub fn with_schwa_override(mut self, code: &str, rules: SchwaRules) -> Self {
        self.schwa_overrides.insert(code.to_string(), rules);
        self
    }

    /// The code `name` refers to: an alias target, or `name` itself.
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases
            .get(&name.to_lowercase())
            .map(String::as_str)
            .unwrap_or(name)
    }

    /// Load `code` (or an alias of it). A no-op when already loaded.
    pub fn load(&self, name: &str) -> Result<(), LoadError> {
        let code = self.canonical(name);
        if self.is_loaded(code) {
            return Ok(());
        }

        let (flight, leader) = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            // Re-check under the lock: a leader may have finished meanwhile.
            if self.is_loaded(code) {
                return Ok(());
            }
            match in_flight.get(code) {
                Some(flight) => (Arc::clone(flight), false),
                None => {
                    let flight = Arc::new(InFlight::default());
                    in_flight.insert(code.to_string(), Arc::clone(&flight));
                    (flight, true)
                }
            }
        };

        if !leader {
            debug!(code, "waiting for in-flight load");
            return flight.wait();
        }

        let result = self.build(code).map(|def| {
            self.loaded
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(code.to_string(), Arc::new(def));
        });
        match &result {
            Ok(()) => info!(code, "script loaded"),
            Err(e) => warn!(code, error = %e, "script load failed"),
        }
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(code);
        flight.finish(result.clone());
        result
    }

    fn build(&self, code: &str) -> Result<ScriptDefinition, LoadError> {
        let mut table = self
            .source
            .fetch(code)?
            .ok_or_else(|| LoadError::Unsupported(code.to_string()))?;
        if table.script.code != code {
            debug!(code, table_code = %table.script.code, "table code differs from requested code");
            table.script.code = code.to_string();
        }
        if let Some(rules) = self.schwa_overrides.get(code) {
            table.schwa = *rules;
        }
        ScriptDefinition::from_table(table).map_err(|e| LoadError::invalid(code, e))
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        let code = self.canonical(name);
        self.loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(code)
    }

    pub fn get(&self, name: &str) -> Result<Arc<ScriptDefinition>, ConversionError> {
        let code = self.canonical(name);
        self.loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(code)
            .cloned()
            .ok_or_else(|| ConversionError::ScriptNotLoaded(name.to_string()))
    }

    /// Codes loaded so far, sorted.
    pub fn loaded_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        codes.sort();
        codes
    }

    /// Codes the source can provide, sorted.
    pub fn available_codes(&self) -> Vec<String> {
        self.source.codes()
    }
}

/// The process-wide registry, built from [`settings()`] on first use.
pub fn global() -> &'static Registry {
    static INSTANCE: OnceLock<Registry> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let s = settings();
        let registry = Registry::from_settings(s);
        for code in &s.registry.preload {
            if let Err(e) = registry.load(code) {
                warn!(code = %code, error = %e, "preload failed");
            }
        }
        registry
    })
}

/// Load `lang_code` into the process-wide registry. Idempotent.
pub fn load_lang(lang_code: &str) -> Result<(), LoadError> {
    global().load(lang_code)
}
