//! Transliteration between Brahmic scripts and their romanized forms.
//!
//! Text in one script is split into orthographic units, mapped onto a
//! script-neutral phonemic representation, then rebuilt in the target
//! script. Script tables are data (`src/script/data/*.toml`) and are
//! loaded on demand through a [`Registry`].

pub mod convert;
pub mod ir;
pub mod phoneme;
pub mod registry;
pub mod render;
pub mod script;
pub mod segment;
pub mod settings;

pub use convert::{parivartak, parivartak_traced, Conversion, ConversionError};
pub use registry::{load_lang, LoadError, Registry};
pub use script::ScriptDefinition;
