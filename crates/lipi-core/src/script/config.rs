use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Raw script table as written in TOML (and stored in `.lpsd` files).
///
/// Keys are identity keys (`"kha"`, `"anusvara"`, `"0"`); they are checked
/// against the phoneme inventory when a [`super::ScriptDefinition`] is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptTable {
    pub script: ScriptHeader,
    #[serde(default)]
    pub schwa: SchwaRules,
    #[serde(default)]
    pub vowels: BTreeMap<String, Graphemes>,
    #[serde(default)]
    pub vowel_signs: BTreeMap<String, Graphemes>,
    #[serde(default)]
    pub consonants: BTreeMap<String, Graphemes>,
    #[serde(default)]
    pub modifiers: BTreeMap<String, Graphemes>,
    #[serde(default)]
    pub digits: BTreeMap<String, Graphemes>,
    #[serde(default)]
    pub punctuation: BTreeMap<String, Graphemes>,
    #[serde(default)]
    pub dead_consonants: BTreeMap<String, Graphemes>,
    #[serde(default)]
    pub render_modifiers: BTreeMap<String, String>,
    #[serde(default)]
    pub render_punctuation: BTreeMap<String, String>,
    /// Independent vowels written after a realized `a`, where the plain
    /// form would merge with it (`kaï`, not `kai`).
    #[serde(default)]
    pub render_hiatus: BTreeMap<String, String>,
    #[serde(default)]
    pub fallback: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptHeader {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub virama: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchwaPolicy {
    #[default]
    AlwaysRetain,
    ContextualDelete,
}

/// Inherent-vowel handling on output. The positional switches only matter
/// under [`SchwaPolicy::ContextualDelete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchwaRules {
    #[serde(default)]
    pub policy: SchwaPolicy,
    #[serde(default = "enabled")]
    pub word_final: bool,
    #[serde(default = "enabled")]
    pub medial: bool,
    #[serde(default = "enabled")]
    pub retain_in_conjunct: bool,
}

fn enabled() -> bool {
    true
}

impl Default for SchwaRules {
    fn default() -> Self {
        Self {
            policy: SchwaPolicy::AlwaysRetain,
            word_final: true,
            medial: true,
            retain_in_conjunct: true,
        }
    }
}

/// One or more graphemes for an identity. The first is the rendering form;
/// all are recognised on input.
///
/// TOML accepts either a string or an array of strings. Binary formats
/// always store a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Graphemes(pub Vec<String>);

impl Graphemes {
    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<&str> for Graphemes {
    fn from(s: &str) -> Self {
        Self(vec![s.to_string()])
    }
}

impl<'de> Deserialize<'de> for Graphemes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GraphemesVisitor;

        impl<'de> Visitor<'de> for GraphemesVisitor {
            type Value = Graphemes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a grapheme string or an array of grapheme strings")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Graphemes, E> {
                Ok(Graphemes(vec![v.to_string()]))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Graphemes, A::Error> {
                let mut out = Vec::new();
                while let Some(g) = seq.next_element::<String>()? {
                    out.push(g);
                }
                Ok(Graphemes(out))
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_any(GraphemesVisitor)
        } else {
            Vec::<String>::deserialize(deserializer).map(Graphemes)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptConfigError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("[script] code is empty")]
    MissingCode,
    #[error("unknown {section} key: {key}")]
    UnknownKey { section: &'static str, key: String },
    #[error("empty grapheme for {section}.{key}")]
    EmptyGrapheme { section: &'static str, key: String },
    #[error("grapheme {grapheme:?} is used by both {first} and {second}")]
    DuplicateGrapheme {
        grapheme: String,
        first: String,
        second: String,
    },
    #[error("invalid fallback {key} -> {target}: {reason}")]
    InvalidFallback {
        key: String,
        target: String,
        reason: &'static str,
    },
    #[error("missing digit {0}")]
    MissingDigit(u8),
    #[error("{kind} {key} has no grapheme and no fallback")]
    Unresolved {
        kind: &'static str,
        key: &'static str,
    },
}

impl ScriptTable {
    pub(crate) fn sections(&self) -> [(&'static str, &BTreeMap<String, Graphemes>); 7] {
        [
            ("vowels", &self.vowels),
            ("vowel_signs", &self.vowel_signs),
            ("consonants", &self.consonants),
            ("modifiers", &self.modifiers),
            ("digits", &self.digits),
            ("punctuation", &self.punctuation),
            ("dead_consonants", &self.dead_consonants),
        ]
    }
}

/// Parse TOML text into a [`ScriptTable`], checking the shallow shape:
/// a non-empty code and no empty graphemes. Identity keys are checked later
/// by [`super::ScriptDefinition::from_table`].
pub fn parse_script_toml(toml_str: &str) -> Result<ScriptTable, ScriptConfigError> {
    let table: ScriptTable =
        toml::from_str(toml_str).map_err(|e| ScriptConfigError::Parse(e.to_string()))?;
    check_shape(&table)?;
    Ok(table)
}

pub(crate) fn check_shape(table: &ScriptTable) -> Result<(), ScriptConfigError> {
    if table.script.code.trim().is_empty() {
        return Err(ScriptConfigError::MissingCode);
    }
    for (section, map) in table.sections() {
        for (key, graphemes) in map {
            if graphemes.0.is_empty() || graphemes.iter().any(str::is_empty) {
                return Err(ScriptConfigError::EmptyGrapheme {
                    section,
                    key: key.clone(),
                });
            }
        }
    }
    let render = [
        ("render_modifiers", &table.render_modifiers),
        ("render_punctuation", &table.render_punctuation),
        ("render_hiatus", &table.render_hiatus),
    ];
    for (section, map) in render {
        if let Some((key, _)) = map.iter().find(|(_, v)| v.is_empty()) {
            return Err(ScriptConfigError::EmptyGrapheme {
                section,
                key: key.clone(),
            });
        }
    }
    if table.script.virama.as_deref() == Some("") {
        return Err(ScriptConfigError::EmptyGrapheme {
            section: "script",
            key: "virama".to_string(),
        });
    }
    Ok(())
}
