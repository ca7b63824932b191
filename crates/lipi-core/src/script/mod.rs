//! Script definitions: per-script grapheme tables keyed by phonetic identity.
//!
//! A [`ScriptTable`] is the raw TOML shape. [`ScriptDefinition::from_table`]
//! validates it and precomputes two things every conversion needs:
//!
//! - the input lookup used by the segmenter (longest match, with vowel
//!   signs kept apart so they are only offered inside an open cluster);
//! - the resolution of every identity to one the script can render, via
//!   own table, then the table's `[fallback]`, then the built-in
//!   nearest-neighbour chain. A table that leaves anything unresolved is
//!   rejected.

mod config;
mod io;
pub(crate) mod table;

pub use config::{
    parse_script_toml, Graphemes, SchwaPolicy, SchwaRules, ScriptConfigError, ScriptHeader,
    ScriptTable,
};
pub use io::ScriptIoError;
pub use table::{embedded, EMBEDDED};

use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;

use serde::Serialize;

use crate::phoneme::{Consonant, Modifier, Phoneme, Punct, Vowel, NUKTA_KEY};

/// One grapheme slot per identity of kind `P`.
#[derive(Debug, Clone)]
struct Slots<P> {
    slots: Vec<Option<String>>,
    _kind: PhantomData<P>,
}

impl<P: Phoneme> Slots<P> {
    fn new() -> Self {
        Self {
            slots: vec![None; P::ALL.len()],
            _kind: PhantomData,
        }
    }

    fn get(&self, p: P) -> Option<&str> {
        self.slots[p.index()].as_deref()
    }

    fn contains(&self, p: P) -> bool {
        self.slots[p.index()].is_some()
    }

    fn set(&mut self, p: P, grapheme: &str) {
        self.slots[p.index()] = Some(grapheme.to_string());
    }

    fn count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Input token recognised by longest match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    Vowel(Vowel),
    VowelSign(Vowel),
    Consonant(Consonant),
    DeadConsonant(Consonant),
    Virama,
    Nukta,
    Modifier(Modifier),
    Digit(u8),
    Punctuation(Punct),
}

impl Token {
    fn describe(self) -> String {
        match self {
            Token::Vowel(v) => format!("vowels.{v}"),
            Token::VowelSign(v) => format!("vowel_signs.{v}"),
            Token::Consonant(c) => format!("consonants.{c}"),
            Token::DeadConsonant(c) => format!("dead_consonants.{c}"),
            Token::Virama => "script.virama".to_string(),
            Token::Nukta => format!("modifiers.{NUKTA_KEY}"),
            Token::Modifier(m) => format!("modifiers.{m}"),
            Token::Digit(d) => format!("digits.{d}"),
            Token::Punctuation(p) => format!("punctuation.{p}"),
        }
    }
}

/// Reverse lookup from grapheme to token.
#[derive(Debug, Clone, Default)]
pub(crate) struct InputTable {
    base: HashMap<String, Token>,
    signs: HashMap<String, Vowel>,
    /// Longest key, in chars.
    max_chars: usize,
}

impl InputTable {
    fn insert(&mut self, grapheme: &str, token: Token) -> Result<(), ScriptConfigError> {
        match self.base.get(grapheme) {
            Some(&existing) if existing != token => {
                return Err(ScriptConfigError::DuplicateGrapheme {
                    grapheme: grapheme.to_string(),
                    first: existing.describe(),
                    second: token.describe(),
                });
            }
            Some(_) => {}
            None => {
                self.base.insert(grapheme.to_string(), token);
            }
        }
        self.max_chars = self.max_chars.max(grapheme.chars().count());
        Ok(())
    }

    fn insert_sign(&mut self, grapheme: &str, vowel: Vowel) -> Result<(), ScriptConfigError> {
        if let Some(&existing) = self.signs.get(grapheme) {
            if existing != vowel {
                return Err(ScriptConfigError::DuplicateGrapheme {
                    grapheme: grapheme.to_string(),
                    first: Token::VowelSign(existing).describe(),
                    second: Token::VowelSign(vowel).describe(),
                });
            }
        }
        self.signs.insert(grapheme.to_string(), vowel);
        self.max_chars = self.max_chars.max(grapheme.chars().count());
        Ok(())
    }

    /// Longest token at the start of `rest`, with its byte length.
    ///
    /// Vowel signs are candidates only when `cluster_open`; on a tie they
    /// win over a base grapheme of the same length.
    pub(crate) fn longest_match(&self, rest: &str, cluster_open: bool) -> Option<(Token, usize)> {
        let mut best = None;
        for (idx, ch) in rest.char_indices().take(self.max_chars) {
            let end = idx + ch.len_utf8();
            let prefix = &rest[..end];
            if cluster_open {
                if let Some(&v) = self.signs.get(prefix) {
                    best = Some((Token::VowelSign(v), end));
                    continue;
                }
            }
            if let Some(&token) = self.base.get(prefix) {
                best = Some((token, end));
            }
        }
        best
    }
}

/// Identity resolution for one kind: index → renderable identity.
#[derive(Debug, Clone)]
struct Resolution<P> {
    to: Vec<P>,
}

impl<P: Phoneme> Resolution<P> {
    fn build(
        has: impl Fn(P) -> bool,
        fallback: &HashMap<P, P>,
    ) -> Result<Self, ScriptConfigError> {
        let to = P::ALL
            .iter()
            .map(|&p| {
                let mut seen = Vec::new();
                let mut cur = p;
                loop {
                    if has(cur) {
                        return Ok(cur);
                    }
                    seen.push(cur);
                    match fallback.get(&cur).copied().or_else(|| cur.nearest()) {
                        Some(next) if !seen.contains(&next) => cur = next,
                        _ => {
                            return Err(ScriptConfigError::Unresolved {
                                kind: P::KIND,
                                key: p.key(),
                            })
                        }
                    }
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { to })
    }

    fn get(&self, p: P) -> P {
        self.to[p.index()]
    }

    fn substituted(&self) -> impl Iterator<Item = (P, P)> + '_ {
        P::ALL
            .iter()
            .map(|&p| (p, self.get(p)))
            .filter(|(from, to)| from != to)
    }
}

#[derive(Debug, Default)]
struct Fallbacks {
    vowels: HashMap<Vowel, Vowel>,
    consonants: HashMap<Consonant, Consonant>,
    modifiers: HashMap<Modifier, Modifier>,
    punctuation: HashMap<Punct, Punct>,
}

fn fallback_target<P: Phoneme>(key: &str, target: &str) -> Result<P, ScriptConfigError> {
    P::from_key(target).ok_or_else(|| ScriptConfigError::InvalidFallback {
        key: key.to_string(),
        target: target.to_string(),
        reason: "target must be an identity of the same kind",
    })
}

fn parse_fallbacks(raw: &BTreeMap<String, String>) -> Result<Fallbacks, ScriptConfigError> {
    let mut out = Fallbacks::default();
    for (key, target) in raw {
        if let Some(v) = Vowel::from_key(key) {
            out.vowels.insert(v, fallback_target(key, target)?);
        } else if let Some(c) = Consonant::from_key(key) {
            out.consonants.insert(c, fallback_target(key, target)?);
        } else if let Some(m) = Modifier::from_key(key) {
            out.modifiers.insert(m, fallback_target(key, target)?);
        } else if let Some(p) = Punct::from_key(key) {
            out.punctuation.insert(p, fallback_target(key, target)?);
        } else {
            return Err(ScriptConfigError::UnknownKey {
                section: "fallback",
                key: key.clone(),
            });
        }
    }
    Ok(out)
}

/// Fill slots from one table section, registering every grapheme through
/// `register`.
fn fill<P: Phoneme>(
    section: &'static str,
    map: &BTreeMap<String, Graphemes>,
    mut register: impl FnMut(&str, P) -> Result<(), ScriptConfigError>,
) -> Result<Slots<P>, ScriptConfigError> {
    let mut slots = Slots::new();
    for (key, graphemes) in map {
        let id = P::from_key(key).ok_or_else(|| ScriptConfigError::UnknownKey {
            section,
            key: key.clone(),
        })?;
        for g in graphemes.iter() {
            register(g, id)?;
        }
        if let Some(primary) = graphemes.primary() {
            slots.set(id, primary);
        }
    }
    Ok(slots)
}

fn fill_render<P: Phoneme>(
    section: &'static str,
    map: &BTreeMap<String, String>,
) -> Result<Slots<P>, ScriptConfigError> {
    let mut slots = Slots::new();
    for (key, grapheme) in map {
        let id = P::from_key(key).ok_or_else(|| ScriptConfigError::UnknownKey {
            section,
            key: key.clone(),
        })?;
        slots.set(id, grapheme);
    }
    Ok(slots)
}

/// Per-kind counts of identities a script writes natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub vowels: usize,
    pub vowel_signs: usize,
    pub consonants: usize,
    pub modifiers: usize,
    pub punctuation: usize,
}

/// Validated, immutable mapping tables for one script.
#[derive(Debug, Clone)]
pub struct ScriptDefinition {
    code: String,
    name: String,
    virama: Option<String>,
    nukta: Option<String>,
    schwa: SchwaRules,
    vowels: Slots<Vowel>,
    signs: Slots<Vowel>,
    consonants: Slots<Consonant>,
    dead: Slots<Consonant>,
    modifiers: Slots<Modifier>,
    render_modifiers: Slots<Modifier>,
    punctuation: Slots<Punct>,
    render_punctuation: Slots<Punct>,
    render_hiatus: Slots<Vowel>,
    digits: [String; 10],
    resolved_vowels: Resolution<Vowel>,
    resolved_signs: Resolution<Vowel>,
    resolved_consonants: Resolution<Consonant>,
    resolved_modifiers: Resolution<Modifier>,
    resolved_punctuation: Resolution<Punct>,
    input: InputTable,
}

impl ScriptDefinition {
    /// Parse and validate a TOML table.
    pub fn from_toml(toml_str: &str) -> Result<Self, ScriptConfigError> {
        Self::from_table(parse_script_toml(toml_str)?)
    }

    pub fn from_table(table: ScriptTable) -> Result<Self, ScriptConfigError> {
        config::check_shape(&table)?;
        let mut input = InputTable::default();

        let vowels = fill("vowels", &table.vowels, |g, v| {
            input.insert(g, Token::Vowel(v))
        })?;
        let signs = fill("vowel_signs", &table.vowel_signs, |g, v| {
            input.insert_sign(g, v)
        })?;
        let consonants = fill("consonants", &table.consonants, |g, c| {
            input.insert(g, Token::Consonant(c))
        })?;
        let dead = fill("dead_consonants", &table.dead_consonants, |g, c| {
            input.insert(g, Token::DeadConsonant(c))
        })?;
        let punctuation = fill("punctuation", &table.punctuation, |g, p| {
            input.insert(g, Token::Punctuation(p))
        })?;

        let mut modifier_table = table.modifiers.clone();
        let nukta = modifier_table.remove(NUKTA_KEY);
        if let Some(graphemes) = &nukta {
            for g in graphemes.iter() {
                input.insert(g, Token::Nukta)?;
            }
        }
        let modifiers = fill("modifiers", &modifier_table, |g, m| {
            input.insert(g, Token::Modifier(m))
        })?;

        if let Some(virama) = &table.script.virama {
            input.insert(virama, Token::Virama)?;
        }

        let mut digit_slots: [Option<String>; 10] = Default::default();
        for (key, graphemes) in &table.digits {
            let digit = key
                .parse::<u8>()
                .ok()
                .filter(|d| *d < 10)
                .ok_or_else(|| ScriptConfigError::UnknownKey {
                    section: "digits",
                    key: key.clone(),
                })?;
            for g in graphemes.iter() {
                input.insert(g, Token::Digit(digit))?;
            }
            digit_slots[digit as usize] = graphemes.primary().map(str::to_string);
        }
        let mut digits: [String; 10] = Default::default();
        for (d, slot) in digit_slots.into_iter().enumerate() {
            digits[d] = slot.ok_or(ScriptConfigError::MissingDigit(d as u8))?;
        }

        let render_modifiers = fill_render("render_modifiers", &table.render_modifiers)?;
        let render_punctuation = fill_render("render_punctuation", &table.render_punctuation)?;
        let render_hiatus = fill_render("render_hiatus", &table.render_hiatus)?;

        let fallbacks = parse_fallbacks(&table.fallback)?;
        let resolved_vowels = Resolution::build(|v| vowels.contains(v), &fallbacks.vowels)?;
        let resolved_signs = Resolution::build(
            |v| v == Vowel::A || signs.contains(v),
            &fallbacks.vowels,
        )?;
        let resolved_consonants =
            Resolution::build(|c| consonants.contains(c), &fallbacks.consonants)?;
        let resolved_modifiers = Resolution::build(
            |m| modifiers.contains(m) || render_modifiers.contains(m),
            &fallbacks.modifiers,
        )?;
        let resolved_punctuation = Resolution::build(
            |p| punctuation.contains(p) || render_punctuation.contains(p),
            &fallbacks.punctuation,
        )?;

        Ok(Self {
            code: table.script.code,
            name: table.script.name,
            virama: table.script.virama,
            nukta: nukta.and_then(|g| g.primary().map(str::to_string)),
            schwa: table.schwa,
            vowels,
            signs,
            consonants,
            dead,
            modifiers,
            render_modifiers,
            punctuation,
            render_punctuation,
            render_hiatus,
            digits,
            resolved_vowels,
            resolved_signs,
            resolved_consonants,
            resolved_modifiers,
            resolved_punctuation,
            input,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn virama(&self) -> Option<&str> {
        self.virama.as_deref()
    }

    pub fn schwa(&self) -> &SchwaRules {
        &self.schwa
    }

    /// Latin-style scripts write the inherent vowel as a letter; their
    /// tables carry a vowel sign for `a`.
    pub fn inherent_explicit(&self) -> bool {
        self.signs.contains(Vowel::A)
    }

    pub fn coverage(&self) -> Coverage {
        Coverage {
            vowels: self.vowels.count(),
            vowel_signs: self.signs.count(),
            consonants: self.consonants.count(),
            modifiers: self.modifiers.count(),
            punctuation: self.punctuation.count(),
        }
    }

    /// Every identity this script writes with another one's grapheme,
    /// as `(kind, from, to)`.
    pub fn fallbacks(&self) -> Vec<(&'static str, &'static str, &'static str)> {
        fn collect<P: Phoneme>(
            out: &mut Vec<(&'static str, &'static str, &'static str)>,
            res: &Resolution<P>,
            kind: &'static str,
        ) {
            out.extend(res.substituted().map(|(from, to)| (kind, from.key(), to.key())));
        }
        let mut out = Vec::new();
        collect(&mut out, &self.resolved_vowels, "vowel");
        collect(&mut out, &self.resolved_signs, "vowel_sign");
        collect(&mut out, &self.resolved_consonants, Consonant::KIND);
        collect(&mut out, &self.resolved_modifiers, Modifier::KIND);
        collect(&mut out, &self.resolved_punctuation, Punct::KIND);
        out
    }

    // Input side.

    pub(crate) fn input(&self) -> &InputTable {
        &self.input
    }

    pub(crate) fn recognizes_vowel(&self, v: Vowel) -> bool {
        self.vowels.contains(v)
    }

    pub(crate) fn recognizes_sign(&self, v: Vowel) -> bool {
        self.signs.contains(v)
    }

    /// Listed consonants, dead forms, and nukta forms of listed consonants.
    pub(crate) fn recognizes_consonant(&self, c: Consonant) -> bool {
        self.consonants.contains(c)
            || self.dead.contains(c)
            || (self.nukta.is_some()
                && Consonant::ALL
                    .iter()
                    .any(|&base| base.with_nukta() == Some(c) && self.consonants.contains(base)))
    }

    pub(crate) fn recognizes_modifier(&self, m: Modifier) -> bool {
        self.modifiers.contains(m)
    }

    pub(crate) fn recognizes_punctuation(&self, p: Punct) -> bool {
        self.punctuation.contains(p)
    }

    // Output side.

    pub(crate) fn resolve_vowel(&self, v: Vowel) -> Vowel {
        self.resolved_vowels.get(v)
    }

    pub(crate) fn resolve_sign(&self, v: Vowel) -> Vowel {
        self.resolved_signs.get(v)
    }

    pub(crate) fn resolve_consonant(&self, c: Consonant) -> Consonant {
        self.resolved_consonants.get(c)
    }

    pub(crate) fn resolve_modifier(&self, m: Modifier) -> Modifier {
        self.resolved_modifiers.get(m)
    }

    pub(crate) fn resolve_punctuation(&self, p: Punct) -> Punct {
        self.resolved_punctuation.get(p)
    }

    pub(crate) fn virama_or_empty(&self) -> &str {
        self.virama.as_deref().unwrap_or("")
    }

    /// Written form of the inherent vowel after a consonant.
    pub(crate) fn inherent_sign(&self) -> &str {
        self.signs.get(Vowel::A).unwrap_or("")
    }

    pub(crate) fn consonant_grapheme(&self, c: Consonant) -> &str {
        self.consonants.get(self.resolve_consonant(c)).unwrap_or("")
    }

    pub(crate) fn vowel_grapheme(&self, v: Vowel) -> &str {
        self.vowels.get(self.resolve_vowel(v)).unwrap_or("")
    }

    /// Form of an independent vowel that follows a written `a`, if the
    /// script distinguishes one.
    pub(crate) fn hiatus_grapheme(&self, v: Vowel) -> Option<&str> {
        self.render_hiatus.get(self.resolve_vowel(v))
    }

    pub(crate) fn sign_grapheme(&self, v: Vowel) -> &str {
        match self.resolve_sign(v) {
            Vowel::A => self.inherent_sign(),
            other => self.signs.get(other).unwrap_or(""),
        }
    }

    pub(crate) fn modifier_grapheme(&self, m: Modifier) -> &str {
        let m = self.resolve_modifier(m);
        self.render_modifiers
            .get(m)
            .or_else(|| self.modifiers.get(m))
            .unwrap_or("")
    }

    pub(crate) fn punctuation_grapheme(&self, p: Punct) -> &str {
        let p = self.resolve_punctuation(p);
        self.render_punctuation
            .get(p)
            .or_else(|| self.punctuation.get(p))
            .unwrap_or("")
    }

    pub(crate) fn digit_grapheme(&self, d: u8) -> &str {
        self.digits.get(d as usize).map(String::as_str).unwrap_or("")
    }
}
