//! Rebuilding target text from target-script units.

use tracing::debug_span;

use crate::phoneme::Vowel;
use crate::script::{SchwaPolicy, SchwaRules, ScriptDefinition};
use crate::segment::{ClusterVowel, OrthographicUnit};

/// Render units in canonical encoding order: consonants joined by virama,
/// then vowel sign or virama, then modifier.
pub fn render(units: &[OrthographicUnit<'_>], target: &ScriptDefinition) -> String {
    let _span = debug_span!("render", script = target.code(), units = units.len()).entered();
    render_pieces(units, target).concat()
}

/// The text each unit renders to, in order; concatenated they equal
/// [`render`].
pub fn render_pieces(units: &[OrthographicUnit<'_>], target: &ScriptDefinition) -> Vec<String> {
    let deleted = schwa_deletions(units, target.schwa());
    let mut pieces = Vec::with_capacity(units.len());
    for (i, unit) in units.iter().enumerate() {
        let after_a = i > 0 && ends_in_a(&units[i - 1], deleted[i - 1], target);
        let mut piece = String::new();
        render_unit(&mut piece, unit, deleted[i], after_a, target);
        pieces.push(piece);
    }
    pieces
}

fn render_unit(
    out: &mut String,
    unit: &OrthographicUnit<'_>,
    delete_schwa: bool,
    after_a: bool,
    target: &ScriptDefinition,
) {
    match unit {
        OrthographicUnit::ConsonantCluster {
            consonants,
            vowel,
            modifier,
        } => {
            for (i, &c) in consonants.iter().enumerate() {
                if i > 0 {
                    out.push_str(target.virama_or_empty());
                }
                out.push_str(target.consonant_grapheme(c));
            }
            match *vowel {
                ClusterVowel::Bare if delete_schwa => out.push_str(target.virama_or_empty()),
                ClusterVowel::Bare => out.push_str(target.inherent_sign()),
                ClusterVowel::Sign(v) => out.push_str(target.sign_grapheme(v)),
                ClusterVowel::Virama => out.push_str(target.virama_or_empty()),
            }
            if let Some(m) = modifier {
                out.push_str(target.modifier_grapheme(*m));
            }
        }
        OrthographicUnit::IndependentVowel { vowel, modifier } => {
            let hiatus = after_a.then(|| target.hiatus_grapheme(*vowel)).flatten();
            out.push_str(hiatus.unwrap_or_else(|| target.vowel_grapheme(*vowel)));
            if let Some(m) = modifier {
                out.push_str(target.modifier_grapheme(*m));
            }
        }
        OrthographicUnit::Digit { value } => out.push_str(target.digit_grapheme(*value)),
        OrthographicUnit::Punctuation { mark } => out.push_str(target.punctuation_grapheme(*mark)),
        OrthographicUnit::Passthrough { text } => out.push_str(text),
    }
}

/// Whether `unit` renders ending in a written inherent vowel.
fn ends_in_a(unit: &OrthographicUnit<'_>, schwa_deleted: bool, target: &ScriptDefinition) -> bool {
    match unit {
        OrthographicUnit::ConsonantCluster {
            vowel, modifier: None, ..
        } => {
            let written = match *vowel {
                ClusterVowel::Bare => !schwa_deleted,
                ClusterVowel::Sign(v) => target.resolve_sign(v) == Vowel::A,
                ClusterVowel::Virama => false,
            };
            written && !target.inherent_sign().is_empty()
        }
        OrthographicUnit::IndependentVowel {
            vowel,
            modifier: None,
        } => target.resolve_vowel(*vowel) == Vowel::A,
        _ => false,
    }
}

/// Which bare clusters lose their inherent vowel under `rules`.
///
/// Words are maximal runs of letters. Within a word, scanning right to
/// left: the last unit drops its `a` (`word_final`, words of two or more
/// units); a non-initial cluster drops it when the unit before it ends in a
/// vowel and the unit after it is a single consonant carrying one
/// (`medial`). Conjuncts keep theirs under `retain_in_conjunct`.
pub(crate) fn schwa_deletions(units: &[OrthographicUnit<'_>], rules: &SchwaRules) -> Vec<bool> {
    let mut deleted = vec![false; units.len()];
    if rules.policy != SchwaPolicy::ContextualDelete {
        return deleted;
    }
    let mut i = 0;
    while i < units.len() {
        if !units[i].is_letter() {
            i += 1;
            continue;
        }
        let start = i;
        while i < units.len() && units[i].is_letter() {
            i += 1;
        }
        mark_word(&units[start..i], rules, &mut deleted[start..i]);
    }
    deleted
}

fn mark_word(word: &[OrthographicUnit<'_>], rules: &SchwaRules, deleted: &mut [bool]) {
    let len = word.len();
    if len < 2 {
        return;
    }
    for pos in (1..len).rev() {
        if !deletable(&word[pos], rules) {
            continue;
        }
        if pos == len - 1 {
            deleted[pos] = rules.word_final;
        } else if rules.medial
            && ends_in_vowel(&word[pos - 1])
            && opens_with_single_consonant(&word[pos + 1], deleted[pos + 1])
        {
            deleted[pos] = true;
        }
    }
}

fn deletable(unit: &OrthographicUnit<'_>, rules: &SchwaRules) -> bool {
    match unit {
        OrthographicUnit::ConsonantCluster {
            consonants,
            vowel: ClusterVowel::Bare,
            modifier: None,
        } => !rules.retain_in_conjunct || consonants.len() == 1,
        _ => false,
    }
}

fn ends_in_vowel(unit: &OrthographicUnit<'_>) -> bool {
    !matches!(
        unit,
        OrthographicUnit::ConsonantCluster {
            vowel: ClusterVowel::Virama,
            ..
        }
    )
}

fn opens_with_single_consonant(unit: &OrthographicUnit<'_>, schwa_deleted: bool) -> bool {
    match unit {
        OrthographicUnit::ConsonantCluster {
            consonants, vowel, ..
        } if consonants.len() == 1 => match vowel {
            ClusterVowel::Bare => !schwa_deleted,
            ClusterVowel::Sign(_) => true,
            ClusterVowel::Virama => false,
        },
        _ => false,
    }
}
