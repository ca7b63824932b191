//! Script-neutral intermediate representation.
//!
//! `to_ir` reads a source unit as phonemes; `from_ir` writes phonemes as a
//! target unit, substituting the nearest available identity where the
//! target lacks one.

use std::borrow::Cow;

use serde::Serialize;
use tracing::debug;

use crate::phoneme::{Consonant, Modifier, Phoneme, Punct, Vowel};
use crate::script::{SchwaPolicy, ScriptDefinition};
use crate::segment::{ClusterVowel, OrthographicUnit};

/// Vowel carried by a syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Nucleus {
    /// The inherent `a`, written or not depending on the script.
    Inherent,
    Vowel(Vowel),
    /// No vowel; the consonants end the syllable.
    Silent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IrUnit<'a> {
    Syllable {
        consonants: Vec<Consonant>,
        nucleus: Nucleus,
        modifier: Option<Modifier>,
    },
    Vowel {
        vowel: Vowel,
        modifier: Option<Modifier>,
    },
    Digit {
        value: u8,
    },
    Punctuation {
        mark: Punct,
    },
    Literal {
        text: Cow<'a, str>,
    },
}

/// A unit names an identity its own script does not define.
///
/// Never leaves the crate's conversion path: the unit is copied through
/// as a literal instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} {key} is not defined by script {script}")]
pub struct UnmappableGrapheme {
    pub script: String,
    pub kind: &'static str,
    pub key: &'static str,
}

/// One identity written with another's grapheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Substitution {
    pub kind: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}

fn check<P: Phoneme>(
    source: &ScriptDefinition,
    id: P,
    known: bool,
) -> Result<(), UnmappableGrapheme> {
    if known {
        Ok(())
    } else {
        Err(UnmappableGrapheme {
            script: source.code().to_string(),
            kind: P::KIND,
            key: id.key(),
        })
    }
}

fn check_modifier(
    source: &ScriptDefinition,
    modifier: Option<Modifier>,
) -> Result<(), UnmappableGrapheme> {
    match modifier {
        Some(m) => check(source, m, source.recognizes_modifier(m)),
        None => Ok(()),
    }
}

/// Read a source unit as phonemes.
pub fn to_ir<'a>(
    unit: &OrthographicUnit<'a>,
    source: &ScriptDefinition,
) -> Result<IrUnit<'a>, UnmappableGrapheme> {
    match unit {
        OrthographicUnit::ConsonantCluster {
            consonants,
            vowel,
            modifier,
        } => {
            for &c in consonants {
                check(source, c, source.recognizes_consonant(c))?;
            }
            check_modifier(source, *modifier)?;
            let nucleus = match *vowel {
                ClusterVowel::Sign(v) => {
                    check(source, v, source.recognizes_sign(v))?;
                    if v == Vowel::A {
                        Nucleus::Inherent
                    } else {
                        Nucleus::Vowel(v)
                    }
                }
                ClusterVowel::Virama => Nucleus::Silent,
                ClusterVowel::Bare if !source.inherent_explicit() => Nucleus::Inherent,
                // Schwa-deleting spellings drop final and medial `a`; read it back.
                ClusterVowel::Bare if source.schwa().policy == SchwaPolicy::ContextualDelete => {
                    Nucleus::Inherent
                }
                ClusterVowel::Bare => Nucleus::Silent,
            };
            Ok(IrUnit::Syllable {
                consonants: consonants.clone(),
                nucleus,
                modifier: *modifier,
            })
        }
        OrthographicUnit::IndependentVowel { vowel, modifier } => {
            check(source, *vowel, source.recognizes_vowel(*vowel))?;
            check_modifier(source, *modifier)?;
            Ok(IrUnit::Vowel {
                vowel: *vowel,
                modifier: *modifier,
            })
        }
        OrthographicUnit::Digit { value } => Ok(IrUnit::Digit { value: *value }),
        OrthographicUnit::Punctuation { mark } => {
            check(source, *mark, source.recognizes_punctuation(*mark))?;
            Ok(IrUnit::Punctuation { mark: *mark })
        }
        OrthographicUnit::Passthrough { text } => Ok(IrUnit::Literal { text: text.clone() }),
    }
}

/// Write phonemes as a target unit. Never drops a unit.
pub fn from_ir<'a>(ir: &IrUnit<'a>, target: &ScriptDefinition) -> OrthographicUnit<'a> {
    from_ir_traced(ir, target, &mut Vec::new())
}

fn record<P: Phoneme>(
    target: &ScriptDefinition,
    trace: &mut Vec<Substitution>,
    kind: &'static str,
    from: P,
    to: P,
) -> P {
    if from != to {
        debug!(
            script = target.code(),
            kind,
            from = from.key(),
            to = to.key(),
            "fallback substitution"
        );
        trace.push(Substitution {
            kind,
            from: from.key(),
            to: to.key(),
        });
    }
    to
}

/// [`from_ir`], recording every fallback substitution in `trace`.
pub fn from_ir_traced<'a>(
    ir: &IrUnit<'a>,
    target: &ScriptDefinition,
    trace: &mut Vec<Substitution>,
) -> OrthographicUnit<'a> {
    match ir {
        IrUnit::Syllable {
            consonants,
            nucleus,
            modifier,
        } => {
            let consonants = consonants
                .iter()
                .map(|&c| record(target, trace, Consonant::KIND, c, target.resolve_consonant(c)))
                .collect();
            let vowel = match *nucleus {
                Nucleus::Inherent => ClusterVowel::Bare,
                Nucleus::Silent => ClusterVowel::Virama,
                Nucleus::Vowel(v) => {
                    ClusterVowel::Sign(record(target, trace, "vowel_sign", v, target.resolve_sign(v)))
                }
            };
            let modifier = modifier
                .map(|m| record(target, trace, Modifier::KIND, m, target.resolve_modifier(m)));
            OrthographicUnit::ConsonantCluster {
                consonants,
                vowel,
                modifier,
            }
        }
        IrUnit::Vowel { vowel, modifier } => OrthographicUnit::IndependentVowel {
            vowel: record(target, trace, Vowel::KIND, *vowel, target.resolve_vowel(*vowel)),
            modifier: modifier
                .map(|m| record(target, trace, Modifier::KIND, m, target.resolve_modifier(m))),
        },
        IrUnit::Digit { value } => OrthographicUnit::Digit { value: *value },
        IrUnit::Punctuation { mark } => OrthographicUnit::Punctuation {
            mark: record(target, trace, Punct::KIND, *mark, target.resolve_punctuation(*mark)),
        },
        IrUnit::Literal { text } => OrthographicUnit::Passthrough { text: text.clone() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::embedded;

    fn script(code: &str) -> ScriptDefinition {
        ScriptDefinition::from_toml(embedded(code).unwrap()).unwrap()
    }

    fn cluster(
        consonants: &[Consonant],
        vowel: ClusterVowel,
    ) -> OrthographicUnit<'static> {
        OrthographicUnit::ConsonantCluster {
            consonants: consonants.to_vec(),
            vowel,
            modifier: None,
        }
    }

    fn nucleus(ir: IrUnit<'_>) -> Nucleus {
        match ir {
            IrUnit::Syllable { nucleus, .. } => nucleus,
            other => panic!("not a syllable: {other:?}"),
        }
    }

    #[test]
    fn bare_cluster_reading_depends_on_script() {
        let bare = cluster(&[Consonant::Ka], ClusterVowel::Bare);
        assert_eq!(nucleus(to_ir(&bare, &script("de")).unwrap()), Nucleus::Inherent);
        // IAST writes every `a`; a bare consonant is dead.
        assert_eq!(nucleus(to_ir(&bare, &script("ro")).unwrap()), Nucleus::Silent);
        // Normal drops `a` at word end; a bare consonant keeps it.
        assert_eq!(nucleus(to_ir(&bare, &script("nr")).unwrap()), Nucleus::Inherent);
    }

    #[test]
    fn explicit_a_sign_is_inherent() {
        let ka = cluster(&[Consonant::Ka], ClusterVowel::Sign(Vowel::A));
        assert_eq!(nucleus(to_ir(&ka, &script("ro")).unwrap()), Nucleus::Inherent);
        let ki = cluster(&[Consonant::Ka], ClusterVowel::Sign(Vowel::I));
        assert_eq!(nucleus(to_ir(&ki, &script("de")).unwrap()), Nucleus::Vowel(Vowel::I));
        let k = cluster(&[Consonant::Ka], ClusterVowel::Virama);
        assert_eq!(nucleus(to_ir(&k, &script("de")).unwrap()), Nucleus::Silent);
    }

    #[test]
    fn unknown_identity_is_unmappable() {
        // Tamil has no letter for gha.
        let gha = cluster(&[Consonant::Gha], ClusterVowel::Bare);
        let err = to_ir(&gha, &script("ta")).unwrap_err();
        assert_eq!(err.kind, "consonant");
        assert_eq!(err.key, "gha");
        assert_eq!(err.script, "ta");
    }

    #[test]
    fn passthrough_becomes_literal() {
        let unit = OrthographicUnit::Passthrough {
            text: Cow::Borrowed("abc"),
        };
        assert_eq!(
            to_ir(&unit, &script("de")).unwrap(),
            IrUnit::Literal {
                text: Cow::Borrowed("abc")
            }
        );
    }

    #[test]
    fn from_ir_substitutes_and_records() {
        let ir = IrUnit::Syllable {
            consonants: vec![Consonant::Gha],
            nucleus: Nucleus::Vowel(Vowel::Aa),
            modifier: Some(Modifier::Chandrabindu),
        };
        let mut trace = Vec::new();
        let unit = from_ir_traced(&ir, &script("ta"), &mut trace);
        assert_eq!(
            unit,
            OrthographicUnit::ConsonantCluster {
                consonants: vec![Consonant::Ka],
                vowel: ClusterVowel::Sign(Vowel::Aa),
                modifier: Some(Modifier::Anusvara),
            }
        );
        assert_eq!(
            trace,
            vec![
                Substitution {
                    kind: "consonant",
                    from: "gha",
                    to: "ka"
                },
                Substitution {
                    kind: "modifier",
                    from: "chandrabindu",
                    to: "anusvara"
                },
            ]
        );
    }

    #[test]
    fn from_ir_without_fallback_records_nothing() {
        let ir = IrUnit::Vowel {
            vowel: Vowel::Ii,
            modifier: None,
        };
        let mut trace = Vec::new();
        let unit = from_ir_traced(&ir, &script("kn"), &mut trace);
        assert_eq!(
            unit,
            OrthographicUnit::IndependentVowel {
                vowel: Vowel::Ii,
                modifier: None
            }
        );
        assert!(trace.is_empty());
    }

    #[test]
    fn nucleus_maps_back_to_cluster_vowel() {
        let de = script("de");
        let ir = IrUnit::Syllable {
            consonants: vec![Consonant::Ka, Consonant::Ssa],
            nucleus: Nucleus::Silent,
            modifier: None,
        };
        assert_eq!(
            from_ir(&ir, &de),
            cluster(&[Consonant::Ka, Consonant::Ssa], ClusterVowel::Virama)
        );
    }
}
