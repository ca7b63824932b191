//! Splitting raw text into orthographic units of one script.
//!
//! A single left-to-right scan over the longest-match tokens of the
//! script's input table. Anything the table does not cover is kept as
//! [`OrthographicUnit::Passthrough`] in place, so output order always
//! follows input order.

use std::borrow::Cow;
use std::ops::Range;

use serde::Serialize;
use tracing::debug_span;

use crate::phoneme::{Consonant, Modifier, Punct, Vowel};
use crate::script::{ScriptDefinition, Token};

/// Vowel state at the end of a consonant cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterVowel {
    /// No mark after the last consonant.
    Bare,
    Sign(Vowel),
    /// Explicitly killed.
    Virama,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrthographicUnit<'a> {
    ConsonantCluster {
        consonants: Vec<Consonant>,
        vowel: ClusterVowel,
        modifier: Option<Modifier>,
    },
    IndependentVowel {
        vowel: Vowel,
        modifier: Option<Modifier>,
    },
    Digit {
        value: u8,
    },
    Punctuation {
        mark: Punct,
    },
    Passthrough {
        text: Cow<'a, str>,
    },
}

impl OrthographicUnit<'_> {
    /// Clusters and independent vowels; these make up words.
    pub fn is_letter(&self) -> bool {
        matches!(
            self,
            OrthographicUnit::ConsonantCluster { .. } | OrthographicUnit::IndependentVowel { .. }
        )
    }
}

/// A unit with the byte range of the input it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment<'a> {
    pub unit: OrthographicUnit<'a>,
    pub span: Range<usize>,
}

/// A letter waiting for an optional trailing modifier.
#[derive(Debug)]
enum Pending {
    Cluster(Vec<Consonant>, ClusterVowel),
    Vowel(Vowel),
}

impl Pending {
    fn into_unit<'a>(self, modifier: Option<Modifier>) -> OrthographicUnit<'a> {
        match self {
            Pending::Cluster(consonants, vowel) => OrthographicUnit::ConsonantCluster {
                consonants,
                vowel,
                modifier,
            },
            Pending::Vowel(vowel) => OrthographicUnit::IndependentVowel { vowel, modifier },
        }
    }
}

#[derive(Debug)]
enum State {
    Scanning,
    ConsonantOpen {
        start: usize,
        consonants: Vec<Consonant>,
    },
    AwaitingNextConsonant {
        start: usize,
        consonants: Vec<Consonant>,
    },
    Closed {
        start: usize,
        pending: Pending,
    },
}

struct Segmenter<'a, 's> {
    text: &'a str,
    script: &'s ScriptDefinition,
    state: State,
    out: Vec<Segment<'a>>,
}

/// Split `text` into units of `script`.
pub fn segment<'a>(text: &'a str, script: &ScriptDefinition) -> Vec<Segment<'a>> {
    let _span = debug_span!("segment", script = script.code(), bytes = text.len()).entered();
    let mut seg = Segmenter {
        text,
        script,
        state: State::Scanning,
        out: Vec::new(),
    };
    let mut pos = 0;
    while pos < text.len() {
        let rest = &text[pos..];
        let cluster_open = matches!(seg.state, State::ConsonantOpen { .. });
        match script.input().longest_match(rest, cluster_open) {
            Some((token, len)) => {
                seg.accept(token, pos, pos + len);
                pos += len;
            }
            None => {
                let len = rest.chars().next().map_or(1, char::len_utf8);
                seg.close(pos);
                seg.passthrough(pos, pos + len);
                pos += len;
            }
        }
    }
    seg.close(text.len());
    seg.out
}

impl<'a> Segmenter<'a, '_> {
    fn push(&mut self, span: Range<usize>, unit: OrthographicUnit<'a>) {
        self.out.push(Segment { unit, span });
    }

    /// Emit `text[start..end]` verbatim, merging with a directly preceding
    /// passthrough.
    fn passthrough(&mut self, start: usize, end: usize) {
        if let Some(last) = self.out.last_mut() {
            if let OrthographicUnit::Passthrough { text } = &mut last.unit {
                if last.span.end == start {
                    last.span.end = end;
                    *text = Cow::Borrowed(&self.text[last.span.clone()]);
                    return;
                }
            }
        }
        self.push(
            start..end,
            OrthographicUnit::Passthrough {
                text: Cow::Borrowed(&self.text[start..end]),
            },
        );
    }

    /// Finish whatever is open; `at` is where the next token begins.
    fn close(&mut self, at: usize) {
        match std::mem::replace(&mut self.state, State::Scanning) {
            State::Scanning => {}
            State::ConsonantOpen { start, consonants } => self.push(
                start..at,
                Pending::Cluster(consonants, ClusterVowel::Bare).into_unit(None),
            ),
            State::AwaitingNextConsonant { start, consonants } => self.push(
                start..at,
                Pending::Cluster(consonants, ClusterVowel::Virama).into_unit(None),
            ),
            State::Closed { start, pending } => self.push(start..at, pending.into_unit(None)),
        }
    }

    fn accept(&mut self, token: Token, start: usize, end: usize) {
        match std::mem::replace(&mut self.state, State::Scanning) {
            State::Scanning => self.scan(token, start, end),

            State::ConsonantOpen {
                start: open,
                mut consonants,
            } => match token {
                Token::Virama => {
                    self.state = State::AwaitingNextConsonant {
                        start: open,
                        consonants,
                    }
                }
                Token::VowelSign(v) => {
                    self.state = State::Closed {
                        start: open,
                        pending: Pending::Cluster(consonants, ClusterVowel::Sign(v)),
                    }
                }
                Token::Modifier(m) => self.push(
                    open..end,
                    Pending::Cluster(consonants, ClusterVowel::Bare).into_unit(Some(m)),
                ),
                Token::Nukta => match consonants.last().and_then(|c| c.with_nukta()) {
                    Some(nukta_form) => {
                        if let Some(last) = consonants.last_mut() {
                            *last = nukta_form;
                        }
                        self.state = State::ConsonantOpen {
                            start: open,
                            consonants,
                        };
                    }
                    None => {
                        self.state = State::ConsonantOpen {
                            start: open,
                            consonants,
                        };
                        self.close(start);
                        self.passthrough(start, end);
                    }
                },
                Token::Consonant(c) if self.script.inherent_explicit() => {
                    consonants.push(c);
                    self.state = State::ConsonantOpen {
                        start: open,
                        consonants,
                    };
                }
                other => {
                    self.state = State::ConsonantOpen {
                        start: open,
                        consonants,
                    };
                    self.close(start);
                    self.scan(other, start, end);
                }
            },

            State::AwaitingNextConsonant {
                start: open,
                mut consonants,
            } => match token {
                Token::Consonant(c) => {
                    consonants.push(c);
                    self.state = State::ConsonantOpen {
                        start: open,
                        consonants,
                    };
                }
                Token::DeadConsonant(c) => {
                    consonants.push(c);
                    self.push(
                        open..end,
                        Pending::Cluster(consonants, ClusterVowel::Virama).into_unit(None),
                    );
                }
                other => {
                    self.push(
                        open..start,
                        Pending::Cluster(consonants, ClusterVowel::Virama).into_unit(None),
                    );
                    self.scan(other, start, end);
                }
            },

            State::Closed {
                start: open,
                pending,
            } => match token {
                Token::Modifier(m) => self.push(open..end, pending.into_unit(Some(m))),
                other => {
                    self.push(open..start, pending.into_unit(None));
                    self.scan(other, start, end);
                }
            },
        }
    }

    /// Handle a token with nothing open.
    fn scan(&mut self, token: Token, start: usize, end: usize) {
        match token {
            Token::Consonant(c) => {
                self.state = State::ConsonantOpen {
                    start,
                    consonants: vec![c],
                }
            }
            Token::DeadConsonant(c) => self.push(
                start..end,
                Pending::Cluster(vec![c], ClusterVowel::Virama).into_unit(None),
            ),
            Token::Vowel(v) => {
                self.state = State::Closed {
                    start,
                    pending: Pending::Vowel(v),
                }
            }
            Token::Digit(value) => self.push(start..end, OrthographicUnit::Digit { value }),
            Token::Punctuation(mark) => {
                self.push(start..end, OrthographicUnit::Punctuation { mark })
            }
            Token::VowelSign(_) | Token::Virama | Token::Nukta | Token::Modifier(_) => {
                self.passthrough(start, end)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{embedded, ScriptDefinition};

    fn script(code: &str) -> ScriptDefinition {
        ScriptDefinition::from_toml(embedded(code).unwrap()).unwrap()
    }

    fn units<'a>(text: &'a str, code: &str) -> Vec<OrthographicUnit<'a>> {
        segment(text, &script(code))
            .into_iter()
            .map(|s| s.unit)
            .collect()
    }

    fn cluster<'a>(
        consonants: &[Consonant],
        vowel: ClusterVowel,
        modifier: Option<Modifier>,
    ) -> OrthographicUnit<'a> {
        OrthographicUnit::ConsonantCluster {
            consonants: consonants.to_vec(),
            vowel,
            modifier,
        }
    }

    fn passthrough(text: &str) -> OrthographicUnit<'_> {
        OrthographicUnit::Passthrough {
            text: Cow::Borrowed(text),
        }
    }

    #[test]
    fn empty_input() {
        assert!(segment("", &script("de")).is_empty());
    }

    #[test]
    fn consonant_with_sign_then_bare() {
        assert_eq!(
            units("राम", "de"),
            vec![
                cluster(&[Consonant::Ra], ClusterVowel::Sign(Vowel::Aa), None),
                cluster(&[Consonant::Ma], ClusterVowel::Bare, None),
            ]
        );
    }

    #[test]
    fn conjunct_joins_across_virama() {
        assert_eq!(
            units("क्षि", "de"),
            vec![cluster(
                &[Consonant::Ka, Consonant::Ssa],
                ClusterVowel::Sign(Vowel::I),
                None
            )]
        );
    }

    #[test]
    fn trailing_virama_kills_cluster() {
        let segs = segment("वाक्", &script("de"));
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].unit, cluster(&[Consonant::Ka], ClusterVowel::Virama, None));
        assert_eq!(segs[1].span, "वा".len().."वाक्".len());
    }

    #[test]
    fn modifier_attaches_to_letter() {
        assert_eq!(
            units("अंक", "de"),
            vec![
                OrthographicUnit::IndependentVowel {
                    vowel: Vowel::A,
                    modifier: Some(Modifier::Anusvara),
                },
                cluster(&[Consonant::Ka], ClusterVowel::Bare, None),
            ]
        );
        assert_eq!(
            units("सः", "de"),
            vec![cluster(&[Consonant::Sa], ClusterVowel::Bare, Some(Modifier::Visarga))]
        );
    }

    #[test]
    fn second_modifier_passes_through() {
        assert_eq!(
            units("कंं", "de"),
            vec![
                cluster(&[Consonant::Ka], ClusterVowel::Bare, Some(Modifier::Anusvara)),
                passthrough("ं"),
            ]
        );
    }

    #[test]
    fn decomposed_nukta_becomes_nukta_consonant() {
        // Precomposed and decomposed spellings read the same.
        assert_eq!(units("\u{0958}", "de"), units("\u{0915}\u{093C}", "de"));
        // Gurmukhi lists no nnna; nukta on na still reads as nnna.
        assert_eq!(
            units("ਨ਼", "pa"),
            vec![cluster(&[Consonant::Nnna], ClusterVowel::Bare, None)]
        );
        // Nukta on a consonant without a nukta form is left as is.
        assert_eq!(
            units("ਮ਼", "pa"),
            vec![
                cluster(&[Consonant::Ma], ClusterVowel::Bare, None),
                passthrough("਼"),
            ]
        );
    }

    #[test]
    fn stray_marks_pass_through() {
        assert_eq!(units("ा", "de"), vec![passthrough("ा")]);
        assert_eq!(
            units("क्ा", "de"),
            vec![
                cluster(&[Consonant::Ka], ClusterVowel::Virama, None),
                passthrough("ा"),
            ]
        );
    }

    #[test]
    fn unknown_text_is_merged_and_kept_in_place() {
        let segs = segment("क abc ख", &script("de"));
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[1].unit, passthrough(" abc "));
        assert_eq!(segs[1].span, "क".len().."क abc ".len());
    }

    #[test]
    fn digits_and_punctuation() {
        assert_eq!(
            units("१२।", "de"),
            vec![
                OrthographicUnit::Digit { value: 1 },
                OrthographicUnit::Digit { value: 2 },
                OrthographicUnit::Punctuation { mark: Punct::Danda },
            ]
        );
    }

    #[test]
    fn malayalam_chillu_is_a_killed_cluster() {
        assert_eq!(
            units("അവൻ", "ml"),
            vec![
                OrthographicUnit::IndependentVowel {
                    vowel: Vowel::A,
                    modifier: None,
                },
                cluster(&[Consonant::Va], ClusterVowel::Bare, None),
                cluster(&[Consonant::Na], ClusterVowel::Virama, None),
            ]
        );
    }

    #[test]
    fn bengali_khanda_ta_ends_a_conjunct() {
        assert_eq!(
            units("ক্ৎ", "bn"),
            vec![cluster(&[Consonant::Ka, Consonant::Ta], ClusterVowel::Virama, None)]
        );
    }

    #[test]
    fn latin_consonants_join_until_a_vowel() {
        assert_eq!(
            units("kṣetra", "ro"),
            vec![
                cluster(
                    &[Consonant::Ka, Consonant::Ssa],
                    ClusterVowel::Sign(Vowel::E),
                    None
                ),
                cluster(
                    &[Consonant::Ta, Consonant::Ra],
                    ClusterVowel::Sign(Vowel::A),
                    None
                ),
            ]
        );
        assert_eq!(
            units("vāk", "ro"),
            vec![
                cluster(&[Consonant::Va], ClusterVowel::Sign(Vowel::Aa), None),
                cluster(&[Consonant::Ka], ClusterVowel::Bare, None),
            ]
        );
    }

    #[test]
    fn latin_aspirates_are_single_consonants() {
        assert_eq!(
            units("samajhnaa", "nr"),
            vec![
                cluster(&[Consonant::Sa], ClusterVowel::Sign(Vowel::A), None),
                cluster(&[Consonant::Ma], ClusterVowel::Sign(Vowel::A), None),
                cluster(
                    &[Consonant::Jha, Consonant::Na],
                    ClusterVowel::Sign(Vowel::Aa),
                    None
                ),
            ]
        );
    }

    #[test]
    fn spans_cover_input_in_order() {
        let text = "नमस्ते, दुनिया!";
        let segs = segment(text, &script("de"));
        let mut pos = 0;
        for seg in &segs {
            assert_eq!(seg.span.start, pos);
            pos = seg.span.end;
        }
        assert_eq!(pos, text.len());
    }
}
