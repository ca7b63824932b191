//! Script-neutral phonetic identities.
//!
//! Every script table is keyed by these identities, never by codepoints.
//! Each kind carries a built-in nearest-neighbour chain used when a target
//! script has no grapheme for an identity (see [`Phoneme::nearest`]).

use std::fmt;

use serde::{Serialize, Serializer};

/// Common surface of the closed identity enums.
pub trait Phoneme: Copy + Eq + std::hash::Hash + fmt::Debug + 'static {
    /// Every identity of this kind, in declaration order.
    const ALL: &'static [Self];
    /// Human-readable kind, used in error messages and explain output.
    const KIND: &'static str;

    /// Table key, e.g. `"kha"`.
    fn key(self) -> &'static str;
    /// Dense index into per-kind lookup vectors.
    fn index(self) -> usize;
    /// Next identity to try when a script lacks this one.
    fn nearest(self) -> Option<Self>;

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.key() == key)
    }
}

macro_rules! inventory {
    (@near) => { None };
    (@near $near:ident) => { Some(Self::$near) };
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident = $key:literal $(-> $near:ident)?,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant,)*
        }

        impl Phoneme for $name {
            const ALL: &'static [Self] = &[$(Self::$variant,)*];
            const KIND: &'static str = $kind;

            fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)*
                }
            }

            fn index(self) -> usize {
                self as usize
            }

            fn nearest(self) -> Option<Self> {
                match self {
                    $(Self::$variant => inventory!(@near $($near)?),)*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.key())
            }
        }
    };
}

inventory! {
    /// Vowel identities. `A` is the inherent vowel.
    Vowel, "vowel" {
        A = "a",
        Aa = "aa" -> A,
        I = "i",
        Ii = "ii" -> I,
        U = "u",
        Uu = "uu" -> U,
        Ri = "ri",
        Rii = "rii" -> Ri,
        Li = "li",
        Lii = "lii" -> Li,
        ECandra = "e_candra" -> E,
        EShort = "e_short" -> E,
        E = "e",
        Ai = "ai",
        OCandra = "o_candra" -> O,
        OShort = "o_short" -> O,
        O = "o",
        Au = "au",
    }
}

inventory! {
    /// Consonant identities, including the nukta forms.
    Consonant, "consonant" {
        Ka = "ka",
        Kha = "kha" -> Ka,
        Ga = "ga" -> Ka,
        Gha = "gha" -> Ga,
        Nga = "nga" -> Na,
        Ca = "ca",
        Cha = "cha" -> Ca,
        Ja = "ja" -> Ca,
        Jha = "jha" -> Ja,
        Nya = "nya" -> Na,
        Tta = "tta",
        Ttha = "ttha" -> Tta,
        Dda = "dda" -> Tta,
        Ddha = "ddha" -> Dda,
        Nna = "nna" -> Na,
        Ta = "ta",
        Tha = "tha" -> Ta,
        Da = "da" -> Ta,
        Dha = "dha" -> Da,
        Na = "na",
        Nnna = "nnna" -> Na,
        Pa = "pa",
        Pha = "pha" -> Pa,
        Ba = "ba" -> Pa,
        Bha = "bha" -> Ba,
        Ma = "ma",
        Ya = "ya",
        Ra = "ra",
        Rra = "rra" -> Ra,
        La = "la",
        Lla = "lla" -> La,
        Llla = "llla" -> Lla,
        Va = "va" -> Ba,
        Sha = "sha" -> Sa,
        Ssa = "ssa" -> Sha,
        Sa = "sa",
        Ha = "ha",
        Qa = "qa" -> Ka,
        Khha = "khha" -> Kha,
        Ghha = "ghha" -> Ga,
        Za = "za" -> Ja,
        Dddha = "dddha" -> Dda,
        Rha = "rha" -> Ddha,
        Fa = "fa" -> Pha,
        Yya = "yya" -> Ya,
    }
}

inventory! {
    /// Renderable vowel modifiers. Nukta is handled by the segmenter and
    /// never reaches the IR.
    Modifier, "modifier" {
        Anusvara = "anusvara",
        Visarga = "visarga",
        Chandrabindu = "chandrabindu" -> Anusvara,
    }
}

inventory! {
    Punct, "punctuation" {
        Danda = "danda",
        DoubleDanda = "double_danda" -> Danda,
        Avagraha = "avagraha",
        Om = "om",
    }
}

/// Table key of the nukta sign in `[modifiers]`.
pub const NUKTA_KEY: &str = "nukta";

impl Consonant {
    /// The consonant a following nukta turns this one into.
    pub fn with_nukta(self) -> Option<Self> {
        match self {
            Self::Ka => Some(Self::Qa),
            Self::Kha => Some(Self::Khha),
            Self::Ga => Some(Self::Ghha),
            Self::Ja => Some(Self::Za),
            Self::Dda => Some(Self::Dddha),
            Self::Ddha => Some(Self::Rha),
            Self::Pha => Some(Self::Fa),
            Self::Ya => Some(Self::Yya),
            Self::Na => Some(Self::Nnna),
            Self::Ra => Some(Self::Rra),
            Self::Lla => Some(Self::Llla),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn assert_chains_terminate<P: Phoneme>() {
        for &p in P::ALL {
            let mut seen = HashSet::new();
            let mut cur = Some(p);
            while let Some(c) = cur {
                assert!(seen.insert(c), "{} chain from {:?} loops", P::KIND, p);
                cur = c.nearest();
            }
        }
    }

    #[test]
    fn nearest_chains_terminate() {
        assert_chains_terminate::<Vowel>();
        assert_chains_terminate::<Consonant>();
        assert_chains_terminate::<Modifier>();
        assert_chains_terminate::<Punct>();
    }

    #[test]
    fn keys_round_trip() {
        for &c in Consonant::ALL {
            assert_eq!(Consonant::from_key(c.key()), Some(c));
        }
        for &v in Vowel::ALL {
            assert_eq!(Vowel::from_key(v.key()), Some(v));
        }
        assert_eq!(Consonant::from_key("kxa"), None);
    }

    #[test]
    fn keys_unique_across_kinds() {
        let mut keys = HashSet::new();
        let all = Vowel::ALL
            .iter()
            .map(|p| p.key())
            .chain(Consonant::ALL.iter().map(|p| p.key()))
            .chain(Modifier::ALL.iter().map(|p| p.key()))
            .chain(Punct::ALL.iter().map(|p| p.key()))
            .chain(std::iter::once(NUKTA_KEY));
        for key in all {
            assert!(keys.insert(key), "duplicate key {key}");
        }
    }

    #[test]
    fn index_matches_position() {
        for (i, &c) in Consonant::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn nukta_forms() {
        assert_eq!(Consonant::Ka.with_nukta(), Some(Consonant::Qa));
        assert_eq!(Consonant::Ddha.with_nukta(), Some(Consonant::Rha));
        assert_eq!(Consonant::Ma.with_nukta(), None);
        assert_eq!(Consonant::Qa.with_nukta(), None);
    }

    #[test]
    fn display_uses_key() {
        assert_eq!(Consonant::Khha.to_string(), "khha");
        assert_eq!(Vowel::ECandra.to_string(), "e_candra");
    }
}
