//! Property-based checks over arbitrary Devanagari-range input.

use proptest::prelude::*;

use super::script;
use crate::convert::explain::explain;
use crate::convert::transliterate;
use crate::segment::segment;

fn devanagari_text() -> impl Strategy<Value = String> {
    "[\u{0900}-\u{097F} a-z,.]{0,24}"
}

fn ascii_text() -> impl Strategy<Value = String> {
    "[ -~]{0,32}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn segments_tile_the_input(text in devanagari_text()) {
        let de = script("de");
        let segments = segment(&text, &de);
        let mut pos = 0;
        for seg in &segments {
            prop_assert_eq!(seg.span.start, pos);
            prop_assert!(seg.span.end > seg.span.start);
            pos = seg.span.end;
        }
        prop_assert_eq!(pos, text.len());
        prop_assert_eq!(segments.is_empty(), text.is_empty());
    }

    #[test]
    fn conversion_is_deterministic(text in devanagari_text()) {
        let (de, ta) = (script("de"), script("ta"));
        prop_assert_eq!(transliterate(&text, &de, &ta), transliterate(&text, &de, &ta));
    }

    #[test]
    fn explain_output_matches_conversion(text in devanagari_text()) {
        let (de, kn) = (script("de"), script("kn"));
        let result = explain(&text, &de, &kn);
        prop_assert_eq!(&result.output, &transliterate(&text, &de, &kn));
        let joined: String = result.units.iter().map(|u| u.rendered.as_str()).collect();
        prop_assert_eq!(joined, result.output);
    }

    #[test]
    fn ascii_passes_between_brahmic_scripts(text in ascii_text()) {
        let (de, kn) = (script("de"), script("kn"));
        prop_assert_eq!(transliterate(&text, &de, &kn), text);
    }
}
