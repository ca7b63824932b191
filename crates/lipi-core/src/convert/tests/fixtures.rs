//! Conversions listed in `tests/fixtures/conversions.toml`.

use serde::Deserialize;

use super::loaded_registry;

const CONVERSIONS_TOML: &str = include_str!("../../../tests/fixtures/conversions.toml");

#[derive(Debug, Deserialize)]
struct Fixtures {
    case: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    from: String,
    to: String,
    input: String,
    expected: String,
}

#[test]
fn test_fixture_conversions() {
    let fixtures: Fixtures = toml::from_str(CONVERSIONS_TOML).unwrap();
    assert!(!fixtures.case.is_empty());
    let registry = loaded_registry();

    let mut failures = Vec::new();
    for case in &fixtures.case {
        let actual = registry
            .parivartak(&case.input, &case.from, &case.to)
            .unwrap();
        if actual != case.expected {
            failures.push(format!(
                "{} -> {}: {:?} gave {:?}, expected {:?}",
                case.from, case.to, case.input, actual, case.expected
            ));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn test_fixture_pairs_use_embedded_codes() {
    let fixtures: Fixtures = toml::from_str(CONVERSIONS_TOML).unwrap();
    let registry = loaded_registry();
    for case in &fixtures.case {
        assert!(registry.is_loaded(&case.from), "{}", case.from);
        assert!(registry.is_loaded(&case.to), "{}", case.to);
    }
}
