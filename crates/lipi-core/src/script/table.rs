//! Script tables compiled into the binary.

/// `(code, toml)` for every embedded script. `build.rs` checks each file.
pub const EMBEDDED: &[(&str, &str)] = &[
    ("bn", include_str!("data/bn.toml")),
    ("de", include_str!("data/de.toml")),
    ("gu", include_str!("data/gu.toml")),
    ("kn", include_str!("data/kn.toml")),
    ("ml", include_str!("data/ml.toml")),
    ("nr", include_str!("data/nr.toml")),
    ("or", include_str!("data/or.toml")),
    ("pa", include_str!("data/pa.toml")),
    ("ro", include_str!("data/ro.toml")),
    ("ta", include_str!("data/ta.toml")),
    ("te", include_str!("data/te.toml")),
];

/// Embedded TOML for `code`, if any.
pub fn embedded(code: &str) -> Option<&'static str> {
    EMBEDDED
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, toml)| *toml)
}
