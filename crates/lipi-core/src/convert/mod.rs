//! Text conversion between two loaded scripts.
//!
//! segment → `to_ir` → `from_ir` → render. A unit whose identities the
//! source table does not define is copied through as its input text.

pub mod explain;
#[cfg(test)]
mod tests;

use std::borrow::Cow;

use tracing::{debug, debug_span};

use crate::ir::{from_ir_traced, to_ir, IrUnit, Substitution};
use crate::registry::{self, Registry};
use crate::render::render;
use crate::script::ScriptDefinition;
use crate::segment::{segment, Segment};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("script not loaded: {0}")]
    ScriptNotLoaded(String),
}

/// Output text plus every fallback substitution made while writing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub text: String,
    pub substitutions: Vec<Substitution>,
}

/// Source units read as IR. Unmappable units degrade to their input text.
pub(crate) fn read_ir<'a>(
    text: &'a str,
    segments: &[Segment<'a>],
    source: &ScriptDefinition,
) -> Vec<IrUnit<'a>> {
    let _span = debug_span!("to_ir", script = source.code(), units = segments.len()).entered();
    segments
        .iter()
        .map(|seg| match to_ir(&seg.unit, source) {
            Ok(ir) => ir,
            Err(e) => {
                debug!(error = %e, span = ?seg.span, "copying unmappable unit");
                IrUnit::Literal {
                    text: Cow::Borrowed(&text[seg.span.clone()]),
                }
            }
        })
        .collect()
}

/// Convert `text` from `source` to `target`.
pub fn transliterate(text: &str, source: &ScriptDefinition, target: &ScriptDefinition) -> String {
    transliterate_traced(text, source, target).text
}

/// [`transliterate`], also returning the fallback substitutions.
pub fn transliterate_traced(
    text: &str,
    source: &ScriptDefinition,
    target: &ScriptDefinition,
) -> Conversion {
    let _span = debug_span!("transliterate", from = source.code(), to = target.code()).entered();
    let segments = segment(text, source);
    let ir = read_ir(text, &segments, source);
    let mut substitutions = Vec::new();
    let units: Vec<_> = ir
        .iter()
        .map(|unit| from_ir_traced(unit, target, &mut substitutions))
        .collect();
    Conversion {
        text: render(&units, target),
        substitutions,
    }
}

impl Registry {
    /// Convert between two loaded scripts (codes or aliases).
    pub fn parivartak(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ConversionError> {
        let source = self.get(source_lang)?;
        let target = self.get(target_lang)?;
        Ok(transliterate(text, &source, &target))
    }

    pub fn parivartak_traced(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Conversion, ConversionError> {
        let source = self.get(source_lang)?;
        let target = self.get(target_lang)?;
        Ok(transliterate_traced(text, &source, &target))
    }
}

/// Convert with the process-wide registry. Both scripts must have been
/// loaded with [`crate::load_lang`].
pub fn parivartak(
    text: &str,
    source_lang: &str,
    target_lang: &str,
) -> Result<String, ConversionError> {
    registry::global().parivartak(text, source_lang, target_lang)
}

pub fn parivartak_traced(
    text: &str,
    source_lang: &str,
    target_lang: &str,
) -> Result<Conversion, ConversionError> {
    registry::global().parivartak_traced(text, source_lang, target_lang)
}
