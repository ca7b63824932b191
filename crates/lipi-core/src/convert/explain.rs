use std::ops::Range;

use serde::Serialize;

use crate::ir::{from_ir_traced, IrUnit, Substitution};
use crate::registry::Registry;
use crate::render::render_pieces;
use crate::script::ScriptDefinition;
use crate::segment::{segment, ClusterVowel, OrthographicUnit};

use super::{read_ir, ConversionError};

/// Every stage of one conversion.
#[derive(Debug, Serialize)]
pub struct ExplainResult<'a> {
    pub source: String,
    pub target: String,
    pub input: &'a str,
    pub units: Vec<ExplainUnit<'a>>,
    pub substitutions: Vec<Substitution>,
    pub output: String,
}

/// One source unit followed through the pipeline.
#[derive(Debug, Serialize)]
pub struct ExplainUnit<'a> {
    pub span: Range<usize>,
    pub raw: &'a str,
    pub source: OrthographicUnit<'a>,
    pub ir: IrUnit<'a>,
    pub target: OrthographicUnit<'a>,
    pub rendered: String,
}

/// Run the full pipeline and keep every intermediate value.
pub fn explain<'a>(
    text: &'a str,
    source: &ScriptDefinition,
    target: &ScriptDefinition,
) -> ExplainResult<'a> {
    let segments = segment(text, source);
    let ir = read_ir(text, &segments, source);
    let mut substitutions = Vec::new();
    let target_units: Vec<_> = ir
        .iter()
        .map(|unit| from_ir_traced(unit, target, &mut substitutions))
        .collect();
    let pieces = render_pieces(&target_units, target);
    let output = pieces.concat();

    let units = segments
        .into_iter()
        .zip(ir)
        .zip(target_units)
        .zip(pieces)
        .map(|(((seg, ir), target), rendered)| ExplainUnit {
            raw: &text[seg.span.clone()],
            span: seg.span,
            source: seg.unit,
            ir,
            target,
            rendered,
        })
        .collect();

    ExplainResult {
        source: source.code().to_string(),
        target: target.code().to_string(),
        input: text,
        units,
        substitutions,
        output,
    }
}

impl Registry {
    pub fn explain<'a>(
        &self,
        text: &'a str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<ExplainResult<'a>, ConversionError> {
        let source = self.get(source_lang)?;
        let target = self.get(target_lang)?;
        Ok(explain(text, &source, &target))
    }
}

fn describe_unit(unit: &OrthographicUnit<'_>) -> String {
    match unit {
        OrthographicUnit::ConsonantCluster {
            consonants,
            vowel,
            modifier,
        } => {
            let mut s = consonants
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join("+");
            match vowel {
                ClusterVowel::Bare => {}
                ClusterVowel::Sign(v) => s.push_str(&format!(" [{v}]")),
                ClusterVowel::Virama => s.push_str(" [virama]"),
            }
            if let Some(m) = modifier {
                s.push_str(&format!(" +{m}"));
            }
            s
        }
        OrthographicUnit::IndependentVowel { vowel, modifier } => match modifier {
            Some(m) => format!("{vowel} +{m}"),
            None => vowel.to_string(),
        },
        OrthographicUnit::Digit { value } => format!("digit {value}"),
        OrthographicUnit::Punctuation { mark } => mark.to_string(),
        OrthographicUnit::Passthrough { text } => format!("{text:?}"),
    }
}

fn pad(s: &str, width: usize) -> String {
    use unicode_width::UnicodeWidthStr;
    let w = UnicodeWidthStr::width(s);
    if w < width {
        format!("{s}{}", " ".repeat(width - w))
    } else {
        s.to_string()
    }
}

/// Format an ExplainResult as human-readable text.
pub fn format_text(result: &ExplainResult<'_>) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== {} -> {}: \"{}\" ({} units) ===\n",
        result.source,
        result.target,
        result.input,
        result.units.len(),
    ));
    for unit in &result.units {
        out.push_str(&format!(
            "  [{:>3},{:>3}) {} {} -> {} {}\n",
            unit.span.start,
            unit.span.end,
            pad(unit.raw, 8),
            pad(&describe_unit(&unit.source), 24),
            pad(&describe_unit(&unit.target), 24),
            unit.rendered,
        ));
    }

    if !result.substitutions.is_empty() {
        out.push_str(&format!(
            "\n=== Substitutions ({}) ===\n",
            result.substitutions.len()
        ));
        for sub in &result.substitutions {
            out.push_str(&format!("  {:<12} {} -> {}\n", sub.kind, sub.from, sub.to));
        }
    }

    out.push_str(&format!("\n=== Output ===\n  {}\n", result.output));
    out
}
