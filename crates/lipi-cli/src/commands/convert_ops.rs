use std::io::{self, BufRead, BufWriter, Write};

use lipi_core::convert::explain::format_text;
use lipi_core::Registry;

use super::load_all;

/// Convert `text`, or each line of stdin when `text` is `None`.
pub fn convert_cmd(registry: &Registry, from: &str, to: &str, text: Option<&str>, trace: bool) {
    load_all(registry, &[from, to]);

    let run = |line: &str| {
        let conv = die!(registry.parivartak_traced(line, from, to), "Error: {}");
        if trace {
            for sub in &conv.substitutions {
                eprintln!("  {} {} -> {}", sub.kind, sub.from, sub.to);
            }
        }
        conv.text
    };

    match text {
        Some(text) => println!("{}", run(text)),
        None => {
            let stdin = io::stdin();
            let mut out = BufWriter::new(io::stdout().lock());
            for line in stdin.lock().lines() {
                let line = die!(line, "Failed to read line: {}");
                die!(writeln!(out, "{}", run(&line)), "Failed to write output: {}");
            }
            die!(out.flush(), "Failed to write output: {}");
        }
    }
}

pub fn explain_cmd(registry: &Registry, from: &str, to: &str, text: &str, json: bool) {
    load_all(registry, &[from, to]);
    let result = die!(registry.explain(text, from, to), "Error: {}");
    if json {
        let rendered = die!(
            serde_json::to_string_pretty(&result),
            "JSON serialization failed: {}"
        );
        println!("{rendered}");
    } else {
        print!("{}", format_text(&result));
    }
}
