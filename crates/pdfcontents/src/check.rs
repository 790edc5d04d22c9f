use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pdfcontents_core::{patterns_from_json, ContentCollection, Pattern};

use crate::contents::load;
use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Args, Clone)]
pub struct CheckOptions {
    /// Path to the PDF file
    path: PathBuf,

    /// JSON file holding an array of pattern objects
    patterns: PathBuf,

    /// Require span texts to equal pattern texts instead of containing them
    #[arg(long)]
    exact_text: bool,
}

/// Read a JSON array of pattern objects from `path`.
pub fn read_patterns(path: &Path) -> Result<Vec<Pattern>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| f!("reading patterns from {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| Error::Patterns(path.display().to_string(), e.to_string()))?;
    patterns_from_json(&json)
        .map_err(|e| Error::Patterns(path.display().to_string(), e.to_string()).into())
}

/// Whether each pattern matches some span, in pattern order.
pub fn evaluate(contents: &ContentCollection, patterns: &[Pattern], exact_text: bool) -> Vec<bool> {
    patterns
        .iter()
        .map(|p| contents.matches_known_patterns(std::slice::from_ref(p), exact_text))
        .collect()
}

pub fn run(options: CheckOptions, global: crate::Global) -> Result<ExitCode> {
    let patterns = read_patterns(&options.patterns)?;
    let contents = load(&options.path)?;

    let results = evaluate(&contents, &patterns, options.exact_text);
    if global.verbose {
        for (pattern, matched) in patterns.iter().zip(&results) {
            let constraints: Vec<String> = pattern
                .constraints()
                .iter()
                .map(|(k, v)| f!("{k}={v}"))
                .collect();
            eprintln!(
                "{} {}",
                if *matched { "match" } else { "miss " },
                constraints.join(" ")
            );
        }
    }

    let matched = results.iter().filter(|m| **m).count();
    println!("{matched}/{} patterns matched", results.len());

    if matched == results.len() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
