use std::path::PathBuf;
use std::process::ExitCode;

use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Args, Clone)]
pub struct TextsOptions {
    /// Path to the PDF file
    path: PathBuf,

    /// Output as a JSON array
    #[arg(long)]
    json: bool,
}

pub fn run(options: TextsOptions, global: crate::Global) -> Result<ExitCode> {
    if global.verbose {
        eprintln!("Extracting texts from {}...", options.path.display());
    }

    let mut extractor = pdf::Extractor::open(&options.path).map_err(|e| eyre!(e))?;
    let texts = extractor
        .extract_texts(true)
        .map_err(|e| eyre!(e))?
        .ok_or_else(|| Error::NoText(options.path.display().to_string()))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&texts)?);
    } else {
        for text in texts {
            println!("{text}");
        }
    }

    Ok(ExitCode::SUCCESS)
}
