use std::path::{Path, PathBuf};
use std::process::ExitCode;

use log::debug;
use pdfcontents_core::{ContentCollection, Key, SortKey};

use crate::output::{default_columns, parse_key, parse_sort_key, print_contents, OutputFormat};
use crate::prelude::{println, *};

#[derive(Debug, clap::Args, Clone)]
pub struct ContentsOptions {
    /// Path to the PDF file
    path: PathBuf,

    /// Merge sequential spans sharing the same style
    #[arg(long)]
    join: bool,

    /// Comma separated sort keys (e.g. "page.number,yo,xl")
    #[arg(long, value_parser = parse_sort_key)]
    sort: Option<SortKey>,

    /// Comma separated horizontal bucket delimiters
    #[arg(long, value_delimiter = ',')]
    buckets: Vec<f64>,

    /// Comma separated columns for table output
    #[arg(long, value_delimiter = ',', value_parser = parse_key)]
    columns: Vec<Key>,

    /// Output format
    #[arg(long, value_enum, env = "PDFCONTENTS_FORMAT", default_value = "table")]
    format: OutputFormat,
}

/// Extract every span of `path`, failing when the document has no text.
pub fn load(path: &Path) -> Result<ContentCollection> {
    let mut extractor = pdf::Extractor::open(path).map_err(|e| eyre!(e))?;
    extractor
        .extract_contents(true)
        .map_err(|e| eyre!(e))?
        .ok_or_else(|| Error::NoText(path.display().to_string()).into())
}

/// Apply bucket assignment, join and sort in that order.
pub fn prepare(contents: &mut ContentCollection, options: &ContentsOptions) -> Result<()> {
    if !options.buckets.is_empty() {
        contents
            .assign_horizontal_bucket(&options.buckets, true)
            .map_err(|e| eyre!(e))?;
    }
    if options.join {
        contents.join(true);
    }
    if let Some(key) = &options.sort {
        contents.sort(key, true);
    }
    Ok(())
}

pub fn run(options: ContentsOptions, _global: crate::Global) -> Result<ExitCode> {
    let mut contents = load(&options.path)?;
    prepare(&mut contents, &options)?;
    debug!(
        "{} spans (joined: {}, sorted by: {:?})",
        contents.len(),
        contents.is_joined(),
        contents.sorted_by().map(ToString::to_string)
    );

    let columns = if options.columns.is_empty() {
        default_columns()
    } else {
        options.columns.clone()
    };
    print_contents(&contents, options.format, &columns)?;

    Ok(ExitCode::SUCCESS)
}
