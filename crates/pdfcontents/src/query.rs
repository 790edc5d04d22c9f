use std::path::PathBuf;
use std::process::ExitCode;

use pdfcontents_core::{ContentCollection, Key};

use crate::contents::load;
use crate::output::{parse_key, print_texts};
use crate::prelude::*;

#[derive(Debug, clap::Args, Clone)]
pub struct RowOptions {
    /// Path to the PDF file
    path: PathBuf,

    /// Index of the reference span in extraction order
    index: usize,

    /// Maximum baseline distance from the reference
    #[arg(long, default_value = "0.0")]
    tolerance: f64,

    /// Merge sequential spans before querying
    #[arg(long)]
    join: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ColumnOptions {
    /// Path to the PDF file
    path: PathBuf,

    /// Index of the reference span in extraction order
    index: usize,

    /// Numeric attribute to align on (e.g. "xl", "xr", "xc")
    #[arg(value_parser = parse_key)]
    key: Key,

    /// Maximum attribute distance from the reference
    #[arg(long, default_value = "0.0")]
    tolerance: f64,

    /// Merge sequential spans before querying
    #[arg(long)]
    join: bool,
}

pub fn row(contents: &mut ContentCollection, options: &RowOptions) -> Result<ContentCollection> {
    if options.join {
        contents.join(true);
    }
    contents
        .contents_matching_row(options.index, options.tolerance)
        .map_err(|e| eyre!(e))
}

pub fn column(
    contents: &mut ContentCollection,
    options: &ColumnOptions,
) -> Result<ContentCollection> {
    if options.join {
        contents.join(true);
    }
    contents
        .contents_matching_attribute(options.index, options.key, options.tolerance)
        .map_err(|e| eyre!(e))
}

pub fn run_row(options: RowOptions, _global: crate::Global) -> Result<ExitCode> {
    let mut contents = load(&options.path)?;
    print_texts(&row(&mut contents, &options)?);
    Ok(ExitCode::SUCCESS)
}

pub fn run_column(options: ColumnOptions, _global: crate::Global) -> Result<ExitCode> {
    let mut contents = load(&options.path)?;
    print_texts(&column(&mut contents, &options)?);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::output::fixtures::invoice;

    #[derive(Debug, clap::Parser)]
    enum Cli {
        Row(RowOptions),
        Column(ColumnOptions),
    }

    #[test]
    fn test_row_options() {
        let Cli::Row(options) = Cli::parse_from(["q", "row", "doc.pdf", "2", "--tolerance", "1.5"])
        else {
            panic!("expected row");
        };
        assert_eq!(options.index, 2);
        assert_eq!(options.tolerance, 1.5);
        assert!(!options.join);
    }

    #[test]
    fn test_column_options() {
        let Cli::Column(options) = Cli::parse_from(["q", "column", "doc.pdf", "0", "xr"]) else {
            panic!("expected column");
        };
        assert_eq!(options.key, Key::Xr);
        assert_eq!(options.tolerance, 0.0);
    }

    #[test]
    fn test_column_rejects_unknown_key() {
        assert!(Cli::try_parse_from(["q", "column", "doc.pdf", "0", "colour"]).is_err());
    }

    #[test]
    fn test_row_query() {
        let mut contents = invoice();
        let Cli::Row(options) = Cli::parse_from(["q", "row", "doc.pdf", "2"]) else {
            panic!("expected row");
        };
        let found = row(&mut contents, &options).unwrap();
        assert_eq!(found.texts(), vec!["Tea", "3.50"]);
    }

    #[test]
    fn test_column_query() {
        let mut contents = invoice();
        let Cli::Column(options) = Cli::parse_from(["q", "column", "doc.pdf", "1", "xl"]) else {
            panic!("expected column");
        };
        let found = column(&mut contents, &options).unwrap();
        assert_eq!(found.texts(), vec!["Price", "3.50"]);
    }

    #[test]
    fn test_query_out_of_range() {
        let mut contents = invoice();
        let Cli::Row(options) = Cli::parse_from(["q", "row", "doc.pdf", "9"]) else {
            panic!("expected row");
        };
        assert!(row(&mut contents, &options).is_err());
    }
}
