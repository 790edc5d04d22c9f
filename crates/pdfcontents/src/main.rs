#![allow(unused)]

use std::process::ExitCode;

use crate::prelude::*;
use clap::Parser;

mod check;
mod contents;
mod error;
mod output;
mod prelude;
mod query;
mod texts;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Inspect the positioned text spans of PDF documents"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(
        long,
        env = "PDFCONTENTS_VERBOSE",
        global = true,
        default_value = "false"
    )]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Print every span as a flat record
    Contents(crate::contents::ContentsOptions),

    /// Print one line per extracted text line
    Texts(crate::texts::TextsOptions),

    /// Print the spans sharing a baseline with a reference span
    Row(crate::query::RowOptions),

    /// Print the spans aligned with a reference span on an attribute
    Column(crate::query::ColumnOptions),

    /// Check that every pattern in a JSON file matches some span
    Check(crate::check::CheckOptions),
}

fn main() -> Result<ExitCode> {
    let app = App::parse();

    let default_filter = if app.global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    color_eyre::install()?;

    match app.command {
        SubCommands::Contents(options) => crate::contents::run(options, app.global),
        SubCommands::Texts(options) => crate::texts::run(options, app.global),
        SubCommands::Row(options) => crate::query::run_row(options, app.global),
        SubCommands::Column(options) => crate::query::run_column(options, app.global),
        SubCommands::Check(options) => crate::check::run(options, app.global),
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_is_global() {
        let app = App::parse_from(["pdfcontents", "texts", "doc.pdf", "--verbose"]);
        assert!(app.global.verbose);
        assert!(matches!(app.command, SubCommands::Texts(_)));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        App::command().debug_assert();
    }
}
