use pdfcontents_core::{ContentCollection, Key, SortKey};

use crate::prelude::{println, *};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per span
    Json,
    /// Aligned columns
    #[default]
    Table,
}

/// Columns shown by the table output when none are requested.
pub fn default_columns() -> Vec<Key> {
    vec![
        Key::PageNumber,
        Key::BlockId,
        Key::LineId,
        Key::Id,
        Key::Xl,
        Key::Yt,
        Key::Xr,
        Key::Yb,
        Key::FontName,
        Key::Size,
        Key::HorizontalBucket,
        Key::Text,
    ]
}

pub fn parse_key(s: &str) -> std::result::Result<Key, String> {
    s.parse::<Key>().map_err(|e| e.to_string())
}

pub fn parse_sort_key(s: &str) -> std::result::Result<SortKey, String> {
    s.parse::<SortKey>().map_err(|e| e.to_string())
}

/// Serialize each span's flat record as a single JSON line.
pub fn json_lines(contents: &ContentCollection) -> Result<Vec<String>> {
    contents
        .records()
        .iter()
        .map(|record| serde_json::to_string(record).context("serializing span record"))
        .collect()
}

pub fn build_table(contents: &ContentCollection, columns: &[Key]) -> prettytable::Table {
    let mut table = new_table();
    table.add_row(prettytable::Row::new(
        columns
            .iter()
            .map(|k| prettytable::Cell::new(k.path()))
            .collect(),
    ));
    for content in contents {
        table.add_row(prettytable::Row::new(
            columns
                .iter()
                .map(|k| prettytable::Cell::new(&k.resolve(content).to_string()))
                .collect(),
        ));
    }
    table
}

pub fn print_contents(
    contents: &ContentCollection,
    format: OutputFormat,
    columns: &[Key],
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            for line in json_lines(contents)? {
                println!("{line}");
            }
        }
        OutputFormat::Table => build_table(contents, columns).printstd(),
    }
    Ok(())
}

/// Print one span text per line.
pub fn print_texts(contents: &ContentCollection) {
    for text in contents.texts() {
        println!("{text}");
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use pdfcontents_core::{build_contents, ContentCollection, RawBlock, RawLine, RawPage, RawSpan};

    pub fn span(text: &str, x: f64, y: f64) -> RawSpan {
        RawSpan {
            text: text.to_string(),
            bbox: (x, y - 8.0, x + 40.0, y + 2.0),
            origin: (x, y),
            ascender: 0.8,
            descender: -0.2,
            size: 10.0,
            font: "Helvetica".to_string(),
            flags: 0,
            char_flags: 16,
            bidi: 0,
            alpha: 255,
            color: 0,
        }
    }

    /// Two rows of two columns: "Item" "Price" over "Tea" "3.50".
    pub fn invoice() -> ContentCollection {
        let line = |spans: Vec<RawSpan>| RawLine {
            bbox: (0.0, 0.0, 612.0, 792.0),
            spans,
        };
        let page = RawPage {
            width: 612.0,
            height: 792.0,
            blocks: vec![RawBlock {
                number: 0,
                bbox: (0.0, 0.0, 612.0, 792.0),
                lines: vec![
                    line(vec![span("Item", 72.0, 100.0), span("Price", 300.0, 100.0)]),
                    line(vec![span("Tea", 72.0, 120.0), span("3.50", 300.0, 120.0)]),
                ],
            }],
        };
        build_contents(&[page]).unwrap()
    }
}
