//! CSV and TSV content.
//!
//! Records are read with the `csv` crate (RFC 4180 quoting, embedded
//! delimiters, doubled quotes, and newlines inside quoted cells) and
//! rendered either as an HTML table or as one card per row.

use docent_core::types::ContentFormat;
use docent_core::{Error, Result};
use serde_json::Value;

use crate::detect;
use crate::html::{escape_attr, escape_text};
use crate::parser::{has_extension, ContentParser, CsvOptions, CsvRender, ParseContext, ParsedContent};

/// Read all records from `content`. No row is treated as a header and
/// ragged rows are allowed.
///
/// ```
/// use docent_content::tabular::parse_records;
///
/// let rows = parse_records("a,b\n1,\"two, and two\"", b',').unwrap();
/// assert_eq!(rows[1], vec!["1", "two, and two"]);
/// ```
pub fn parse_records(content: &str, delimiter: u8) -> std::result::Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    reader
        .records()
        .map(|record| record.map(|r| r.iter().map(String::from).collect()))
        .collect()
}

/// CSV/TSV parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser;

impl CsvParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self
    }
}

impl ContentParser for CsvParser {
    fn name(&self) -> &str {
        "csv"
    }

    fn format(&self) -> ContentFormat {
        ContentFormat::Csv
    }

    fn can_parse(&self, content: &str, filename: Option<&str>) -> bool {
        has_extension(filename, "csv")
            || has_extension(filename, "tsv")
            || detect::csv_score(content) >= 0.5
    }

    fn parse(&self, content: &str, ctx: &ParseContext) -> Result<ParsedContent> {
        let opts = ctx
            .options
            .as_ref()
            .and_then(|o| o.csv())
            .cloned()
            .unwrap_or_default();

        let mut warnings = Vec::new();
        let delimiter = match opts.delimiter {
            Some(d) if d.is_ascii() => d as u8,
            Some(d) => {
                warnings.push(format!("delimiter {d:?} is not ASCII; using ','"));
                b','
            }
            None if ctx.has_extension("tsv") => b'\t',
            None => b',',
        };

        let mut rows = parse_records(content, delimiter)
            .map_err(|e| Error::parse(ctx.display_name(), e.to_string()))?;

        let headers = if opts.has_headers && !rows.is_empty() {
            Some(rows.remove(0))
        } else {
            None
        };
        let width = headers
            .as_ref()
            .map(Vec::len)
            .or_else(|| rows.iter().map(Vec::len).max())
            .unwrap_or(0);

        let first_data_line = if headers.is_some() { 2 } else { 1 };
        for (i, row) in rows.iter_mut().enumerate() {
            if row.len() != width {
                warnings.push(format!(
                    "row {} has {} fields, expected {width}",
                    i + first_data_line,
                    row.len()
                ));
                row.resize(width, String::new());
            }
        }
        if rows.is_empty() {
            warnings.push("no data rows".to_string());
        }

        let html = match opts.render {
            CsvRender::Table => render_table(headers.as_deref(), &rows, &opts),
            CsvRender::Cards => render_cards(headers.as_deref(), &rows, &opts, &mut warnings),
        };

        let mut parsed = ParsedContent {
            html,
            warnings,
            ..Default::default()
        };
        if let Some(headers) = headers {
            parsed.metadata.custom.insert(
                "columns".into(),
                Value::Array(headers.into_iter().map(Value::String).collect()),
            );
        }
        parsed
            .metadata
            .custom
            .insert("rowCount".into(), Value::from(rows.len()));
        parsed.ensure_slug(ctx);
        Ok(parsed)
    }
}

fn cell(text: &str) -> String {
    escape_text(text).replace('\n', "<br />")
}

fn render_table(headers: Option<&[String]>, rows: &[Vec<String>], opts: &CsvOptions) -> String {
    let mut html = format!("<table class=\"{}\">\n", escape_attr(&opts.class_name));

    if let Some(headers) = headers {
        html.push_str("<thead><tr>");
        for h in headers {
            html.push_str(&format!("<th>{}</th>", cell(h)));
        }
        html.push_str("</tr></thead>\n");
    }

    html.push_str("<tbody>\n");
    for row in rows {
        html.push_str("<tr>");
        for value in row {
            html.push_str(&format!("<td>{}</td>", cell(value)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

/// Column index for a card option: a header name (case-insensitive) or,
/// without headers, a zero-based index.
fn column_index(headers: Option<&[String]>, wanted: Option<&str>, default: usize) -> Option<usize> {
    let Some(wanted) = wanted else {
        return Some(default);
    };
    match headers {
        Some(headers) => headers.iter().position(|h| h.eq_ignore_ascii_case(wanted)),
        None => wanted.parse().ok(),
    }
}

fn render_cards(
    headers: Option<&[String]>,
    rows: &[Vec<String>],
    opts: &CsvOptions,
    warnings: &mut Vec<String>,
) -> String {
    let mut lookup = |option: Option<&str>, default: usize, what: &str| {
        column_index(headers, option, default).or_else(|| {
            warnings.push(format!("{what} column {:?} not found", option.unwrap_or_default()));
            None
        })
    };
    let title_col = lookup(opts.title_column.as_deref(), 0, "title");
    let content_col = lookup(opts.content_column.as_deref(), 1, "content");

    let mut html = format!("<div class=\"{} csv-cards\">\n", escape_attr(&opts.class_name));
    for row in rows {
        html.push_str("<div class=\"csv-card\">");
        if let Some(title) = title_col.and_then(|i| row.get(i)) {
            html.push_str(&format!("<h3 class=\"csv-card-title\">{}</h3>", cell(title)));
        }
        if let Some(body) = content_col.and_then(|i| row.get(i)) {
            html.push_str(&format!("<div class=\"csv-card-content\">{}</div>", cell(body)));
        }

        if let Some(headers) = headers {
            let extra: Vec<(&String, &String)> = headers
                .iter()
                .zip(row)
                .enumerate()
                .filter(|(i, _)| Some(*i) != title_col && Some(*i) != content_col)
                .map(|(_, pair)| pair)
                .collect();
            if !extra.is_empty() {
                html.push_str("<dl class=\"csv-card-fields\">");
                for (name, value) in extra {
                    html.push_str(&format!("<dt>{}</dt><dd>{}</dd>", cell(name), cell(value)));
                }
                html.push_str("</dl>");
            }
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");
    html
}

// ============================================================================
// Tests
// ============================================================================
