//! Record extraction from the source page's wikitables.

use crate::record::Record;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info};

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid regex {pattern:?}: {e}"))
}

static TABLES: LazyLock<Selector> = LazyLock::new(|| selector("table.wikitable"));
static ROWS: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static CELLS: LazyLock<Selector> = LazyLock::new(|| selector("td, th"));
static LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a"));

static BRACKETED: LazyLock<Regex> = LazyLock::new(|| regex(r"\[.*?\]"));
static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| regex(r"\(.*?\)"));
static PIPE_TAIL: LazyLock<Regex> = LazyLock::new(|| regex(r"\|.*"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| regex(r"\s+"));
static TAG_DELIMITERS: LazyLock<Regex> = LazyLock::new(|| regex(r"[,\n/;]+"));

const NAME_HEADERS: [&str; 2] = ["animal", "trivial name"];
const TAG_HEADER: &str = "collateral adjective";

/// Parse every qualifying wikitable into records, in document order.
///
/// A table qualifies when its first row has a name column (`animal`, else
/// `trivial name`) and a `collateral adjective` column. Rows without a name or
/// without tags are dropped.
pub fn extract_records(html: &str) -> Vec<Record> {
    let doc = Html::parse_document(html);
    let mut records = Vec::new();

    for (table_index, table) in doc.select(&TABLES).enumerate() {
        let mut rows = table.select(&ROWS);
        let Some(header_row) = rows.next() else {
            continue;
        };

        let headers: Vec<String> = header_row
            .select(&CELLS)
            .map(|cell| cell_text(cell).to_lowercase())
            .collect();

        let Some(name_col) = NAME_HEADERS
            .iter()
            .find_map(|wanted| headers.iter().position(|h| h == wanted))
        else {
            debug!("Skipping table {}: no name column", table_index);
            continue;
        };
        let Some(tag_col) = headers.iter().position(|h| h == TAG_HEADER) else {
            debug!("Skipping table {}: no tag column", table_index);
            continue;
        };

        for row in rows {
            let cells: Vec<ElementRef<'_>> = row.select(&CELLS).collect();
            if cells.len() <= name_col.max(tag_col) {
                continue;
            }

            let name_cell = cells[name_col];
            let raw_name = name_cell
                .select(&LINKS)
                .next()
                .map(cell_text)
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| cell_text(name_cell));

            let name = clean_name(&raw_name);
            let tags = split_tags(&cell_text(cells[tag_col]));
            if !name.is_empty() && !tags.is_empty() {
                records.push(Record::new(name, tags));
            }
        }
    }

    info!("Extracted {} records", records.len());
    records
}

/// Normalize a raw name cell: first line only, no `[...]`/`(...)` annotations,
/// nothing after `|`, single spaces, title case.
pub fn clean_name(raw: &str) -> String {
    let first_line = raw.trim().lines().next().unwrap_or("");
    let name = BRACKETED.replace_all(first_line, "");
    let name = PARENTHESIZED.replace_all(&name, "");
    let name = PIPE_TAIL.replace_all(&name, "");
    let name = WHITESPACE.replace_all(&name, " ");
    title_case(name.trim())
}

/// Split a tag cell on `,`, newline, `/` and `;` into lowercase tags.
pub fn split_tags(raw: &str) -> Vec<String> {
    TAG_DELIMITERS
        .split(raw.trim())
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Upper-case the first letter of every run of letters, lower-case the rest.
/// `"red-tailed HAWK"` becomes `"Red-Tailed Hawk"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
