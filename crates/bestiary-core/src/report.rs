//! HTML report of records grouped by tag.

use crate::record::Record;
use crate::storage::{atomic_write_bytes, ensure_directory};
use crate::Result;
use indexmap::IndexMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

const STYLE: &str = r#"body { font-family: sans-serif; margin: 2em; }
section { margin-bottom: 1.5em; }
ul { list-style: none; padding: 0; display: flex; flex-wrap: wrap; gap: 1em; }
li { width: 120px; text-align: center; }
img { width: 100px; height: 100px; object-fit: cover; }
#search { font-size: 1.1em; padding: 0.3em; width: 20em; }"#;

const FILTER_SCRIPT: &str = r#"document.getElementById('search').addEventListener('input', function (e) {
  var q = e.target.value.trim().toLowerCase();
  document.querySelectorAll('section').forEach(function (section) {
    var tagMatch = section.dataset.tag.indexOf(q) !== -1;
    var shown = 0;
    section.querySelectorAll('li').forEach(function (li) {
      var visible = !q || tagMatch || li.dataset.name.indexOf(q) !== -1;
      li.style.display = visible ? '' : 'none';
      if (visible) { shown++; }
    });
    section.style.display = shown ? '' : 'none';
  });
});"#;

/// Group records under each of their tags.
///
/// Tags appear in first-seen order; each tag lists its records in input order.
pub fn group_by_tag(records: &[Record]) -> IndexMap<String, Vec<&Record>> {
    let mut groups: IndexMap<String, Vec<&Record>> = IndexMap::new();
    for record in records {
        for tag in &record.tags {
            groups.entry(tag.clone()).or_default().push(record);
        }
    }
    groups
}

/// Render the report document for `records` as it will live at `report_path`.
pub fn render_html(records: &[Record], report_path: &Path) -> String {
    let base = report_path.parent().unwrap_or_else(|| Path::new(""));
    let groups = group_by_tag(records);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Bestiary</title>\n");
    let _ = writeln!(html, "<style>\n{}\n</style>", STYLE);
    html.push_str("</head>\n<body>\n<h1>Bestiary</h1>\n");
    html.push_str(
        "<input id=\"search\" type=\"search\" placeholder=\"Filter by name or adjective\" autofocus>\n",
    );

    for (tag, members) in &groups {
        let tag = escape_html(tag);
        let _ = writeln!(
            html,
            "<section data-tag=\"{}\">\n<h2>{}</h2>\n<ul>",
            tag.to_lowercase(),
            tag
        );
        for record in members {
            let name = escape_html(&record.name);
            let _ = write!(html, "<li data-name=\"{}\">", name.to_lowercase());
            if let Some(image) = record.resolved_image() {
                let _ = write!(
                    html,
                    "<img src=\"{}\" alt=\"{}\" loading=\"lazy\"><br>",
                    escape_html(&image_src(image, base)),
                    name
                );
            }
            let _ = writeln!(html, "{}</li>", name);
        }
        html.push_str("</ul>\n</section>\n");
    }

    let _ = writeln!(html, "<script>\n{}\n</script>", FILTER_SCRIPT);
    html.push_str("</body>\n</html>\n");
    html
}

/// Write the report and return its path.
pub fn render_report(records: &[Record], report_path: &Path) -> Result<PathBuf> {
    if let Some(parent) = report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }
    let html = render_html(records, report_path);
    atomic_write_bytes(report_path, html.as_bytes())?;
    info!(
        "Wrote report with {} records to {}",
        records.len(),
        report_path.display()
    );
    Ok(report_path.to_path_buf())
}

/// `src` attribute for an image: relative when it sits under the report
/// directory, absolute otherwise.
fn image_src(image: &Path, base: &Path) -> String {
    let relative = if base.as_os_str().is_empty() {
        None
    } else {
        image.strip_prefix(base).ok()
    };
    match relative {
        Some(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        None => format!("file://{}", image.display()),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
