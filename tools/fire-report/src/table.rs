//! Summary and count tables as console text and a styled HTML page.

use std::fmt::Write as _;

use fire_core::palette::Palette;
use fire_core::report::ReportTable;
use fire_core::resolve::DominantCounts;
use fire_core::DatasetSummary;

const COUNT_HEADERS: [&str; 2] = ["Dominant forest type", "Fires"];

fn grid_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize], numeric: &[bool]) -> String {
    let parts: Vec<String> = cells
        .enumerate()
        .map(|(i, c)| if numeric[i] { format!("{c:>w$}", w = widths[i]) } else { format!("{c:<w$}", w = widths[i]) })
        .collect();
    parts.join("  ").trim_end().to_string()
}

fn text_grid(headers: &[&str], rows: &[Vec<String>], numeric: &[bool]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = grid_line(headers.iter().copied(), &widths, numeric);
    out.push('\n');
    out.push_str(&widths.iter().map(|&w| "-".repeat(w)).collect::<Vec<_>>().join("  "));
    out.push('\n');
    for row in rows {
        out.push_str(&grid_line(row.iter().map(String::as_str), &widths, numeric));
        out.push('\n');
    }
    out
}

fn report_cells(table: &ReportTable) -> Vec<Vec<String>> {
    table.rows.iter().map(|r| r.cells.iter().map(|c| c.display()).collect()).collect()
}

fn count_cells(counts: &DominantCounts) -> Vec<Vec<String>> {
    counts.iter().map(|(ft, n)| vec![ft.label().to_string(), n.to_string()]).collect()
}

pub fn report_text(table: &ReportTable) -> String {
    let numeric: Vec<bool> = table.columns.iter().map(|c| c.is_numeric()).collect();
    text_grid(&table.headers(), &report_cells(table), &numeric)
}

pub fn counts_text(counts: &DominantCounts) -> String {
    text_grid(&COUNT_HEADERS, &count_cells(counts), &[false, true])
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn html_table(out: &mut String, caption: &str, headers: &[&str], rows: &[Vec<String>], numeric: &[bool]) {
    let _ = writeln!(out, "<table>\n<caption>{}</caption>\n<thead><tr>", escape(caption));
    for h in headers {
        let _ = write!(out, "<th>{}</th>", escape(h));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in rows {
        out.push_str("<tr>");
        for (i, cell) in row.iter().enumerate() {
            let class = if numeric.get(i).copied().unwrap_or(false) { " class=\"num\"" } else { "" };
            let _ = write!(out, "<td{class}>{}</td>", escape(cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
}

const STYLE: &str = "\
body { font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; margin: 2em; color: #222; }
table { border-collapse: collapse; margin-bottom: 2em; font-size: 0.9em; }
caption { text-align: left; font-weight: 600; padding: 0.4em 0; }
th { background: #39424e; color: #fff; padding: 0.4em 0.8em; text-align: left; }
td { padding: 0.3em 0.8em; border-bottom: 1px solid #ddd; }
td.num { text-align: right; font-variant-numeric: tabular-nums; }
tbody tr:nth-child(even) { background: #f4f6f8; }
.swatch { display: inline-block; width: 0.9em; height: 0.9em; margin-right: 0.4em; vertical-align: middle; }
";

/// Full HTML page: header with dataset summary, summary table, count table.
pub fn report_html(
    title: &str,
    summary: &DatasetSummary,
    table: &ReportTable,
    counts: &DominantCounts,
    palette: &Palette,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{t}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n<h1>{t}</h1>",
        t = escape(title)
    );

    let years = summary
        .year_bounds
        .map_or_else(|| "n/a".to_string(), |b| format!("{}–{}", b.min, b.max));
    let _ = writeln!(
        out,
        "<p>{} fires ({} with a dominant forest type), {} acres ({:.0} ha) burned, years {}.</p>",
        summary.records, summary.with_dominant, summary.total_acres, summary.total_hectares, years
    );
    if summary.parse_errors > 0 {
        let _ = writeln!(out, "<p>{} attribute values could not be parsed and are shown blank.</p>", summary.parse_errors);
    }

    if table.is_empty() {
        out.push_str("<p>No fire has a dominant forest type.</p>\n");
    } else {
        let numeric: Vec<bool> = table.columns.iter().map(|c| c.is_numeric()).collect();
        html_table(&mut out, "Fire perimeters", &table.headers(), &report_cells(table), &numeric);
    }

    if !counts.is_empty() {
        // Count table carries a palette swatch so it doubles as the chart legend.
        let _ = writeln!(out, "<table>\n<caption>Dominant forest type</caption>\n<thead><tr>");
        for h in COUNT_HEADERS {
            let _ = write!(out, "<th>{}</th>", escape(h));
        }
        out.push_str("</tr></thead>\n<tbody>\n");
        for (ft, n) in counts.iter() {
            let _ = writeln!(
                out,
                "<tr><td><span class=\"swatch\" style=\"background:{}\"></span>{}</td><td class=\"num\">{n}</td></tr>",
                palette.forest(ft).hex(),
                escape(ft.label())
            );
        }
        out.push_str("</tbody>\n</table>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}
