//! Detail Page Module
//! Builds a single-file HTML page embedding the rendered charts and the
//! snapshot summary.

use crate::charts::SvgContainer;
use crate::stats::SnapshotSummary;

/// File names the page references; the PNGs are written next to it.
pub const PATHS_PNG: &str = "graph_paths.png";
pub const CRASHES_PNG: &str = "graph_crashes.png";

/// Build the details page: summary table, the two canvas charts, and the
/// vector chart inline inside `<div id="graph">`.
pub fn render_page(
    title: &str,
    summary: Option<&SnapshotSummary>,
    container: &SvgContainer,
) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str(
        r#"<style>
body { font-family: sans-serif; margin: 24px; }
h1 { font-size: 20px; }
table { border-collapse: collapse; margin-bottom: 16px; }
td, th { border: 1px solid #ccc; padding: 4px 10px; text-align: right; }
th { background: #eee; }
.charts img { display: block; margin-bottom: 12px; }
</style>
</head>
<body>
"#,
    );
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(title)));

    if let Some(summary) = summary {
        html.push_str(&summary_table(summary));
    }

    html.push_str(&format!(
        "<div class=\"charts\">\n\
         <img id=\"graph_paths\" src=\"{PATHS_PNG}\" width=\"600\" height=\"300\" alt=\"Pending paths\">\n\
         <img id=\"graph_crashes\" src=\"{CRASHES_PNG}\" width=\"600\" height=\"300\" alt=\"Crashes and hangs\">\n\
         </div>\n"
    ));

    html.push_str("<div id=\"graph\">\n");
    html.push_str(&container.contents());
    html.push_str("\n</div>\n</body>\n</html>\n");
    html
}

fn summary_table(summary: &SnapshotSummary) -> String {
    let mut table = String::from(
        "<table>\n<tr><th>Fuzzers</th><th>Alive</th><th>Execs</th><th>Speed</th>\
         <th>Paths</th><th>Favored</th><th>Pending</th><th>Pending favs</th>\
         <th>Crashes</th><th>Hangs</th></tr>\n",
    );
    table.push_str(&format!(
        "<tr><td>{}</td><td>{}</td><td>{:.0}</td><td>{:.1}/s</td><td>{:.0}</td>\
         <td>{:.0}</td><td>{:.0}</td><td>{:.0}</td><td>{:.0}</td><td>{:.0}</td></tr>\n",
        summary.fuzzers,
        summary.alive,
        summary.execs_done,
        summary.execs_per_sec,
        summary.paths_total,
        summary.paths_favored,
        summary.pending_total,
        summary.pending_favs,
        summary.unique_crashes,
        summary.unique_hangs
    ));
    table.push_str("</table>\n");
    table
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{summarize, FuzzerSnapshot};

    #[test]
    fn test_page_embeds_all_charts() {
        let mut container = SvgContainer::new();
        container.append("<svg data-test=\"1\"></svg>".to_string());
        let html = render_page("target_000", None, &container);
        assert!(html.contains("id=\"graph_paths\""));
        assert!(html.contains("id=\"graph_crashes\""));
        assert!(html.contains("<div id=\"graph\">"));
        assert!(html.contains("<svg data-test=\"1\"></svg>"));
        assert!(html.contains("<title>target_000</title>"));
        // no snapshot summary, so no table
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_page_includes_summary_table() {
        let snapshot = FuzzerSnapshot {
            alive: true,
            execs_done: 1000.0,
            execs_per_sec: 250.5,
            paths_total: 12.0,
            paths_favored: 3.0,
            pending_favs: 2.0,
            pending_total: 9.0,
            unique_crashes: 1.0,
            unique_hangs: 0.0,
            afl_banner: "target_000".to_string(),
        };
        let summary = summarize(&[snapshot]);
        let html = render_page("target_000", Some(&summary), &SvgContainer::new());
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("250.5/s"));
    }

    #[test]
    fn test_page_escapes_title() {
        let html = render_page("a <b> & \"c\"", None, &SvgContainer::new());
        assert!(html.contains("<title>a &lt;b&gt; &amp; &quot;c&quot;</title>"));
    }
}
