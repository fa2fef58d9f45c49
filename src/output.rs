//! Console rendering of search results

use crate::search::Query;

/// Render results as a numbered table followed by the elapsed time
pub fn render_results(query: &Query) -> String {
    let rows: Vec<(String, String)> = query
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let title = match r.short_date() {
                Some(date) => format!("{} ({})", r.title, date),
                None => r.title.clone(),
            };
            ((i + 1).to_string(), title)
        })
        .collect();

    let width = rows
        .iter()
        .map(|(n, _)| n.len())
        .max()
        .unwrap_or(0)
        .max(1);

    let mut out = String::new();
    out.push_str(&format!("{:<width$}  TITLE\n", "#", width = width));
    for (n, title) in &rows {
        out.push_str(&format!("{:<width$}  {}\n", n, title, width = width));
    }
    out.push_str(&format!("\n{}ms\n", query.elapsed_ms()));
    out
}

/// Render provider names one per line
pub fn render_providers(names: &[String]) -> String {
    names.iter().map(|n| format!("{}\n", n)).collect()
}
