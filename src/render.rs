//! Results panel rendering.
//!
//! [`render_results_html`] is the panel markup; [`render_results_text`] is the
//! same payload laid out for a terminal. Both show a "No results." placeholder
//! when the payload has no `results` or an empty list. Every string that
//! came from a document goes through [`escape_html`] before it is placed in
//! markup.

use crate::models::{SearchResponse, SearchResultItem};

/// Placeholder text for an empty result set.
pub const NO_RESULTS: &str = "No results.";

/// Escape the five HTML-significant characters.
///
/// Replacement order is fixed: `&` first, so entities produced by later steps
/// are never double-escaped.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Fixed four-decimal score: `0.5` → `0.5000`.
///
/// Rounds on the exact binary value with ties away from zero, so
/// `0.03125` → `0.0313`. Negative zero prints as `0.0000`; NaN and the
/// infinities print as `NaN` / `Infinity` / `-Infinity`.
pub fn format_score(score: f64) -> String {
    const PLACES: usize = 4;

    if score.is_nan() {
        return "NaN".to_string();
    }
    if score.is_infinite() {
        return if score > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // Every finite f64 has an exact decimal expansion within 1074 places.
    let exact = format!("{:.1100}", score.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(PLACES))
        .map(|b| b - b'0')
        .collect();

    if frac_part.as_bytes().get(PLACES).is_some_and(|&d| d >= b'5') {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - PLACES;
    let text: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
    // `-0.0 < 0.0` is false, so negative zero loses its sign here.
    let sign = if score < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, &text[..split], &text[split..])
}

/// Make document-derived text safe to print on a terminal: tabs, newlines
/// and carriage returns become spaces, other control characters (ESC, BEL,
/// C1 controls) are dropped.
pub fn terminal_safe(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\t' | '\n' | '\r' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Render the results panel as HTML.
pub fn render_results_html(data: &SearchResponse) -> String {
    let items = data.items();
    if items.is_empty() {
        return format!("<p class=\"muted\">{}</p>", NO_RESULTS);
    }

    items
        .iter()
        .map(render_card)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_card(item: &SearchResultItem) -> String {
    format!(
        "<div class=\"card\">\
         <div><strong>{}</strong></div>\
         <div class=\"muted mono\">score: {} | doc_id: {}</div>\
         <pre>{}</pre>\
         </div>",
        escape_html(&item.filename),
        format_score(item.score),
        escape_html(&item.doc_id),
        escape_html(&item.snippet),
    )
}

/// Render the results panel for a terminal.
pub fn render_results_text(data: &SearchResponse) -> String {
    let items = data.items();
    if items.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!(
            "{}. [{}] {}\n",
            i + 1,
            format_score(item.score),
            terminal_safe(&item.filename)
        ));
        out.push_str(&format!("    doc_id: {}\n", terminal_safe(&item.doc_id)));
        out.push_str(&format!(
            "    excerpt: \"{}\"\n",
            terminal_safe(&item.snippet).trim()
        ));
        out.push('\n');
    }
    out.truncate(out.trim_end().len());
    out
}
