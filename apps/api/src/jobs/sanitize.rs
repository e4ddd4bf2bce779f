//! Markup stripping for job descriptions.

use scraper::Html;

/// Inline marker that replaces line breaks found in text content.
pub const BREAK_MARKER: &str = "<br>";

/// Strips every tag from `raw`, keeping only text content. Line breaks inside
/// text become [`BREAK_MARKER`]. `None` and empty input produce an empty string.
///
/// Never fails: malformed markup is parsed best-effort and whatever text the
/// parser recovers is returned.
pub fn sanitize_description(raw: Option<&str>) -> String {
    let text = extract_text(raw);
    text.replace("\r\n", "\n").replace(['\n', '\r'], BREAK_MARKER)
}

/// Tag-free text with all whitespace runs collapsed to single spaces.
/// This is what gets embedded for ranking.
pub fn plain_text(raw: Option<&str>) -> String {
    extract_text(raw).split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_text(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r,
        _ => return String::new(),
    };
    let fragment = Html::parse_fragment(raw);
    fragment.root_element().text().collect()
}
