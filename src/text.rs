// src/text.rs
//! Display sanitation for titles and article bodies.

use once_cell::sync::OnceCell;
use regex::Regex;

fn re(cell: &'static OnceCell<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex"))
}

/// Single-line title: entities decoded, tags stripped, whitespace collapsed.
pub fn clean_title(s: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();

    let out = re(&RE_TAGS, r"(?is)</?[a-z][^>]*>").replace_all(s, "");
    let out = html_escape::decode_html_entities(&out);
    re(&RE_WS, r"\s+").replace_all(&out, " ").trim().to_string()
}

/// Multi-line body: block tags become line breaks, runs of blank lines are
/// capped at one.
pub fn clean_body(s: &str) -> String {
    static RE_DROP: OnceCell<Regex> = OnceCell::new();
    static RE_BREAK: OnceCell<Regex> = OnceCell::new();
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    static RE_SPACES: OnceCell<Regex> = OnceCell::new();
    static RE_LINES: OnceCell<Regex> = OnceCell::new();

    let out = re(&RE_DROP, r"(?is)<(script|style)[^>]*>.*?</(script|style)>").replace_all(s, " ");
    let out = re(&RE_BREAK, r"(?i)<br\s*/?>|</(p|div|li|tr|h[1-6])>").replace_all(&out, "\n");
    let out = re(&RE_TAGS, r"(?s)<[^>]+>").replace_all(&out, "");
    let out = html_escape::decode_html_entities(&out);
    let out = re(&RE_SPACES, r"[ \t\r]+").replace_all(&out, " ");
    let out = out
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    re(&RE_LINES, r"\n{3,}")
        .replace_all(&out, "\n\n")
        .trim()
        .to_string()
}
