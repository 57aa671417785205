//! Text normalization shared by the extractors.

use scraper::{ElementRef, Html, Node, Selector};

/// Decode HTML entities (`&amp;`, `&#39;`, ...) in a plain string.
///
/// Only for values that arrive outside an HTML document, such as JSON fields;
/// text pulled out of a parsed page is already decoded. Anything that looks
/// like markup is kept as-is.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// First line of `text` that has content, trimmed.
pub fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Trimmed text, or `None` when nothing is left.
pub fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Elements that start a new line in rendered text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "footer", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "table", "tr", "ul",
];

/// Text content of an element split into trimmed, non-empty lines.
///
/// Block elements start a new line, inline elements do not.
pub fn element_lines(element: ElementRef<'_>) -> Vec<String> {
    let mut text = String::new();

    for node in element.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if BLOCK_ELEMENTS.contains(&e.name()) => text.push('\n'),
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// First line of the first element matching `selector`.
///
/// `None` when nothing matches; `Some(None)` when it matches but is empty.
pub fn select_first_line(document: &Html, selector: &Selector) -> Option<Option<String>> {
    document
        .select(selector)
        .next()
        .map(|element| element_lines(element).into_iter().next())
}
