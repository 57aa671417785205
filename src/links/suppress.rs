//! Preview suppression.
//!
//! Discord renders an embed for every bare link in a message. Wrapping a link
//! in `<...>` keeps it clickable but suppresses the embed.

use crate::links::detector::scan;

/// Wrap every bare URL of `text` in `<`/`>`, leaving already wrapped URLs and
/// every other character untouched.
///
/// Spans come back from the scanner in ascending order and never overlap, so
/// a single left-to-right fold with a running insertion offset keeps every
/// later span aligned with the text built so far.
pub fn suppress_previews(text: &str) -> String {
    let (suppressed, _) = scan(text).iter().fold(
        (text.to_string(), 0usize),
        |(mut out, inserted), span| {
            let start = span.start + inserted;
            let end = span.end + inserted;

            if is_wrapped(&out, start, end) {
                return (out, inserted);
            }

            out.insert(start, '<');
            out.insert(end + 1, '>');
            (out, inserted + 2)
        },
    );

    suppressed
}

fn is_wrapped(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    start > 0 && bytes.get(start - 1) == Some(&b'<') && bytes.get(end) == Some(&b'>')
}
