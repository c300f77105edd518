//! Helper functions for text processing: whitespace canonicalization and
//! sticker (dccon) markup normalization.

use regex::Regex;
use std::sync::LazyLock;

use crate::STICKER_TOKEN;

// ASCII whitespace only; ideographic and no-break spaces are content.
static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\n\r\x0B\x0C]+").unwrap());

// Sticker markup patterns. The `?no=` query parameter carries the sticker id.
static VIDEO_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-src="[^?]*\?no=([^"]+)""#).unwrap());
static IMAGE_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src="[^?]*\?no=([^"]+)""#).unwrap());
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"title="([^"]*)""#).unwrap());

const VIDEO_MARKER: &str = "<video";
const IMAGE_MARKER: &str = "<img";
const BLOCK_MARKER: &str = "<div";

/// Replace every maximal run of ASCII whitespace with a single space.
///
/// Leading and trailing runs are collapsed too, not trimmed, so the function
/// is idempotent.
pub fn canonicalize_whitespace(text: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(text, " ").into_owned()
}

/// Whether the contents open with a block-markup element (quoted posts and
/// similar boilerplate). Such comments never take part in a conversation.
pub fn is_block_markup(text: &str) -> bool {
    text.starts_with(BLOCK_MARKER)
}

/// First capture group of `re` in `text`, or the empty string.
fn first_capture<'a>(re: &Regex, text: &'a str) -> &'a str {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str())
}

/// Rewrite an embedded sticker element into `<dccon> <ID> <TITLE>`.
///
/// Only fields that *begin* with a `<video` or `<img` element are rewritten;
/// anything else passes through unchanged. A missing id or title leaves its
/// slot empty, so malformed markup still yields a (partial) token.
pub fn normalize_sticker_markup(text: &str) -> String {
    let src_re = if text.starts_with(VIDEO_MARKER) {
        &*VIDEO_SRC_RE
    } else if text.starts_with(IMAGE_MARKER) {
        &*IMAGE_SRC_RE
    } else {
        return text.to_string();
    };

    format!(
        "{} {} {}",
        STICKER_TOKEN,
        first_capture(src_re, text),
        first_capture(&TITLE_RE, text)
    )
}

/// Full normalization applied to comment contents: whitespace first, then
/// sticker markup.
pub fn normalize_contents(text: &str) -> String {
    normalize_sticker_markup(&canonicalize_whitespace(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_whitespace() {
        assert_eq!(canonicalize_whitespace("a  b\n\tc"), "a b c");
        assert_eq!(canonicalize_whitespace("\n hello \r\n"), " hello ");
        assert_eq!(canonicalize_whitespace("plain"), "plain");
        assert_eq!(canonicalize_whitespace(""), "");
    }

    #[test]
    fn test_canonicalize_whitespace_is_idempotent() {
        for s in ["a \t\n b", "  lead", "trail\n\n", "x", "", "a\r\n\x0Bb"] {
            let once = canonicalize_whitespace(s);
            assert_eq!(canonicalize_whitespace(&once), once);
        }
    }

    #[test]
    fn test_unicode_spaces_pass_through() {
        let text = "a\u{3000}\u{3000}b\u{a0}c";
        assert_eq!(canonicalize_whitespace(text), text);
        assert_eq!(canonicalize_whitespace("가\u{3000} \t나"), "가\u{3000} 나");
    }

    #[test]
    fn test_video_sticker() {
        let raw = r#"<video data-src="http://x?no=42" title="Foo">"#;
        assert_eq!(normalize_sticker_markup(raw), "<dccon> 42 Foo");
    }

    #[test]
    fn test_image_sticker() {
        let raw = r#"<img class="written_dccon" src="https://dcimg5.example.com/viewimage.php?no=24b0d769e1&amp;x" title="웃음" alt="">"#;
        assert_eq!(
            normalize_sticker_markup(raw),
            "<dccon> 24b0d769e1&amp;x 웃음"
        );
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(normalize_sticker_markup("hello there"), "hello there");
        // Marker must lead the field.
        let embedded = r#"look <img src="a?no=1" title="t">"#;
        assert_eq!(normalize_sticker_markup(embedded), embedded);
    }

    #[test]
    fn test_malformed_sticker_leaves_empty_slots() {
        assert_eq!(normalize_sticker_markup("<video>"), "<dccon>  ");
        assert_eq!(
            normalize_sticker_markup(r#"<img src="nope.png" title="T">"#),
            "<dccon>  T"
        );
        assert_eq!(
            normalize_sticker_markup(r#"<video data-src="v?no=7">"#),
            "<dccon> 7 "
        );
    }

    #[test]
    fn test_block_markup_filter() {
        assert!(is_block_markup("<div>quote</div>"));
        assert!(!is_block_markup(" <div>"));
        assert!(is_block_markup("<div class=\"q\">x</div>"));
        assert!(!is_block_markup("hi"));
    }

    #[test]
    fn test_normalize_contents_collapses_before_parsing() {
        let raw = "<video data-src=\"v?no=9\"\n  title=\"Big   Smile\">";
        assert_eq!(normalize_contents(raw), "<dccon> 9 Big Smile");
    }
}
