//! CSS selector queries over a parsed HTML page.
//!
//! Exposes a deliberately narrow surface: a [`Document`] to search from, an
//! opaque [`Node`] handle for each match, and the free functions [`text`],
//! [`html`] and [`attr`] that read a node which may not exist. A lookup that
//! finds nothing yields an empty string instead of an error, so one missing
//! sub-element never costs the rest of an item.

use encoding_rs::Encoding;
use scraper::{ElementRef, Html, Selector};
use std::borrow::Cow;
use thiserror::Error;

/// A selector string that is not valid CSS.
#[derive(Debug, Clone, Error)]
#[error("invalid selector {selector:?}: {message}")]
pub struct SelectorError {
    /// The offending selector as written in the config
    pub selector: String,
    /// Parser diagnostic
    pub message: String,
}

/// A compiled selector.
///
/// An empty selector string compiles to a query that matches nothing, which
/// lets a feed leave out e.g. its description selector.
#[derive(Debug, Clone)]
pub struct Query {
    selector: Option<Selector>,
}

impl Query {
    /// Compiles `source`, rejecting invalid CSS syntax.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Ok(Self { selector: None });
        }

        let selector = Selector::parse(trimmed).map_err(|e| SelectorError {
            selector: source.to_owned(),
            message: e.to_string(),
        })?;

        Ok(Self {
            selector: Some(selector),
        })
    }

    /// True for the query compiled from an empty selector string.
    pub fn matches_nothing(&self) -> bool {
        self.selector.is_none()
    }
}

/// How far into the body to look for NUL bytes when sniffing binary data.
const BINARY_SNIFF_LEN: usize = 1024;

/// A body that is binary data rather than markup.
#[derive(Debug, Clone, Error)]
#[error("body is not text (NUL byte at offset {offset})")]
pub struct BinaryBody {
    pub offset: usize,
}

/// A parsed HTML page.
///
/// Not `Send`: parse, query and drop it within one synchronous call.
pub struct Document {
    html: Html,
}

impl Document {
    /// Decodes and parses a page.
    ///
    /// Decoding never fails on text: a byte order mark picks the encoding,
    /// otherwise valid UTF-8 is taken as is and anything else is read as
    /// windows-1252, the superset of latin-1 legacy pages are served in.
    /// The HTML parser repairs malformed markup the way browsers do, so the
    /// only rejected input is binary data.
    pub fn parse(body: &[u8]) -> Result<Self, BinaryBody> {
        let source = decode(body)?;
        Ok(Self {
            html: Html::parse_document(&source),
        })
    }

    /// All elements matching `query`, in document order.
    pub fn find(&self, query: &Query) -> Vec<Node<'_>> {
        match &query.selector {
            Some(selector) => self.html.select(selector).map(Node).collect(),
            None => Vec::new(),
        }
    }
}

fn decode(body: &[u8]) -> Result<Cow<'_, str>, BinaryBody> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(body) {
        let (text, _had_errors) = encoding.decode_without_bom_handling(&body[bom_len..]);
        return Ok(text);
    }

    let sniff = &body[..body.len().min(BINARY_SNIFF_LEN)];
    if let Some(offset) = sniff.iter().position(|&b| b == 0) {
        return Err(BinaryBody { offset });
    }

    match std::str::from_utf8(body) {
        Ok(text) => Ok(Cow::Borrowed(text)),
        Err(_) => {
            let (text, _had_errors) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(body);
            Ok(text)
        }
    }
}

/// Opaque handle to one matched element.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    /// Descendants of this node matching `query`, in document order.
    ///
    /// The node itself is never part of the result.
    pub fn find(&self, query: &Query) -> Vec<Node<'a>> {
        match &query.selector {
            Some(selector) => self.0.select(selector).map(Node).collect(),
            None => Vec::new(),
        }
    }

    /// First descendant matching `query`.
    pub fn find_first(&self, query: &Query) -> Option<Node<'a>> {
        let selector = query.selector.as_ref()?;
        self.0.select(selector).next().map(Node)
    }
}

/// Concatenated text of the node and all its descendants, untrimmed.
pub fn text(node: Option<Node<'_>>) -> String {
    node.map(|n| n.0.text().collect()).unwrap_or_default()
}

/// Serialized inner markup of the node.
pub fn html(node: Option<Node<'_>>) -> String {
    node.map(|n| n.0.inner_html()).unwrap_or_default()
}

/// Attribute value, or `default` when the node or the attribute is missing.
pub fn attr(node: Option<Node<'_>>, name: &str, default: &str) -> String {
    node.and_then(|n| n.0.value().attr(name))
        .unwrap_or(default)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="entry" id="first">
            <h2>First <em>post</em></h2>
            <p class="summary">Hello <b>world</b></p>
            <a href="/posts/1" title="one">read</a>
        </div>
        <div class="entry" id="second">
            <h2>Second post</h2>
            <a>no href</a>
        </div>
        <div class="other"><h2>Not an entry</h2></div>
    </body></html>"#;

    fn doc() -> Document {
        Document::parse(PAGE.as_bytes()).unwrap()
    }

    fn q(s: &str) -> Query {
        Query::parse(s).unwrap()
    }

    #[test]
    fn test_find_returns_matches_in_document_order() {
        let doc = doc();
        let entries = doc.find(&q(".entry"));
        assert_eq!(entries.len(), 2);
        assert_eq!(attr(Some(entries[0]), "id", ""), "first");
        assert_eq!(attr(Some(entries[1]), "id", ""), "second");
    }

    #[test]
    fn test_find_no_match_is_empty() {
        let doc = doc();
        assert!(doc.find(&q("article.missing")).is_empty());
    }

    #[test]
    fn test_empty_selector_matches_nothing() {
        let query = q("   ");
        assert!(query.matches_nothing());
        let doc = doc();
        assert!(doc.find(&query).is_empty());
        let entry = doc.find(&q(".entry"))[0];
        assert!(entry.find_first(&query).is_none());
        assert!(entry.find(&query).is_empty());
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let err = Query::parse("div[").unwrap_err();
        assert_eq!(err.selector, "div[");
        assert!(err.to_string().contains("invalid selector"));
    }

    #[test]
    fn test_node_find_is_scoped_to_descendants() {
        let doc = doc();
        let second = doc.find(&q(".entry"))[1];
        let headings = second.find(&q("h2"));
        assert_eq!(headings.len(), 1);
        assert_eq!(text(Some(headings[0])), "Second post");
        // The scope node itself does not match its own query
        assert!(second.find(&q(".entry")).is_empty());
    }

    #[test]
    fn test_text_concatenates_descendants() {
        let doc = doc();
        let first = doc.find(&q(".entry"))[0];
        assert_eq!(text(first.find_first(&q("h2"))), "First post");
    }

    #[test]
    fn test_text_is_not_trimmed() {
        let doc = Document::parse(b"<p>  spaced  </p>").unwrap();
        let p = doc.find(&q("p"))[0];
        assert_eq!(text(Some(p)), "  spaced  ");
    }

    #[test]
    fn test_html_returns_inner_markup() {
        let doc = doc();
        let first = doc.find(&q(".entry"))[0];
        assert_eq!(
            html(first.find_first(&q(".summary"))),
            "Hello <b>world</b>"
        );
    }

    #[test]
    fn test_missing_node_degrades_to_empty() {
        assert_eq!(text(None), "");
        assert_eq!(html(None), "");
        assert_eq!(attr(None, "href", "fallback"), "fallback");
    }

    #[test]
    fn test_attr_missing_attribute_uses_default() {
        let doc = doc();
        let second = doc.find(&q(".entry"))[1];
        assert_eq!(attr(second.find_first(&q("a")), "href", ""), "");
        let first = doc.find(&q(".entry"))[0];
        assert_eq!(attr(first.find_first(&q("a")), "href", ""), "/posts/1");
    }

    #[test]
    fn test_latin1_body_decoded_as_windows_1252() {
        let doc = Document::parse(b"<h2>Caf\xe9 \x93quoted\x94</h2>").unwrap();
        let h2 = doc.find(&q("h2"))[0];
        assert_eq!(text(Some(h2)), "Caf\u{e9} \u{201c}quoted\u{201d}");
    }

    #[test]
    fn test_utf8_body_kept_as_is() {
        let doc = Document::parse("<h2>Caf\u{e9}</h2>".as_bytes()).unwrap();
        assert_eq!(text(Some(doc.find(&q("h2"))[0])), "Caf\u{e9}");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let doc = Document::parse(b"\xef\xbb\xbf<p>x</p>").unwrap();
        assert_eq!(text(Some(doc.find(&q("p"))[0])), "x");
    }

    #[test]
    fn test_utf16_body_with_bom_decoded() {
        let mut body = vec![0xff, 0xfe];
        for unit in "<p>hi</p>".encode_utf16() {
            body.extend_from_slice(&unit.to_le_bytes());
        }
        let doc = Document::parse(&body).unwrap();
        assert_eq!(text(Some(doc.find(&q("p"))[0])), "hi");
    }

    #[test]
    fn test_binary_body_rejected() {
        let err = Document::parse(b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR").err().unwrap();
        assert_eq!(err.offset, 8);
    }

    #[test]
    fn test_malformed_markup_still_parses() {
        let doc = Document::parse(b"<div class=entry><h2>Unclosed<div class=entry>").unwrap();
        assert_eq!(doc.find(&q(".entry")).len(), 2);
    }
}
