//! Tolerant element lookup over `roxmltree` documents.
//!
//! Both feeds have drifted over the years: tag casing changes, some years
//! carry a namespace and some don't. Every lookup here matches on the
//! case-insensitive local name and ignores namespaces entirely.

use std::borrow::Cow;

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::ParseErrorKind;

/// Decode feed bytes, tolerating a BOM and stray non-UTF-8 bytes.
pub(crate) fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes)
}

/// Parse a document; the House feed ships a DOCTYPE so DTDs must be allowed.
pub(crate) fn parse(text: &str) -> Result<Document<'_>, ParseErrorKind> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options).map_err(|e| ParseErrorKind::Xml(e.to_string()))
}

pub(crate) fn is_named(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name().eq_ignore_ascii_case(name)
}

pub(crate) fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| is_named(*n, name))
}

/// First child matching any of `names`, in preference order.
pub(crate) fn child_any<'a, 'i>(node: Node<'a, 'i>, names: &[&str]) -> Option<Node<'a, 'i>> {
    names.iter().find_map(|name| child(node, name))
}

pub(crate) fn children<'a, 'i: 'a>(
    node: Node<'a, 'i>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'i>> + 'a {
    node.children().filter(move |n| is_named(*n, name))
}

pub(crate) fn descendant<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.descendants().find(|n| is_named(*n, name))
}

/// Concatenated, trimmed text content of `node` and its descendants.
pub(crate) fn text(node: Node<'_, '_>) -> String {
    let joined: String = node
        .descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect();
    joined.trim().to_string()
}

/// Text of the first child named `name`, `None` when the element is absent.
pub(crate) fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name).map(text)
}

/// Text of the first child named `name`, `None` when absent or blank.
pub(crate) fn child_text_non_empty(node: Node<'_, '_>, name: &str) -> Option<String> {
    child_text(node, name).filter(|s| !s.is_empty())
}

/// First non-blank text among `names`, in preference order.
pub(crate) fn first_text(node: Node<'_, '_>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| child_text_non_empty(node, name))
}

/// Attribute lookup by case-insensitive local name; blank values are `None`.
pub(crate) fn attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name().eq_ignore_ascii_case(name))
        .map(|a| a.value().trim())
        .filter(|v| !v.is_empty())
}

/// Parse a tally count. An absent or empty element is a zero the feed didn't print.
pub(crate) fn count(node: Option<Node<'_, '_>>, field: &str) -> Result<u32, ParseErrorKind> {
    let Some(node) = node else { return Ok(0) };
    let raw = text(node);
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse().map_err(|_| ParseErrorKind::MalformedTally {
        field: field.to_string(),
        value: raw,
    })
}

/// Leading integer of values like `"118"` or `"1st"`.
pub(crate) fn leading_number<T: std::str::FromStr>(raw: &str) -> Option<T> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Required numeric field: missing → `MissingField(field)`, garbage → `MalformedField`.
pub(crate) fn required_number<T: std::str::FromStr>(
    raw: Option<String>,
    field: &'static str,
) -> Result<T, ParseErrorKind> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or(ParseErrorKind::MissingField(field))?;
    leading_number(&raw).ok_or(ParseErrorKind::MalformedField { field, value: raw })
}
