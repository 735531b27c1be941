//! DOM tree handle and helpers
//!
//! The enhancement pipeline operates on a mutable HTML tree parsed with
//! `kuchikiki`. Every transformer receives the content container as an
//! explicit [`NodeRef`] rather than querying an ambient document, which keeps
//! the units testable against in-memory fixtures.
//!
//! This module also defines the shared idempotence marker: processed elements
//! carry a `data-enhanced` attribute listing the ids of the transformer units
//! that already handled them.

use html5ever::{namespace_url, ns, LocalName, QualName};
use kuchikiki::traits::TendrilSink;
use kuchikiki::{Attribute, ExpandedName, NodeRef};

/// Attribute used to record which transformer units processed an element.
///
/// The value is a space-separated list of unit ids.
pub const MARKER_ATTR: &str = "data-enhanced";

/// Inline formatting tags that may wrap the visual start or end of a
/// paragraph without changing what counts as its leading/trailing text.
const INLINE_MARKUP_TAGS: &[&str] = &["em", "strong", "i", "b", "u", "mark", "span"];

/// Parse a complete HTML document into a mutable node tree.
///
/// The parser follows the HTML5 specification; implicit `<html>`, `<head>`
/// and `<body>` elements are synthesised when missing.
pub fn parse_document(html: &str) -> NodeRef {
    kuchikiki::parse_html().one(html)
}

/// Serialize a node (including the node itself) back to HTML.
pub fn to_html(node: &NodeRef) -> String {
    let mut buf = Vec::new();
    if node.serialize(&mut buf).is_err() {
        log::warn!("failed to serialize node");
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Create a new HTML element with the given attributes.
pub fn new_element(name: &str, attrs: &[(&str, &str)]) -> NodeRef {
    NodeRef::new_element(
        QualName::new(None, ns!(html), LocalName::from(name)),
        attrs.iter().map(|(name, value)| {
            (
                ExpandedName::new(ns!(), LocalName::from(*name)),
                Attribute {
                    prefix: None,
                    value: (*value).to_string(),
                },
            )
        }),
    )
}

/// Whether the node is an element with the given local tag name.
pub fn is_tag(node: &NodeRef, tag: &str) -> bool {
    node.as_element().is_some_and(|el| &*el.name.local == tag)
}

/// Whether the node is any of `<h1>`..`<h6>`.
pub fn is_heading(node: &NodeRef) -> bool {
    node.as_element().is_some_and(|el| {
        matches!(&*el.name.local, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
    })
}

/// Get an attribute value from an element node.
pub fn get_attr(node: &NodeRef, name: &str) -> Option<String> {
    let el = node.as_element()?;
    let attrs = el.attributes.borrow();
    attrs.get(name).map(str::to_string)
}

/// Set an attribute on an element node. Non-element nodes are ignored.
pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
    if let Some(el) = node.as_element() {
        el.attributes.borrow_mut().insert(name, value.to_string());
    }
}

/// Whether the element carries the given class token.
pub fn has_class(node: &NodeRef, class: &str) -> bool {
    get_attr(node, "class")
        .is_some_and(|v| v.split_whitespace().any(|token| token == class))
}

/// Add a class token to the element, preserving existing tokens.
pub fn add_class(node: &NodeRef, class: &str) {
    let Some(el) = node.as_element() else { return };
    let mut attrs = el.attributes.borrow_mut();
    let current = attrs.get("class").map(str::to_string);
    match current {
        Some(v) if v.split_whitespace().any(|token| token == class) => {}
        Some(v) if !v.trim().is_empty() => {
            attrs.insert("class", format!("{} {}", v.trim(), class));
        }
        _ => {
            attrs.insert("class", class.to_string());
        }
    }
}

/// Remove a class token from the element; drops the attribute when empty.
pub fn remove_class(node: &NodeRef, class: &str) {
    let Some(el) = node.as_element() else { return };
    let mut attrs = el.attributes.borrow_mut();
    let Some(current) = attrs.get("class").map(str::to_string) else {
        return;
    };
    let remaining: Vec<&str> = current
        .split_whitespace()
        .filter(|token| *token != class)
        .collect();
    if remaining.is_empty() {
        attrs.remove("class");
    } else {
        attrs.insert("class", remaining.join(" "));
    }
}

/// Whether the element was already processed by the given transformer unit.
pub fn is_marked(node: &NodeRef, unit_id: &str) -> bool {
    get_attr(node, MARKER_ATTR)
        .is_some_and(|v| v.split_whitespace().any(|id| id == unit_id))
}

/// Record that the given transformer unit processed this element.
pub fn mark(node: &NodeRef, unit_id: &str) {
    let Some(el) = node.as_element() else { return };
    let mut attrs = el.attributes.borrow_mut();
    let current = attrs.get(MARKER_ATTR).map(str::to_string);
    match current {
        Some(v) if v.split_whitespace().any(|id| id == unit_id) => {}
        Some(v) => {
            attrs.insert(MARKER_ATTR, format!("{} {}", v, unit_id));
        }
        None => {
            attrs.insert(MARKER_ATTR, unit_id.to_string());
        }
    }
}

/// Next sibling element, skipping whitespace-only text and comments.
///
/// Returns `None` when meaningful text (or nothing) separates the node from
/// the next element, so callers never treat content across real text as
/// "adjacent".
pub fn next_element_sibling(node: &NodeRef) -> Option<NodeRef> {
    let mut current = node.next_sibling();
    while let Some(sibling) = current {
        if sibling.as_element().is_some() {
            return Some(sibling);
        }
        if let Some(text) = sibling.as_text() {
            if !text.borrow().trim().is_empty() {
                return None;
            }
        } else if sibling.as_comment().is_none() {
            return None;
        }
        current = sibling.next_sibling();
    }
    None
}

/// Text nodes at the visual start of `root`, in reading order.
///
/// Descends through inline formatting wrappers only; collection stops at the
/// first element that is not a pure formatting wrapper (links, images, line
/// breaks all end the leading edge).
pub fn forward_edge_text_nodes(root: &NodeRef) -> Vec<NodeRef> {
    let mut out = Vec::new();
    collect_edge_text(root, false, &mut out);
    out
}

/// Text nodes at the visual end of `root`, ordered from the end inward.
pub fn backward_edge_text_nodes(root: &NodeRef) -> Vec<NodeRef> {
    let mut out = Vec::new();
    collect_edge_text(root, true, &mut out);
    out
}

fn collect_edge_text(node: &NodeRef, reverse: bool, out: &mut Vec<NodeRef>) -> bool {
    let children: Vec<NodeRef> = if reverse {
        node.children().rev().collect()
    } else {
        node.children().collect()
    };
    for child in children {
        if child.as_text().is_some() {
            out.push(child.clone());
            continue;
        }
        if child.as_comment().is_some() {
            continue;
        }
        if let Some(el) = child.as_element() {
            if INLINE_MARKUP_TAGS.contains(&&*el.name.local) {
                if !collect_edge_text(&child, reverse, out) {
                    return false;
                }
                continue;
            }
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_p(doc: &NodeRef) -> NodeRef {
        doc.select_first("p").unwrap().as_node().clone()
    }

    #[test]
    fn test_class_helpers() {
        let doc = parse_document("<p class=\"one two\">x</p>");
        let p = first_p(&doc);

        assert!(has_class(&p, "one"));
        assert!(!has_class(&p, "three"));

        add_class(&p, "three");
        assert!(has_class(&p, "three"));

        // adding again does not duplicate the token
        add_class(&p, "three");
        assert_eq!(get_attr(&p, "class").unwrap(), "one two three");

        remove_class(&p, "two");
        assert_eq!(get_attr(&p, "class").unwrap(), "one three");
    }

    #[test]
    fn test_remove_last_class_drops_attribute() {
        let doc = parse_document("<p class=\"only\">x</p>");
        let p = first_p(&doc);
        remove_class(&p, "only");
        assert_eq!(get_attr(&p, "class"), None);
    }

    #[test]
    fn test_marker_roundtrip() {
        let doc = parse_document("<p>x</p>");
        let p = first_p(&doc);

        assert!(!is_marked(&p, "quote-cleaner"));
        mark(&p, "quote-cleaner");
        assert!(is_marked(&p, "quote-cleaner"));

        mark(&p, "pro-tip");
        assert!(is_marked(&p, "quote-cleaner"));
        assert!(is_marked(&p, "pro-tip"));

        // marking twice keeps a single entry
        mark(&p, "pro-tip");
        assert_eq!(get_attr(&p, MARKER_ATTR).unwrap(), "quote-cleaner pro-tip");
    }

    #[test]
    fn test_next_element_sibling_skips_whitespace_only() {
        let doc = parse_document("<div><ul id=\"a\"></ul>\n  <ul id=\"b\"></ul></div>");
        let a = doc.select_first("#a").unwrap().as_node().clone();
        let next = next_element_sibling(&a).unwrap();
        assert_eq!(get_attr(&next, "id").unwrap(), "b");
    }

    #[test]
    fn test_next_element_sibling_blocked_by_text() {
        let doc = parse_document("<div><ul id=\"a\"></ul>between<ul id=\"b\"></ul></div>");
        let a = doc.select_first("#a").unwrap().as_node().clone();
        assert!(next_element_sibling(&a).is_none());
    }

    #[test]
    fn test_forward_edge_descends_inline_wrappers() {
        let doc = parse_document("<p><em>“</em>Hello <a href=\"#\">link</a> world</p>");
        let p = first_p(&doc);
        let nodes = forward_edge_text_nodes(&p);
        let texts: Vec<String> = nodes.iter().map(|n| n.text_contents()).collect();
        // stops at the <a>: the link is not a formatting wrapper
        assert_eq!(texts, vec!["“".to_string(), "Hello ".to_string()]);
    }

    #[test]
    fn test_new_element_serializes_with_attributes() {
        let el = new_element("img", &[("src", "/x.png"), ("class", "check-icon")]);
        let html = to_html(&el);
        assert!(html.contains("src=\"/x.png\""));
        assert!(html.contains("class=\"check-icon\""));
    }
}
