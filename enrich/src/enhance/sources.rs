//! Sources / references list formatting
//!
//! The list following a "Sources" or "References" heading is rewritten so
//! each row is one full-width link: the item's visible text loses its
//! trailing parenthetical (usually a bare domain) and trailing period, and
//! the original hyperlink is stretched to wrap the whole text, opening in a
//! new browsing context.

use regex::Regex;
use std::sync::OnceLock;

use kuchikiki::NodeRef;

use crate::dom;

use super::{classes, Context, Transform, TransformError};

/// Formats the article's sources list into full-row links.
pub struct SourcesFormatter;

/// At most one trailing period on either side of at most one trailing
/// parenthetical group.
fn trailing_citation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\s*\.?\s*(\([^()]*\))?\s*\.?\s*$").expect("static regex")
    })
}

/// Strip the trailing parenthetical and period from an item's visible text.
fn clean_item_text(text: &str) -> String {
    trailing_citation_re().replace(text.trim(), "").into_owned()
}

fn is_sources_heading(node: &NodeRef) -> bool {
    let text = node.text_contents().to_lowercase();
    text.contains("source") || text.contains("reference")
}

impl Transform for SourcesFormatter {
    fn id(&self) -> &'static str {
        "sources-list"
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<(), TransformError> {
        let Some(heading) = ctx
            .select("h2, h3, h4")?
            .into_iter()
            .find(is_sources_heading)
        else {
            return Ok(());
        };

        // Walk forward from the heading: the first sibling list wins, and a
        // later heading ends the search empty-handed.
        let mut cursor = dom::next_element_sibling(&heading);
        let list = loop {
            let Some(node) = cursor else { return Ok(()) };
            if dom::is_heading(&node) {
                return Ok(());
            }
            if dom::is_tag(&node, "ul") || dom::is_tag(&node, "ol") {
                break node;
            }
            cursor = dom::next_element_sibling(&node);
        };

        if dom::has_class(&list, classes::SOURCES_LIST) {
            return Ok(());
        }
        dom::add_class(&list, classes::SOURCES_LIST);
        ctx.note_changed();

        for item in list.children().collect::<Vec<_>>() {
            if !dom::is_tag(&item, "li") {
                continue;
            }
            if rewrite_item(&item) {
                ctx.note_changed();
            }
        }
        Ok(())
    }
}

/// Rewrite one list item into a single link wrapping its cleaned text.
/// Items without a hyperlink are left unmodified.
fn rewrite_item(item: &NodeRef) -> bool {
    let Ok(anchor) = item.select_first("a") else {
        return false;
    };
    let href = {
        let attrs = anchor.attributes.borrow();
        match attrs.get("href") {
            Some(href) if !href.is_empty() => href.to_string(),
            _ => return false,
        }
    };

    let cleaned = clean_item_text(&item.text_contents());
    if cleaned.is_empty() {
        log::debug!("sources item has no text besides its citation, skipping");
        return false;
    }

    for child in item.children().collect::<Vec<_>>() {
        child.detach();
    }
    let link = dom::new_element(
        "a",
        &[
            ("href", &href),
            ("target", "_blank"),
            ("rel", "noopener noreferrer"),
        ],
    );
    link.append(NodeRef::new_text(cleaned));
    item.append(link);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::testutil::{apply, fixture};

    #[test]
    fn test_clean_item_text() {
        assert_eq!(clean_item_text("Title (x.com)"), "Title");
        assert_eq!(clean_item_text("Title (x.com)."), "Title");
        assert_eq!(clean_item_text("Title."), "Title");
        assert_eq!(clean_item_text("Paper Title (2023)."), "Paper Title");
        assert_eq!(clean_item_text("No suffix"), "No suffix");
        // internal parentheticals survive
        assert_eq!(clean_item_text("A (b) c"), "A (b) c");
    }

    #[test]
    fn test_item_becomes_single_full_row_link() {
        let fx = fixture(
            "<h2>Sources</h2>\
             <ul><li><a href=\"https://x.com\">Title (x.com)</a></li></ul>",
        );
        let result = apply(&SourcesFormatter, &fx);
        assert_eq!(result.changed, 2);

        let list = fx.container.select_first("ul").unwrap();
        assert!(crate::dom::has_class(list.as_node(), "sources-list"));

        let item = fx.container.select_first("li").unwrap();
        assert_eq!(item.as_node().text_contents(), "Title");

        let anchors: Vec<_> = item.as_node().select("a").unwrap().collect();
        assert_eq!(anchors.len(), 1);
        let attrs = anchors[0].attributes.borrow();
        assert_eq!(attrs.get("href"), Some("https://x.com"));
        assert_eq!(attrs.get("target"), Some("_blank"));
    }

    #[test]
    fn test_link_with_surrounding_text_is_wrapped_whole() {
        let fx = fixture(
            "<h2>References</h2>\
             <ul><li>Smith et al, <a href=\"https://j.org/1\">The Study</a> (j.org).</li></ul>",
        );
        apply(&SourcesFormatter, &fx);
        let item = fx.container.select_first("li").unwrap();
        assert_eq!(item.as_node().text_contents(), "Smith et al, The Study");
        let anchor = item.as_node().select_first("a").unwrap();
        assert_eq!(
            anchor.as_node().text_contents(),
            "Smith et al, The Study"
        );
    }

    #[test]
    fn test_item_without_link_is_untouched() {
        let fx = fixture(
            "<h2>Sources</h2><ul><li>Plain citation (nowhere).</li></ul>",
        );
        let result = apply(&SourcesFormatter, &fx);
        // the list is tagged but the item stays as-is
        assert_eq!(result.changed, 1);
        let item = fx.container.select_first("li").unwrap();
        assert_eq!(item.as_node().text_contents(), "Plain citation (nowhere).");
    }

    #[test]
    fn test_search_stops_at_next_heading() {
        let fx = fixture(
            "<h2>Sources</h2><h2>Unrelated</h2>\
             <ul><li><a href=\"https://x.com\">Title</a></li></ul>",
        );
        let result = apply(&SourcesFormatter, &fx);
        assert_eq!(result.changed, 0);
        assert!(fx.container.select_first(".sources-list").is_err());
    }

    #[test]
    fn test_intervening_paragraph_is_skipped() {
        let fx = fixture(
            "<h3>Sources</h3><p>All links below.</p>\
             <ul><li><a href=\"https://x.com\">Title</a></li></ul>",
        );
        apply(&SourcesFormatter, &fx);
        assert!(fx.container.select_first(".sources-list").is_ok());
    }

    #[test]
    fn test_is_idempotent() {
        let fx = fixture(
            "<h2>Sources</h2>\
             <ul><li><a href=\"https://x.com\">Title (x.com)</a></li></ul>",
        );
        apply(&SourcesFormatter, &fx);
        let once = crate::dom::to_html(&fx.container);

        let second = apply(&SourcesFormatter, &fx);
        assert_eq!(second.changed, 0);
        assert_eq!(crate::dom::to_html(&fx.container), once);
    }
}
