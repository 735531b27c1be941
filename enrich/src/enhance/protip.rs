//! Pro-tip paragraph highlighting
//!
//! Paragraphs that open with the literal prefix "Pro tip:" get a highlight
//! class, and the prefix itself is wrapped in an emphasis element so the
//! stylesheet can render it differently from the tip body.

use kuchikiki::NodeRef;

use crate::dom;

use super::{classes, Context, Transform, TransformError};

/// The fixed prefix, matched case-insensitively at the start of a paragraph.
const PREFIX: &str = "Pro tip:";

/// Highlights paragraphs that begin with the pro-tip prefix.
pub struct ProTipHighlighter;

impl Transform for ProTipHighlighter {
    fn id(&self) -> &'static str {
        "pro-tip"
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<(), TransformError> {
        for paragraph in ctx.select("p")? {
            if dom::has_class(&paragraph, classes::PRO_TIP) {
                continue;
            }

            let text = paragraph.text_contents();
            let trimmed = text.trim_start();
            let starts_with_prefix = trimmed
                .get(..PREFIX.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(PREFIX));
            if !starts_with_prefix {
                continue;
            }

            dom::add_class(&paragraph, classes::PRO_TIP);
            if !wrap_prefix(&paragraph) {
                // Prefix split across markup boundaries: keep the highlight,
                // leave the text structure alone.
                log::debug!("pro-tip prefix not contained in one text node, class only");
            }
            ctx.note_changed();
        }
        Ok(())
    }
}

/// Wrap the literal prefix occurrence in `<strong class="pro-tip-label">`.
///
/// Returns false when the first meaningful text node does not contain the
/// whole prefix.
fn wrap_prefix(paragraph: &NodeRef) -> bool {
    let candidate = dom::forward_edge_text_nodes(paragraph)
        .into_iter()
        .find(|node| {
            node.as_text()
                .is_some_and(|t| !t.borrow().trim().is_empty())
        });
    let Some(node) = candidate else { return false };
    let Some(text) = node.as_text() else { return false };

    let (leading_ws, prefix_text, remainder) = {
        let content = text.borrow();
        let lead = content.len() - content.trim_start().len();
        let rest = &content[lead..];
        let matches_here = rest
            .get(..PREFIX.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(PREFIX));
        if !matches_here {
            return false;
        }
        (
            content[..lead].to_string(),
            rest[..PREFIX.len()].to_string(),
            rest[PREFIX.len()..].to_string(),
        )
    };

    let label = dom::new_element("strong", &[("class", classes::PRO_TIP_LABEL)]);
    label.append(NodeRef::new_text(prefix_text));
    node.insert_after(NodeRef::new_text(remainder));
    node.insert_after(label);
    *text.borrow_mut() = leading_ws;
    true
}
