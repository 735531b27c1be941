//! Checkmark paragraph rewriting
//!
//! Authors mark benefit lines with a leading checkmark emoji. The emoji
//! renders inconsistently across platforms, so it is replaced with the site's
//! own icon: the paragraph is tagged, the emoji removed, an icon image
//! prepended and the remaining content wrapped in a span for styling.

use kuchikiki::NodeRef;

use crate::dom;

use super::{classes, Context, Transform, TransformError};

const CHECKMARK: char = '\u{2705}';
const VARIATION_SELECTOR: char = '\u{FE0F}';

/// Rewrites paragraphs that open with the checkmark emoji.
pub struct CheckmarkReplacer;

impl Transform for CheckmarkReplacer {
    fn id(&self) -> &'static str {
        "checkmark"
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<(), TransformError> {
        let icon_src = ctx.config.assets.check_icon.clone();
        for paragraph in ctx.select("p")? {
            if !strip_leading_checkmark(&paragraph) {
                continue;
            }

            dom::add_class(&paragraph, classes::CHECK_ITEM);

            let text_wrap = dom::new_element("span", &[("class", classes::CHECK_TEXT)]);
            for child in paragraph.children().collect::<Vec<_>>() {
                text_wrap.append(child);
            }

            let icon = dom::new_element(
                "img",
                &[("class", classes::CHECK_ICON), ("src", &icon_src), ("alt", "")],
            );
            paragraph.append(icon);
            paragraph.append(text_wrap);
            ctx.note_changed();
        }
        Ok(())
    }
}

/// Remove a leading checkmark emoji (tolerating an emoji variation selector)
/// from the paragraph's first meaningful text node. Returns true when an
/// emoji was found and removed. Once removed it can never match again, which
/// is what makes the structural rewrite one-shot.
fn strip_leading_checkmark(paragraph: &NodeRef) -> bool {
    let candidate = dom::forward_edge_text_nodes(paragraph)
        .into_iter()
        .find(|node| {
            node.as_text()
                .is_some_and(|t| !t.borrow().trim().is_empty())
        });
    let Some(node) = candidate else { return false };
    let Some(text) = node.as_text() else { return false };

    let remaining = {
        let content = text.borrow();
        let trimmed = content.trim_start();
        if !trimmed.starts_with(CHECKMARK) {
            return false;
        }
        let mut rest = &trimmed[CHECKMARK.len_utf8()..];
        if rest.starts_with(VARIATION_SELECTOR) {
            rest = &rest[VARIATION_SELECTOR.len_utf8()..];
        }
        rest.trim_start().to_string()
    };
    *text.borrow_mut() = remaining;
    true
}
