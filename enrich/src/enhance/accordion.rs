//! Accordion / FAQ activation
//!
//! Accordion blocks arrive from the CMS fully expanded. This transformer
//! puts them into their initial collapsed state and installs the textual
//! expand/collapse indicator the front-end toggle flips. Re-running replaces
//! any previous indicator instead of stacking a second one.

use kuchikiki::NodeRef;

use crate::dom;

use super::{classes, Context, Transform, TransformError};

/// Indicator glyph shown while the body is collapsed.
const COLLAPSED_GLYPH: &str = "+";
/// Glyph the front-end swaps in when the body is expanded.
const EXPANDED_GLYPH: &str = "\u{2212}";

/// Collapses accordion bodies and installs head indicators.
pub struct AccordionActivator;

fn first_inner(node: &NodeRef, class: &str) -> Option<NodeRef> {
    node.select(&format!(".{}", class))
        .ok()?
        .next()
        .map(|m| m.as_node().clone())
}

impl Transform for AccordionActivator {
    fn id(&self) -> &'static str {
        "accordion"
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<(), TransformError> {
        for item in ctx.select(&format!(".{}", classes::ACCORDION_ITEM))? {
            let (Some(header), Some(body)) = (
                first_inner(&item, classes::ACCORDION_HEADER),
                first_inner(&item, classes::ACCORDION_BODY),
            ) else {
                log::debug!("accordion item without header/body, skipping");
                continue;
            };

            let mut modified = false;

            if !dom::has_class(&body, classes::COLLAPSED) {
                dom::add_class(&body, classes::COLLAPSED);
                modified = true;
            }
            if dom::get_attr(&body, "hidden").is_none() {
                dom::set_attr(&body, "hidden", "");
                modified = true;
            }
            if dom::get_attr(&header, "aria-expanded").as_deref() != Some("false") {
                dom::set_attr(&header, "aria-expanded", "false");
                modified = true;
            }

            match first_inner(&header, classes::ACCORDION_INDICATOR) {
                Some(indicator) => {
                    if indicator.text_contents() != COLLAPSED_GLYPH {
                        for child in indicator.children().collect::<Vec<_>>() {
                            child.detach();
                        }
                        indicator.append(NodeRef::new_text(COLLAPSED_GLYPH));
                        modified = true;
                    }
                }
                None => {
                    let indicator = dom::new_element(
                        "span",
                        &[
                            ("class", classes::ACCORDION_INDICATOR),
                            ("data-expanded-glyph", EXPANDED_GLYPH),
                        ],
                    );
                    indicator.append(NodeRef::new_text(COLLAPSED_GLYPH));
                    header.append(indicator);
                    modified = true;
                }
            }

            if modified {
                ctx.note_changed();
            }
        }
        Ok(())
    }
}
