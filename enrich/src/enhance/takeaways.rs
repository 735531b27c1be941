//! Key-takeaways grouping
//!
//! A level-2 heading mentioning "takeaway" and the run of lists that follows
//! it form one visual unit. This transformer wraps them in a single container
//! so the stylesheet can frame them as a card.

use crate::dom;

use super::{classes, Context, Transform, TransformError};

/// Wraps takeaways headings together with their trailing lists.
pub struct KeyTakeawaysWrapper;

impl Transform for KeyTakeawaysWrapper {
    fn id(&self) -> &'static str {
        "key-takeaways"
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<(), TransformError> {
        for heading in ctx.select("h2")? {
            if !heading.text_contents().to_lowercase().contains("takeaway") {
                continue;
            }
            if heading
                .ancestors()
                .any(|a| dom::has_class(&a, classes::KEY_TAKEAWAYS))
            {
                continue;
            }

            let wrapper = dom::new_element("div", &[("class", classes::KEY_TAKEAWAYS)]);
            heading.insert_before(wrapper.clone());
            wrapper.append(heading);

            // Pull in the immediately following sibling lists, stopping at
            // the first non-list sibling. A heading with no lists still gets
            // wrapped on its own.
            loop {
                let Some(list) = dom::next_element_sibling(&wrapper) else {
                    break;
                };
                if !(dom::is_tag(&list, "ul") || dom::is_tag(&list, "ol")) {
                    break;
                }
                while let Some(node) = wrapper.next_sibling() {
                    let done = node == list;
                    wrapper.append(node);
                    if done {
                        break;
                    }
                }
            }

            ctx.note_changed();
        }
        Ok(())
    }
}
