//! List repair
//!
//! Some CMS editors split one logical list into several consecutive sibling
//! lists when authors paste content. The merger folds adjacent lists of the
//! same kind back into one, as long as both carry the shared marker class.

use crate::dom;

use super::{classes, Context, Transform, TransformError};

/// Merges consecutive same-type marker-classed sibling lists.
pub struct ListMerger;

impl Transform for ListMerger {
    fn id(&self) -> &'static str {
        "list-merger"
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<(), TransformError> {
        // Each merge mutates the sibling structure, so the scan restarts
        // after every merge and the pass only ends once a full scan finds
        // nothing left to fold.
        loop {
            let mut merged = false;
            for list in ctx.select("ul, ol")? {
                if !dom::has_class(&list, classes::ARTICLE_LIST) {
                    continue;
                }
                if list.parent().is_none() {
                    // removed by a merge earlier in this scan
                    continue;
                }
                let Some(next) = dom::next_element_sibling(&list) else {
                    continue;
                };

                let same_tag = match (list.as_element(), next.as_element()) {
                    (Some(a), Some(b)) => a.name.local == b.name.local,
                    _ => false,
                };
                if !same_tag || !dom::has_class(&next, classes::ARTICLE_LIST) {
                    continue;
                }

                for child in next.children().collect::<Vec<_>>() {
                    if dom::is_tag(&child, "li") {
                        list.append(child);
                    }
                }
                next.detach();
                ctx.note_changed();
                merged = true;
                break;
            }
            if !merged {
                return Ok(());
            }
        }
    }
}
