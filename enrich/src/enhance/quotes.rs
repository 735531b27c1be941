//! Quote block enhancements: edge-glyph cleaning and author bylines
//!
//! CMS rich text frequently carries its own quotation marks (or encoding
//! artifacts) at the edges of quote paragraphs. The presentation layer adds
//! decorative quote glyphs, so the cleaner strips the marks from the true
//! start and end of each paragraph, leaving internal quotes untouched.
//!
//! The injector appends a structured byline to quote blocks that have no
//! citation of their own.

use kuchikiki::NodeRef;

use crate::dom;

use super::{classes, Context, Transform, TransformError};

/// Strips quote-like characters from the edges of paragraphs inside quote
/// blocks.
pub struct QuoteCleaner;

/// Appends the configured author byline to uncited quote blocks.
pub struct QuoteAuthorInjector;

fn is_quote_mark(ch: char) -> bool {
    matches!(
        ch,
        '"' | '\'' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}' | '\u{201E}'
            | '\u{201F}' | '\u{00AB}' | '\u{00BB}' | '\u{FFFD}'
    )
}

fn is_strippable(ch: char) -> bool {
    is_quote_mark(ch) || ch.is_whitespace()
}

/// Byte length of the strippable run at the start (or end) of `text`.
///
/// Returns `(bytes, saw_quote, consumed_all)`; a run with no quote mark in it
/// must not be stripped, and a fully consumed node lets the run continue into
/// the next edge text node.
fn edge_run(text: &str, from_end: bool) -> (usize, bool, bool) {
    let mut bytes = 0;
    let mut saw_quote = false;
    let mut chars_iter: Box<dyn Iterator<Item = char>> = if from_end {
        Box::new(text.chars().rev())
    } else {
        Box::new(text.chars())
    };
    loop {
        match chars_iter.next() {
            Some(ch) if is_strippable(ch) => {
                bytes += ch.len_utf8();
                saw_quote |= is_quote_mark(ch);
            }
            Some(_) => return (bytes, saw_quote, false),
            None => return (bytes, saw_quote, true),
        }
    }
}

/// Strip one edge of a paragraph. `nodes` is the edge text node sequence in
/// trim order (outermost first). Returns true when anything was removed.
fn strip_edge(nodes: &[NodeRef], from_end: bool) -> bool {
    // First pass: find how far the strippable run extends and whether it
    // actually contains a quote mark.
    let mut run = Vec::new();
    let mut saw_quote = false;
    for node in nodes {
        let Some(text) = node.as_text() else { continue };
        let (bytes, quote_here, consumed_all) = edge_run(&text.borrow(), from_end);
        saw_quote |= quote_here;
        run.push((node.clone(), bytes));
        if !consumed_all {
            break;
        }
    }
    if !saw_quote {
        return false;
    }

    let mut stripped = false;
    for (node, bytes) in run {
        if bytes == 0 {
            continue;
        }
        let Some(text) = node.as_text() else { continue };
        let mut content = text.borrow_mut();
        let remaining = if from_end {
            content[..content.len() - bytes].to_string()
        } else {
            content[bytes..].to_string()
        };
        *content = remaining;
        stripped = true;
    }
    stripped
}

impl Transform for QuoteCleaner {
    fn id(&self) -> &'static str {
        "quote-cleaner"
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<(), TransformError> {
        for paragraph in ctx.select("blockquote p")? {
            if dom::is_marked(&paragraph, self.id()) {
                continue;
            }

            let leading = dom::forward_edge_text_nodes(&paragraph);
            let trailing = dom::backward_edge_text_nodes(&paragraph);
            let changed =
                strip_edge(&leading, false) | strip_edge(&trailing, true);

            dom::mark(&paragraph, self.id());
            if changed {
                ctx.note_changed();
            }
        }
        Ok(())
    }
}

/// Whether the quote block already carries non-empty citation text.
fn has_citation(block: &NodeRef) -> bool {
    match block.select("cite") {
        Ok(mut cites) => cites.any(|c| !c.as_node().text_contents().trim().is_empty()),
        Err(()) => false,
    }
}

impl Transform for QuoteAuthorInjector {
    fn id(&self) -> &'static str {
        "quote-author"
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<(), TransformError> {
        let Some(author) = ctx.config.quote_author.clone() else {
            log::debug!("no quote byline configured, skipping injection");
            return Ok(());
        };

        for block in ctx.select("blockquote")? {
            if has_citation(&block) {
                continue;
            }
            // Idempotence is an existence check on the injected element, not
            // a marker attribute.
            if block
                .select(&format!(".{}", classes::QUOTE_AUTHOR))
                .map_or(false, |mut m| m.next().is_some())
            {
                continue;
            }

            let byline = dom::new_element("footer", &[("class", classes::QUOTE_AUTHOR)]);
            let avatar = dom::new_element(
                "img",
                &[
                    ("class", classes::QUOTE_AUTHOR_AVATAR),
                    ("src", &author.avatar),
                    ("alt", &author.name),
                ],
            );
            let name = dom::new_element("span", &[("class", classes::QUOTE_AUTHOR_NAME)]);
            name.append(NodeRef::new_text(author.name.clone()));
            let role = dom::new_element("span", &[("class", classes::QUOTE_AUTHOR_ROLE)]);
            role.append(NodeRef::new_text(author.role.clone()));

            byline.append(avatar);
            byline.append(name);
            byline.append(role);
            block.append(byline);
            ctx.note_changed();
        }
        Ok(())
    }
}
