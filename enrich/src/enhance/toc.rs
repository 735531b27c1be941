//! Table-of-contents index
//!
//! Scans the container for level-2/3 headings, assigns each a stable unique
//! id derived from its text, and publishes the ordered heading index the
//! navigation UI reads. The index is rebuilt from scratch on every run; ids
//! already present in the markup are respected and reused, which keeps them
//! stable across repeated runs over the same content.

use itertools::Itertools;
use serde::Serialize;
use std::collections::HashSet;

use crate::dom;

use super::{Context, Transform, TransformError};

/// One navigable heading inside the content container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingEntry {
    /// Anchor id written onto the heading element
    pub id: String,
    /// Visible heading text, trimmed
    pub text: String,
    /// Heading level: 2 or 3
    pub level: u8,
}

/// Ordered heading index, rebuilt wholesale on every content load.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TocIndex {
    entries: Vec<HeadingEntry>,
}

impl TocIndex {
    /// Build an index from entries in document order.
    pub fn new(entries: Vec<HeadingEntry>) -> Self {
        Self { entries }
    }

    /// Entries in document order.
    pub fn entries(&self) -> &[HeadingEntry] {
        &self.entries
    }

    /// Lazy, restartable walk over the entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = &HeadingEntry> + '_ {
        self.entries.iter()
    }

    /// Look an entry up by its anchor id.
    pub fn get(&self, id: &str) -> Option<&HeadingEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derive an anchor slug from heading text.
///
/// Lowercased, alphanumeric runs kept, everything else collapsed into single
/// dashes with no leading/trailing dash.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.to_lowercase().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Builds the heading index and writes anchor ids back onto the headings.
pub struct TocBuilder;

impl Transform for TocBuilder {
    fn id(&self) -> &'static str {
        "toc"
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<(), TransformError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut entries = Vec::new();

        for heading in ctx.select("h2, h3")? {
            let level = if dom::is_tag(&heading, "h2") { 2 } else { 3 };
            let text = heading.text_contents().trim().to_string();

            let existing = dom::get_attr(&heading, "id")
                .filter(|id| !id.is_empty() && !seen.contains(id));
            let id = match existing {
                Some(id) => id,
                None => {
                    let base = {
                        let slug = slugify(&text);
                        if slug.is_empty() {
                            "section".to_string()
                        } else {
                            slug
                        }
                    };
                    // Disambiguate colliding slugs by position.
                    let mut candidate = base.clone();
                    let mut n = 1;
                    while seen.contains(&candidate) {
                        n += 1;
                        candidate = format!("{}-{}", base, n);
                    }
                    dom::set_attr(&heading, "id", &candidate);
                    ctx.note_changed();
                    candidate
                }
            };

            seen.insert(id.clone());
            entries.push(HeadingEntry { id, text, level });
        }

        debug_assert!(entries.iter().map(|e| &e.id).all_unique());
        ctx.toc = TocIndex::new(entries);
        Ok(())
    }
}
