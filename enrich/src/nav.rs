//! Navigation read model
//!
//! The table-of-contents UI highlights the section currently being read and
//! scrolls to a section on demand. Both operations are pure functions of the
//! heading index, the viewport, and the headings' document offsets; geometry
//! is passed in through [`HeadingGeometry`] so the UI supplies live
//! measurements and tests supply a fixture map.

use std::collections::HashMap;

use crate::enhance::TocIndex;

/// Fixed offset subtracted from a scroll target, leaving room for the
/// sticky page header.
pub const SCROLL_OFFSET_PX: f64 = 100.0;

/// Height of the viewport band's top exclusion.
pub const TOP_EXCLUSION_PX: f64 = 100.0;

/// Fraction of the viewport excluded at the bottom of the band.
pub const BOTTOM_EXCLUSION_FRACTION: f64 = 0.66;

/// Current scroll state of the page.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// Document offset of the viewport top
    pub scroll_y: f64,
    /// Viewport height in pixels
    pub height: f64,
}

/// Source of heading positions (document offset of each heading's top).
pub trait HeadingGeometry {
    /// Document offset for the heading with the given anchor id.
    fn top_of(&self, id: &str) -> Option<f64>;
}

impl HeadingGeometry for HashMap<String, f64> {
    fn top_of(&self, id: &str) -> Option<f64> {
        self.get(id).copied()
    }
}

/// Tracks which indexed heading is currently "in view".
///
/// A heading counts as in view once its top sits inside the band that
/// excludes the top 100px and the bottom 66% of the viewport. Of several
/// in-band headings the last one in document order wins; when none is in
/// band the previous pointer is kept, so the pointer only ever moves when a
/// heading actually enters the band.
#[derive(Debug, Clone)]
pub struct SectionTracker {
    ids: Vec<String>,
    active: Option<String>,
}

impl SectionTracker {
    /// Create a tracker over the headings of the given index.
    pub fn new(index: &TocIndex) -> Self {
        Self {
            ids: index.iter().map(|e| e.id.clone()).collect(),
            active: None,
        }
    }

    /// The currently active heading id, if any.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Recompute the active section for the given viewport state.
    pub fn update<G: HeadingGeometry>(&mut self, viewport: &Viewport, geometry: &G) -> Option<&str> {
        let band_top = viewport.scroll_y + TOP_EXCLUSION_PX;
        let band_bottom =
            viewport.scroll_y + viewport.height * (1.0 - BOTTOM_EXCLUSION_FRACTION);

        for id in &self.ids {
            let Some(top) = geometry.top_of(id) else {
                continue;
            };
            if top >= band_top && top <= band_bottom {
                self.active = Some(id.clone());
            }
        }
        self.active.as_deref()
    }

    /// Scroll destination for the heading with the given id: its document
    /// offset minus the fixed header offset. Unknown ids are a no-op.
    pub fn scroll_target<G: HeadingGeometry>(&self, id: &str, geometry: &G) -> Option<f64> {
        if !self.ids.iter().any(|known| known == id) {
            return None;
        }
        let top = geometry.top_of(id)?;
        Some((top - SCROLL_OFFSET_PX).max(0.0))
    }
}
