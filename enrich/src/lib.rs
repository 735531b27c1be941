//! enrich - post-render enhancement pipeline for CMS article HTML
//!
//! A fixed, ordered set of idempotent transformer units scans the rendered
//! article body (the "content container") and mutates it in place: cleaning
//! quote glyphs, injecting author bylines, highlighting pro tips, grouping
//! takeaways, repairing split lists, rewriting checkmark paragraphs,
//! formatting the sources list, classifying image orientation, building the
//! table-of-contents index and activating accordions.
//!
//! Raw CMS markup goes in, enhanced markup plus a heading index come out;
//! every unit degrades to a no-op on missing or malformed structure, so the
//! worst case is an enhancement that is simply absent.
//!
//! # Quick start
//!
//! ```rust
//! use enrich::{Enhancer, SiteConfig};
//!
//! let doc = enrich::dom::parse_document(
//!     "<div class=\"article-body\"><h2>Intro</h2><p>Pro tip: read me.</p></div>",
//! );
//! let report = Enhancer::new(SiteConfig::default())
//!     .enhance_document(&doc)
//!     .expect("container present");
//!
//! assert_eq!(report.toc.len(), 1);
//! assert_eq!(report.toc.entries()[0].id, "intro");
//! ```

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod dom;
pub mod enhance;
pub mod nav;
pub mod site_config;

pub use enhance::{
    EnhanceError, EnhanceReport, Enhancer, HeadingEntry, ImageProbe, TocIndex, UnitOutcome,
};
pub use nav::{HeadingGeometry, SectionTracker, Viewport};
pub use site_config::{QuoteAuthor, SiteConfig};
