//! Content enhancement pipeline
//!
//! The pipeline is a fixed, ordered set of independent transformer units.
//! Each unit scans the content container (the rendered article body) and
//! mutates it in place to add the structure, styling hooks and interactivity
//! the raw CMS markup lacks.
//!
//! Units are idempotent: running the pipeline repeatedly over the same markup
//! yields the same tree. Each unit performs its own existence/marker checks
//! and never assumes another unit has or has not run. A unit that matches
//! nothing is a silent no-op; a unit that fails internally is logged,
//! recorded in the report and skipped, leaving the content unmodified and
//! every sibling unit unaffected.

use kuchikiki::NodeRef;
use thiserror::Error;

use crate::site_config::SiteConfig;

pub mod accordion;
pub mod checkmark;
pub mod images;
pub mod lists;
pub mod protip;
pub mod quotes;
pub mod sources;
pub mod takeaways;
pub mod toc;

pub use images::{FsProbe, ImageProbe};
pub use toc::{HeadingEntry, TocIndex};

/// Class names applied by the pipeline.
///
/// These are the externally observable contract: downstream stylesheets key
/// off these exact names, so they live in one place.
pub mod classes {
    /// Paragraph highlighted as a pro tip
    pub const PRO_TIP: &str = "pro-tip";
    /// Emphasis element wrapping the literal "Pro tip:" prefix
    pub const PRO_TIP_LABEL: &str = "pro-tip-label";
    /// Wrapper grouping a takeaways heading with its lists
    pub const KEY_TAKEAWAYS: &str = "key-takeaways";
    /// Marker class shared by lists that belong to one logical list
    pub const ARTICLE_LIST: &str = "article-list";
    /// Paragraph rewritten from a leading checkmark emoji
    pub const CHECK_ITEM: &str = "check-item";
    /// Icon image prepended to a checkmark paragraph
    pub const CHECK_ICON: &str = "check-icon";
    /// Span wrapping the text of a checkmark paragraph
    pub const CHECK_TEXT: &str = "check-text";
    /// List tagged as the article's sources/references
    pub const SOURCES_LIST: &str = "sources-list";
    /// Image with aspect ratio >= 1
    pub const IMG_LANDSCAPE: &str = "img-landscape";
    /// Image with aspect ratio < 1
    pub const IMG_PORTRAIT: &str = "img-portrait";
    /// Injected quote byline container
    pub const QUOTE_AUTHOR: &str = "quote-author";
    /// Avatar image inside the quote byline
    pub const QUOTE_AUTHOR_AVATAR: &str = "quote-author-avatar";
    /// Name span inside the quote byline
    pub const QUOTE_AUTHOR_NAME: &str = "quote-author-name";
    /// Role span inside the quote byline
    pub const QUOTE_AUTHOR_ROLE: &str = "quote-author-role";
    /// Accordion container
    pub const ACCORDION_ITEM: &str = "accordion-item";
    /// Accordion head element (click target)
    pub const ACCORDION_HEADER: &str = "accordion-header";
    /// Accordion body panel
    pub const ACCORDION_BODY: &str = "accordion-body";
    /// Textual expand/collapse indicator inside the head
    pub const ACCORDION_INDICATOR: &str = "accordion-indicator";
    /// Collapsed state applied to accordion bodies by default
    pub const COLLAPSED: &str = "is-collapsed";
}

/// A single scan-and-mutate enhancement over the content container.
pub trait Transform {
    /// Stable identity of the unit, used for idempotence markers and reports.
    fn id(&self) -> &'static str;

    /// Scan the container and apply the enhancement in place.
    fn apply(&self, ctx: &mut Context<'_>) -> Result<(), TransformError>;
}

/// Shared state handed to each transformer unit.
pub struct Context<'a> {
    /// The content container root (the rendered article body)
    pub root: &'a NodeRef,

    /// Site configuration (byline, asset locations, selectors)
    pub config: &'a SiteConfig,

    /// Resolver for natural image dimensions
    pub probe: &'a dyn ImageProbe,

    /// Heading index published by the TOC builder, rebuilt every run
    pub toc: TocIndex,

    /// Image sources whose dimensions could not be resolved this run;
    /// they are classified on a later run once the assets exist
    pub pending_images: Vec<String>,

    changed: usize,
}

impl<'a> Context<'a> {
    /// Record one mutated element for the unit currently running.
    pub fn note_changed(&mut self) {
        self.changed += 1;
    }

    /// Select nodes under the container, collected up front so transformers
    /// can mutate the tree while walking the result.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeRef>, TransformError> {
        let matches = self
            .root
            .select(selector)
            .map_err(|()| TransformError::Selector(selector.to_string()))?;
        Ok(matches.map(|m| m.as_node().clone()).collect())
    }
}

/// Internal fault inside one transformer unit.
///
/// Never escapes the pipeline: the runner logs it, records it in the report
/// and moves on to the next unit.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("invalid selector: {0:?}")]
    Selector(String),
}

/// Errors locating the content container.
#[derive(Error, Debug)]
pub enum EnhanceError {
    #[error("no element matches container selector {0:?}")]
    ContainerNotFound(String),

    #[error("invalid container selector {0:?}")]
    InvalidSelector(String),
}

/// Outcome of one transformer unit within a single run.
#[derive(Debug)]
pub struct UnitOutcome {
    /// Unit identity
    pub id: &'static str,
    /// Number of elements the unit changed
    pub changed: usize,
    /// Error text when the unit degraded to a no-op
    pub error: Option<String>,
}

/// Result of one pipeline run over a content container.
#[derive(Debug)]
pub struct EnhanceReport {
    /// Per-unit outcomes in execution order
    pub units: Vec<UnitOutcome>,

    /// Ordered heading index for the navigation UI
    pub toc: TocIndex,

    /// Image sources left unclassified because their dimensions were unknown
    pub pending_images: Vec<String>,
}

impl EnhanceReport {
    /// Total elements changed across all units.
    pub fn total_changed(&self) -> usize {
        self.units.iter().map(|u| u.changed).sum()
    }

    /// Whether any unit degraded to a no-op this run.
    pub fn had_errors(&self) -> bool {
        self.units.iter().any(|u| u.error.is_some())
    }
}

/// The pipeline runner: owns the unit registry and its execution order.
pub struct Enhancer {
    config: SiteConfig,
    probe: Box<dyn ImageProbe>,
    units: Vec<Box<dyn Transform>>,
}

impl Enhancer {
    /// Create a runner with the default filesystem image probe.
    pub fn new(config: SiteConfig) -> Self {
        let probe = Box::new(FsProbe::new(config.assets.root.clone()));
        Self::with_probe(config, probe)
    }

    /// Create a runner with a custom image dimension probe.
    pub fn with_probe(config: SiteConfig, probe: Box<dyn ImageProbe>) -> Self {
        // Execution order is part of the contract: the list merger runs
        // before every unit that counts list items, and the takeaways
        // wrapper runs after heading text is final (no unit renames
        // headings).
        let units: Vec<Box<dyn Transform>> = vec![
            Box::new(quotes::QuoteCleaner),
            Box::new(quotes::QuoteAuthorInjector),
            Box::new(protip::ProTipHighlighter),
            Box::new(lists::ListMerger),
            Box::new(takeaways::KeyTakeawaysWrapper),
            Box::new(checkmark::CheckmarkReplacer),
            Box::new(sources::SourcesFormatter),
            Box::new(images::ImageOrientationClassifier),
            Box::new(toc::TocBuilder),
            Box::new(accordion::AccordionActivator),
        ];
        Self {
            config,
            probe,
            units,
        }
    }

    /// The configuration this runner was built with.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Locate the content container in a parsed document and enhance it.
    ///
    /// A document without a matching container is not enhanced; callers
    /// decide whether to retry once content has arrived or to pass the
    /// document through unmodified.
    pub fn enhance_document(&self, document: &NodeRef) -> Result<EnhanceReport, EnhanceError> {
        let selector = self.config.container_selector.as_str();
        let mut matches = document
            .select(selector)
            .map_err(|()| EnhanceError::InvalidSelector(selector.to_string()))?;
        let container = matches
            .next()
            .ok_or_else(|| EnhanceError::ContainerNotFound(selector.to_string()))?;
        Ok(self.enhance_container(container.as_node()))
    }

    /// Run every registered unit exactly once, in fixed order, against the
    /// given container root.
    pub fn enhance_container(&self, root: &NodeRef) -> EnhanceReport {
        let mut ctx = Context {
            root,
            config: &self.config,
            probe: self.probe.as_ref(),
            toc: TocIndex::default(),
            pending_images: Vec::new(),
            changed: 0,
        };

        let mut outcomes = Vec::with_capacity(self.units.len());
        for unit in &self.units {
            ctx.changed = 0;
            let error = match unit.apply(&mut ctx) {
                Ok(()) => None,
                Err(e) => {
                    log::warn!(
                        "transformer {} degraded, content left unmodified: {}",
                        unit.id(),
                        e
                    );
                    Some(e.to_string())
                }
            };
            log::debug!("transformer {} changed {} element(s)", unit.id(), ctx.changed);
            outcomes.push(UnitOutcome {
                id: unit.id(),
                changed: ctx.changed,
                error,
            });
        }

        EnhanceReport {
            units: outcomes,
            toc: ctx.toc,
            pending_images: ctx.pending_images,
        }
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use crate::dom;

    /// In-memory container fixture for exercising single transformer units.
    pub struct Fixture {
        #[allow(dead_code)]
        doc: NodeRef,
        pub container: NodeRef,
        pub config: SiteConfig,
    }

    pub fn fixture(body: &str) -> Fixture {
        let doc = dom::parse_document(&format!("<div class=\"article-body\">{}</div>", body));
        let container = doc
            .select_first(".article-body")
            .expect("fixture container")
            .as_node()
            .clone();
        Fixture {
            doc,
            container,
            config: SiteConfig::default(),
        }
    }

    /// Outcome of a single-unit run.
    pub struct RunResult {
        pub changed: usize,
        pub toc: TocIndex,
        pub pending: Vec<String>,
    }

    pub fn apply(unit: &dyn Transform, fx: &Fixture) -> RunResult {
        apply_with_probe(unit, fx, &images::NullProbe)
    }

    pub fn apply_with_probe(
        unit: &dyn Transform,
        fx: &Fixture,
        probe: &dyn ImageProbe,
    ) -> RunResult {
        let mut ctx = Context {
            root: &fx.container,
            config: &fx.config,
            probe,
            toc: TocIndex::default(),
            pending_images: Vec::new(),
            changed: 0,
        };
        unit.apply(&mut ctx).expect("transformer unit failed");
        RunResult {
            changed: ctx.changed,
            toc: ctx.toc,
            pending: ctx.pending_images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;

    #[test]
    fn test_container_not_found() {
        let doc = dom::parse_document("<div class=\"sidebar\"><p>x</p></div>");
        let enhancer = Enhancer::new(SiteConfig::default());
        match enhancer.enhance_document(&doc) {
            Err(EnhanceError::ContainerNotFound(sel)) => assert_eq!(sel, ".article-body"),
            other => panic!("expected ContainerNotFound, got {:?}", other.map(|r| r.total_changed())),
        }
    }

    #[test]
    fn test_empty_container_is_a_silent_noop() {
        let doc = dom::parse_document("<div class=\"article-body\"></div>");
        let enhancer = Enhancer::new(SiteConfig::default());
        let report = enhancer.enhance_document(&doc).unwrap();
        assert_eq!(report.total_changed(), 0);
        assert!(!report.had_errors());
        assert!(report.toc.is_empty());
    }

    #[test]
    fn test_units_run_in_registration_order() {
        let doc = dom::parse_document("<div class=\"article-body\"></div>");
        let enhancer = Enhancer::new(SiteConfig::default());
        let report = enhancer.enhance_document(&doc).unwrap();
        let ids: Vec<&str> = report.units.iter().map(|u| u.id).collect();
        assert_eq!(
            ids,
            vec![
                "quote-cleaner",
                "quote-author",
                "pro-tip",
                "list-merger",
                "key-takeaways",
                "checkmark",
                "sources-list",
                "image-orientation",
                "toc",
                "accordion",
            ]
        );
    }
}
