//! Runs the pipeline over the shipped example article and config.

use enrich::{dom, Enhancer, SiteConfig};
use std::path::PathBuf;

fn example_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("examples")
        .join(name)
}

#[test]
fn test_example_config_loads() {
    let config = SiteConfig::load(example_path("enrich.toml")).expect("example config parses");
    assert_eq!(config.container_selector, ".article-body");
    let author = config.quote_author.expect("example byline");
    assert_eq!(author.name, "Jane Smith");
}

#[test]
fn test_example_article_enhances() {
    let html = std::fs::read_to_string(example_path("article.html")).expect("example article");
    let config = SiteConfig::load(example_path("enrich.toml")).expect("example config");

    let doc = dom::parse_document(&html);
    let report = Enhancer::new(config)
        .enhance_document(&doc)
        .expect("container present");

    assert!(!report.had_errors());

    // one heading index entry per h2/h3 in the article
    assert_eq!(report.toc.len(), 5);

    // both checkmark paragraphs rewritten
    assert_eq!(doc.select(".check-item").unwrap().count(), 2);

    // the split takeaway lists collapse into one
    let wrapper = doc.select_first(".key-takeaways").unwrap();
    assert_eq!(wrapper.as_node().select("ul").unwrap().count(), 1);
    assert_eq!(wrapper.as_node().select("li").unwrap().count(), 3);

    // both accordions collapsed
    assert_eq!(doc.select(".accordion-indicator").unwrap().count(), 2);

    // sources rewritten into full-row links
    let items: Vec<String> = doc
        .select(".sources-list li")
        .unwrap()
        .map(|li| li.as_node().text_contents())
        .collect();
    assert_eq!(
        items,
        vec!["ISO 6425 divers' watch standard", "The Horology Handbook"]
    );
}
