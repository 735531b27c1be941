//! Site configuration from enrich.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Main configuration from enrich.toml
///
/// Every field has a default so a missing file or empty table means stock
/// behavior. The byline is optional: without one the quote-author injector
/// leaves quote blocks untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// CSS selector locating the rendered article body inside a document
    pub container_selector: String,

    /// Byline appended to quote blocks that lack a citation
    pub quote_author: Option<QuoteAuthor>,

    /// Asset settings used by the image classifier and checkmark replacer
    pub assets: AssetConfig,
}

/// Author byline injected into uncited quote blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteAuthor {
    /// Author's display name
    pub name: String,

    /// Author's role line (e.g. "Founder & CEO")
    pub role: String,

    /// URL of the author's avatar image
    pub avatar: String,
}

/// Asset settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory that site-absolute image paths resolve against when probing
    /// natural dimensions
    pub root: Option<String>,

    /// URL of the icon prepended to checkmark paragraphs
    pub check_icon: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            container_selector: ".article-body".to_string(),
            quote_author: None,
            assets: AssetConfig::default(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: None,
            check_icon: "/icons/check.svg".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from an enrich.toml file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SiteConfigError> {
        let content = fs::read_to_string(&path)?;
        let config: SiteConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to an enrich.toml file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SiteConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Error, Debug)]
pub enum SiteConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
}
