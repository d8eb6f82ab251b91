//! Markdown content pages (help center, privacy policy, terms of service).
//!
//! Pages are loaded from `<content_dir>/pages/*.md` once at startup. Each
//! file starts with YAML frontmatter:
//!
//! ```markdown
//! ---
//! title: Privacy Policy
//! description: How Bitversity handles your data
//! updated_at: 2026-09-01
//! ---
//!
//! # Privacy Policy
//! ...
//! ```
//!
//! The slug is the file stem, so `pages/help.md` is served at `/help`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;

/// Frontmatter of a content page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// A rendered page with metadata and HTML content
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// Content store that holds all loaded pages in memory
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

impl ContentStore {
    /// Load all pages from `<content_dir>/pages`.
    ///
    /// A missing directory yields an empty store; a single unreadable or
    /// malformed page is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the pages directory exists but cannot be listed.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Pages directory does not exist: {:?}", dir);
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match Self::load_page(&path) {
                    Ok(page) => {
                        tracing::info!("Loaded page: {}", page.slug);
                        pages.insert(page.slug.clone(), page);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load page {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    /// Load a single page from a markdown file
    fn load_page(path: &Path) -> Result<Page, ContentError> {
        let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?
            .to_string();

        parse_page(slug, &content)
    }

    /// Get a page by slug
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// Number of loaded pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Split frontmatter from body and render the body.
fn parse_page(slug: String, content: &str) -> Result<Page, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(content)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    Ok(Page {
        slug,
        meta,
        content_html: render_markdown(&parsed.content),
    })
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
///
/// Raw HTML in the source is escaped; content pages are plain prose.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const SAMPLE: &str = "---\n\
        title: Terms of Service\n\
        description: The rules\n\
        updated_at: 2026-09-01\n\
        ---\n\
        \n\
        ## Accounts\n\
        \n\
        Keep your **password** safe.\n";

    #[test]
    fn test_parse_page_reads_frontmatter() {
        let page = parse_page("terms".to_string(), SAMPLE).unwrap();
        assert_eq!(page.slug, "terms");
        assert_eq!(page.meta.title, "Terms of Service");
        assert_eq!(page.meta.description.as_deref(), Some("The rules"));
        assert_eq!(
            page.meta.updated_at,
            NaiveDate::from_ymd_opt(2026, 9, 1)
        );
        assert!(page.content_html.contains("<strong>password</strong>"));
        assert!(page.content_html.contains("Accounts</h2>"));
    }

    #[test]
    fn test_parse_page_requires_frontmatter() {
        let err = parse_page("bare".to_string(), "# Just a heading\n").unwrap_err();
        assert!(matches!(err, ContentError::Parse(_)));
    }

    #[test]
    fn test_raw_html_is_not_passed_through() {
        let html = render_markdown("<script>alert(1)</script>\n\nhello");
        assert!(!html.contains("<script>"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let store = ContentStore::load(Path::new("/nonexistent/bitversity/content")).unwrap();
        assert!(store.is_empty());
        assert!(store.get_page("terms").is_none());
    }

    #[test]
    fn test_shipped_pages_load() {
        let dir = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/content"));
        let store = ContentStore::load(&dir).unwrap();
        for slug in ["help", "privacy", "terms"] {
            assert!(store.get_page(slug).is_some(), "missing page {slug}");
        }
    }
}
