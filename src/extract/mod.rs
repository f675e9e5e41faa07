//! Extractor: rendered HTML in, result document out
//!
//! Pure transformation with no I/O. Each facet is extracted by its own pass
//! and each pass returns a [`FacetResult`]. A failing pass degrades to the
//! facet's empty value through [`degrade`] instead of aborting the whole
//! extraction, so a malformed fragment only costs the facet it lives in.
//!
//! Pass order:
//! 1. meta
//! 2. headings
//! 3. links
//! 4. images
//! 5. tables, lists, paragraphs
//! 6. selector results
//! 7. technologies
//! 8. social links (derived from links)
//! 9. structured data
//! 10. stats (derived from all of the above)

mod content;
mod document;
mod meta;
mod signatures;
mod social;
mod stats;
mod structured;
mod technology;

pub use document::{
    Heading, Image, Link, List, ListKind, Meta, ResultDocument, SelectorMatch, SocialLink, Stats,
    StructuredData, StructuredFormat, Technology,
};
pub use signatures::{PLATFORM_SIGNATURES, SCRIPT_SIGNATURES, SOCIAL_DOMAINS};

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Title used when the document has none
pub const NO_TITLE: &str = "No Title";

/// Text used for links without text
pub const NO_LINK_TEXT: &str = "[no text]";

// String caps, in characters
pub const MAX_LINK_TEXT: usize = 100;
pub const MAX_HEADING_TEXT: usize = 200;
pub const MAX_CELL_TEXT: usize = 200;
pub const MAX_LIST_ITEM_TEXT: usize = 200;
pub const MAX_PARAGRAPH_TEXT: usize = 500;
pub const MAX_IMAGE_ALT: usize = 150;
pub const MAX_SELECTOR_TEXT: usize = 500;
pub const MAX_SELECTOR_HTML: usize = 1000;

// Collection caps
pub const MAX_TABLE_ROWS: usize = 50;
pub const MAX_LIST_ITEMS: usize = 30;
pub const MAX_LISTS: usize = 20;
pub const MAX_PARAGRAPHS: usize = 50;

/// Paragraphs must be longer than this many characters to count
pub const MIN_PARAGRAPH_CHARS: usize = 20;

/// Internal failure of a single facet pass
#[derive(Debug, Error)]
#[error("{0}")]
pub struct FacetError(String);

impl FacetError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result type for a facet pass
pub type FacetResult<T> = Result<T, FacetError>;

/// Extracts the full result document from rendered HTML
///
/// Links, images and the favicon are resolved against `base_url`, which
/// should be the URL originally requested. A non-blank `selector` enables
/// the selector facet; an invalid selector yields an empty match list.
///
/// Render-side fields (`meta.final_url`, `screenshot`,
/// `stats.elapsed_seconds`) are left empty for the caller to fill in.
///
/// # Example
///
/// ```
/// use pagescope::extract::extract;
/// use url::Url;
///
/// let html = r#"<html><head><title>Hello</title></head><body><a href="/about">About</a></body></html>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let doc = extract(html, &base, None);
/// assert_eq!(doc.meta.title, "Hello");
/// assert_eq!(doc.stats.internal_links, 1);
/// ```
pub fn extract(html: &str, base_url: &Url, selector: Option<&str>) -> ResultDocument {
    let document = Html::parse_document(html);

    let meta = degrade("meta", meta::extract_meta(&document, base_url));
    let headings = degrade("headings", content::extract_headings(&document));
    let links = degrade("links", content::extract_links(&document, base_url));
    let images = degrade("images", content::extract_images(&document, base_url));
    let tables = degrade("tables", content::extract_tables(&document));
    let lists = degrade("lists", content::extract_lists(&document));
    let text = degrade("text", content::extract_paragraphs(&document));
    let selector_results = selector
        .filter(|css| !css.trim().is_empty())
        .map(|css| content::select_matches(&document, css));
    let technologies = degrade(
        "technologies",
        technology::detect_technologies(&document, html),
    );
    let social_links = social::extract_social_links(&links);
    let structured_data = degrade(
        "structured_data",
        structured::extract_structured_data(&document),
    );

    let mut result = ResultDocument {
        meta,
        headings,
        links,
        images,
        tables,
        lists,
        text,
        selector_results,
        technologies,
        social_links,
        structured_data,
        screenshot: None,
        stats: Stats::default(),
    };
    result.stats = stats::compute_stats(&document, html, &result);
    result
}

/// Consumes a facet outcome, falling back to the facet's empty value
pub fn degrade<T: Default>(facet: &'static str, result: FacetResult<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::debug!(facet, error = %e, "Facet extraction degraded to default");
        T::default()
    })
}

/// Parses a CSS selector used internally by a facet pass
fn selector(css: &str) -> FacetResult<Selector> {
    Selector::parse(css).map_err(|e| FacetError::new(format!("bad selector '{}': {:?}", css, e)))
}

/// Element text with surrounding whitespace trimmed and inner runs collapsed
fn element_text(element: &ElementRef<'_>) -> String {
    let mut out = String::new();
    for word in element.text().flat_map(str::split_whitespace) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Truncates to at most `max` characters
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

/// Resolves `href` against `base`, falling back to the raw value
fn resolve_or_raw(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}
