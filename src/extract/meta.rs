//! Meta facet: title, description, OpenGraph basics, favicon and canonical

use super::{element_text, resolve_or_raw, selector, FacetResult, Meta, NO_TITLE};
use scraper::Html;
use std::collections::HashMap;
use url::Url;

/// Builds the meta facet
///
/// `final_url` is left unset; it is only known to the renderer.
pub(super) fn extract_meta(document: &Html, base_url: &Url) -> FacetResult<Meta> {
    let title = document
        .select(&selector("title")?)
        .next()
        .map(|el| element_text(&el))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let tags = meta_map(document)?;
    let field = |key: &str| tags.get(key).cloned().unwrap_or_default();

    Ok(Meta {
        title,
        description: field("description"),
        keywords: field("keywords"),
        og_title: field("og:title"),
        og_description: field("og:description"),
        og_image: field("og:image"),
        favicon: favicon(document, base_url)?,
        canonical: canonical(document)?,
        final_url: None,
    })
}

/// Maps each meta tag's `name`, `property` or `http-equiv` (lowercased) to its content
///
/// Later tags overwrite earlier ones with the same key.
pub(super) fn meta_map(document: &Html) -> FacetResult<HashMap<String, String>> {
    let mut tags = HashMap::new();

    for element in document.select(&selector("meta")?) {
        let attrs = element.value();
        let key = ["name", "property", "http-equiv"]
            .iter()
            .filter_map(|attr| attrs.attr(attr))
            .find(|value| !value.is_empty());

        if let (Some(key), Some(content)) = (key, attrs.attr("content")) {
            if !content.is_empty() {
                tags.insert(key.to_lowercase(), content.to_string());
            }
        }
    }

    Ok(tags)
}

/// First `<link>` whose rel mentions "icon", resolved to an absolute URL
fn favicon(document: &Html, base_url: &Url) -> FacetResult<Option<String>> {
    let favicon = document
        .select(&selector("link[rel][href]")?)
        .find(|el| {
            el.value()
                .attr("rel")
                .is_some_and(|rel| rel.to_ascii_lowercase().contains("icon"))
        })
        .and_then(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| resolve_or_raw(base_url, href));

    Ok(favicon)
}

/// First canonical link, exactly as authored
fn canonical(document: &Html) -> FacetResult<Option<String>> {
    let canonical = document
        .select(&selector("link[rel][href]")?)
        .find(|el| {
            el.value().attr("rel").is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("canonical"))
            })
        })
        .and_then(|el| el.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string);

    Ok(canonical)
}
