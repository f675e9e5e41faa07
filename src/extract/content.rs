//! Structural facets: headings, links, images, tables, lists, paragraphs
//! and selector matches

use super::{
    element_text, resolve_or_raw, selector, truncate, FacetResult, Heading, Image, Link, List,
    ListKind, SelectorMatch, MAX_CELL_TEXT, MAX_HEADING_TEXT, MAX_IMAGE_ALT, MAX_LINK_TEXT,
    MAX_LISTS, MAX_LIST_ITEMS, MAX_LIST_ITEM_TEXT, MAX_PARAGRAPHS, MAX_PARAGRAPH_TEXT,
    MAX_SELECTOR_HTML, MAX_SELECTOR_TEXT, MAX_TABLE_ROWS, MIN_PARAGRAPH_CHARS, NO_LINK_TEXT,
};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Hrefs that never lead to another document
const SKIPPED_HREF_PREFIXES: [&str; 4] = ["#", "javascript:", "mailto:", "tel:"];

/// Headings grouped by level (all h1, then all h2, ...), document order within a level
pub(super) fn extract_headings(document: &Html) -> FacetResult<Vec<Heading>> {
    let mut headings = Vec::new();

    for level in 1..=6u8 {
        for element in document.select(&selector(&format!("h{}", level))?) {
            let text = element_text(&element);
            if !text.is_empty() {
                headings.push(Heading {
                    level,
                    text: truncate(&text, MAX_HEADING_TEXT),
                });
            }
        }
    }

    Ok(headings)
}

pub(super) fn extract_links(document: &Html, base_url: &Url) -> FacetResult<Vec<Link>> {
    let base_host = base_url.host_str();
    let mut links = Vec::new();

    for element in document.select(&selector("a[href]")?) {
        let Some(href) = element.value().attr("href").map(str::trim) else {
            continue;
        };

        if href.is_empty() || is_skipped_href(href) {
            continue;
        }

        // Unresolvable hrefs are kept verbatim and never count as internal
        let (url, internal) = match base_url.join(href) {
            Ok(resolved) => {
                let internal = resolved.host_str() == base_host
                    && resolved.port_or_known_default() == base_url.port_or_known_default();
                (resolved.to_string(), internal)
            }
            Err(e) => {
                tracing::trace!(href, error = %e, "Keeping unresolvable link as authored");
                (href.to_string(), false)
            }
        };

        let text = truncate(&element_text(&element), MAX_LINK_TEXT);
        links.push(Link {
            internal,
            url,
            text: if text.is_empty() {
                NO_LINK_TEXT.to_string()
            } else {
                text
            },
        });
    }

    Ok(links)
}

fn is_skipped_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    SKIPPED_HREF_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Images with a `src` (or lazy-loading `data-src`)
pub(super) fn extract_images(document: &Html, base_url: &Url) -> FacetResult<Vec<Image>> {
    let mut images = Vec::new();

    for element in document.select(&selector("img")?) {
        let attrs = element.value();
        let src = ["src", "data-src"]
            .iter()
            .filter_map(|attr| attrs.attr(attr))
            .map(str::trim)
            .find(|value| !value.is_empty());

        if let Some(src) = src {
            images.push(Image {
                src: resolve_or_raw(base_url, src),
                alt: truncate(attrs.attr("alt").unwrap_or(""), MAX_IMAGE_ALT),
                width: attrs.attr("width").map(str::to_string),
                height: attrs.attr("height").map(str::to_string),
            });
        }
    }

    Ok(images)
}

/// Tables as rows of cell texts; empty rows and empty tables are dropped
pub(super) fn extract_tables(document: &Html) -> FacetResult<Vec<Vec<Vec<String>>>> {
    let row_selector = selector("tr")?;
    let cell_selector = selector("th, td")?;
    let mut tables = Vec::new();

    for table in document.select(&selector("table")?) {
        let rows: Vec<Vec<String>> = table
            .select(&row_selector)
            .take(MAX_TABLE_ROWS)
            .map(|row| {
                row.select(&cell_selector)
                    .map(|cell| truncate(&element_text(&cell), MAX_CELL_TEXT))
                    .collect::<Vec<_>>()
            })
            .filter(|cells| !cells.is_empty())
            .collect();

        if !rows.is_empty() {
            tables.push(rows);
        }
    }

    Ok(tables)
}

/// Ordered and unordered lists, counting only their direct `<li>` children
pub(super) fn extract_lists(document: &Html) -> FacetResult<Vec<List>> {
    let mut lists = Vec::new();

    for list in document.select(&selector("ul, ol")?) {
        let kind = if list.value().name() == "ol" {
            ListKind::Ordered
        } else {
            ListKind::Unordered
        };

        let items: Vec<String> = list
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
            .take(MAX_LIST_ITEMS)
            .map(|li| truncate(&element_text(&li), MAX_LIST_ITEM_TEXT))
            .filter(|text| !text.is_empty())
            .collect();

        if !items.is_empty() {
            lists.push(List { kind, items });
        }
    }

    lists.truncate(MAX_LISTS);
    Ok(lists)
}

/// Paragraph texts longer than [`MIN_PARAGRAPH_CHARS`]
pub(super) fn extract_paragraphs(document: &Html) -> FacetResult<Vec<String>> {
    let paragraphs = document
        .select(&selector("p")?)
        .map(|p| element_text(&p))
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .map(|text| truncate(&text, MAX_PARAGRAPH_TEXT))
        .take(MAX_PARAGRAPHS)
        .collect();

    Ok(paragraphs)
}

/// Elements matching a caller-supplied selector
///
/// An unparsable selector matches nothing.
pub(super) fn select_matches(document: &Html, css: &str) -> Vec<SelectorMatch> {
    let Ok(user_selector) = Selector::parse(css) else {
        tracing::debug!(selector = css, "Ignoring invalid selector");
        return Vec::new();
    };

    document
        .select(&user_selector)
        .map(|element| SelectorMatch {
            tag: element.value().name().to_string(),
            text: truncate(&element_text(&element), MAX_SELECTOR_TEXT),
            html: truncate(&element.html(), MAX_SELECTOR_HTML),
        })
        .collect()
}
