//! Embedded structured data: JSON-LD, OpenGraph and Twitter Card

use super::{selector, FacetResult, StructuredData, StructuredFormat};
use scraper::Html;
use serde_json::{Map, Value};

/// Collects structured data in a fixed order
///
/// Every JSON-LD block comes first (arrays flattened, malformed blocks
/// skipped), then one combined OpenGraph record and one combined Twitter
/// Card record when any such tags exist.
pub(super) fn extract_structured_data(document: &Html) -> FacetResult<Vec<StructuredData>> {
    let mut entries = Vec::new();

    for script in document.select(&selector("script[type]")?) {
        let is_json_ld = script
            .value()
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"));
        if !is_json_ld {
            continue;
        }

        let body: String = script.text().collect();
        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Array(items)) => {
                entries.extend(items.into_iter().map(|data| StructuredData {
                    format: StructuredFormat::JsonLd,
                    data,
                }));
            }
            Ok(data) => entries.push(StructuredData {
                format: StructuredFormat::JsonLd,
                data,
            }),
            Err(e) => tracing::debug!(error = %e, "Skipping malformed JSON-LD block"),
        }
    }

    let og = prefixed_meta(document, "property", "og:")?;
    if !og.is_empty() {
        entries.push(StructuredData {
            format: StructuredFormat::OpenGraph,
            data: Value::Object(og),
        });
    }

    let twitter = prefixed_meta(document, "name", "twitter:")?;
    if !twitter.is_empty() {
        entries.push(StructuredData {
            format: StructuredFormat::TwitterCard,
            data: Value::Object(twitter),
        });
    }

    Ok(entries)
}

/// Meta tags whose `attr` starts with `prefix`, keyed by that attribute
fn prefixed_meta(document: &Html, attr: &str, prefix: &str) -> FacetResult<Map<String, Value>> {
    let mut record = Map::new();

    for element in document.select(&selector("meta[content]")?) {
        let attrs = element.value();
        let (Some(key), Some(content)) = (attrs.attr(attr), attrs.attr("content")) else {
            continue;
        };
        if key.starts_with(prefix) && !content.is_empty() {
            record.insert(key.to_string(), Value::String(content.to_string()));
        }
    }

    Ok(record)
}
