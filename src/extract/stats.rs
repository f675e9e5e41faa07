//! Page statistics derived from the finished facets

use super::{ResultDocument, Stats};
use scraper::{Html, Node, Selector};

/// Elements whose text is never rendered as page content
const INVISIBLE_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Computes every stat except `elapsed_seconds`
///
/// Facet counts are read from `result`, so they always agree with the
/// facets themselves. Whole-document metrics come from `document` and the
/// raw `html`.
pub(super) fn compute_stats(document: &Html, html: &str, result: &ResultDocument) -> Stats {
    let internal_links = result.links.iter().filter(|l| l.internal).count();
    let (script_count, inline_script_count) = script_counts(document);

    Stats {
        word_count: word_count(document),
        link_count: result.links.len(),
        internal_links,
        external_links: result.links.len() - internal_links,
        image_count: result.images.len(),
        heading_count: result.headings.len(),
        table_count: result.tables.len(),
        list_count: result.lists.len(),
        paragraph_count: result.text.len(),
        script_count,
        inline_script_count,
        style_count: stylesheet_count(document),
        html_size_bytes: html.len(),
        tech_count: result.technologies.len(),
        social_count: result.social_links.len(),
        structured_data_count: result.structured_data.len(),
        elapsed_seconds: 0.0,
    }
}

/// Whitespace-separated tokens across all visible text nodes
fn word_count(document: &Html) -> usize {
    document
        .tree
        .nodes()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
                Node::Element(el) => INVISIBLE_ELEMENTS.contains(&el.name()),
                _ => false,
            });
            (!hidden).then(|| text.split_whitespace().count())
        })
        .sum()
}

/// `(external, inline)` script counts
fn script_counts(document: &Html) -> (usize, usize) {
    let Ok(scripts) = Selector::parse("script") else {
        return (0, 0);
    };

    document
        .select(&scripts)
        .fold((0, 0), |(external, inline), script| {
            if script.value().attr("src").is_some() {
                (external + 1, inline)
            } else {
                (external, inline + 1)
            }
        })
}

/// `<link>` elements with a `stylesheet` rel token
fn stylesheet_count(document: &Html) -> usize {
    let Ok(links) = Selector::parse("link[rel]") else {
        return 0;
    };

    document
        .select(&links)
        .filter(|link| {
            link.value().attr("rel").is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("stylesheet"))
            })
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Link;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_word_count_skips_invisible_text() {
        let document = doc(
            r#"<html><head><title>Two words</title><style>body { color: red }</style></head>
            <body><p>one two three</p><script>var ignored = true;</script>
            <noscript>enable javascript</noscript></body></html>"#,
        );

        assert_eq!(word_count(&document), 5);
    }

    #[test]
    fn test_script_and_stylesheet_counts() {
        let document = doc(
            r#"<head><script src="a.js"></script><script src="b.js"></script>
            <script>inline()</script>
            <link rel="preload stylesheet" href="a.css">
            <link rel="icon" href="f.ico"></head>"#,
        );

        assert_eq!(script_counts(&document), (2, 1));
        assert_eq!(stylesheet_count(&document), 1);
    }

    #[test]
    fn test_link_split() {
        let result = ResultDocument {
            links: vec![
                Link {
                    url: "https://example.com/a".to_string(),
                    text: "a".to_string(),
                    internal: true,
                },
                Link {
                    url: "https://other.example/".to_string(),
                    text: "o".to_string(),
                    internal: false,
                },
                Link {
                    url: "https://other.example/2".to_string(),
                    text: "o2".to_string(),
                    internal: false,
                },
            ],
            ..Default::default()
        };

        let stats = compute_stats(&doc(""), "", &result);
        assert_eq!(stats.link_count, 3);
        assert_eq!(stats.internal_links, 1);
        assert_eq!(stats.external_links, 2);
        assert_eq!(stats.html_size_bytes, 0);
        assert_eq!(stats.elapsed_seconds, 0.0);
    }
}
