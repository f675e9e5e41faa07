//! Technology detection from markup keywords and DOM shape

use super::signatures::{PLATFORM_SIGNATURES, SCRIPT_SIGNATURES};
use super::{selector, FacetResult, Technology};
use scraper::Html;
use std::collections::HashSet;

const SOURCE_GENERATOR: &str = "meta generator";
const SOURCE_SCRIPT: &str = "script/markup";
const SOURCE_PLATFORM: &str = "markup pattern";
const SOURCE_DOM: &str = "DOM element";

/// Technologies in detection order, each name reported once
struct Detected {
    technologies: Vec<Technology>,
    seen: HashSet<String>,
}

impl Detected {
    fn new() -> Self {
        Self {
            technologies: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.seen.contains(&name.to_lowercase())
    }

    fn add(&mut self, name: &str, source: &str) {
        if self.seen.insert(name.to_lowercase()) {
            self.technologies.push(Technology {
                name: name.to_string(),
                source: source.to_string(),
            });
        }
    }

    fn scan(&mut self, table: &[(&str, &[&str])], markup: &str, source: &str) {
        for (name, keywords) in table {
            if !self.contains(name) && keywords.iter().any(|kw| markup.contains(kw)) {
                self.add(name, source);
            }
        }
    }
}

/// Detects front-end technologies and hosting platforms
///
/// The generator meta tag is reported first and verbatim, followed by
/// keyword matches against the lowercased markup and then DOM heuristics.
/// These are best-effort signals; false positives are expected.
pub(super) fn detect_technologies(document: &Html, html: &str) -> FacetResult<Vec<Technology>> {
    let mut detected = Detected::new();
    let markup = html.to_lowercase();

    let generator = document
        .select(&selector("meta[name][content]")?)
        .filter(|el| {
            el.value()
                .attr("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("generator"))
        })
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty());

    if let Some(generator) = generator {
        detected.add(generator, SOURCE_GENERATOR);
    }

    detected.scan(SCRIPT_SIGNATURES, &markup, SOURCE_SCRIPT);
    detected.scan(PLATFORM_SIGNATURES, &markup, SOURCE_PLATFORM);

    if document.select(&selector("div#__next")?).next().is_some() {
        detected.add("Next.js", SOURCE_DOM);
    }
    if document.select(&selector("div#__nuxt")?).next().is_some() {
        detected.add("Nuxt.js", SOURCE_DOM);
    }
    if document.select(&selector("div#app")?).next().is_some() {
        let vue_script = document
            .select(&selector("script")?)
            .any(|script| script.html().to_lowercase().contains("vue"));
        if vue_script {
            detected.add("Vue.js", SOURCE_DOM);
        }
    }

    Ok(detected.technologies)
}
