//! Social links derived from the link facet

use super::signatures::social_platform;
use super::{Link, SocialLink};
use std::collections::HashSet;
use url::Url;

/// Keeps the first link per recognized social platform, in link order
pub(super) fn extract_social_links(links: &[Link]) -> Vec<SocialLink> {
    let mut seen = HashSet::new();
    let mut social = Vec::new();

    for link in links {
        let Some(platform) = Url::parse(&link.url)
            .ok()
            .and_then(|url| url.host_str().and_then(social_platform))
        else {
            continue;
        };

        if seen.insert(platform) {
            social.push(SocialLink {
                platform: platform.to_string(),
                url: link.url.clone(),
                text: link.text.clone(),
            });
        }
    }

    social
}
