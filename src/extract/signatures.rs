//! Fixed lookup tables used by the technology and social passes
//!
//! Keywords are matched as substrings of the lowercased markup. Tables are
//! scanned in order, so earlier entries win ties.

/// Front-end frameworks and libraries, keyed by display name
pub static SCRIPT_SIGNATURES: &[(&str, &[&str])] = &[
    ("React", &["react", "react-dom", "reactjs"]),
    ("Vue.js", &["vue.js", "vuejs", "vue.min"]),
    ("Angular", &["angular", "ng-"]),
    ("Svelte", &["svelte"]),
    ("Next.js", &["_next/", "__next"]),
    ("Nuxt.js", &["_nuxt/", "__nuxt"]),
    ("jQuery", &["jquery"]),
    ("Bootstrap", &["bootstrap"]),
    ("Tailwind CSS", &["tailwindcss", "tailwind"]),
    ("Webpack", &["webpack", "__webpack"]),
    ("Vite", &["vite", "@vite"]),
    ("Gatsby", &["gatsby"]),
    ("Remix", &["remix"]),
    ("Astro", &["astro"]),
];

/// Hosting platforms and CMSes recognizable by their asset paths
pub static PLATFORM_SIGNATURES: &[(&str, &[&str])] = &[
    ("WordPress", &["wp-content", "wp-includes", "wordpress"]),
    ("Shopify", &["shopify", "cdn.shopify"]),
    ("Wix", &["wix.com", "parastorage"]),
    ("Squarespace", &["squarespace"]),
    ("Drupal", &["drupal"]),
    ("Ghost", &["ghost"]),
];

/// Registrable domain to platform name
pub static SOCIAL_DOMAINS: &[(&str, &str)] = &[
    ("twitter.com", "Twitter/X"),
    ("x.com", "Twitter/X"),
    ("facebook.com", "Facebook"),
    ("fb.com", "Facebook"),
    ("instagram.com", "Instagram"),
    ("linkedin.com", "LinkedIn"),
    ("github.com", "GitHub"),
    ("youtube.com", "YouTube"),
    ("youtu.be", "YouTube"),
    ("tiktok.com", "TikTok"),
    ("reddit.com", "Reddit"),
    ("discord.gg", "Discord"),
    ("discord.com", "Discord"),
    ("pinterest.com", "Pinterest"),
    ("mastodon.social", "Mastodon"),
    ("threads.net", "Threads"),
    ("twitch.tv", "Twitch"),
    ("medium.com", "Medium"),
];

/// Looks up the platform for a host, accepting subdomains
pub fn social_platform(host: &str) -> Option<&'static str> {
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    SOCIAL_DOMAINS
        .iter()
        .find(|(domain, _)| {
            host == *domain
                || host
                    .strip_suffix(domain)
                    .is_some_and(|rest| rest.ends_with('.'))
        })
        .map(|(_, platform)| *platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_lowercase() {
        for (_, keywords) in SCRIPT_SIGNATURES.iter().chain(PLATFORM_SIGNATURES) {
            for keyword in *keywords {
                assert_eq!(*keyword, keyword.to_lowercase());
            }
        }
    }

    #[test]
    fn test_social_platform_lookup() {
        assert_eq!(social_platform("twitter.com"), Some("Twitter/X"));
        assert_eq!(social_platform("www.GitHub.com"), Some("GitHub"));
        assert_eq!(social_platform("m.youtube.com"), Some("YouTube"));
        assert_eq!(social_platform("notgithub.com"), None);
        assert_eq!(social_platform("example.com"), None);
    }
}
