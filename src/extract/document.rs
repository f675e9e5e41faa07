//! Result document: the structured profile of one rendered page
//!
//! The shape is fixed; every facet is present even when empty. Only
//! ordered collections are used so that serializing the same extraction
//! twice yields identical bytes.

use serde::{Deserialize, Serialize};

/// Aggregate produced by a successful extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub meta: Meta,
    pub headings: Vec<Heading>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    /// Each table is a sequence of rows, each row a sequence of cell texts
    pub tables: Vec<Vec<Vec<String>>>,
    pub lists: Vec<List>,
    /// Paragraph texts
    pub text: Vec<String>,
    /// Present only when a selector was supplied
    pub selector_results: Option<Vec<SelectorMatch>>,
    pub technologies: Vec<Technology>,
    pub social_links: Vec<SocialLink>,
    pub structured_data: Vec<StructuredData>,
    /// Base64-encoded JPEG
    pub screenshot: Option<String>,
    pub stats: Stats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    pub favicon: Option<String>,
    pub canonical: Option<String>,
    pub final_url: Option<String>,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            title: super::NO_TITLE.to_string(),
            description: String::new(),
            keywords: String::new(),
            og_title: String::new(),
            og_description: String::new(),
            og_image: String::new(),
            favicon: None,
            canonical: None,
            final_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub text: String,
    pub internal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
    /// Passed through verbatim; may be non-numeric
    pub width: Option<String>,
    pub height: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ordered => "ordered",
            Self::Unordered => "unordered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    #[serde(rename = "type")]
    pub kind: ListKind,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorMatch {
    pub tag: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technology {
    pub name: String,
    /// Which rule family attributed it
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructuredFormat {
    #[serde(rename = "JSON-LD")]
    JsonLd,
    #[serde(rename = "OpenGraph")]
    OpenGraph,
    #[serde(rename = "Twitter Card")]
    TwitterCard,
}

impl StructuredFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonLd => "JSON-LD",
            Self::OpenGraph => "OpenGraph",
            Self::TwitterCard => "Twitter Card",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredData {
    pub format: StructuredFormat,
    pub data: serde_json::Value,
}

/// Counts and derived metrics
///
/// Every `*_count` that mirrors a facet equals that facet's length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub word_count: usize,
    pub link_count: usize,
    pub internal_links: usize,
    pub external_links: usize,
    pub image_count: usize,
    pub heading_count: usize,
    pub table_count: usize,
    pub list_count: usize,
    pub paragraph_count: usize,
    pub script_count: usize,
    pub inline_script_count: usize,
    pub style_count: usize,
    pub html_size_bytes: usize,
    pub tech_count: usize,
    pub social_count: usize,
    pub structured_data_count: usize,
    /// Render time in seconds, two decimals
    pub elapsed_seconds: f64,
}
