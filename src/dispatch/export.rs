//! Export of a job's stored payload as JSON or CSV

use super::csv::write_record;
use crate::extract::{ResultDocument, Stats};
use crate::store::Job;
use crate::{Result, ScrapeError};
use std::fmt;
use std::str::FromStr;

/// Output format for [`export_job`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown export format '{}' (expected json or csv)", other)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A rendered export, ready to be written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Exports a job's payload
///
/// JSON accepts any stored payload, including a failed job's error record.
/// CSV needs a full result document.
///
/// # Returns
///
/// * `Err(ScrapeError::NoData)` - The job has no payload yet
/// * `Err(ScrapeError::InvalidData)` - The payload does not fit the format
pub fn export_job(job: &Job, format: ExportFormat) -> Result<ExportFile> {
    let data = job.data.as_deref().ok_or(ScrapeError::NoData(job.id))?;

    let body = match format {
        ExportFormat::Json => {
            let value: serde_json::Value =
                serde_json::from_str(data).map_err(|e| invalid(job.id, e))?;
            serde_json::to_string_pretty(&value)?
        }
        ExportFormat::Csv => to_csv(&parse_document(job.id, data)?),
    };

    Ok(ExportFile {
        filename: format!("scrape_{}.{}", job.id, format.extension()),
        content_type: format.content_type(),
        body: body.into_bytes(),
    })
}

/// Parses a stored payload as a result document
pub fn parse_document(job_id: i64, data: &str) -> Result<ResultDocument> {
    serde_json::from_str(data).map_err(|e| invalid(job_id, e))
}

fn invalid(job_id: i64, err: serde_json::Error) -> ScrapeError {
    ScrapeError::InvalidData {
        job_id,
        message: err.to_string(),
    }
}

/// Flattens a result document into labeled CSV sections
///
/// META and STATS are always written. Other sections are skipped when
/// their facet is empty.
pub fn to_csv(doc: &ResultDocument) -> String {
    let mut out = String::new();

    section(&mut out, "META", ["Field", "Value"]);
    let meta = &doc.meta;
    for (field, value) in [
        ("Title", meta.title.as_str()),
        ("Description", meta.description.as_str()),
        ("Keywords", meta.keywords.as_str()),
        ("OG Title", meta.og_title.as_str()),
        ("OG Description", meta.og_description.as_str()),
        ("OG Image", meta.og_image.as_str()),
        ("Favicon", meta.favicon.as_deref().unwrap_or("")),
        ("Canonical", meta.canonical.as_deref().unwrap_or("")),
        ("Final URL", meta.final_url.as_deref().unwrap_or("")),
    ] {
        write_record(&mut out, [field, value]);
    }

    if !doc.headings.is_empty() {
        section(&mut out, "HEADINGS", ["Level", "Text"]);
        for heading in &doc.headings {
            write_record(&mut out, [format!("h{}", heading.level), heading.text.clone()]);
        }
    }

    if !doc.links.is_empty() {
        section(&mut out, "LINKS", ["URL", "Text", "Internal"]);
        for link in &doc.links {
            write_record(
                &mut out,
                [link.url.as_str(), link.text.as_str(), bool_str(link.internal)],
            );
        }
    }

    if !doc.images.is_empty() {
        section(&mut out, "IMAGES", ["Src", "Alt", "Width", "Height"]);
        for image in &doc.images {
            write_record(
                &mut out,
                [
                    image.src.as_str(),
                    image.alt.as_str(),
                    image.width.as_deref().unwrap_or(""),
                    image.height.as_deref().unwrap_or(""),
                ],
            );
        }
    }

    if !doc.tables.is_empty() {
        section(&mut out, "TABLES", ["Table", "Cells"]);
        for (index, table) in doc.tables.iter().enumerate() {
            for row in table {
                let number = (index + 1).to_string();
                write_record(&mut out, std::iter::once(&number).chain(row));
            }
        }
    }

    if !doc.lists.is_empty() {
        section(&mut out, "LISTS", ["List", "Type", "Item"]);
        for (index, list) in doc.lists.iter().enumerate() {
            let number = (index + 1).to_string();
            for item in &list.items {
                write_record(&mut out, [number.as_str(), list.kind.as_str(), item.as_str()]);
            }
        }
    }

    if !doc.text.is_empty() {
        section(&mut out, "TEXT", ["Paragraph"]);
        for paragraph in &doc.text {
            write_record(&mut out, [paragraph]);
        }
    }

    if !doc.technologies.is_empty() {
        section(&mut out, "TECHNOLOGIES", ["Name", "Source"]);
        for tech in &doc.technologies {
            write_record(&mut out, [&tech.name, &tech.source]);
        }
    }

    if !doc.social_links.is_empty() {
        section(&mut out, "SOCIAL LINKS", ["Platform", "URL", "Text"]);
        for social in &doc.social_links {
            write_record(&mut out, [&social.platform, &social.url, &social.text]);
        }
    }

    if !doc.structured_data.is_empty() {
        section(&mut out, "STRUCTURED DATA", ["Format", "Data"]);
        for entry in &doc.structured_data {
            write_record(&mut out, [entry.format.as_str().to_string(), entry.data.to_string()]);
        }
    }

    section(&mut out, "STATS", ["Metric", "Value"]);
    for (metric, value) in stat_rows(&doc.stats) {
        write_record(&mut out, [metric.to_string(), value]);
    }

    out
}

/// Starts a section, separated from the previous one by a blank line
fn section<const N: usize>(out: &mut String, title: &str, header: [&str; N]) {
    if !out.is_empty() {
        out.push_str("\r\n");
    }
    out.push_str("== ");
    out.push_str(title);
    out.push_str(" ==\r\n");
    write_record(out, header);
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn stat_rows(stats: &Stats) -> Vec<(&'static str, String)> {
    vec![
        ("word_count", stats.word_count.to_string()),
        ("link_count", stats.link_count.to_string()),
        ("internal_links", stats.internal_links.to_string()),
        ("external_links", stats.external_links.to_string()),
        ("image_count", stats.image_count.to_string()),
        ("heading_count", stats.heading_count.to_string()),
        ("table_count", stats.table_count.to_string()),
        ("list_count", stats.list_count.to_string()),
        ("paragraph_count", stats.paragraph_count.to_string()),
        ("script_count", stats.script_count.to_string()),
        ("inline_script_count", stats.inline_script_count.to_string()),
        ("style_count", stats.style_count.to_string()),
        ("html_size_bytes", stats.html_size_bytes.to_string()),
        ("tech_count", stats.tech_count.to_string()),
        ("social_count", stats.social_count.to_string()),
        ("structured_data_count", stats.structured_data_count.to_string()),
        ("elapsed_seconds", format!("{:.2}", stats.elapsed_seconds)),
    ]
}
