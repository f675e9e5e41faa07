//! Image proxy: fetches images referenced by a stored result document

use crate::config::FetchConfig;
use crate::{Result, ScrapeError};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Raw image bytes as served by the origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub url: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FetchedImage {
    /// File extension guessed from the content type, `jpg` when unknown
    pub fn extension(&self) -> &'static str {
        let mime = self
            .content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            "image/avif" => "avif",
            "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
            _ => "jpg",
        }
    }
}

/// Builds the client used for image fetches
///
/// # Arguments
///
/// * `user_agent` - Sent with every request, normally the browser's user agent
/// * `config` - Fetch timeout settings
pub fn build_client(user_agent: &str, config: &FetchConfig) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(ScrapeError::HttpClient)
}

/// Fetches one image, failing on transport errors and non-2xx statuses
pub async fn fetch_image(client: &Client, url: &str) -> Result<FetchedImage> {
    let http_error = |source| ScrapeError::Http {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(http_error)?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();

    let bytes = response.bytes().await.map_err(http_error)?;
    tracing::debug!(url, bytes = bytes.len(), %content_type, "Fetched image");

    Ok(FetchedImage {
        url: url.to_string(),
        content_type,
        bytes: bytes.to_vec(),
    })
}

/// Packs images into a ZIP archive as `image_001.<ext>`, `image_002.<ext>`, ...
///
/// Numbering follows the slice order, so callers that skip failed fetches
/// should pass the original position alongside each image.
pub fn archive_images(images: &[(usize, FetchedImage)]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (index, image) in images {
        let name = format!("image_{:03}.{}", index + 1, image.extension());
        writer.start_file(name, options)?;
        writer.write_all(&image.bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}
