//! Image proxy against a mock origin

use crate::support::{FakeRenderer, Harness};
use pagescope::ScrapeError;
use std::io::{Cursor, Read};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn origin() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(b"png-data".to_vec()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/c.gif"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/gif")
                .set_body_bytes(b"gif-data".to_vec()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    server
}

/// Scrapes a page whose images live on `server`, returning the job id
async fn scraped(server: &MockServer) -> (Harness, i64) {
    let page_url = format!("{}/gallery", server.uri());
    let html = r#"<html><body>
        <img src="/a.png" alt="A">
        <img src="/broken.jpg" alt="B">
        <img data-src="/c.gif" alt="C">
    </body></html>"#;

    let harness = Harness::new(FakeRenderer::new().page(&page_url, html));
    let id = harness.dispatcher.trigger_scrape(&page_url, None).unwrap();
    harness.dispatcher.shutdown().await;
    (harness, id)
}

#[tokio::test]
async fn test_fetch_single_image() {
    let server = origin().await;
    let (harness, id) = scraped(&server).await;

    let image = harness.dispatcher.fetch_image(id, 0).await.unwrap();
    assert_eq!(image.content_type, "image/png");
    assert_eq!(image.bytes, b"png-data".to_vec());
    assert_eq!(image.extension(), "png");

    assert!(matches!(
        harness.dispatcher.fetch_image(id, 1).await,
        Err(ScrapeError::Http { .. })
    ));
    assert!(matches!(
        harness.dispatcher.fetch_image(id, 3).await,
        Err(ScrapeError::ImageNotFound { index: 3, .. })
    ));
}

#[tokio::test]
async fn test_download_all_skips_failures() {
    let server = origin().await;
    let (harness, id) = scraped(&server).await;

    let file = harness.dispatcher.download_all_images(id).await.unwrap();
    assert_eq!(file.filename, format!("scrape_{}_images.zip", id));
    assert_eq!(file.content_type, "application/zip");

    let mut archive = zip::ZipArchive::new(Cursor::new(file.body)).unwrap();
    assert_eq!(archive.len(), 2);

    let mut gif = String::new();
    archive
        .by_name("image_003.gif")
        .unwrap()
        .read_to_string(&mut gif)
        .unwrap();
    assert_eq!(gif, "gif-data");
    assert!(archive.by_name("image_001.png").is_ok());
    assert!(archive.by_name("image_002.jpg").is_err());
}
