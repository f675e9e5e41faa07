//! Export of stored jobs

use crate::support::{FakeRenderer, Harness};
use pagescope::dispatch::ExportFormat;
use pagescope::{JobStatus, ScrapeError};

const PAGE: &str = r#"<html><head><title>Export me</title></head><body>
    <a href="/docs">Docs, and more</a>
    <table><tr><th>Name</th><th>Value</th></tr><tr><td>a</td><td>1</td></tr></table>
</body></html>"#;

#[tokio::test]
async fn test_csv_export_of_completed_job() {
    let harness = Harness::new(FakeRenderer::new().page("https://example.com/", PAGE));
    let id = harness
        .dispatcher
        .trigger_scrape("https://example.com/", None)
        .unwrap();
    harness.dispatcher.shutdown().await;

    let file = harness.dispatcher.export(id, ExportFormat::Csv).unwrap();
    assert_eq!(file.filename, format!("scrape_{}.csv", id));

    let csv = String::from_utf8(file.body).unwrap();
    assert!(csv.contains("Title,Export me\r\n"));
    assert!(csv.contains(
        "== LINKS ==\r\nURL,Text,Internal\r\nhttps://example.com/docs,\"Docs, and more\",true\r\n"
    ));
    assert!(csv.contains("== TABLES ==\r\nTable,Cells\r\n1,Name,Value\r\n1,a,1\r\n"));
    assert!(csv.contains("link_count,1\r\n"));
    assert!(!csv.contains("== IMAGES =="));
}

#[tokio::test]
async fn test_json_export_of_failed_job() {
    let harness = Harness::new(FakeRenderer::new());
    let id = harness
        .dispatcher
        .trigger_scrape("https://nowhere.invalid/", None)
        .unwrap();
    harness.dispatcher.shutdown().await;
    assert_eq!(
        harness.dispatcher.get_job(id).unwrap().status,
        JobStatus::Failed
    );

    let file = harness.dispatcher.export(id, ExportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&file.body).unwrap();
    assert_eq!(value["error_type"], "NavigationNetwork");

    assert!(matches!(
        harness.dispatcher.export(id, ExportFormat::Csv),
        Err(ScrapeError::InvalidData { .. })
    ));
}

#[tokio::test]
async fn test_export_of_pending_and_corrupt_jobs() {
    let harness = Harness::new(FakeRenderer::new());

    let pending = harness.store.create("https://example.com/").unwrap();
    assert!(matches!(
        harness.dispatcher.export(pending, ExportFormat::Json),
        Err(ScrapeError::NoData(_))
    ));

    let corrupt = harness.store.create("https://example.com/").unwrap();
    harness
        .store
        .update(corrupt, JobStatus::Completed, Some("{not json"))
        .unwrap();
    assert!(matches!(
        harness.dispatcher.export(corrupt, ExportFormat::Json),
        Err(ScrapeError::InvalidData { .. })
    ));

    harness.dispatcher.shutdown().await;
}
