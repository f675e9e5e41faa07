//! Job lifecycle through the dispatcher

use crate::support::{FakeRenderer, Harness};
use pagescope::{JobStatus, ResultDocument, ScrapeError};

const HOME: &str = r#"<html><head>
    <title>Example Home</title>
    <meta name="description" content="A test page">
    <script type="application/ld+json">{"@type":"Organization","name":"Example"}</script>
</head><body>
    <h1>Welcome</h1>
    <a href="/about">About</a>
    <a href="https://github.com/example">GitHub</a>
    <p>This paragraph is comfortably longer than twenty characters.</p>
    <ul><li>First</li><li>Second</li></ul>
</body></html>"#;

#[tokio::test]
async fn test_scrape_completes_with_result_document() {
    let harness = Harness::new(FakeRenderer::new().page("https://example.com/", HOME));

    let id = harness
        .dispatcher
        .trigger_scrape("https://example.com/", Some("li"))
        .unwrap();
    harness.dispatcher.shutdown().await;

    let job = harness.dispatcher.get_job(id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);

    let doc: ResultDocument = serde_json::from_str(job.data.as_deref().unwrap()).unwrap();
    assert_eq!(doc.meta.title, "Example Home");
    assert_eq!(doc.meta.description, "A test page");
    assert_eq!(doc.meta.final_url.as_deref(), Some("https://example.com/"));
    assert_eq!(doc.stats.internal_links, 1);
    assert_eq!(doc.stats.external_links, 1);
    assert_eq!(doc.social_links.len(), 1);
    assert_eq!(doc.social_links[0].platform, "GitHub");
    assert_eq!(doc.structured_data.len(), 1);
    assert_eq!(doc.selector_results.as_ref().map(Vec::len), Some(2));
    assert_eq!(doc.screenshot.as_deref(), Some("anBlZw=="));
}

#[tokio::test]
async fn test_failed_navigation_is_recorded() {
    let harness = Harness::new(FakeRenderer::new());

    let id = harness
        .dispatcher
        .trigger_scrape("https://nowhere.invalid/", None)
        .unwrap();
    harness.dispatcher.shutdown().await;

    let job = harness.dispatcher.get_job(id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);

    let payload: serde_json::Value = serde_json::from_str(job.data.as_deref().unwrap()).unwrap();
    assert_eq!(payload["error_type"], "NavigationNetwork");
    assert!(payload["elapsed_seconds"].is_number());
}

#[tokio::test]
async fn test_many_jobs_listed_newest_first() {
    let harness = Harness::new(FakeRenderer::new().page("https://example.com/", HOME));

    let ids: Vec<i64> = (0..5)
        .map(|_| {
            harness
                .dispatcher
                .trigger_scrape("https://example.com/", None)
                .unwrap()
        })
        .collect();
    harness.dispatcher.shutdown().await;

    let listed: Vec<i64> = harness
        .dispatcher
        .list_jobs(3)
        .unwrap()
        .iter()
        .map(|j| j.id)
        .collect();
    assert_eq!(listed, vec![ids[4], ids[3], ids[2]]);

    let summaries = harness.dispatcher.list_jobs(50).unwrap();
    assert!(summaries
        .iter()
        .all(|j| j.status == JobStatus::Completed && j.has_data));
}

#[tokio::test]
async fn test_rescrape_and_delete() {
    let harness = Harness::new(FakeRenderer::new().page("https://example.com/", HOME));

    let original = harness
        .dispatcher
        .trigger_scrape("https://example.com/", None)
        .unwrap();
    let again = harness.dispatcher.rescrape(original).unwrap();
    harness.dispatcher.shutdown().await;

    assert!(again > original);
    assert_eq!(
        harness.dispatcher.get_job(again).unwrap().status,
        JobStatus::Completed
    );

    harness.dispatcher.delete_job(original).unwrap();
    assert!(matches!(
        harness.dispatcher.get_job(original),
        Err(ScrapeError::NotFound(_))
    ));
    assert!(matches!(
        harness.dispatcher.delete_job(original),
        Err(ScrapeError::NotFound(_))
    ));
    assert!(harness.store.get(again).unwrap().is_some());
}
