//! Ingestion workflow tests: dedup idempotency and the
//! no-row-on-failed-extraction guarantee.

mod common;

use std::sync::Arc;

use common::{app_with, CannedSynthesizer, FakeExtractor};
use readcast::error::AppError;
use readcast::models::ArticleStatus;
use readcast::services::TranscriptFile;

#[tokio::test]
async fn ingest_stores_a_processed_article() {
    let extractor = FakeExtractor::new().page("https://example.com/a", "A", "hello");
    let harness = app_with(Arc::new(extractor), None, Arc::new(TranscriptFile)).await;

    let article = harness.app.ingest("https://example.com/a", "web").await.unwrap();

    assert_eq!(article.url, "https://example.com/a");
    assert_eq!(article.title.as_deref(), Some("A"));
    assert_eq!(article.content_clean.as_deref(), Some("hello"));
    assert_eq!(article.source, "web");
    assert_eq!(article.status, ArticleStatus::Processed);
}

#[tokio::test]
async fn ingesting_the_same_url_twice_returns_the_first_record() {
    let extractor = FakeExtractor::new().page("https://example.com/a", "A", "hello");
    let harness = app_with(Arc::new(extractor), None, Arc::new(TranscriptFile)).await;

    let first = harness.app.ingest("https://example.com/a", "web").await.unwrap();
    let second = harness
        .app
        .ingest("https://example.com/a", "chrome-extension")
        .await
        .unwrap();

    // Same record, untouched: no re-fetch, no source overwrite.
    assert_eq!(second.id, first.id);
    assert_eq!(second.source, "web");
    assert_eq!(second.status, ArticleStatus::Processed);

    let articles = harness.app.list_articles().await.unwrap();
    assert_eq!(articles.len(), 1);
}

#[tokio::test]
async fn failed_extraction_creates_no_article() {
    let extractor = FakeExtractor::new(); // knows no pages
    let harness = app_with(Arc::new(extractor), None, Arc::new(TranscriptFile)).await;

    let err = harness
        .app
        .ingest("https://example.com/dead", "web")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Extraction(_)));

    assert!(harness.app.list_articles().await.unwrap().is_empty());
}

#[tokio::test]
async fn extraction_diagnostic_reaches_the_caller() {
    let extractor = FakeExtractor::new();
    let harness = app_with(Arc::new(extractor), None, Arc::new(TranscriptFile)).await;

    let err = harness
        .app
        .ingest("https://example.com/dead", "web")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("https://example.com/dead"));
}

#[tokio::test]
async fn deleting_an_article_removes_it_from_the_queue() {
    let extractor = FakeExtractor::new().page("https://example.com/a", "A", "hello");
    let harness = app_with(Arc::new(extractor), None, Arc::new(TranscriptFile)).await;

    let article = harness.app.ingest("https://example.com/a", "web").await.unwrap();
    harness.app.delete_article(article.id).await.unwrap();

    assert!(harness.app.list_articles().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_missing_article_is_not_found() {
    let harness = app_with(
        Arc::new(FakeExtractor::new()),
        Some(Arc::new(CannedSynthesizer {
            script: "Alex: hi".to_string(),
        })),
        Arc::new(TranscriptFile),
    )
    .await;

    let err = harness.app.delete_article(42).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}
