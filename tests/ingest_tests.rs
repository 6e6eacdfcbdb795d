//! Image ingestion from files and URLs into icon entries.

mod common;

use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::Write;

use common::{Reply, StubBackend};
use etiket::{
    EtiketError, Session,
    ingest::{self, FileSource, Ingestor, UrlSource},
    model::EntryKind,
};

#[tokio::test]
async fn file_bytes_end_up_in_icon_entry() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"\x89PNG\r\n\x1a\nrest-of-image").unwrap();

    let mut session = Session::new();
    let id = session.add(EntryKind::Icon);
    let source = FileSource::new(file.path());

    assert!(session.attach_icon(&id, &source, &Ingestor::validating()).await.unwrap());

    let icon = session.store().icon(&id).unwrap();
    assert_eq!(
        STANDARD.decode(&icon.base64_string).unwrap(),
        b"\x89PNG\r\n\x1a\nrest-of-image"
    );
}

#[tokio::test]
async fn attach_to_removed_icon_is_a_noop() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"GIF89a").unwrap();

    let mut session = Session::new();
    let id = session.add(EntryKind::Icon);
    session.remove(EntryKind::Icon, &id);
    let before = session.snapshot();

    let updated = session
        .attach_icon(&id, &FileSource::new(file.path()), &Ingestor::new())
        .await
        .unwrap();
    assert!(!updated);
    assert_eq!(session.snapshot(), before);
}

#[tokio::test]
async fn url_source_downloads_bytes() {
    let stub = StubBackend::start().await;
    stub.set("/logo.png", Reply::text(StatusCode::OK, "not-really-a-png"));

    let url = format!("{}/logo.png", stub.base_url);
    let source = UrlSource::new(url, reqwest::Client::new());
    let encoded = Ingestor::new().ingest(&source).await.unwrap();
    assert_eq!(STANDARD.decode(encoded).unwrap(), b"not-really-a-png");
}

#[tokio::test]
async fn url_source_http_error_is_read_error() {
    let stub = StubBackend::start().await;
    let url = format!("{}/missing.png", stub.base_url);

    let source = ingest::source_for(&url, &reqwest::Client::new());
    let err = Ingestor::new().ingest(source.as_ref()).await.unwrap_err();
    match err {
        EtiketError::ResourceRead(msg) => assert!(msg.contains("404")),
        other => panic!("unexpected error: {other}"),
    }
}
