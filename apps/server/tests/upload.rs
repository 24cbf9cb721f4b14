mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use common::{Part, app, content_type, docx, multipart_body, unzip};
use docfill::domain::config::ApiConfig;
use http_body_util::BodyExt;
use tower::ServiceExt;

fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/v1/batch")
        .header(header::CONTENT_TYPE, content_type())
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn error_kind(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
    body["kind"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn batch_returns_zip_of_documents() {
    let template = docx(&["Dear {{NAME}}", "{{ROLE}} at {{COMPANY}}"]);
    let sheet = b"{{NAME}},{{ROLE}},{{COMPANY}},Date\nAda,Engineer,Acme,2024-01-01\nGrace,Admiral,Navy,\n";

    let response = app(ApiConfig::default())
        .oneshot(upload_request(&[
            Part::File { name: "template", file_name: "letter.docx", bytes: &template },
            Part::File { name: "replacements", file_name: "people.csv", bytes: sheet },
            Part::Text { name: "base_name", value: "Letter" },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"generated_documents.zip\""
    );
    assert_eq!(headers["x-documents"], "2");
    assert_eq!(headers["x-batch-id"].len(), 12);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let entries = unzip(&bytes);
    let names: Vec<_> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["Letter - Ada - Engineer - Acme.docx", "Letter - Grace - Admiral - Navy.docx"]);

    let first = unzip(&entries[0].1);
    let document = String::from_utf8(first[0].1.clone()).unwrap();
    assert!(document.contains("Dear Ada"));
    assert!(document.contains("Engineer at Acme"));
}

#[tokio::test]
async fn max_documents_field_lowers_the_limit() {
    let template = docx(&["{{N}}"]);
    let response = app(ApiConfig::default())
        .oneshot(upload_request(&[
            Part::File { name: "template", file_name: "t.docx", bytes: &template },
            Part::File { name: "replacements", file_name: "s.csv", bytes: b"{{N}}\n1\n2\n3\n" },
            Part::Text { name: "max_documents", value: "2" },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-documents"], "2");
}

#[tokio::test]
async fn missing_sheet_is_bad_request() {
    let template = docx(&["{{N}}"]);
    let response = app(ApiConfig::default())
        .oneshot(upload_request(&[Part::File {
            name: "template",
            file_name: "t.docx",
            bytes: &template,
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(response).await, "missing_file");
}

#[tokio::test]
async fn empty_file_part_counts_as_missing() {
    let template = docx(&["{{N}}"]);
    let response = app(ApiConfig::default())
        .oneshot(upload_request(&[
            Part::File { name: "template", file_name: "t.docx", bytes: &template },
            Part::File { name: "replacements", file_name: "", bytes: b"" },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(response).await, "missing_file");
}

#[tokio::test]
async fn repeated_empty_part_keeps_earlier_upload() {
    let template = docx(&["{{N}}"]);
    let response = app(ApiConfig::default())
        .oneshot(upload_request(&[
            Part::File { name: "template", file_name: "t.docx", bytes: &template },
            Part::File { name: "replacements", file_name: "s.csv", bytes: b"{{N}}\n1\n" },
            Part::File { name: "template", file_name: "", bytes: b"" },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-documents"], "1");
}

#[tokio::test]
async fn wrong_extension_is_unsupported_media_type() {
    let template = docx(&["{{N}}"]);
    let response = app(ApiConfig::default())
        .oneshot(upload_request(&[
            Part::File { name: "template", file_name: "t.docx", bytes: &template },
            Part::File { name: "replacements", file_name: "s.xlsx", bytes: b"{{N}}\n1\n" },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(error_kind(response).await, "invalid_extension");
}

#[tokio::test]
async fn malformed_sheet_is_unprocessable() {
    let template = docx(&["{{N}}"]);
    let response = app(ApiConfig::default())
        .oneshot(upload_request(&[
            Part::File { name: "template", file_name: "t.docx", bytes: &template },
            Part::File { name: "replacements", file_name: "s.csv", bytes: b"A,B\n1,2,3\n" },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_kind(response).await, "malformed_sheet");
}

#[tokio::test]
async fn unknown_category_is_unprocessable() {
    let template = docx(&["{{N}}"]);
    let response = app(ApiConfig::default())
        .oneshot(upload_request(&[
            Part::File { name: "template", file_name: "t.docx", bytes: &template },
            Part::File {
                name: "replacements",
                file_name: "s.csv",
                bytes: b"{{N}},__CATEGORY__\n1,legal\n",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_kind(response).await, "unknown_category");
}

#[tokio::test]
async fn category_template_field_is_used() {
    let template = docx(&["plain {{N}}"]);
    let legal = docx(&["legal {{N}}"]);
    let response = app(ApiConfig::default())
        .oneshot(upload_request(&[
            Part::File { name: "template", file_name: "t.docx", bytes: &template },
            Part::File { name: "template:legal", file_name: "legal.docx", bytes: &legal },
            Part::File {
                name: "replacements",
                file_name: "s.csv",
                bytes: b"{{N}},__CATEGORY__\n1,legal\n2,\n",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let entries = unzip(&bytes);
    let first = String::from_utf8(unzip(&entries[0].1)[0].1.clone()).unwrap();
    let second = String::from_utf8(unzip(&entries[1].1)[0].1.clone()).unwrap();
    assert!(first.contains("legal 1"));
    assert!(second.contains("plain 2"));
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let mut cfg = ApiConfig::default();
    cfg.server.body_limit_bytes = 1024;
    let big = vec![b'x'; 8 * 1024];

    let response = app(cfg)
        .oneshot(upload_request(&[
            Part::File { name: "template", file_name: "t.docx", bytes: &big },
            Part::File { name: "replacements", file_name: "s.csv", bytes: b"A\n1\n" },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
