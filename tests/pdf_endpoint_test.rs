//! `/generatePdf` and the callable variant, end to end through the router.

mod common;

use base64::Engine;
use common::{header, json, MemoryBucket, TestApp};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn missing_file_is_not_found() {
    let app = TestApp::new();
    let (status, _, body) = app.post_json("/generatePdf", json!({ "fileName": "nao-existe.html" }), None).await;
    assert_eq!(status, 404);
    assert!(json(&body)["error"].as_str().unwrap().contains("nao-existe.html"));
}

#[tokio::test]
async fn html_file_renders_pdf() {
    let app = TestApp::new();
    app.write_material("aula.html", "<b>bold</b> text");
    let (status, headers, body) = app.post_json("/generatePdf", json!({ "fileName": "aula.html" }), None).await;
    assert_eq!(status, 200);
    assert_eq!(header(&headers, "content-type"), Some("application/pdf"));
    assert_eq!(header(&headers, "content-disposition"), Some("inline; filename=\"aula.html.pdf\""));
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn storage_path_is_served_from_the_bucket() {
    let app = TestApp::with_bucket(MemoryBucket::default().with("materiais/resumo.txt", "Resumo de imunologia.", Some("text/plain")));
    let (status, _, body) = app
        .post_json("/generatePdf", json!({ "storagePath": "materiais/resumo.txt", "materialTitle": "Resumo" }), Some("uid-ana"))
        .await;
    assert_eq!(status, 200);
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn no_identifier_is_a_bad_request() {
    let app = TestApp::new();
    let (status, _, _) = app.post_json("/generatePdf", json!({ "materialTitle": "Sem arquivo" }), None).await;
    assert_eq!(status, 400);
    let (status, _, _) = app.post_json("/generatePdf", json!({ "fileName": "   " }), None).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn browser_override_without_browser_is_rejected() {
    let app = TestApp::new();
    app.write_material("tabela.html", "<table><tr><td>1</td></tr></table>");
    let (status, _, _) = app
        .post_json("/generatePdf", json!({ "fileName": "tabela.html", "renderer": "browser" }), None)
        .await;
    assert_eq!(status, 400);
    // auto falls back to the template when no browser is configured
    let (status, _, _) = app
        .post_json("/generatePdf", json!({ "fileName": "tabela.html", "renderer": "auto" }), None)
        .await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn callable_requires_identity() {
    let app = TestApp::new();
    let (status, _, body) = app
        .post_json("/callable/generatePdf", json!({ "data": { "storagePath": "a.html", "materialTitle": "A" } }), None)
        .await;
    assert_eq!(status, 401);
    assert_eq!(json(&body)["error"]["status"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn callable_requires_both_fields() {
    let app = TestApp::new();
    let (status, _, body) = app
        .post_json("/callable/generatePdf", json!({ "data": { "storagePath": "a.html" } }), Some("uid-ana"))
        .await;
    assert_eq!(status, 400);
    assert_eq!(json(&body)["error"]["status"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn callable_unknown_user_or_file_is_not_found() {
    let app = TestApp::with_bucket(MemoryBucket::default().with("a.html", "<p>a</p>", None));
    let (status, _, body) = app
        .post_json("/callable/generatePdf", json!({ "data": { "storagePath": "a.html", "materialTitle": "A" } }), Some("uid-ghost"))
        .await;
    assert_eq!(status, 404);
    assert_eq!(json(&body)["error"]["message"], "Usuário não encontrado.");

    let (status, _, body) = app
        .post_json("/callable/generatePdf", json!({ "data": { "storagePath": "b.html", "materialTitle": "B" } }), Some("uid-ana"))
        .await;
    assert_eq!(status, 404);
    assert_eq!(json(&body)["error"]["status"], "NOT_FOUND");
}

#[tokio::test]
async fn callable_returns_base64_pdf() {
    let app = TestApp::with_bucket(MemoryBucket::default().with(
        "disciplinas/imuno/aula1.html",
        "<h1>Imunidade inata</h1><p>Barreiras físicas e químicas.</p>",
        Some("text/html"),
    ));
    let (status, _, body) = app
        .post_json(
            "/callable/generatePdf",
            json!({ "data": { "storagePath": "disciplinas/imuno/aula1.html", "materialTitle": "Imunologia - Aula 1" } }),
            Some("uid-ana"),
        )
        .await;
    assert_eq!(status, 200);
    let encoded = json(&body)["result"]["pdfBase64"].as_str().unwrap().to_string();
    let pdf = base64::engine::general_purpose::STANDARD.decode(encoded).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn malformed_bodies_get_json_bad_request() {
    let app = TestApp::new();
    for body in [json!({ "fileName": 5 }), json!({ "fileName": "a.html", "renderer": "pdf-lib" }), json!([1, 2])] {
        let (status, headers, resp) = app.post_json("/generatePdf", body, None).await;
        assert_eq!(status, 400);
        assert_eq!(header(&headers, "content-type"), Some("application/json"));
        assert!(json(&resp)["error"].is_string());
    }

    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/generatePdf")
        .body(axum::body::Body::from(r#"{"fileName":"a.html"}"#))
        .unwrap();
    let (status, _, resp) = app.send(req).await;
    assert_eq!(status, 400);
    assert!(json(&resp)["error"].is_string());

    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/generatePdf")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{ não é json"))
        .unwrap();
    let (status, _, resp) = app.send(req).await;
    assert_eq!(status, 400);
    assert!(json(&resp)["error"].is_string());
}

#[tokio::test]
async fn callable_rejects_non_object_body_as_invalid_argument() {
    let app = TestApp::new();
    for body in [json!("texto"), json!({ "data": { "storagePath": 7, "materialTitle": "A" } })] {
        let (status, _, resp) = app.post_json("/callable/generatePdf", body, Some("uid-ana")).await;
        assert_eq!(status, 400);
        assert_eq!(json(&resp)["error"]["status"], "INVALID_ARGUMENT");
    }
}
