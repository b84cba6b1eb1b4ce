//! Gemini client against a WireMock server.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use imagegen::{
    GeminiConfig, GeminiImageClient, GenerateImageInput, ImageGenError, ImageProvider,
    ReferenceImageInput,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-test:generateContent";
const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn client(server: &MockServer) -> GeminiImageClient {
    GeminiImageClient::new(
        &GeminiConfig::new("test-key")
            .with_model("gemini-test")
            .with_base_url(server.uri()),
    )
}

fn image_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    {"text": "Here you go"},
                    {"inlineData": {"mimeType": "image/png", "data": PNG_BASE64}}
                ]
            },
            "finishReason": "STOP"
        }]
    }))
}

async fn generate_request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap_or_default();
    let request = requests
        .iter()
        .find(|request| request.url.path() == GENERATE_PATH)
        .expect("generateContent was not called");
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn test_generate_image_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(image_response())
        .expect(1)
        .mount(&server)
        .await;

    let input = GenerateImageInput::new("a cat", 1920, 1080).with_style("watercolor");
    let image = client(&server).generate_image(input).await.unwrap();
    assert_eq!(image, PNG_BASE64);

    let body = generate_request_body(&server).await;
    assert_eq!(
        body,
        json!({
            "contents": [{"parts": [{"text": "a cat. Style: watercolor"}]}],
            "generationConfig": {"imageConfig": {"aspectRatio": "16:9"}}
        })
    );
}

#[tokio::test]
async fn test_remote_reference_is_fetched_and_inlined() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/refs/cat.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(image_response())
        .mount(&server)
        .await;

    let reference = ReferenceImageInput::new(format!("{}/refs/cat.jpg", server.uri()));
    let input = GenerateImageInput::new("a cat", 1024, 1024).with_references(vec![reference]);
    client(&server).generate_image(input).await.unwrap();

    let body = generate_request_body(&server).await;
    assert_eq!(
        body["contents"][0]["parts"][1],
        json!({"inlineData": {"mimeType": "image/jpeg", "data": STANDARD.encode(b"jpeg-bytes")}})
    );
}

#[tokio::test]
async fn test_only_first_reference_is_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/refs/first.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"first".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/refs/second.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"second".to_vec()))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(image_response())
        .mount(&server)
        .await;

    let references = vec![
        ReferenceImageInput::new(format!("{}/refs/first.png", server.uri())),
        ReferenceImageInput::new(format!("{}/refs/second.png", server.uri())),
    ];
    let input = GenerateImageInput::new("a cat", 1024, 1024).with_references(references);
    client(&server).generate_image(input).await.unwrap();

    let body = generate_request_body(&server).await;
    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
}

#[tokio::test]
async fn test_data_url_reference_needs_no_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(image_response())
        .expect(1)
        .mount(&server)
        .await;

    let reference = ReferenceImageInput::new("data:image/png;base64,AAAA");
    let input = GenerateImageInput::new("a cat", 1024, 1024).with_references(vec![reference]);
    client(&server).generate_image(input).await.unwrap();

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    let body = generate_request_body(&server).await;
    assert_eq!(
        body["contents"][0]["parts"][1],
        json!({"inlineData": {"mimeType": "image/png", "data": "AAAA"}})
    );
}

#[tokio::test]
async fn test_failed_reference_degrades_to_text_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/refs/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(image_response())
        .expect(1)
        .mount(&server)
        .await;

    let reference = ReferenceImageInput::new(format!("{}/refs/missing.png", server.uri()));
    let input = GenerateImageInput::new("a cat", 1024, 1024).with_references(vec![reference]);
    let image = client(&server).generate_image(input).await.unwrap();
    assert_eq!(image, PNG_BASE64);

    let body = generate_request_body(&server).await;
    assert_eq!(body["contents"][0]["parts"], json!([{"text": "a cat"}]));
}

#[tokio::test]
async fn test_response_without_image_is_no_image_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "I can't draw that"}]}}]
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .generate_image(GenerateImageInput::new("a cat", 1024, 1024))
        .await
        .unwrap_err();
    assert!(matches!(err, ImageGenError::NoImageData));
}

#[tokio::test]
async fn test_null_candidates_is_no_image_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": null})))
        .mount(&server)
        .await;

    let err = client(&server)
        .generate_image(GenerateImageInput::new("a cat", 1024, 1024))
        .await
        .unwrap_err();
    assert!(matches!(err, ImageGenError::NoImageData));
}

#[tokio::test]
async fn test_inline_data_without_mime_type_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"inlineData": {"data": PNG_BASE64}}]}}]
        })))
        .mount(&server)
        .await;

    let image = client(&server)
        .generate_image(GenerateImageInput::new("a cat", 1024, 1024))
        .await
        .unwrap();
    assert_eq!(image, PNG_BASE64);
}

#[tokio::test]
async fn test_upstream_error_message_is_propagated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .generate_image(GenerateImageInput::new("a cat", 1024, 1024))
        .await
        .unwrap_err();
    match err {
        ImageGenError::Provider(message) => assert_eq!(message, "API key not valid"),
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_failure_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client(&server)
        .generate_image(GenerateImageInput::new("a cat", 1024, 1024))
        .await
        .unwrap_err();
    assert!(matches!(err, ImageGenError::Provider(ref m) if m.contains("503")));
    assert!(err.to_string().starts_with("Gemini API failed: "));
}

#[tokio::test]
async fn test_malformed_body_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .generate_image(GenerateImageInput::new("a cat", 1024, 1024))
        .await
        .unwrap_err();
    assert!(matches!(err, ImageGenError::Provider(_)));
}
