use std::time::Duration;

use recovery_aid_advice::{
    AdviceError, AdviceRequest, AdviceService, ApiKey, OpenAiAdviceService, PromptVariant,
    ServiceConfig,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> AdviceRequest {
    AdviceRequest {
        prompt: PromptVariant::Baseline,
        system: "system text".to_string(),
        user: "Hello Alex,".to_string(),
    }
}

fn service(base_url: &str) -> OpenAiAdviceService {
    let config = ServiceConfig::new(ApiKey::new("test-key"))
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5));
    OpenAiAdviceService::new(config).unwrap()
}

#[tokio::test]
async fn test_successful_completion_is_trimmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4",
            "max_tokens": 750,
            "temperature": 0.7,
            "messages": [
                {"role": "system", "content": "system text"},
                {"role": "user", "content": "Hello Alex,"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "\n  Recovery Recommendation\n...  \n"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = service(&server.uri()).request_advice(&request()).await.unwrap();
    assert_eq!(response.text, "Recovery Recommendation\n...");
}

#[tokio::test]
async fn test_auth_failure_surfaces_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let err = service(&server.uri())
        .request_advice(&request())
        .await
        .unwrap_err();
    match err {
        AdviceError::Status { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_response_without_choices_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = service(&server.uri())
        .request_advice(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, AdviceError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let err = service(&server.uri())
        .request_advice(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, AdviceError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    // Nothing listens on port 1
    let err = service("http://127.0.0.1:1")
        .request_advice(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, AdviceError::Transport(_)));
}
