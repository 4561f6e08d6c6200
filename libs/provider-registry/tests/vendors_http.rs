use esp_core::ErrorKind;
use esp_provider_registry::ProviderRegistry;
use esp_testutil::{multi_recipient_email, sample_email};
use serde_json::json;
use wiremock::matchers::{basic_auth, bearer_token, body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn registry_for(config: serde_json::Value) -> ProviderRegistry {
    let registry = ProviderRegistry::new();
    registry.add_provider(&config).unwrap();
    registry
}

#[tokio::test]
async fn mailgun_posts_form_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/sandboxed.example.org/messages"))
        .and(basic_auth("api", "key-imagined"))
        .and(body_string_contains("subject=Hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "<mg-1@sandboxed.example.org>",
            "message": "Queued. Thank you."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry_for(json!({
        "name": "ironman",
        "provider": "mailgun",
        "apiKey": "key-imagined",
        "domain": "sandboxed.example.org",
        "endpoint": server.uri()
    }));

    let receipt = registry
        .send_by_provider("ironman", &sample_email())
        .unwrap()
        .await
        .unwrap();
    assert_eq!(receipt.provider, "ironman");
    assert_eq!(
        receipt.message_id.as_deref(),
        Some("<mg-1@sandboxed.example.org>")
    );
}

#[tokio::test]
async fn mailgun_unauthorized_is_a_configuration_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let registry = registry_for(json!({
        "name": "ironman",
        "provider": "mailgun",
        "apiKey": "key-incorrect",
        "domain": "sandboxed.example.org",
        "endpoint": server.uri()
    }));

    let err = registry.send(&sample_email()).unwrap().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigurationInvalid);
    assert_eq!(err.status(), 401);
    assert_eq!(err.message(), "Configurations for [ironman] is forbidden.");
}

#[tokio::test]
async fn mandrill_invalid_key_body_is_a_configuration_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .and(body_partial_json(json!({ "key": "imagined" })))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "code": -1,
            "name": "Invalid_Key",
            "message": "Invalid API key"
        })))
        .mount(&server)
        .await;

    let registry = registry_for(json!({
        "name": "thor",
        "provider": "mandrill",
        "apiKey": "imagined",
        "endpoint": server.uri()
    }));

    let err = registry.send(&sample_email()).unwrap().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigurationInvalid);
    assert_eq!(err.message(), "Configurations for [thor] is forbidden.");
}

#[tokio::test]
async fn mandrill_accepts_sent_and_queued_recipients() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "email": "recipient@example.com", "status": "sent", "_id": "md-1" },
            { "email": "recipient+1@example.com", "status": "queued", "_id": "md-2" },
            { "email": "recipient+2@example.com", "status": "sent", "_id": "md-3" }
        ])))
        .mount(&server)
        .await;

    let registry = registry_for(json!({
        "name": "thor",
        "provider": "mandrill",
        "apiKey": "imagined",
        "endpoint": server.uri()
    }));

    let receipt = registry.send(&multi_recipient_email()).unwrap().await.unwrap();
    assert_eq!(receipt.message_id.as_deref(), Some("md-1"));
}

#[tokio::test]
async fn sendgrid_uses_bearer_token_and_message_id_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .and(bearer_token("SG.imagined"))
        .and(body_partial_json(json!({ "from": { "email": "sender@example.com" } })))
        .respond_with(ResponseTemplate::new(202).insert_header("X-Message-Id", "sg-42"))
        .mount(&server)
        .await;

    let registry = registry_for(json!({
        "name": "hawkeye",
        "provider": "sendgrid",
        "apiKey": "SG.imagined",
        "endpoint": server.uri()
    }));

    let receipt = registry.send(&sample_email()).unwrap().await.unwrap();
    assert_eq!(receipt.message_id.as_deref(), Some("sg-42"));
}

#[tokio::test]
async fn sendgrid_server_errors_are_transport_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let registry = registry_for(json!({
        "name": "hawkeye",
        "provider": "sendgrid",
        "apiKey": "SG.imagined",
        "endpoint": server.uri()
    }));

    let err = registry.send(&sample_email()).unwrap().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
}

#[tokio::test]
async fn unreachable_vendor_is_a_transport_failure() {
    let registry = registry_for(json!({
        "name": "thor",
        "provider": "mandrill",
        "apiKey": "imagined",
        "endpoint": "http://127.0.0.1:9"
    }));

    let err = registry.send(&sample_email()).unwrap().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(std::error::Error::source(&err).is_some());
}
