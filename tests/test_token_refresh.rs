mod common;

use common::{Failure, FakeIdentity};
use pantry_api_client::client::{ApiRequest, MultipartForm};
use pantry_api_client::ApiError;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_single_retry_with_fresh_token() {
    common::init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/diet-planning/active"))
        .and(header("Authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/diet-planning/active"))
        .and(header("Authorization", "Bearer tok2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "plan": {"planId": "p1"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let identity = FakeIdentity::signed_in("tok1", "tok2");
    let client = common::client_for(&server, identity.clone());

    let body: Value = client
        .get("/diet-planning/active", true)
        .await
        .expect("Retry with the refreshed token should succeed");

    assert_eq!(body, json!({"success": true, "plan": {"planId": "p1"}}));
    assert_eq!(common::request_count(&server).await, 2);
    assert_eq!(identity.forced(), 1, "Exactly one forced refresh");
}

#[tokio::test]
async fn test_retry_does_not_loop() {
    common::init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/pantry"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token revoked"))
        .expect(2)
        .mount(&server)
        .await;

    let identity = FakeIdentity::signed_in("tok1", "tok2");
    let client = common::client_for(&server, identity.clone());

    let err = client
        .get::<Value>("/pantry", true)
        .await
        .expect_err("Persistent 401 must fail");

    match &err {
        ApiError::RetryExhausted { status, body } => {
            assert_eq!(*status, 401);
            assert_eq!(body, "token revoked");
        }
        other => panic!("Expected RetryExhausted, got {:?}", other),
    }
    assert_eq!(common::request_count(&server).await, 2);
    assert_eq!(identity.forced(), 1);
}

#[tokio::test]
async fn test_retry_reports_second_failure() {
    common::init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer tok2"))
        .respond_with(ResponseTemplate::new(403).set_body_string("subscription required"))
        .mount(&server)
        .await;

    let client = common::client_for(&server, FakeIdentity::signed_in("tok1", "tok2"));
    let err = client.get::<Value>("/recipes/r1", true).await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(err.to_string().contains("subscription required"));
}

#[tokio::test]
async fn test_no_fresh_token_returns_original_401() {
    common::init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .expect(1)
        .mount(&server)
        .await;

    let identity = FakeIdentity::without_refresh("tok1");
    let client = common::client_for(&server, identity.clone());

    let err = client.get::<Value>("/pantry", true).await.unwrap_err();

    match &err {
        ApiError::Http { status, body } => {
            assert_eq!(*status, 401);
            assert_eq!(body, "expired");
        }
        other => panic!("Expected the original 401, got {:?}", other),
    }
    assert_eq!(common::request_count(&server).await, 1, "No second network attempt");
    assert_eq!(identity.forced(), 1);
}

#[tokio::test]
async fn test_failed_refresh_returns_original_401() {
    common::init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .expect(1)
        .mount(&server)
        .await;

    let identity = FakeIdentity::failing("tok1", Failure::Refresh);
    let client = common::client_for(&server, identity.clone());

    let err = client.get::<Value>("/pantry", true).await.unwrap_err();

    match &err {
        ApiError::Http { status, body } => {
            assert_eq!(*status, 401);
            assert_eq!(body, "expired");
        }
        other => panic!("Expected the original 401, got {:?}", other),
    }
    assert_eq!(common::request_count(&server).await, 1, "No second network attempt");
    assert_eq!(identity.forced(), 1);
}

#[tokio::test]
async fn test_public_401_is_not_retried() {
    common::init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .expect(1)
        .mount(&server)
        .await;

    let identity = FakeIdentity::signed_in("tok1", "tok2");
    let client = common::client_for(&server, identity.clone());

    let err = client
        .get::<Value>("/subscription/plans", false)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Http { status: 401, .. }));
    assert_eq!(identity.forced(), 0, "No token to refresh on public requests");
}

#[tokio::test]
async fn test_retry_replays_json_body() {
    common::init_test_logging();
    let server = MockServer::start().await;
    let payload = json!({"name": "eggs", "quantity": 12});

    Mock::given(method("POST"))
        .and(path("/api/pantry/items"))
        .and(header("Authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/pantry/items"))
        .and(header("Authorization", "Bearer tok2"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"created": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server, FakeIdentity::signed_in("tok1", "tok2"));
    let body: Value = client
        .post("/pantry/items", Some(&payload), true)
        .await
        .unwrap();

    assert_eq!(body, json!({"created": true}));
}

#[tokio::test]
async fn test_retry_replays_multipart_body() {
    common::init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("Authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("Authorization", "Bearer tok2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ingredients": []})))
        .mount(&server)
        .await;

    let client = common::client_for(&server, FakeIdentity::signed_in("tok1", "tok2"));
    let form = MultipartForm::new().file("image", b"jpeg-bytes".to_vec(), "fridge.jpg", Some("image/jpeg"));
    let _: Value = client
        .request(ApiRequest::post("/ingredients/detect").form(form))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        let body = String::from_utf8_lossy(&request.body);
        assert!(body.contains("jpeg-bytes"), "Both attempts carry the file");
        assert!(body.contains("filename=\"fridge.jpg\""));
    }
}
