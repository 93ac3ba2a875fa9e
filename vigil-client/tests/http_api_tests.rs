//! HTTP transport tests against a local mock server: body shapes, bearer
//! injection, and error mapping.

use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use vigil_client::api::{AuthApi, HttpAuthApi};
use vigil_client::types::*;
use vigil_client::{ClientConfig, ClientError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn api_for(server: &MockServer) -> HttpAuthApi {
    let config = ClientConfig {
        api_base_url: server.uri(),
        ..ClientConfig::test()
    };
    HttpAuthApi::new(config).unwrap()
}

#[tokio::test]
async fn login_start_posts_snake_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login/start"))
        .and(body_json(json!({
            "email": "ada@example.com",
            "login_request": "b2s"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "login_response": "cmVzcA"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server).await;
    let resp = api
        .login_start(&LoginStartRequest {
            email: "ada@example.com".to_string(),
            login_request: "b2s".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(resp.login_response, "cmVzcA");
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register/start"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = api_for(&server).await;
    let err = api
        .register_start(&RegisterStartRequest {
            email: "ada@example.com".to_string(),
            registration_request: "cmVx".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api(_)));
}

#[tokio::test]
async fn malformed_body_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login/start"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let api = api_for(&server).await;
    let err = api
        .login_start(&LoginStartRequest {
            email: "ada@example.com".to_string(),
            login_request: "b2s".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
    assert_eq!(err.user_message(), "Invalid response from server.");
}

#[tokio::test]
async fn unauthorized_on_public_endpoint_is_a_protocol_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login/finish"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let api = api_for(&server).await;
    let err = api
        .login_finish(&LoginFinishRequest {
            email: "ada@example.com".to_string(),
            finish_login_request: "ZmluaXNo".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Protocol(_)));
    assert_eq!(err.user_message(), "Authentication failed. Please try again.");
}

#[tokio::test]
async fn protected_endpoint_without_token_never_sends() {
    let server = MockServer::start().await;
    // No mock mounted: a request would 404 and map to Api, not AuthRequired.

    let api = api_for(&server).await;
    let err = api.get_user_record(7).await.unwrap_err();
    assert!(matches!(err, ClientError::AuthRequired));
}

#[tokio::test]
async fn protected_endpoint_injects_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/account/7"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "email": "ada@example.com",
            "full_name": "Ada Lovelace",
            "master_key_salt": "c2FsdA",
            "encrypted_vault_key": "Y3Q",
            "vault_key_nonce": "bm9uY2U"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server).await;
    api.set_access_token("tok-123".to_string()).await;

    let record = api.get_user_record(7).await.unwrap();
    assert_eq!(record.id, 7);
    assert_eq!(record.master_key_salt.as_deref(), Some("c2FsdA"));
}

#[tokio::test]
async fn unauthorized_on_protected_endpoint_fires_hook() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/account/7"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let api = api_for(&server).await;
    api.set_access_token("stale-token".to_string()).await;

    let fired = Arc::new(AtomicBool::new(false));
    let flag = fired.clone();
    api.on_unauthorized(move || flag.store(true, Ordering::SeqCst))
        .await;

    let err = api.get_user_record(7).await.unwrap_err();
    assert!(matches!(err, ClientError::AuthRequired));
    assert!(fired.load(Ordering::SeqCst));
}
