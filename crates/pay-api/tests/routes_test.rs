use axum::http::StatusCode;
use axum_test::TestServer;
use pay_api::{create_router, AppConfig, AppState};
use pay_core::CallbackPayload;
use pay_mpesa::{CallbackSink, DarajaClient, MpesaConfig};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/oauth/v1/generate";
const PUSH_PATH: &str = "/mpesa/stkpush/v1/processrequest";

#[derive(Default)]
struct RecordingSink {
    seen: Mutex<Vec<CallbackPayload>>,
}

impl CallbackSink for RecordingSink {
    fn on_callback(&self, payload: &CallbackPayload) {
        self.seen.lock().unwrap().push(payload.clone());
    }
}

fn state_for(gateway: &MockServer, config: AppConfig) -> AppState {
    let mpesa = MpesaConfig::new(
        "key",
        "secret",
        "174379",
        "passkey",
        "https://example.com/callback",
    )
    .with_api_base_url(gateway.uri());
    let client = DarajaClient::new(mpesa).unwrap();
    AppState::with_gateway(Arc::new(client), config)
}

fn server_for(gateway: &MockServer) -> TestServer {
    TestServer::new(create_router(state_for(gateway, AppConfig::default()))).unwrap()
}

fn push_ack() -> Value {
    json!({
        "MerchantRequestID": "29115-34620561-1",
        "CheckoutRequestID": "ws_CO_191220191020363925",
        "ResponseCode": "0",
        "ResponseDescription": "Success. Request accepted for processing",
        "CustomerMessage": "Success. Request accepted for processing"
    })
}

async fn mount_token_ok(gateway: &MockServer) {
    Mock::given(method("GET"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok123",
            "expires_in": "3599"
        })))
        .mount(gateway)
        .await;
}

#[tokio::test]
async fn test_root_liveness() {
    let gateway = MockServer::start().await;
    let server = server_for(&gateway);

    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("M-Pesa Backend is Running");
}

#[tokio::test]
async fn test_health() {
    let gateway = MockServer::start().await;
    let server = server_for(&gateway);

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["provider"], "mpesa");
}

#[tokio::test]
async fn test_token_passthrough() {
    let gateway = MockServer::start().await;
    mount_token_ok(&gateway).await;
    let server = server_for(&gateway);

    let response = server.get("/token").await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "access_token": "tok123",
        "expires_in": "3599"
    }));
}

#[tokio::test]
async fn test_token_failure_is_500() {
    let gateway = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&gateway)
        .await;
    let server = server_for(&gateway);

    let response = server.get("/token").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to get token");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_stk_push_returns_gateway_ack() {
    let gateway = MockServer::start().await;
    mount_token_ok(&gateway).await;
    Mock::given(method("POST"))
        .and(path(PUSH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(push_ack()))
        .expect(1)
        .mount(&gateway)
        .await;
    let server = server_for(&gateway);

    let response = server
        .post("/stkpush")
        .json(&json!({ "phone": "254708374149", "amount": 1 }))
        .await;

    response.assert_status_ok();
    response.assert_json(&push_ack());
}

#[tokio::test]
async fn test_stk_push_under_api_prefix() {
    let gateway = MockServer::start().await;
    mount_token_ok(&gateway).await;
    Mock::given(method("POST"))
        .and(path(PUSH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(push_ack()))
        .mount(&gateway)
        .await;
    let server = server_for(&gateway);

    let response = server
        .post("/api/mpesa/stkpush")
        .json(&json!({ "phone": "254708374149", "amount": 1 }))
        .await;

    response.assert_status_ok();
    response.assert_json(&push_ack());
}

#[tokio::test]
async fn test_stk_push_token_401_never_pushes() {
    let gateway = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&gateway)
        .await;
    Mock::given(method("POST"))
        .and(path(PUSH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(push_ack()))
        .expect(0)
        .mount(&gateway)
        .await;
    let server = server_for(&gateway);

    let response = server
        .post("/stkpush")
        .json(&json!({ "phone": "254708374149", "amount": 1 }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "STK Push failed");
}

#[tokio::test]
async fn test_stk_push_rejected_with_details_exposed() {
    let gateway = MockServer::start().await;
    mount_token_ok(&gateway).await;
    Mock::given(method("POST"))
        .and(path(PUSH_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorCode": "400.002.02",
            "errorMessage": "Bad Request - Invalid PhoneNumber"
        })))
        .mount(&gateway)
        .await;
    let config = AppConfig {
        expose_upstream_errors: true,
        ..AppConfig::default()
    };
    let server = TestServer::new(create_router(state_for(&gateway, config))).unwrap();

    let response = server
        .post("/stkpush")
        .json(&json!({ "phone": "0700", "amount": 1 }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "STK Push failed");
    assert!(body["details"].as_str().unwrap().contains("Invalid PhoneNumber"));
}

fn sent_push_body(requests: &[wiremock::Request]) -> Value {
    requests
        .iter()
        .find(|r| r.url.path() == PUSH_PATH)
        .expect("push request sent")
        .body_json()
        .unwrap()
}

#[tokio::test]
async fn test_token_body_without_access_token_passed_through() {
    let gateway = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "abc",
            "errorCode": "400.008.01"
        })))
        .mount(&gateway)
        .await;
    let server = server_for(&gateway);

    let response = server.get("/token").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "requestId": "abc", "errorCode": "400.008.01" }));
}

#[tokio::test]
async fn test_stk_push_forwards_string_amount() {
    let gateway = MockServer::start().await;
    mount_token_ok(&gateway).await;
    Mock::given(method("POST"))
        .and(path(PUSH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(push_ack()))
        .expect(1)
        .mount(&gateway)
        .await;
    let server = server_for(&gateway);

    let response = server
        .post("/stkpush")
        .json(&json!({ "phone": "254708374149", "amount": "10" }))
        .await;

    response.assert_status_ok();
    response.assert_json(&push_ack());

    let body = sent_push_body(&gateway.received_requests().await.unwrap());
    assert_eq!(body["Amount"], "10");
    assert_eq!(body["PartyA"], "254708374149");
}

#[tokio::test]
async fn test_stk_push_forwards_numeric_phone() {
    let gateway = MockServer::start().await;
    mount_token_ok(&gateway).await;
    Mock::given(method("POST"))
        .and(path(PUSH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(push_ack()))
        .expect(1)
        .mount(&gateway)
        .await;
    let server = server_for(&gateway);

    server
        .post("/stkpush")
        .json(&json!({ "phone": 254708374149u64, "amount": 1 }))
        .await
        .assert_status_ok();

    let body = sent_push_body(&gateway.received_requests().await.unwrap());
    assert_eq!(body["PartyA"], 254708374149u64);
    assert_eq!(body["PhoneNumber"], 254708374149u64);
}

#[tokio::test]
async fn test_stk_push_empty_object_reaches_gateway() {
    let gateway = MockServer::start().await;
    mount_token_ok(&gateway).await;
    Mock::given(method("POST"))
        .and(path(PUSH_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorCode": "400.002.02",
            "errorMessage": "Bad Request - Invalid Amount"
        })))
        .expect(1)
        .mount(&gateway)
        .await;
    let server = server_for(&gateway);

    let response = server.post("/stkpush").json(&json!({})).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "STK Push failed", "code": 500 }));

    let body = sent_push_body(&gateway.received_requests().await.unwrap());
    assert!(body.get("Amount").is_none());
    assert!(body.get("PartyA").is_none());
    assert!(body.get("PhoneNumber").is_none());
    assert_eq!(body["BusinessShortCode"], "174379");
}

#[tokio::test]
async fn test_stk_push_unreadable_body_is_500() {
    let gateway = MockServer::start().await;
    let server = server_for(&gateway);

    let response = server.post("/stkpush").text("phone=254708374149").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "STK Push failed");
    assert!(gateway.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_callback_always_accepted() {
    let gateway = MockServer::start().await;
    let sink = Arc::new(RecordingSink::default());
    let state = state_for(&gateway, AppConfig::default()).with_callback_sink(sink.clone());
    let server = TestServer::new(create_router(state)).unwrap();

    let expected = json!({
        "ResultCode": 0,
        "ResultDesc": "Accepted",
        "message": "Callback received successfully"
    });

    let well_formed = json!({
        "Body": {
            "stkCallback": {
                "MerchantRequestID": "29115-34620561-1",
                "CheckoutRequestID": "ws_CO_191220191020363925",
                "ResultCode": 1032,
                "ResultDesc": "Request cancelled by user"
            }
        }
    });

    let response = server.post("/callback").json(&well_formed).await;
    response.assert_status_ok();
    response.assert_json(&expected);

    let response = server.post("/callback").await;
    response.assert_status_ok();
    response.assert_json(&expected);

    let response = server
        .post("/callback")
        .json(&json!({ "totally": ["unrelated", 42] }))
        .await;
    response.assert_status_ok();
    response.assert_json(&expected);

    let seen = sink.seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0], CallbackPayload::Json(well_formed));
    assert_eq!(seen[1], CallbackPayload::Empty);
}

#[tokio::test]
async fn test_callback_does_not_touch_gateway() {
    let gateway = MockServer::start().await;
    let server = server_for(&gateway);

    server
        .post("/api/mpesa/callback")
        .text("not json at all")
        .await
        .assert_status_ok();

    let requests = gateway.received_requests().await.unwrap();
    assert!(requests.is_empty());
}
