use gcash_payments::payments::providers::uisp::UispClientConfig;
use gcash_payments::payments::{BillingApi, CreatePaymentRequest, UispClient};
use gcash_payments::AppError;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_PREFIX: &str = "/crm/api/v1.0";

fn client_for(server: &MockServer, timeout_secs: u64) -> UispClient {
    UispClient::new(UispClientConfig {
        base_url: format!("{}{}", server.uri(), API_PREFIX),
        app_key: "test-app-key".to_string(),
        timeout_secs,
    })
    .expect("client should build")
}

fn payment_request() -> CreatePaymentRequest {
    CreatePaymentRequest {
        client_id: 42,
        amount: Decimal::new(25000, 2),
        note: "GCash Payment - Ref: REF-001".to_string(),
        apply_to_invoices_automatically: true,
        user_id: Some(7),
        method_id: Some("d8c1eae9-d41d-479f-aeaf-38497975d7b3".to_string()),
    }
}

#[tokio::test]
async fn test_lists_clients_with_app_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/clients", API_PREFIX)))
        .and(header("X-Auth-App-Key", "test-app-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 42, "userIdent": "ACC100", "firstName": "Juan", "lastName": "Dela Cruz", "isLead": false},
            {"id": 43, "userIdent": null, "firstName": "Lead", "lastName": null}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let clients = client_for(&server, 5).list_clients().await.unwrap();

    assert_eq!(clients.len(), 2);
    assert!(clients[0].has_account_number("ACC100"));
    assert_eq!(clients[0].display_name(), "Juan Dela Cruz");
    assert!(clients[1].user_ident.is_none());
}

#[tokio::test]
async fn test_client_lookup_http_error_is_lookup_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/clients", API_PREFIX)))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = client_for(&server, 5).list_clients().await.unwrap_err();
    match err {
        AppError::Lookup { message } => {
            assert!(message.contains("401"));
            assert!(message.contains("Unauthorized"));
        }
        other => panic!("expected lookup error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_lists_payment_methods() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/payment-methods", API_PREFIX)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "11111111-2222-3333-4444-555555555555", "name": "Cash", "visible": true},
            {"id": "d8c1eae9-d41d-479f-aeaf-38497975d7b3", "name": "GCash", "visible": true}
        ])))
        .mount(&server)
        .await;

    let methods = client_for(&server, 5).list_payment_methods().await.unwrap();
    assert_eq!(methods.len(), 2);
    assert_eq!(methods[1].name, "GCash");
}

#[tokio::test]
async fn test_creates_payment_and_returns_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/payments", API_PREFIX)))
        .and(header("X-Auth-App-Key", "test-app-key"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 311,
            "clientId": 42,
            "amount": 250.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server, 5)
        .create_payment(payment_request())
        .await
        .unwrap();
    assert_eq!(response.id.as_deref(), Some("311"));

    let received = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["clientId"], 42);
    assert_eq!(body["amount"].as_f64(), Some(250.0));
    assert_eq!(body["note"], "GCash Payment - Ref: REF-001");
    assert_eq!(body["applyToInvoicesAutomatically"], true);
    assert_eq!(body["userId"], 7);
    assert_eq!(body["methodId"], "d8c1eae9-d41d-479f-aeaf-38497975d7b3");
}

#[tokio::test]
async fn test_payment_rejection_is_external_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/payments", API_PREFIX)))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Validation failed."})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server, 5)
        .create_payment(payment_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ExternalApi { .. }));
    assert!(err.to_string().contains("Validation failed."));
}

#[tokio::test]
async fn test_unparseable_payment_response_is_external_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/payments", API_PREFIX)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server, 5)
        .create_payment(payment_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ExternalApi { .. }));
}

#[tokio::test]
async fn test_slow_lookup_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/clients", API_PREFIX)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = client_for(&server, 1).list_clients().await.unwrap_err();
    assert!(matches!(err, AppError::Lookup { .. }));
    assert!(err.to_string().contains("timed out"));
}
