use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use exchange_engine::{
    db_types::NotificationType,
    events::EventProducers,
    traits::{CreditedDeposit, DepositError, DepositResult},
    DepositApi,
};
use serde_json::json;
use xg_common::Secret;

use super::{
    helpers::{amount, sample_deposit_tx, sample_notification, sample_user, sample_wallet, send_request, TestResponse},
    mocks::MockBackend,
};
use crate::{
    helpers::{calculate_webhook_signature, SIGNATURE_HEADER},
    middleware::SignatureMiddlewareFactory,
    routes::CryptoPayWebhookRoute,
};

const API_TOKEN: &str = "1234:test-token";

const PAID_INVOICE: &str = concat!(
    r#"{"update_id":1,"update_type":"invoice_paid","#,
    r#""payload":{"invoice_id":77,"status":"paid","asset":"USDT","amount":"100.00","payload":"user_123"}}"#
);

fn configure(backend: MockBackend, signature_checks: bool) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = DepositApi::new(backend, EventProducers::default());
        let signatures =
            SignatureMiddlewareFactory::new(SIGNATURE_HEADER, Secret::new(API_TOKEN.to_string()), signature_checks);
        cfg.app_data(web::Data::new(api))
            .service(web::scope("/webhooks").wrap(signatures).service(CryptoPayWebhookRoute::<MockBackend>::new()));
    }
}

async fn deliver(body: &str, signature: Option<&str>, backend: MockBackend) -> TestResponse {
    let mut req = TestRequest::post()
        .uri("/webhooks/crypto-pay")
        .insert_header(("content-type", "application/json"))
        .set_payload(body.to_string());
    if let Some(signature) = signature {
        req = req.insert_header((SIGNATURE_HEADER, signature));
    }
    send_request(req, configure(backend, true)).await
}

async fn deliver_signed(body: &str, backend: MockBackend) -> TestResponse {
    let signature = calculate_webhook_signature(API_TOKEN, body.as_bytes()).unwrap();
    deliver(body, Some(&signature), backend).await
}

fn credited(tx_id: i64) -> DepositResult {
    DepositResult::Credited(CreditedDeposit {
        user: sample_user(1, 123),
        wallet: sample_wallet(3, 1, "USDT", "150"),
        transaction: sample_deposit_tx(tx_id, 1, "77", "100"),
        notification: sample_notification(1, NotificationType::Deposit, None),
    })
}

#[actix_web::test]
async fn paid_invoice_is_credited() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend
        .expect_credit_deposit()
        .withf(|d| d.invoice_id == "77" && d.telegram_id == 123 && d.currency == "USDT" && d.amount == amount("100"))
        .times(1)
        .returning(|_| Ok(credited(7)));
    let res = deliver_signed(PAID_INVOICE, backend).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({"success": true, "transaction_id": 7, "duplicate": false}));
}

#[actix_web::test]
async fn crypto_bot_sample_delivery_is_credited() {
    // String invoice id, as in the provider's documented example. The second delivery has no status.
    let bodies = [
        concat!(
            r#"{"update_id":123,"update_type":"invoice_paid","request_date":"2024-12-09T12:00:00Z","#,
            r#""payload":{"invoice_id":"123456","status":"paid","asset":"USDT","amount":"100.00","#,
            r#""paid_at":"2024-12-09T12:05:00Z","payload":"user_123"}}"#
        ),
        concat!(
            r#"{"update_type":"invoice_paid","#,
            r#""payload":{"invoice_id":"123457","asset":"USDT","amount":"100.00","payload":"user_123"}}"#
        ),
    ];
    for (i, body) in bodies.into_iter().enumerate() {
        let expected_id = format!("{}", 123456 + i);
        let mut backend = MockBackend::new();
        backend
            .expect_credit_deposit()
            .withf(move |d| d.invoice_id == expected_id && d.telegram_id == 123 && d.amount == amount("100"))
            .times(1)
            .returning(|_| Ok(credited(8)));
        let res = deliver_signed(body, backend).await;
        assert_eq!(res.status, StatusCode::OK, "{body}");
        assert_eq!(res.json(), json!({"success": true, "transaction_id": 8, "duplicate": false}));
    }
}

#[actix_web::test]
async fn redelivery_is_acknowledged() {
    let mut backend = MockBackend::new();
    backend
        .expect_credit_deposit()
        .times(1)
        .returning(|_| Ok(DepositResult::AlreadyCredited(sample_deposit_tx(7, 1, "77", "100"))));
    let res = deliver_signed(PAID_INVOICE, backend).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({"success": true, "transaction_id": 7, "duplicate": true}));
}

#[actix_web::test]
async fn unsigned_delivery_is_rejected() {
    let mut backend = MockBackend::new();
    backend.expect_credit_deposit().never();
    let res = deliver(PAID_INVOICE, None, backend).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json(), json!({"error": "No webhook signature found"}));
    assert_eq!(res.header("Access-Control-Allow-Origin"), Some("*"));
}

#[actix_web::test]
async fn forged_delivery_is_rejected() {
    let mut backend = MockBackend::new();
    backend.expect_credit_deposit().never();
    let signature = calculate_webhook_signature("some-other-token", PAID_INVOICE.as_bytes()).unwrap();
    let res = deliver(PAID_INVOICE, Some(&signature), backend).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json(), json!({"error": "Invalid webhook signature"}));

    // A valid signature for a different body
    let mut backend = MockBackend::new();
    backend.expect_credit_deposit().never();
    let signature = calculate_webhook_signature(API_TOKEN, b"{}").unwrap();
    let res = deliver(PAID_INVOICE, Some(&signature), backend).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn disabled_signature_checks() {
    let mut backend = MockBackend::new();
    backend.expect_credit_deposit().times(1).returning(|_| Ok(credited(8)));
    let req = TestRequest::post()
        .uri("/webhooks/crypto-pay")
        .insert_header(("content-type", "application/json"))
        .set_payload(PAID_INVOICE);
    let res = send_request(req, configure(backend, false)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["transaction_id"], 8);
}

#[actix_web::test]
async fn other_updates_are_ignored() {
    let mut backend = MockBackend::new();
    backend.expect_credit_deposit().never();
    let body = r#"{"update_id":2,"update_type":"invoice_expired","payload":{"invoice_id":78}}"#;
    let res = deliver_signed(body, backend).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({"success": true, "message": "Event type invoice_expired ignored"}));
}

#[actix_web::test]
async fn invalid_invoices() {
    // Missing payload: rejected before the backend is reached
    let mut backend = MockBackend::new();
    backend.expect_credit_deposit().never();
    let body =
        r#"{"update_type":"invoice_paid","payload":{"invoice_id":79,"status":"paid","asset":"USDT","amount":"5"}}"#;
    let res = deliver_signed(body, backend).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({"error": "The invoice carries no payload"}));

    let mut backend = MockBackend::new();
    backend.expect_credit_deposit().never();
    let body = r#"{"update_type":"invoice_paid","payload":{"status":"paid"}}"#;
    let res = deliver_signed(body, backend).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let mut backend = MockBackend::new();
    backend.expect_credit_deposit().never();
    let res = deliver_signed("{not json", backend).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].is_string());
}

#[actix_web::test]
async fn missing_wallet() {
    let mut backend = MockBackend::new();
    backend
        .expect_credit_deposit()
        .returning(|d| Err(DepositError::WalletNotFound { user_id: 1, currency: d.currency }));
    let res = deliver_signed(PAID_INVOICE, backend).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json(), json!({"error": "User #1 has no USDT wallet"}));
}

#[actix_web::test]
async fn backend_failure() {
    let mut backend = MockBackend::new();
    backend.expect_credit_deposit().returning(|_| Err(DepositError::DatabaseError("database is locked".into())));
    let res = deliver_signed(PAID_INVOICE, backend).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json(), json!({"error": "Internal server error"}));
}

#[actix_web::test]
async fn preflight_needs_no_signature() {
    let req = TestRequest::default().method(actix_web::http::Method::OPTIONS).uri("/webhooks/crypto-pay");
    let res = send_request(req, configure(MockBackend::new(), true)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header("Access-Control-Allow-Origin"), Some("*"));
}
