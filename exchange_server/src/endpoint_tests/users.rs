use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use exchange_engine::{traits::RegisteredUser, UserApi};
use serde_json::json;
use xg_common::SUPPORTED_CURRENCIES;

use super::{
    helpers::{sample_user, sample_wallet, send_request},
    mocks::MockBackend,
};
use crate::{
    data_objects::InvoiceClient,
    routes::{CreateInvoiceRoute, RegisterUserRoute},
};

fn configure(backend: MockBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(UserApi::new(backend)))
            .app_data(web::Data::new(InvoiceClient::default()))
            .service(
                web::scope("/api")
                    .service(RegisterUserRoute::<MockBackend>::new())
                    .service(CreateInvoiceRoute::<MockBackend>::new()),
            );
    }
}

fn registered(is_new: bool) -> RegisteredUser {
    let wallets = SUPPORTED_CURRENCIES
        .iter()
        .enumerate()
        .map(|(i, currency)| sample_wallet(i as i64 + 1, 1, currency, "0"))
        .collect();
    RegisteredUser { user: sample_user(1, 123), wallets, is_new }
}

#[actix_web::test]
async fn register_new_user() {
    let mut backend = MockBackend::new();
    backend
        .expect_register_user()
        .withf(|u| u.telegram_id == 123 && u.username.as_deref() == Some("alice") && u.referral_code.is_none())
        .times(1)
        .returning(|_| Ok(registered(true)));
    let body = json!({"telegram_id": 123, "username": "alice", "first_name": "Alice"});
    let res = send_request(TestRequest::post().uri("/api/users").set_json(body), configure(backend)).await;
    assert_eq!(res.status, StatusCode::CREATED);
    let result = res.json();
    assert_eq!(result["user"]["telegram_id"], 123);
    assert_eq!(result["user"]["referral_code"], "ALICE123");
    let wallets = result["wallets"].as_array().unwrap();
    assert_eq!(wallets.len(), 4);
    assert!(wallets.iter().all(|w| w["balance"] == "0"));
}

#[actix_web::test]
async fn register_existing_user() {
    let mut backend = MockBackend::new();
    backend
        .expect_register_user()
        .withf(|u| u.referral_code.as_deref() == Some("BOB45678"))
        .returning(|_| Ok(registered(false)));
    let body = json!({"telegram_id": 123, "referral_code": "BOB45678"});
    let res = send_request(TestRequest::post().uri("/api/users").set_json(body), configure(backend)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["user"]["id"], 1);
}

#[actix_web::test]
async fn register_without_telegram_id() {
    let mut backend = MockBackend::new();
    backend.expect_register_user().never();
    let body = json!({"username": "alice"});
    let res = send_request(TestRequest::post().uri("/api/users").set_json(body), configure(backend)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].as_str().unwrap().contains("telegram_id"));
}

#[actix_web::test]
async fn invoice_for_unknown_user() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_user_by_telegram_id().returning(|_| Ok(None));
    let body = json!({"telegram_id": 999, "asset": "USDT", "amount": "10"});
    let res = send_request(TestRequest::post().uri("/api/deposits/invoice").set_json(body), configure(backend)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json(), json!({"error": "No user with telegram id 999"}));
}

#[actix_web::test]
async fn invalid_invoice_requests() {
    let body = json!({"telegram_id": 123, "asset": "US DT", "amount": "10"});
    let req = TestRequest::post().uri("/api/deposits/invoice").set_json(body);
    let res = send_request(req, configure(MockBackend::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let body = json!({"telegram_id": 123, "asset": "USDT", "amount": "-5"});
    let req = TestRequest::post().uri("/api/deposits/invoice").set_json(body);
    let res = send_request(req, configure(MockBackend::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({"error": "Invalid amount: -5 is not a positive amount"}));
}

#[actix_web::test]
async fn invoice_without_provider() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_user_by_telegram_id().returning(|id| Ok(Some(sample_user(1, id))));
    let body = json!({"telegram_id": 123, "asset": "usdt", "amount": 10});
    let res = send_request(TestRequest::post().uri("/api/deposits/invoice").set_json(body), configure(backend)).await;
    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert_eq!(res.json(), json!({"error": "The upstream service could not complete the request"}));
}
