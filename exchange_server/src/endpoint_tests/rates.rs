use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use exchange_engine::ExchangeRateApi;
use rust_decimal_macros::dec;
use serde_json::json;
use xg_common::Secret;

use super::{
    helpers::{sample_rate, send_request, usdt_btc_rate},
    mocks::MockBackend,
};
use crate::{
    middleware::{AdminKeyMiddlewareFactory, ADMIN_KEY_HEADER},
    routes::{RatesRoute, SetRateRoute},
};

const ADMIN_KEY: &str = "correct-horse-battery-staple";

fn configure(backend: MockBackend, admin_key: &'static str) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = ExchangeRateApi::new(backend);
        cfg.app_data(web::Data::new(api))
            .service(
                web::scope("/api/admin")
                    .wrap(AdminKeyMiddlewareFactory::new(Secret::new(admin_key.to_string())))
                    .service(SetRateRoute::<MockBackend>::new()),
            )
            .service(web::scope("/api").service(RatesRoute::<MockBackend>::new()));
    }
}

fn admin_put(key: &str, body: serde_json::Value) -> TestRequest {
    TestRequest::put().uri("/api/admin/rates").insert_header((ADMIN_KEY_HEADER, key.to_string())).set_json(body)
}

fn new_rate() -> serde_json::Value {
    json!({"from_currency": "usdt", "to_currency": "btc", "rate": "0.000016", "markup_percent": "2"})
}

#[actix_web::test]
async fn list_rates() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_active_rates()
        .returning(|| Ok(vec![usdt_btc_rate(), sample_rate("USDT", "RUB", dec!(92.5), dec!(0))]));
    let res = send_request(TestRequest::get().uri("/api/rates"), configure(backend, ADMIN_KEY)).await;
    assert_eq!(res.status, StatusCode::OK);
    let rates = res.json();
    let rates = rates.as_array().unwrap();
    assert_eq!(rates.len(), 2);
    assert_eq!(rates[0]["from_currency"], "USDT");
    assert_eq!(rates[0]["to_currency"], "BTC");
    assert_eq!(rates[0]["is_active"], true);
    let effective = rates[0]["effective_rate"].as_str().unwrap().parse::<rust_decimal::Decimal>().unwrap();
    assert_eq!(effective, dec!(0.00001632));
    let effective = rates[1]["effective_rate"].as_str().unwrap().parse::<rust_decimal::Decimal>().unwrap();
    assert_eq!(effective, dec!(92.5));
}

#[actix_web::test]
async fn set_rate_requires_admin_key() {
    let mut backend = MockBackend::new();
    backend.expect_set_exchange_rate().never();
    let req = TestRequest::put().uri("/api/admin/rates").set_json(new_rate());
    let res = send_request(req, configure(backend, ADMIN_KEY)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json(), json!({"error": "A valid admin key is required"}));
    assert_eq!(res.header("Access-Control-Allow-Origin"), Some("*"));

    let mut backend = MockBackend::new();
    backend.expect_set_exchange_rate().never();
    let req = admin_put("guess", new_rate());
    let res = send_request(req, configure(backend, ADMIN_KEY)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn admin_routes_are_closed_without_a_configured_key() {
    let mut backend = MockBackend::new();
    backend.expect_set_exchange_rate().never();
    let req = admin_put("", new_rate());
    let res = send_request(req, configure(backend, "")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn set_rate() {
    let mut backend = MockBackend::new();
    backend
        .expect_set_exchange_rate()
        .withf(|r| {
            r.from_currency == "USDT" &&
                r.to_currency == "BTC" &&
                r.rate == dec!(0.000016) &&
                r.markup_percent == dec!(2)
        })
        .times(1)
        .returning(|_| Ok(usdt_btc_rate()));
    let req = admin_put(ADMIN_KEY, new_rate());
    let res = send_request(req, configure(backend, ADMIN_KEY)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["from_currency"], "USDT");
}

#[actix_web::test]
async fn set_invalid_rate() {
    let mut backend = MockBackend::new();
    backend.expect_set_exchange_rate().never();
    let body = json!({"from_currency": "USDT", "to_currency": "BTC", "rate": "0"});
    let req = admin_put(ADMIN_KEY, body);
    let res = send_request(req, configure(backend, ADMIN_KEY)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].as_str().unwrap().starts_with("Invalid exchange rate"));
}
