use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use exchange_engine::{
    db_types::{NotificationType, OrderStatusType},
    events::EventProducers,
    traits::{ExchangeRateError, NewOrderRecord, OrderManagementError, OrderStatusUpdate},
    ExchangeOrderApi,
    ORDER_HISTORY_LIMIT,
};
use serde_json::json;

use super::{
    helpers::{amount, order_from, sample_notification, sample_order, sample_user, send_request, usdt_btc_rate},
    mocks::MockBackend,
};
use crate::routes::{CreateOrderRoute, OrderHistoryRoute, UpdateOrderStatusRoute};

fn configure(backend: MockBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = ExchangeOrderApi::new(backend, EventProducers::default());
        cfg.app_data(web::Data::new(api)).service(
            web::scope("/api")
                .service(OrderHistoryRoute::<MockBackend>::new())
                .service(CreateOrderRoute::<MockBackend>::new())
                .service(UpdateOrderStatusRoute::<MockBackend>::new()),
        );
    }
}

fn order_request(from_amount: &str) -> serde_json::Value {
    json!({"telegram_id": 123, "from_currency": "usdt", "to_currency": "BTC", "from_amount": from_amount})
}

#[actix_web::test]
async fn create_order() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_user_by_telegram_id().withf(|id| *id == 123).returning(|_| Ok(Some(sample_user(1, 123))));
    backend
        .expect_fetch_active_rate()
        .withf(|from, to| from == "USDT" && to == "BTC")
        .returning(|_, _| Ok(usdt_btc_rate()));
    backend
        .expect_insert_order()
        .withf(|order| {
            order.user_id == 1 &&
                order.to_amount == amount("61274509.80392157") &&
                order.fee == amount("612745.09803922")
        })
        .times(1)
        .returning(|order| {
            let order = order_from(10, order);
            let notification = sample_notification(1, NotificationType::OrderCreated, Some(10));
            Ok(NewOrderRecord { order, notification })
        });
    let req = TestRequest::post().uri("/api/orders").set_json(order_request("1000"));
    let res = send_request(req, configure(backend)).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.header("Access-Control-Allow-Origin"), Some("*"));
    let order = res.json();
    assert_eq!(order["id"], 10);
    assert_eq!(order["from_currency"], "USDT");
    assert_eq!(order["from_amount"], "1000");
    assert_eq!(order["to_amount"], "61274509.80392157");
    assert_eq!(order["fee"], "612745.09803922");
    assert_eq!(order["status"], "pending");
    assert!(order["completed_at"].is_null());
}

#[actix_web::test]
async fn create_order_for_unknown_user() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_user_by_telegram_id().returning(|_| Ok(None));
    backend.expect_insert_order().never();
    let req = TestRequest::post().uri("/api/orders").set_json(order_request("1000"));
    let res = send_request(req, configure(backend)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json(), json!({"error": "No user with telegram id 123"}));
}

#[actix_web::test]
async fn create_order_without_a_rate() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_user_by_telegram_id().returning(|_| Ok(Some(sample_user(1, 123))));
    backend
        .expect_fetch_active_rate()
        .returning(|from, to| Err(ExchangeRateError::RateNotFound { from: from.into(), to: to.into() }));
    backend.expect_insert_order().never();
    let req = TestRequest::post().uri("/api/orders").set_json(order_request("1000"));
    let res = send_request(req, configure(backend)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json(), json!({"error": "No active exchange rate for USDT → BTC"}));
}

#[actix_web::test]
async fn create_order_with_invalid_input() {
    // No expectations: the backend must not be touched
    let req = TestRequest::post().uri("/api/orders").set_json(order_request("0"));
    let res = send_request(req, configure(MockBackend::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].as_str().unwrap().starts_with("Invalid amount"));

    let body = json!({"telegram_id": 123, "from_currency": "BTC", "to_currency": "btc", "from_amount": "1"});
    let res = send_request(TestRequest::post().uri("/api/orders").set_json(body), configure(MockBackend::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].as_str().unwrap().starts_with("Invalid currency"));

    let body = json!({"telegram_id": 123, "from_currency": "USDT", "to_currency": "BTC", "from_amount": "lots"});
    let res = send_request(TestRequest::post().uri("/api/orders").set_json(body), configure(MockBackend::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].is_string());

    let body = json!({"telegram_id": 123, "from_currency": "USDT"});
    let res = send_request(TestRequest::post().uri("/api/orders").set_json(body), configure(MockBackend::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.header("Access-Control-Allow-Origin"), Some("*"));
}

#[actix_web::test]
async fn update_order_status() {
    let mut backend = MockBackend::new();
    backend
        .expect_update_order_status()
        .withf(|id, status| *id == 10 && *status == OrderStatusType::Completed)
        .times(1)
        .returning(|id, _| {
            Ok(OrderStatusUpdate {
                old_status: OrderStatusType::Processing,
                order: sample_order(id, 1, OrderStatusType::Completed),
                notification: sample_notification(1, NotificationType::OrderStatus, Some(id)),
                telegram_id: 123,
            })
        });
    let req = TestRequest::put().uri("/api/orders").set_json(json!({"order_id": 10, "status": "completed"}));
    let res = send_request(req, configure(backend)).await;
    assert_eq!(res.status, StatusCode::OK);
    let order = res.json();
    assert_eq!(order["id"], 10);
    assert_eq!(order["status"], "completed");
    assert!(order["completed_at"].is_string());
}

#[actix_web::test]
async fn update_order_with_unknown_status() {
    let mut backend = MockBackend::new();
    backend.expect_update_order_status().never();
    let req = TestRequest::put().uri("/api/orders").set_json(json!({"order_id": 10, "status": "shipped"}));
    let res = send_request(req, configure(backend)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({"error": "Invalid status: 'shipped' is not a recognised order status"}));
}

#[actix_web::test]
async fn update_order_in_terminal_state() {
    let mut backend = MockBackend::new();
    backend.expect_update_order_status().returning(|id, to| {
        Err(OrderManagementError::StatusTransitionForbidden { id, from: OrderStatusType::Completed, to })
    });
    let req = TestRequest::put().uri("/api/orders").set_json(json!({"order_id": 10, "status": "failed"}));
    let res = send_request(req, configure(backend)).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.json(), json!({"error": "Order #10 cannot change from completed to failed"}));
}

#[actix_web::test]
async fn update_unknown_order() {
    let mut backend = MockBackend::new();
    backend.expect_update_order_status().returning(|id, _| Err(OrderManagementError::OrderNotFound(id)));
    let req = TestRequest::put().uri("/api/orders").set_json(json!({"order_id": 404, "status": "processing"}));
    let res = send_request(req, configure(backend)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json(), json!({"error": "Order #404 does not exist"}));
}

#[actix_web::test]
async fn database_errors_are_not_leaked() {
    let mut backend = MockBackend::new();
    backend
        .expect_update_order_status()
        .returning(|_, _| Err(OrderManagementError::DatabaseError("disk I/O error at /var/lib/xg".into())));
    let req = TestRequest::put().uri("/api/orders").set_json(json!({"order_id": 1, "status": "processing"}));
    let res = send_request(req, configure(backend)).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json(), json!({"error": "Internal server error"}));
}

#[actix_web::test]
async fn order_history() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_orders_for_user()
        .withf(|telegram_id, limit| *telegram_id == 123 && *limit == ORDER_HISTORY_LIMIT)
        .times(1)
        .returning(|_, _| {
            Ok(vec![sample_order(12, 1, OrderStatusType::Pending), sample_order(11, 1, OrderStatusType::Completed)])
        });
    let req = TestRequest::get().uri("/api/orders?telegram_id=123");
    let res = send_request(req, configure(backend)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header("Access-Control-Allow-Origin"), Some("*"));
    let orders = res.json();
    let orders = orders.as_array().expect("Expected a list of orders");
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], 12);
    assert_eq!(orders[0]["status"], "pending");
    assert_eq!(orders[1]["id"], 11);
    assert_eq!(orders[1]["to_amount"], "61274509.80392157");
}

#[actix_web::test]
async fn order_history_for_unknown_user_is_empty() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_orders_for_user().returning(|_, _| Ok(vec![]));
    let res = send_request(TestRequest::get().uri("/api/orders?telegram_id=999"), configure(backend)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!([]));
}

#[actix_web::test]
async fn order_history_needs_a_telegram_id() {
    // No expectations: the backend must not be touched
    let res = send_request(TestRequest::get().uri("/api/orders"), configure(MockBackend::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({"error": "telegram_id is required"}));

    let res =
        send_request(TestRequest::get().uri("/api/orders?telegram_id=alice"), configure(MockBackend::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].as_str().unwrap().starts_with("Could not read query string"));
}
