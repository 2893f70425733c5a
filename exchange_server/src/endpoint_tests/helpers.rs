use std::str::FromStr;

use actix_web::{
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::Utc;
use exchange_engine::db_types::{
    Amount,
    ExchangeOrder,
    ExchangeRate,
    NewExchangeOrder,
    Notification,
    NotificationType,
    OrderStatusType,
    Transaction,
    TransactionStatus,
    TransactionType,
    User,
    Wallet,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    routes::default_handler,
    server::{cors_headers, json_config, query_config},
};

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Response body is not JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Sends `req` to an app with the same CORS headers, extractor configs and fallback handler as the server, plus
/// whatever `configure` registers.
pub async fn send_request<F>(req: TestRequest, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new()
        .wrap(cors_headers())
        .app_data(json_config())
        .app_data(query_config())
        .configure(configure)
        .default_service(web::to(default_handler));
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let headers = res.headers().clone();
    let body = test::read_body(res).await;
    TestResponse { status, headers, body: String::from_utf8_lossy(&body).into_owned() }
}

pub fn amount(s: &str) -> Amount {
    Amount::from_str(s).unwrap()
}

pub fn sample_user(id: i64, telegram_id: i64) -> User {
    User {
        id,
        telegram_id,
        username: Some("alice".into()),
        first_name: Some("Alice".into()),
        referral_code: "ALICE123".into(),
        referred_by_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_wallet(id: i64, user_id: i64, currency: &str, balance: &str) -> Wallet {
    Wallet {
        id,
        user_id,
        currency: currency.into(),
        balance: amount(balance),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_rate(from: &str, to: &str, rate: Decimal, markup_percent: Decimal) -> ExchangeRate {
    ExchangeRate {
        id: 1,
        from_currency: from.into(),
        to_currency: to.into(),
        rate,
        markup_percent,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn usdt_btc_rate() -> ExchangeRate {
    sample_rate("USDT", "BTC", dec!(0.000016), dec!(2))
}

pub fn order_from(id: i64, order: NewExchangeOrder) -> ExchangeOrder {
    ExchangeOrder {
        id,
        user_id: order.user_id,
        from_currency: order.from_currency,
        to_currency: order.to_currency,
        from_amount: order.from_amount,
        to_amount: order.to_amount,
        exchange_rate: order.exchange_rate,
        fee: order.fee,
        status: OrderStatusType::Pending,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        completed_at: None,
    }
}

pub fn sample_order(id: i64, user_id: i64, status: OrderStatusType) -> ExchangeOrder {
    let order = NewExchangeOrder {
        user_id,
        from_currency: "USDT".into(),
        to_currency: "BTC".into(),
        from_amount: amount("1000"),
        to_amount: amount("61274509.80392157"),
        exchange_rate: dec!(0.00001632),
        fee: amount("612745.09803922"),
    };
    let mut order = order_from(id, order);
    order.status = status;
    if status == OrderStatusType::Completed {
        order.completed_at = Some(Utc::now());
    }
    order
}

pub fn sample_notification(user_id: i64, notification_type: NotificationType, order_id: Option<i64>) -> Notification {
    Notification {
        id: 1,
        user_id,
        notification_type,
        title: "Notification".into(),
        message: "Something happened".into(),
        related_order_id: order_id,
        is_read: false,
        created_at: Utc::now(),
    }
}

pub fn sample_deposit_tx(id: i64, user_id: i64, invoice_id: &str, value: &str) -> Transaction {
    Transaction {
        id,
        user_id,
        transaction_type: TransactionType::Deposit,
        currency: "USDT".into(),
        amount: amount(value),
        status: TransactionStatus::Completed,
        crypto_bot_invoice_id: Some(invoice_id.into()),
        created_at: Utc::now(),
    }
}
