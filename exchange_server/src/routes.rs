//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any I/O (database calls, upstream API calls) must be awaited, never
//! blocked on.
use actix_web::{http::Method, web, HttpRequest, HttpResponse, Responder, ResponseError};
use exchange_engine::{
    db_types::{NewExchangeRate, NewUser},
    exchange_objects::{NewOrderRequest, PaidInvoice},
    helpers::DepositPayload,
    traits::{DepositManagement, ExchangeOrderManagement, ExchangeRates, UserManagement},
    DepositApi,
    ExchangeOrderApi,
    ExchangeRateApi,
    UserApi,
};
use log::*;
use provider_tools::{NewInvoice, WebhookUpdate};
use xg_common::helpers::normalize_currency_code;

use crate::{
    data_objects::{
        InvoiceClient,
        InvoiceRequest,
        InvoiceResponse,
        OrderHistoryParams,
        RateResult,
        UpdateOrderStatusParams,
        UserResult,
        WebhookAck,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name);
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
route!(health => Get "/health");
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Everything that matches no route lands here. Pre-flight requests are answered with an empty 200 (the CORS headers
/// are added by the app); anything else is a 404.
pub async fn default_handler(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        trace!("💻️ Pre-flight request for {}", req.path());
        return HttpResponse::Ok().finish();
    }
    debug!("💻️ No route for {} {}", req.method(), req.path());
    ServerError::NoRecordFound(format!("No route for {} {}", req.method(), req.path())).error_response()
}

//----------------------------------------------   Users  ----------------------------------------------------
route!(register_user => Post "/users" impl UserManagement);
/// Registers a user arriving from the mini-app. `POST /api/users` with
/// `{ "telegram_id": 123, "username": "alice", "first_name": "Alice", "referral_code": "ABCD1234" }`.
///
/// Only `telegram_id` is required. Returns `201` with the new user and their wallets, or `200` with the existing user
/// if the telegram id is already registered.
pub async fn register_user<B: UserManagement>(
    body: web::Json<NewUser>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let new_user = body.into_inner();
    debug!("💻️ Registration request for telegram user {}", new_user.telegram_id);
    let registered = api.register(new_user).await?;
    let is_new = registered.is_new;
    let result = UserResult::from(registered);
    if is_new {
        Ok(HttpResponse::Created().json(result))
    } else {
        Ok(HttpResponse::Ok().json(result))
    }
}

//----------------------------------------------   Rates  ----------------------------------------------------
route!(rates => Get "/rates" impl ExchangeRates);
pub async fn rates<B: ExchangeRates>(api: web::Data<ExchangeRateApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Fetching active exchange rates");
    let rates = api.fetch_active_rates().await?;
    let result = rates.into_iter().map(RateResult::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(result))
}

route!(set_rate => Put "/rates" impl ExchangeRates);
/// Sets the rate for a currency pair. Admin only: `PUT /api/admin/rates` with
/// `{ "from_currency": "USDT", "to_currency": "BTC", "rate": "0.000016", "markup_percent": "2" }`.
///
/// Any rate previously active for the pair is deactivated.
pub async fn set_rate<B: ExchangeRates>(
    body: web::Json<NewExchangeRate>,
    api: web::Data<ExchangeRateApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let new_rate = body.into_inner();
    info!(
        "💻️ Setting exchange rate {} → {} to {} (markup {}%)",
        new_rate.from_currency, new_rate.to_currency, new_rate.rate, new_rate.markup_percent
    );
    let rate = api.set_exchange_rate(new_rate).await.map_err(|e| {
        debug!("💻️ Could not set exchange rate. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(RateResult::from(rate)))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(order_history => Get "/orders" impl ExchangeRates, UserManagement, ExchangeOrderManagement);
/// The most recent orders placed by a user, newest first. `GET /api/orders?telegram_id=123`.
///
/// At most [`exchange_engine::ORDER_HISTORY_LIMIT`] orders are returned. An unknown telegram id has no orders.
pub async fn order_history<B>(
    query: web::Query<OrderHistoryParams>,
    api: web::Data<ExchangeOrderApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: ExchangeRates + UserManagement + ExchangeOrderManagement,
{
    let telegram_id =
        query.telegram_id.ok_or_else(|| ServerError::ValidationError("telegram_id is required".into()))?;
    trace!("💻️ Fetching order history for telegram user {telegram_id}");
    let orders = api.order_history(telegram_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(create_order => Post "/orders" impl ExchangeRates, UserManagement, ExchangeOrderManagement);
/// Creates an exchange order. `POST /api/orders` with
/// `{ "telegram_id": 123, "from_currency": "USDT", "to_currency": "BTC", "from_amount": "1000" }`.
///
/// The order is priced at the active rate for the pair and stored as `pending`. Returns `201` with the order.
pub async fn create_order<B>(
    body: web::Json<NewOrderRequest>,
    api: web::Data<ExchangeOrderApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: ExchangeRates + UserManagement + ExchangeOrderManagement,
{
    let request = body.into_inner();
    debug!(
        "💻️ New order request from {}: {} {} → {}",
        request.telegram_id, request.from_amount, request.from_currency, request.to_currency
    );
    let order = api.create_order(request).await.map_err(|e| {
        debug!("💻️ Could not create order. {e}");
        e
    })?;
    Ok(HttpResponse::Created().json(order))
}

route!(update_order_status => Put "/orders" impl ExchangeRates, UserManagement, ExchangeOrderManagement);
/// Moves an order to a new status. `PUT /api/orders` with `{ "order_id": 1, "status": "completed" }`.
///
/// Orders in a terminal state (`completed`, `cancelled`, `failed`) cannot change again; such requests get a `409`.
pub async fn update_order_status<B>(
    body: web::Json<UpdateOrderStatusParams>,
    api: web::Data<ExchangeOrderApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: ExchangeRates + UserManagement + ExchangeOrderManagement,
{
    let UpdateOrderStatusParams { order_id, status } = body.into_inner();
    info!("💻️ Status update request for order #{order_id}: {status}");
    let order = api.update_order_status(order_id, &status).await.map_err(|e| {
        debug!("💻️ Could not update order #{order_id}. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Deposits  ----------------------------------------------------
route!(create_invoice => Post "/deposits/invoice" impl UserManagement);
/// Issues a deposit invoice with the payment provider. `POST /api/deposits/invoice` with
/// `{ "telegram_id": 123, "asset": "USDT", "amount": "100" }`.
///
/// The invoice payload identifies the user, so that the payment webhook can credit the right wallet.
pub async fn create_invoice<B: UserManagement>(
    body: web::Json<InvoiceRequest>,
    users: web::Data<UserApi<B>>,
    client: web::Data<InvoiceClient>,
) -> Result<HttpResponse, ServerError> {
    let InvoiceRequest { telegram_id, asset, amount } = body.into_inner();
    let asset = normalize_currency_code(&asset)
        .ok_or_else(|| ServerError::ValidationError(format!("Invalid currency code: {asset}")))?;
    if !amount.is_positive() {
        return Err(ServerError::ValidationError(format!("Invalid amount: {amount} is not a positive amount")));
    }
    users.fetch_user(telegram_id).await?;
    let api = client
        .api()
        .ok_or_else(|| ServerError::UpstreamError("The Crypto Pay API client is not configured".into()))?;
    let invoice = NewInvoice::new(asset.clone(), amount.to_string())
        .with_description(format!("Deposit of {amount} {asset}"))
        .with_payload(DepositPayload::new(telegram_id).to_string());
    info!("💻️ Creating a {amount} {asset} invoice for telegram user {telegram_id}");
    let invoice = api.create_invoice(&invoice).await?;
    let result = InvoiceResponse {
        invoice_id: invoice.invoice_id.clone(),
        pay_url: invoice.payment_url().map(String::from),
        asset: invoice.asset.unwrap_or(asset),
        amount: invoice.amount,
    };
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(crypto_pay_webhook => Post "/crypto-pay" impl DepositManagement);
/// Receives payment notifications from the payment provider. Signature checks are done by the middleware wrapping
/// this route.
///
/// `invoice_paid` updates credit the wallet named in the invoice payload. Redeliveries of an invoice that was already
/// credited are acknowledged with `"duplicate": true` and the original transaction id. Other update types are
/// acknowledged and ignored.
pub async fn crypto_pay_webhook<B: DepositManagement>(
    body: web::Json<WebhookUpdate>,
    api: web::Data<DepositApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let update = body.into_inner();
    trace!("💻️ Received webhook update: {update:?}");
    if !update.is_invoice_paid() {
        info!("💻️ Ignoring webhook update of type {}", update.update_type);
        return Ok(HttpResponse::Ok().json(WebhookAck::ignored(format!("Event type {} ignored", update.update_type))));
    }
    let invoice = update
        .invoice()
        .map_err(|e| ServerError::ValidationError(format!("Could not read the paid invoice. {e}")))?;
    let paid = PaidInvoice {
        invoice_id: invoice.invoice_id.clone(),
        asset: invoice.asset.unwrap_or_default(),
        amount: invoice.amount,
        payload: invoice.payload,
    };
    let result = api.process_invoice_paid(paid).await.map_err(|e| {
        warn!("💻️ Could not credit invoice {}. {e}", invoice.invoice_id);
        e
    })?;
    Ok(HttpResponse::Ok().json(WebhookAck::credited(result.transaction().id, result.is_duplicate())))
}
