use std::time::Duration;

use actix_web::{
    dev::Server,
    error::{JsonPayloadError, QueryPayloadError},
    http::KeepAlive,
    middleware::{DefaultHeaders, Logger},
    web,
    App,
    HttpRequest,
    HttpServer,
};
use exchange_engine::{events::EventProducers, DepositApi, ExchangeOrderApi, ExchangeRateApi, SqliteDatabase, UserApi};
use log::*;
use provider_tools::CryptoPayApi;

use crate::{
    config::ServerConfig,
    data_objects::InvoiceClient,
    errors::ServerError,
    helpers::SIGNATURE_HEADER,
    integrations::telegram::create_telegram_event_handlers,
    middleware::{AdminKeyMiddlewareFactory, SignatureMiddlewareFactory, ADMIN_KEY_HEADER},
    routes::{
        default_handler,
        CreateInvoiceRoute,
        CreateOrderRoute,
        CryptoPayWebhookRoute,
        HealthRoute,
        OrderHistoryRoute,
        RatesRoute,
        RegisterUserRoute,
        SetRateRoute,
        UpdateOrderStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not run migrations. {e}")))?;
    info!("🗃️ Database ready at {}", db.url());
    let handlers = create_telegram_event_handlers(config.telegram.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let producers = handlers.producers();
    handlers.start_handlers();
    let invoice_client = match CryptoPayApi::new(config.crypto_pay.clone()) {
        Ok(api) => InvoiceClient::new(Some(api)),
        Err(e) => {
            warn!("🪛️ Deposit invoices are unavailable. {e}");
            InvoiceClient::default()
        },
    };
    let srv = create_server_instance(config, db, producers, invoice_client)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
    invoice_client: InvoiceClient,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = ExchangeOrderApi::new(db.clone(), producers.clone());
        let deposit_api = DepositApi::new(db.clone(), producers.clone());
        let rates_api = ExchangeRateApi::new(db.clone());
        let users_api = UserApi::new(db.clone());
        let admin_scope = web::scope("/api/admin")
            .wrap(AdminKeyMiddlewareFactory::new(config.admin_secret_key.clone()))
            .service(SetRateRoute::<SqliteDatabase>::new());
        let api_scope = web::scope("/api")
            .service(RegisterUserRoute::<SqliteDatabase>::new())
            .service(RatesRoute::<SqliteDatabase>::new())
            .service(OrderHistoryRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(CreateInvoiceRoute::<SqliteDatabase>::new());
        let webhook_scope = web::scope("/webhooks")
            .wrap(SignatureMiddlewareFactory::new(
                SIGNATURE_HEADER,
                config.crypto_pay.api_token.clone(),
                config.webhook_signature_checks,
            ))
            .service(CryptoPayWebhookRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(cors_headers())
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %r").log_target("xg::access_log"))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(deposit_api))
            .app_data(web::Data::new(rates_api))
            .app_data(web::Data::new(users_api))
            .app_data(web::Data::new(invoice_client.clone()))
            .service(HealthRoute::new())
            .service(admin_scope)
            .service(api_scope)
            .service(webhook_scope)
            .default_service(web::to(default_handler))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// The permissive cross-origin policy applied to every response, including errors and pre-flight answers.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET, POST, PUT, OPTIONS"))
        .add(("Access-Control-Allow-Headers", format!("Content-Type, {ADMIN_KEY_HEADER}, {SIGNATURE_HEADER}")))
        .add(("Access-Control-Max-Age", "86400"))
}

/// Malformed JSON bodies are answered with the usual `{"error": ...}` body and a 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        debug!("💻️ Rejected request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        debug!("💻️ Rejected query string. {err}");
        ServerError::InvalidQueryString(err.to_string()).into()
    })
}
