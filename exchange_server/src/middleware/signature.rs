//! Webhook signature middleware for Actix Web.
//!
//! The payment provider signs every webhook delivery. The signature is the hex-encoded HMAC-SHA256 of the raw request
//! body, keyed with the SHA-256 hash of the `XG_CRYPTO_PAY_API_TOKEN`, and is sent in the `crypto-pay-api-signature`
//! header.
//!
//! Wrap the webhook routes with this middleware to reject deliveries that were not signed with our token. Rejected
//! requests are answered with a 401 and a JSON error body. `OPTIONS` requests are passed through untouched.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use xg_common::Secret;

use crate::{errors::ServerError, helpers::verify_webhook_signature};

pub struct SignatureMiddlewareFactory {
    signature_header: String,
    api_token: Secret<String>,
    // If false, then the middleware will not check the signature and always allow the call
    enabled: bool,
}

impl SignatureMiddlewareFactory {
    pub fn new(signature_header: &str, api_token: Secret<String>, enabled: bool) -> Self {
        SignatureMiddlewareFactory { signature_header: signature_header.into(), api_token, enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SignatureMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<EitherBody<B>>;
    type Transform = SignatureMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SignatureMiddlewareService {
            signature_header: self.signature_header.clone(),
            api_token: self.api_token.clone(),
            enabled: self.enabled,
            service: Rc::new(service),
        }))
    }
}

pub struct SignatureMiddlewareService<S> {
    signature_header: String,
    api_token: Secret<String>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SignatureMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<EitherBody<B>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let api_token = self.api_token.clone();
        let signature_header = self.signature_header.clone();
        let enabled = self.enabled;
        Box::pin(async move {
            trace!("🔐️ Checking webhook signature for request");
            if !enabled || req.method() == Method::OPTIONS {
                trace!("🔐️ Signature checks do not apply. Allowing request.");
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            }
            if api_token.is_empty() {
                warn!("🔐️ XG_CRYPTO_PAY_API_TOKEN is not set. Webhook signatures cannot be checked. Denying access.");
                return Ok(reject(req, "Invalid webhook signature"));
            }
            let data = match req.extract::<web::Bytes>().await {
                Ok(data) => data,
                Err(e) => {
                    warn!("🔐️ Failed to extract request data: {e:?}");
                    let err = ServerError::InvalidRequestBody("Failed to extract request data.".into());
                    return Ok(req.error_response(err).map_into_right_body());
                },
            };
            let signature = req.headers().get(&signature_header).and_then(|v| v.to_str().ok()).map(String::from);
            let Some(signature) = signature else {
                warn!("🔐️ No webhook signature found in request. Denying access.");
                return Ok(reject(req, "No webhook signature found"));
            };
            if verify_webhook_signature(api_token.reveal(), data.as_ref(), &signature) {
                trace!("🔐️ Webhook signature check for request ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await.map(ServiceResponse::map_into_left_body)
            } else {
                warn!("🔐️ Invalid webhook signature found in request. Denying access.");
                Ok(reject(req, "Invalid webhook signature"))
            }
        })
    }
}

fn reject<B>(req: ServiceRequest, message: &str) -> ServiceResponse<EitherBody<B>> {
    req.error_response(ServerError::Unauthorized(message.into())).map_into_right_body()
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
