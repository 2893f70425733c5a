//! Shared-secret guard for the admin routes.
//!
//! Requests must carry the configured `XG_ADMIN_SECRET_KEY` in the `X-Admin-Key` header. Anything else gets a 401
//! with a JSON error body. While no key is configured, every request is refused.

use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    Error,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::warn;
use xg_common::Secret;

use crate::errors::ServerError;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

pub struct AdminKeyMiddlewareFactory {
    admin_key: Secret<String>,
}

impl AdminKeyMiddlewareFactory {
    pub fn new(admin_key: Secret<String>) -> Self {
        AdminKeyMiddlewareFactory { admin_key }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminKeyMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<EitherBody<B>>;
    type Transform = AdminKeyMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AdminKeyMiddlewareService { admin_key: self.admin_key.clone(), service: Rc::new(service) })
    }
}

pub struct AdminKeyMiddlewareService<S> {
    admin_key: Secret<String>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<EitherBody<B>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let admin_key = self.admin_key.clone();
        Box::pin(async move {
            if req.method() == Method::OPTIONS {
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            }
            let presented = req.headers().get(ADMIN_KEY_HEADER).and_then(|v| v.to_str().ok());
            let authorized = match presented {
                _ if admin_key.is_empty() => {
                    warn!("🔐️ Admin request refused. XG_ADMIN_SECRET_KEY is not configured.");
                    false
                },
                None => {
                    warn!("🔐️ Admin request to {} without an admin key. Denying access.", req.path());
                    false
                },
                Some(key) => {
                    let valid = key == admin_key.reveal().as_str();
                    if !valid {
                        warn!("🔐️ Invalid admin key presented for {}. Denying access.", req.path());
                    }
                    valid
                },
            };
            if authorized {
                service.call(req).await.map(ServiceResponse::map_into_left_body)
            } else {
                let err = ServerError::Unauthorized("A valid admin key is required".into());
                Ok(req.error_response(err).map_into_right_body())
            }
        })
    }
}
