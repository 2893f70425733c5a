mod admin_key;
mod signature;

pub use admin_key::{AdminKeyMiddlewareFactory, AdminKeyMiddlewareService, ADMIN_KEY_HEADER};
pub use signature::{SignatureMiddlewareFactory, SignatureMiddlewareService};
