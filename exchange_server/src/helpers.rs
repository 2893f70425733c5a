use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// The header in which the payment provider sends the webhook signature.
pub const SIGNATURE_HEADER: &str = "crypto-pay-api-signature";

fn keyed_mac(api_token: &str) -> Option<HmacSha256> {
    let key = Sha256::digest(api_token.as_bytes());
    <HmacSha256 as Mac>::new_from_slice(&key).ok()
}

/// Calculates the webhook signature the payment provider would send for `body`.
///
/// The signature is the hex-encoded HMAC-SHA256 of the raw request body, keyed with the SHA-256 hash of the API token.
pub fn calculate_webhook_signature(api_token: &str, body: &[u8]) -> Option<String> {
    let mut mac = keyed_mac(api_token)?;
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a hex-encoded signature against `body` in constant time. Malformed signatures are rejected.
pub fn verify_webhook_signature(api_token: &str, body: &[u8], signature: &str) -> bool {
    let Ok(signature) = hex::decode(signature.trim()) else {
        return false;
    };
    let Some(mut mac) = keyed_mac(api_token) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}
