//! The payment provider echoes back an opaque payload string that we attach to every invoice. We use it to carry the
//! messaging-platform identity of the user that asked for the invoice, in the form `user_<telegram_id>`.
use std::{fmt::Display, str::FromStr};

use thiserror::Error;

const PAYLOAD_PREFIX: &str = "user_";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid invoice payload: {0}")]
pub struct InvalidPayloadError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositPayload {
    pub telegram_id: i64,
}

impl DepositPayload {
    pub fn new(telegram_id: i64) -> Self {
        Self { telegram_id }
    }
}

impl Display for DepositPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{PAYLOAD_PREFIX}{}", self.telegram_id)
    }
}

impl FromStr for DepositPayload {
    type Err = InvalidPayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .strip_prefix(PAYLOAD_PREFIX)
            .ok_or_else(|| InvalidPayloadError(format!("'{s}' does not start with '{PAYLOAD_PREFIX}'")))?;
        // i64::from_str accepts a leading '+', which we don't want to allow
        let digits = id.strip_prefix('-').unwrap_or(id);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidPayloadError(format!("'{id}' is not a numeric user id")));
        }
        let telegram_id = id.parse::<i64>().map_err(|e| InvalidPayloadError(format!("'{id}': {e}")))?;
        Ok(Self { telegram_id })
    }
}
