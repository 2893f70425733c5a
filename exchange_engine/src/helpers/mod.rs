mod deposit_payload;
mod referral_code;

pub use deposit_payload::{DepositPayload, InvalidPayloadError};
pub use referral_code::{generate_referral_code, REFERRAL_CODE_LENGTH};
