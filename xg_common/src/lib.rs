mod amount;

pub mod helpers;
pub mod op;
mod secret;

pub use amount::{Amount, AmountConversionError, AMOUNT_DECIMALS};
pub use secret::Secret;

/// Every new user gets a wallet in each of these currencies.
pub const SUPPORTED_CURRENCIES: [&str; 4] = ["BTC", "ETH", "USDT", "RUB"];
