use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use xg_common::Amount;

use crate::{db_types::ExchangeRate, xg_api::errors::OrderFlowError};

/// The exchange fee, as a percentage of the converted amount.
pub const EXCHANGE_FEE_PERCENT: Decimal = Decimal::ONE;

/// A request from a user to convert `from_amount` of `from_currency` into `to_currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub telegram_id: i64,
    pub from_currency: String,
    pub to_currency: String,
    pub from_amount: Amount,
}

/// The priced result of applying an effective rate to an amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuote {
    pub from_amount: Amount,
    pub exchange_rate: Decimal,
    pub to_amount: Amount,
    pub fee: Amount,
}

/// Prices `from_amount` against `rate`.
///
/// `to_amount = from_amount / effective_rate` and `fee = to_amount * 1%`. Both results are rounded to 8 decimal places
/// with banker's rounding; the fee is taken from the rounded `to_amount`.
pub fn calculate_quote(from_amount: Amount, rate: &ExchangeRate) -> Result<OrderQuote, OrderFlowError> {
    if !from_amount.is_positive() {
        return Err(OrderFlowError::InvalidAmount(format!("{from_amount} is not a positive amount")));
    }
    let effective_rate = rate.effective_rate().ok_or_else(|| {
        let pair = format!("{} → {}", rate.from_currency, rate.to_currency);
        OrderFlowError::InvalidRate(format!("{pair} overflows once the markup is applied"))
    })?;
    if effective_rate <= Decimal::ZERO {
        return Err(OrderFlowError::InvalidRate(format!(
            "{} → {} has a non-positive effective rate of {effective_rate}",
            rate.from_currency, rate.to_currency
        )));
    }
    let out_of_range = || {
        OrderFlowError::AmountOutOfRange(format!("{from_amount} converted at {effective_rate} is too large"))
    };
    let converted = from_amount.to_decimal().checked_div(effective_rate).ok_or_else(out_of_range)?;
    let to_amount = Amount::from_decimal_rounded(converted).map_err(|_| out_of_range())?;
    let fee = to_amount
        .to_decimal()
        .checked_mul(EXCHANGE_FEE_PERCENT)
        .map(|v| v / Decimal::ONE_HUNDRED)
        .ok_or_else(out_of_range)
        .and_then(|v| Amount::from_decimal_rounded(v).map_err(|_| out_of_range()))?;
    Ok(OrderQuote { from_amount, exchange_rate: effective_rate, to_amount, fee })
}

/// A paid invoice, as reported by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidInvoice {
    pub invoice_id: String,
    pub asset: String,
    /// The amount paid, as the decimal string the provider sent
    pub amount: String,
    /// The opaque payload attached when the invoice was created
    pub payload: Option<String>,
}
