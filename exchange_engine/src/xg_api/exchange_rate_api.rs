//! Resolves and maintains the conversion rates between ordered currency pairs.

use std::fmt::Debug;

use log::*;
use rust_decimal::Decimal;
use xg_common::helpers::normalize_currency_code;

use crate::{
    db_types::{effective_rate, ExchangeRate, NewExchangeRate},
    traits::{ExchangeRateError, ExchangeRates},
};

pub struct ExchangeRateApi<B> {
    db: B,
}

impl<B> Debug for ExchangeRateApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExchangeRateApi")
    }
}

impl<B> ExchangeRateApi<B>
where B: ExchangeRates
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// The active rate for the ordered pair. Currency codes are matched case-insensitively.
    pub async fn fetch_active_rate(&self, from: &str, to: &str) -> Result<ExchangeRate, ExchangeRateError> {
        let (from, to) = normalize_pair(from, to)?;
        self.db.fetch_active_rate(&from, &to).await
    }

    pub async fn fetch_active_rates(&self) -> Result<Vec<ExchangeRate>, ExchangeRateError> {
        self.db.fetch_active_rates().await
    }

    /// Replaces the active rate for a pair after validating it.
    pub async fn set_exchange_rate(&self, rate: NewExchangeRate) -> Result<ExchangeRate, ExchangeRateError> {
        let rate = validate_new_rate(rate)?;
        let result = self.db.set_exchange_rate(rate).await?;
        info!(
            "🔄️💱️ Exchange rate for {} → {} set to {} (+{}%)",
            result.from_currency, result.to_currency, result.rate, result.markup_percent
        );
        Ok(result)
    }
}

fn normalize_pair(from: &str, to: &str) -> Result<(String, String), ExchangeRateError> {
    let from = normalize_currency_code(from)
        .ok_or_else(|| ExchangeRateError::InvalidRate(format!("'{from}' is not a valid currency code")))?;
    let to = normalize_currency_code(to)
        .ok_or_else(|| ExchangeRateError::InvalidRate(format!("'{to}' is not a valid currency code")))?;
    Ok((from, to))
}

fn validate_new_rate(rate: NewExchangeRate) -> Result<NewExchangeRate, ExchangeRateError> {
    let (from, to) = normalize_pair(&rate.from_currency, &rate.to_currency)?;
    if from == to {
        return Err(ExchangeRateError::InvalidRate(format!("{from} cannot be exchanged for itself")));
    }
    if rate.rate <= Decimal::ZERO {
        return Err(ExchangeRateError::InvalidRate(format!("the base rate must be positive, got {}", rate.rate)));
    }
    if rate.markup_percent <= -Decimal::ONE_HUNDRED {
        return Err(ExchangeRateError::InvalidRate(format!(
            "a markup of {}% would make the rate non-positive",
            rate.markup_percent
        )));
    }
    if effective_rate(rate.rate, rate.markup_percent).is_none() {
        return Err(ExchangeRateError::InvalidRate(format!(
            "a rate of {} with a {}% markup is too large",
            rate.rate, rate.markup_percent
        )));
    }
    Ok(NewExchangeRate::new(from, to, rate.rate, rate.markup_percent))
}
