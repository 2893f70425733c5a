use std::{fmt::Debug, str::FromStr};

use log::*;
use xg_common::helpers::normalize_currency_code;

use crate::{
    db_types::Amount,
    events::{DepositCreditedEvent, EventProducers},
    helpers::DepositPayload,
    traits::{DepositError, DepositManagement, DepositResult, NewDeposit},
    xg_api::exchange_objects::PaidInvoice,
};

/// `DepositApi` credits payments confirmed by the payment provider to user wallets.
pub struct DepositApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for DepositApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DepositApi")
    }
}

impl<B> DepositApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> DepositApi<B>
where B: DepositManagement
{
    /// Credits a paid invoice to the wallet of the user named in the invoice payload.
    ///
    /// The payload, asset and amount are validated before the backend is touched. Redelivered invoices are recognised
    /// by their invoice id and acknowledged with the original ledger entry, without crediting the wallet again.
    pub async fn process_invoice_paid(&self, invoice: PaidInvoice) -> Result<DepositResult, DepositError> {
        let deposit = validate_invoice(invoice)?;
        let invoice_id = deposit.invoice_id.clone();
        let result = self.db.credit_deposit(deposit).await?;
        match &result {
            DepositResult::Credited(credit) => {
                info!(
                    "🔄️💰️ Invoice {invoice_id} credited {} {} to user #{}. New balance: {}",
                    credit.transaction.amount, credit.wallet.currency, credit.user.id, credit.wallet.balance
                );
                let event = DepositCreditedEvent {
                    telegram_id: credit.user.telegram_id,
                    wallet: credit.wallet.clone(),
                    transaction: credit.transaction.clone(),
                    notification: credit.notification.clone(),
                };
                self.producers.publish_deposit_credited(event);
            },
            DepositResult::AlreadyCredited(tx) => {
                info!("🔄️💰️ Invoice {invoice_id} was already credited in transaction #{}. Ignoring.", tx.id);
            },
        }
        Ok(result)
    }
}

fn validate_invoice(invoice: PaidInvoice) -> Result<NewDeposit, DepositError> {
    let payload = invoice
        .payload
        .as_deref()
        .ok_or_else(|| DepositError::InvalidPayload("The invoice carries no payload".to_string()))?;
    let payload = DepositPayload::from_str(payload).map_err(|e| DepositError::InvalidPayload(e.to_string()))?;
    let currency = normalize_currency_code(&invoice.asset).ok_or_else(|| DepositError::InvalidCurrency(invoice.asset))?;
    let amount = Amount::from_str(&invoice.amount).map_err(|e| DepositError::InvalidAmount(e.to_string()))?;
    if !amount.is_positive() {
        return Err(DepositError::InvalidAmount(format!("{amount} is not a positive amount")));
    }
    Ok(NewDeposit { invoice_id: invoice.invoice_id, telegram_id: payload.telegram_id, currency, amount })
}
