use crate::db_types::{Amount, ExchangeOrder, Notification, OrderStatusType, Transaction, User, Wallet};

/// The result of storing a new order: the order row and the notification written with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderRecord {
    pub order: ExchangeOrder,
    pub notification: Notification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatusUpdate {
    pub old_status: OrderStatusType,
    pub order: ExchangeOrder,
    pub notification: Notification,
    /// The messaging-platform identity of the order owner
    pub telegram_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    pub user: User,
    pub wallets: Vec<Wallet>,
    /// False when the user already existed and nothing was written
    pub is_new: bool,
}

/// A confirmed payment from the payment provider, ready to be credited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeposit {
    pub invoice_id: String,
    pub telegram_id: i64,
    pub currency: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditedDeposit {
    pub user: User,
    pub wallet: Wallet,
    pub transaction: Transaction,
    pub notification: Notification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositResult {
    Credited(CreditedDeposit),
    /// The invoice had been credited before. Holds the original ledger entry.
    AlreadyCredited(Transaction),
}

impl DepositResult {
    pub fn transaction(&self) -> &Transaction {
        match self {
            DepositResult::Credited(deposit) => &deposit.transaction,
            DepositResult::AlreadyCredited(tx) => tx,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, DepositResult::AlreadyCredited(_))
    }
}
