//! `SqliteDatabase` is the concrete SQLite backend of the exchange engine.
//!
//! It implements every trait in the [`traits`](crate::traits) module. Each write method opens its own transaction,
//! holding the write lock from the start (see [`begin_write`]). A transaction that is dropped before `commit` is
//! rolled back, so every early return leaves the store as it found it.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqliteConnection, SqlitePool};
use xg_common::SUPPORTED_CURRENCIES;

use super::db::{
    begin_write,
    db_url,
    exchange_rates,
    new_pool,
    notifications,
    orders,
    run_migrations,
    transactions,
    users,
    wallets,
};
use crate::{
    db_types::{
        ExchangeOrder,
        ExchangeRate,
        NewExchangeOrder,
        NewExchangeRate,
        NewNotification,
        NewTransaction,
        NewUser,
        Notification,
        OrderStatusType,
        TransactionStatus,
        TransactionType,
        User,
        Wallet,
    },
    helpers::generate_referral_code,
    traits::{
        CreditedDeposit,
        DepositError,
        DepositManagement,
        DepositResult,
        ExchangeOrderManagement,
        ExchangeRateError,
        ExchangeRates,
        NewDeposit,
        NewOrderRecord,
        OrderManagementError,
        OrderStatusUpdate,
        RegisteredUser,
        UserManagement,
        UserManagementError,
    },
};

const MAX_REFERRAL_CODE_ATTEMPTS: usize = 10;

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the `XG_DATABASE_URL` environment variable (or the default URL).
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        run_migrations(&self.pool).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn fetch_notifications_for_user(&self, user_id: i64) -> Result<Vec<Notification>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        notifications::fetch_notifications_for_user(user_id, &mut conn).await
    }

    pub async fn fetch_wallet(&self, user_id: i64, currency: &str) -> Result<Option<Wallet>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        wallets::fetch_wallet(user_id, currency, &mut conn).await
    }
}

impl ExchangeRates for SqliteDatabase {
    async fn fetch_active_rate(&self, from: &str, to: &str) -> Result<ExchangeRate, ExchangeRateError> {
        let mut conn = self.pool.acquire().await?;
        exchange_rates::fetch_active_rate(from, to, &mut conn)
            .await?
            .ok_or_else(|| ExchangeRateError::RateNotFound { from: from.to_string(), to: to.to_string() })
    }

    async fn fetch_active_rates(&self) -> Result<Vec<ExchangeRate>, ExchangeRateError> {
        let mut conn = self.pool.acquire().await?;
        let rates = exchange_rates::fetch_active_rates(&mut conn).await?;
        Ok(rates)
    }

    async fn set_exchange_rate(&self, rate: NewExchangeRate) -> Result<ExchangeRate, ExchangeRateError> {
        let mut tx = begin_write(&self.pool).await?;
        let replaced =
            exchange_rates::deactivate_rates_for_pair(&rate.from_currency, &rate.to_currency, &mut tx).await?;
        let rate = exchange_rates::insert_rate(&rate, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Rate #{} {} → {} set to {} (+{}%). {replaced} previous rate(s) deactivated",
            rate.id, rate.from_currency, rate.to_currency, rate.rate, rate.markup_percent
        );
        Ok(rate)
    }
}

impl UserManagement for SqliteDatabase {
    async fn fetch_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, UserManagementError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_telegram_id(telegram_id, &mut conn).await?;
        Ok(user)
    }

    async fn fetch_wallets_for_user(&self, user_id: i64) -> Result<Vec<Wallet>, UserManagementError> {
        let mut conn = self.pool.acquire().await?;
        let wallets = wallets::fetch_wallets_for_user(user_id, &mut conn).await?;
        Ok(wallets)
    }

    async fn register_user(&self, user: NewUser) -> Result<RegisteredUser, UserManagementError> {
        let mut tx = begin_write(&self.pool).await?;
        if let Some(existing) = users::fetch_user_by_telegram_id(user.telegram_id, &mut tx).await? {
            let wallets = wallets::fetch_wallets_for_user(existing.id, &mut tx).await?;
            trace!("🗃️ User with telegram id {} is already registered as #{}", user.telegram_id, existing.id);
            return Ok(RegisteredUser { user: existing, wallets, is_new: false });
        }
        let referrer = match user.referral_code.as_deref().map(|c| c.trim().to_ascii_uppercase()) {
            Some(code) => {
                let referrer = users::fetch_user_by_referral_code(&code, &mut tx).await?;
                if referrer.is_none() {
                    debug!("🗃️ Referral code {code} does not belong to anyone. Ignoring it.");
                }
                referrer
            },
            None => None,
        };
        let code = unique_referral_code(&mut tx).await?;
        let inserted = users::insert_user(
            user.telegram_id,
            user.username.as_deref(),
            user.first_name.as_deref(),
            &code,
            referrer.as_ref().map(|r| r.id),
            &mut tx,
        )
        .await;
        let new_user = match inserted {
            Ok(u) => u,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                // Someone else registered this telegram id between our check and our insert.
                tx.rollback().await?;
                return self.registered_user(user.telegram_id).await;
            },
            Err(e) => return Err(e.into()),
        };
        let mut created = Vec::with_capacity(SUPPORTED_CURRENCIES.len());
        for currency in SUPPORTED_CURRENCIES {
            created.push(wallets::create_wallet(new_user.id, currency, &mut tx).await?);
        }
        if let Some(referrer) = &referrer {
            notifications::insert_notification(NewNotification::referral(referrer.id, &new_user), &mut tx).await?;
        }
        tx.commit().await?;
        info!("🗃️ User #{} registered for telegram id {} with referral code {code}", new_user.id, new_user.telegram_id);
        Ok(RegisteredUser { user: new_user, wallets: created, is_new: true })
    }
}

impl SqliteDatabase {
    async fn registered_user(&self, telegram_id: i64) -> Result<RegisteredUser, UserManagementError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_telegram_id(telegram_id, &mut conn)
            .await?
            .ok_or(UserManagementError::UserNotFound(telegram_id))?;
        let wallets = wallets::fetch_wallets_for_user(user.id, &mut conn).await?;
        Ok(RegisteredUser { user, wallets, is_new: false })
    }
}

async fn unique_referral_code(conn: &mut SqliteConnection) -> Result<String, UserManagementError> {
    for _ in 0..MAX_REFERRAL_CODE_ATTEMPTS {
        let code = generate_referral_code();
        if !users::referral_code_exists(&code, &mut *conn).await? {
            return Ok(code);
        }
        trace!("🗃️ Referral code {code} is taken. Trying another one.");
    }
    Err(UserManagementError::ReferralCodeExhausted)
}

impl ExchangeOrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewExchangeOrder) -> Result<NewOrderRecord, OrderManagementError> {
        let mut tx = begin_write(&self.pool).await?;
        let order = orders::insert_order(order, &mut tx).await?;
        debug!("🗃️ Order #{} for user #{} has been saved in the DB", order.id, order.user_id);
        let notification = notifications::insert_notification(NewNotification::order_created(&order), &mut tx).await?;
        tx.commit().await?;
        Ok(NewOrderRecord { order, notification })
    }

    async fn fetch_order(&self, id: i64) -> Result<Option<ExchangeOrder>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_user(
        &self,
        telegram_id: i64,
        limit: i64,
    ) -> Result<Vec<ExchangeOrder>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_telegram_id(telegram_id, limit, &mut conn).await?;
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        id: i64,
        status: OrderStatusType,
    ) -> Result<OrderStatusUpdate, OrderManagementError> {
        let mut tx = begin_write(&self.pool).await?;
        let current = orders::fetch_order(id, &mut tx).await?.ok_or(OrderManagementError::OrderNotFound(id))?;
        let old_status = current.status;
        trace!("🗃️ Updating order #{id}: currently {old_status}, requested {status}");
        if !old_status.can_transition_to(status) {
            debug!("🗃️ Order #{id} cannot change from {old_status} to {status}");
            return Err(OrderManagementError::StatusTransitionForbidden { id, from: old_status, to: status });
        }
        let order = orders::update_order_status(id, old_status, status, &mut tx)
            .await?
            .ok_or(OrderManagementError::StatusTransitionForbidden { id, from: old_status, to: status })?;
        let notification = notifications::insert_notification(NewNotification::order_status(&order), &mut tx).await?;
        let owner = users::fetch_user_by_id(order.user_id, &mut tx)
            .await?
            .ok_or_else(|| OrderManagementError::DatabaseError(format!("Order #{id} has no owner")))?;
        tx.commit().await?;
        debug!("🗃️ Order #{id} changed from {old_status} to {status}");
        Ok(OrderStatusUpdate { old_status, order, notification, telegram_id: owner.telegram_id })
    }
}

impl DepositManagement for SqliteDatabase {
    async fn credit_deposit(&self, deposit: NewDeposit) -> Result<DepositResult, DepositError> {
        let mut tx = begin_write(&self.pool).await?;
        let invoice_id = deposit.invoice_id.as_str();
        if let Some(existing) = transactions::fetch_transaction_by_invoice_id(invoice_id, &mut tx).await? {
            info!("🗃️ Invoice {invoice_id} was already credited in transaction #{}. Nothing to do.", existing.id);
            return Ok(DepositResult::AlreadyCredited(existing));
        }
        let user = users::fetch_user_by_telegram_id(deposit.telegram_id, &mut tx)
            .await?
            .ok_or(DepositError::UserNotFound(deposit.telegram_id))?;
        let wallet = wallets::fetch_wallet(user.id, &deposit.currency, &mut tx)
            .await?
            .ok_or_else(|| DepositError::WalletNotFound { user_id: user.id, currency: deposit.currency.clone() })?;
        let balance = wallet
            .balance
            .checked_add(deposit.amount)
            .map_err(|e| DepositError::BalanceOutOfRange(format!("wallet #{}: {e}", wallet.id)))?;
        let wallet = wallets::update_balance(wallet.id, balance, &mut tx).await?;
        trace!("🗃️ {} {} added to wallet #{} for invoice {invoice_id}", deposit.amount, deposit.currency, wallet.id);
        let entry = NewTransaction {
            user_id: user.id,
            transaction_type: TransactionType::Deposit,
            currency: deposit.currency.clone(),
            amount: deposit.amount,
            status: TransactionStatus::Completed,
            crypto_bot_invoice_id: Some(deposit.invoice_id.clone()),
        };
        let transaction = match transactions::insert_transaction(entry, &mut tx).await {
            Ok(t) => t,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                warn!("🗃️ Invoice {invoice_id} was credited concurrently. Rolling back this attempt.");
                tx.rollback().await?;
                let mut conn = self.pool.acquire().await?;
                let existing = transactions::fetch_transaction_by_invoice_id(invoice_id, &mut conn)
                    .await?
                    .ok_or_else(|| DepositError::DatabaseError(format!("Invoice {invoice_id} vanished")))?;
                return Ok(DepositResult::AlreadyCredited(existing));
            },
            Err(e) => return Err(e.into()),
        };
        let note = NewNotification::deposit(user.id, deposit.amount, &deposit.currency);
        let notification = notifications::insert_notification(note, &mut tx).await?;
        tx.commit().await?;
        info!(
            "🗃️ Deposit of {} {} credited to user #{} (transaction #{}, invoice {invoice_id})",
            deposit.amount, deposit.currency, user.id, transaction.id
        );
        Ok(DepositResult::Credited(CreditedDeposit { user, wallet, transaction, notification }))
    }
}
